//! Prebuilt rubies offered by rubies.travis-ci.org

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};

use crate::version::error::SourceError;
use crate::version::source::VersionSource;
use crate::version::sources::{Fetcher, index_lines};

static ARCHIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^/]+)\.tar\.(?:gz|bz2)$").expect("valid archive regex"));
static RVM_SYSTEM_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:system|remote.path):\s*"(.*?)""#).expect("valid rvm debug regex")
});

/// Archives listed in the Travis rubies index for one platform
///
/// The index lists archives for every platform; only URLs below the base
/// URL are kept. The base URL is, in order of preference: the configured
/// one, the system path reported by `rvm debug` when running on Travis, or
/// the first ubuntu directory in the index.
pub struct TravisIndex {
    fetcher: Arc<Fetcher>,
    root_url: String,
    base_url: Option<String>,
    on_travis: bool,
}

impl TravisIndex {
    pub fn new(fetcher: Arc<Fetcher>, root_url: &str) -> Self {
        Self {
            fetcher,
            root_url: root_url.to_string(),
            base_url: None,
            on_travis: false,
        }
    }

    /// Use a fixed platform directory instead of detecting it
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Ask `rvm debug` for the platform directory
    pub fn on_travis(mut self, on_travis: bool) -> Self {
        self.on_travis = on_travis;
        self
    }

    fn index_url(&self) -> String {
        format!("{}index.txt", self.root_url)
    }

    async fn base_url(&self, urls: &[&str]) -> Result<String, SourceError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }

        if self.on_travis {
            let output = rvm_debug().await?;
            let system_path =
                parse_rvm_system_path(&output).ok_or_else(|| SourceError::Command {
                    command: "rvm debug".to_string(),
                    message: "system path not found in output".to_string(),
                })?;
            return Ok(format!("{}{}/", self.root_url, system_path));
        }

        first_ubuntu_base_url(&self.root_url, urls)
    }
}

#[async_trait::async_trait]
impl VersionSource for TravisIndex {
    fn name(&self) -> &'static str {
        "travis"
    }

    async fn fetch(&self) -> Result<Vec<String>, SourceError> {
        let body = self.fetcher.data(&self.index_url()).await?;
        let urls: Vec<&str> = index_lines(&body).collect();

        let base_url = self.base_url(&urls).await?;
        info!("Using rubies from {}", base_url);

        let versions: Vec<String> = urls
            .iter()
            .filter(|url| url.starts_with(&base_url))
            .filter_map(|url| archive_stem(url))
            .map(str::to_string)
            .collect();

        debug!("{} of {} archives match {}", versions.len(), urls.len(), base_url);
        Ok(versions)
    }
}

async fn rvm_debug() -> Result<String, SourceError> {
    let output = tokio::process::Command::new("rvm")
        .arg("debug")
        .output()
        .await
        .map_err(|e| SourceError::Command {
            command: "rvm debug".to_string(),
            message: e.to_string(),
        })?;

    command_stdout("rvm debug", output)
}

/// Stdout of a finished command, or its stderr as the error when it failed
fn command_stdout(command: &str, output: std::process::Output) -> Result<String, SourceError> {
    if !output.status.success() {
        return Err(SourceError::Command {
            command: command.to_string(),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract the platform path from `rvm debug` output
fn parse_rvm_system_path(output: &str) -> Option<&str> {
    RVM_SYSTEM_PATH_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Directory of the lexicographically first ubuntu archive
fn first_ubuntu_base_url(root_url: &str, urls: &[&str]) -> Result<String, SourceError> {
    let prefix = format!("{}ubuntu/", root_url);

    let first = urls
        .iter()
        .filter(|url| url.starts_with(&prefix))
        .min()
        .ok_or_else(|| SourceError::BaseUrlNotFound {
            prefix: prefix.clone(),
            urls: urls.join("\n"),
        })?;

    let dir_end = first.rfind('/').map_or(first.len(), |pos| pos + 1);
    Ok(first[..dir_end].to_string())
}

/// `https://.../ruby-2.4.1.tar.bz2` -> `ruby-2.4.1`
fn archive_stem(url: &str) -> Option<&str> {
    ARCHIVE_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
