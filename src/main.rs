use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use travis_rubies::config::{
    self, Config, DEFAULT_TRAVIS_YML, RVM_KNOWN_STRINGS_URL, TRAVIS_ROOT_URL,
};
use travis_rubies::update::{UpdateError, UpdateOutcome, change_lines, check, update};
use travis_rubies::version::cache::{Cache, IndexStorer};
use travis_rubies::version::catalog::Catalog;
use travis_rubies::version::source::VersionSource;
use travis_rubies::version::sources::{Fetcher, RvmIndex, TravisIndex};

#[derive(Parser)]
#[command(name = "travis-rubies")]
#[command(version, about = "Check and update ruby versions declared in .travis.yml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Print warnings and suggested updates (default)
    Check,
    /// Rewrite the file with every suggested update
    Update,
}

#[derive(Args)]
struct Options {
    /// File to check
    #[arg(short, long, global = true, default_value = DEFAULT_TRAVIS_YML)]
    file: PathBuf,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Granularities to search at, e.g. `0,1,2`
    #[arg(long, global = true, value_delimiter = ',')]
    parts: Option<Vec<usize>>,

    /// Suggest pre-releases for stable versions
    #[arg(long, global = true)]
    allow_pre: bool,

    /// Only suggest the best version per granularity
    #[arg(long, global = true)]
    no_intermediary: bool,

    /// Never suggest versions of this line (repeatable)
    #[arg(long, global = true)]
    exclude: Vec<String>,

    /// Always download indexes
    #[arg(long, global = true)]
    no_cache: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.options.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr (`RUST_LOG`, warn by default) and optionally to a
/// file as JSON lines
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli.options)?;
    let options = config.update.to_options();
    let file = &cli.options.file;

    let sources = build_sources(&config)?;
    let catalog = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(Catalog::fetch(&sources))
        .context("Failed to fetch available rubies")?;

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            let report = check(file, &catalog, &options)?;
            for line in report.lines() {
                println!("{}", line);
            }

            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Update => match update(file, &catalog, &options) {
            Ok(UpdateOutcome::UpToDate) => Ok(ExitCode::SUCCESS),
            Ok(UpdateOutcome::Updated(suggestions)) => {
                for line in change_lines(&suggestions) {
                    println!("{}", line);
                }
                Ok(ExitCode::SUCCESS)
            }
            Ok(UpdateOutcome::Blocked(warnings)) => {
                for warning in warnings {
                    println!("{}", warning);
                }
                Ok(ExitCode::FAILURE)
            }
            Err(UpdateError::VerificationFailed { content }) => {
                error!("Refusing to write {}", file.display());
                eprintln!("{}", content);
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to update {}", file.display())),
        },
    }
}

/// Configuration file values overridden by command line flags
fn load_config(options: &Options) -> anyhow::Result<Config> {
    let mut config = match &options.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(parts) = &options.parts {
        config.update.parts = parts.clone();
    }
    if options.allow_pre {
        config.update.allow_pre = true;
    }
    if options.no_intermediary {
        config.update.intermediary = false;
    }
    config.update.exclude.extend(options.exclude.iter().cloned());
    if options.no_cache {
        config.cache.enabled = false;
    }

    anyhow::ensure!(!config.update.parts.is_empty(), "parts must not be empty");

    Ok(config)
}

fn build_sources(config: &Config) -> anyhow::Result<Vec<Box<dyn VersionSource>>> {
    let storer: Option<Arc<dyn IndexStorer>> = if config.cache.enabled {
        Some(Arc::new(Cache::new(
            &config::db_path(),
            config.cache.refresh_interval,
        )?))
    } else {
        None
    };
    let fetcher = Arc::new(Fetcher::new(storer)?);

    let mut sources: Vec<Box<dyn VersionSource>> = Vec::new();
    if config.sources.travis.enabled {
        sources.push(Box::new(
            TravisIndex::new(fetcher.clone(), TRAVIS_ROOT_URL)
                .with_base_url(config.sources.travis.base_url.clone())
                .on_travis(config::on_travis()),
        ));
    }
    if config.sources.rvm.enabled {
        sources.push(Box::new(RvmIndex::new(fetcher, RVM_KNOWN_STRINGS_URL)));
    }

    anyhow::ensure!(!sources.is_empty(), "all version sources are disabled");

    Ok(sources)
}
