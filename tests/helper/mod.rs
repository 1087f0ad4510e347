//! Shared setup for end-to-end tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mockito::{Server, ServerGuard};
use tempfile::TempDir;

use travis_rubies::version::catalog::Catalog;
use travis_rubies::version::source::VersionSource;
use travis_rubies::version::sources::{Fetcher, RvmIndex, TravisIndex};

/// Write `content` to a .travis.yml inside a fresh temporary directory
pub fn create_travis_yml(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".travis.yml");
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Catalog built directly from version strings
pub fn catalog(versions: &[&str]) -> Catalog {
    versions.iter().copied().collect()
}

/// Mock server serving a Travis index with archives for `ubuntu/16.04`
/// and an RVM known_strings file
pub async fn create_index_server(archives: &[&str], known_strings: &[&str]) -> ServerGuard {
    let mut server = Server::new_async().await;
    let root = format!("{}/", server.url());

    let mut index: Vec<String> = archives
        .iter()
        .map(|name| format!("{root}ubuntu/16.04/x86_64/{name}.tar.bz2"))
        .collect();
    index.push(format!("{root}osx/10.12/x86_64/ruby-9.9.9.tar.bz2"));

    server
        .mock("GET", "/index.txt")
        .with_status(200)
        .with_body(index.join("\n"))
        .create_async()
        .await;

    server
        .mock("GET", "/config/known_strings")
        .with_status(200)
        .with_body(known_strings.join("\n"))
        .create_async()
        .await;

    server
}

/// Sources reading from a server created by [`create_index_server`]
pub fn create_sources(server: &ServerGuard) -> Vec<Box<dyn VersionSource>> {
    let fetcher = Arc::new(Fetcher::new(None).unwrap());
    let root = format!("{}/", server.url());

    vec![
        Box::new(TravisIndex::new(fetcher.clone(), &root)),
        Box::new(RvmIndex::new(
            fetcher,
            &format!("{}/config/known_strings", server.url()),
        )),
    ]
}
