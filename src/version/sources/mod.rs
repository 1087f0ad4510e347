//! VersionSource implementations backed by remote indexes

pub mod fetcher;
pub mod rvm;
pub mod travis;

pub use fetcher::Fetcher;
pub use rvm::RvmIndex;
pub use travis::TravisIndex;

/// Split an index body into its non-empty lines
pub(crate) fn index_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|line| !line.is_empty())
}
