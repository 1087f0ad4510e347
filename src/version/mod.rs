//! Version layer: parsing, catalogs of installable rubies and update selection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sources   │────▶│   Catalog   │────▶│  Resolver   │
//! │(travis,rvm) │     │  (sorted)   │     │  (update)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │    Cache    │
//! │  (sqlite)   │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`key`]: `VersionKey` parsing, ordering and matching
//! - [`catalog`]: Sorted, deduplicated set of installable versions
//! - [`resolver`]: Upgrade candidate selection (`update`, `updates`)
//! - [`source`]: `VersionSource` trait for remote version lists
//! - [`sources`]: Travis rubies index and RVM known strings
//! - [`cache`]: SQLite-based cache of downloaded indexes
//! - [`error`]: Error types for cache and source operations

pub mod cache;
pub mod catalog;
pub mod error;
pub mod key;
pub mod resolver;
pub mod source;
pub mod sources;
