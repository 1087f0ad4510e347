pub mod config;
pub mod document;
pub mod update;
pub mod version;
