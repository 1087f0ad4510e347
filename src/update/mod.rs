//! Update layer
//! - suggestion.rs: Suggestion and Warning derivation
//! - mutator.rs: Line splicing of version scalars
//! - verifier.rs: Logical comparison of rewritten text
//! - writer.rs: Atomic file replacement
//! - audit.rs: Check and update runs

pub mod audit;
pub mod error;
pub mod mutator;
pub mod suggestion;
pub mod verifier;
pub mod writer;

pub use audit::{Report, UpdateOutcome, change_lines, check, rewrite, update};
pub use error::UpdateError;
pub use suggestion::{Suggestion, Warning};
