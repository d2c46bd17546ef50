//! os-core: shared foundation for the translator crates.
//!
//! Contains:
//! - ids (compact arena indices and persistent handles)
//! - numeric (finiteness guards and tolerant comparison)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

pub use error::{OsError, OsResult};
pub use ids::*;
pub use numeric::*;
