//! ts-core: stable foundation for transit-spread.
//!
//! Contains:
//! - geo (planar locations + uom lengths)
//! - kinds (vertex and edge classifications)
//! - numeric (Real, uniformity and finiteness checks)
//! - ids (stable compact IDs for graph objects)
//! - error (shared error types)

pub mod error;
pub mod geo;
pub mod ids;
pub mod kinds;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TsError, TsResult};
pub use geo::*;
pub use ids::*;
pub use kinds::*;
pub use numeric::*;
