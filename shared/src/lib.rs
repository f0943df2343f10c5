//! Shared types and models for the turf booking marketplace
//!
//! Everything here is free of I/O: domain models, validation, the slot
//! availability engine and the listing query engine. The backend wires these
//! to storage and HTTP.

pub mod availability;
pub mod models;
pub mod query;
pub mod types;
pub mod validation;

pub use availability::*;
pub use models::*;
pub use query::*;
pub use types::*;
pub use validation::*;
