//! Domain models for the turf booking marketplace

mod account;
mod booking;
mod catalog;
mod slot;
mod turf;

pub use account::*;
pub use booking::*;
pub use catalog::*;
pub use slot::*;
pub use turf::*;
