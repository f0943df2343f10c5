//! HTTP handlers

pub mod account;
pub mod booking;
pub mod health;
pub mod turf;
pub mod upload;

pub use account::*;
pub use booking::*;
pub use health::*;
pub use turf::*;
pub use upload::upload_media;
