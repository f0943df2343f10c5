//! Business logic services for the turf booking marketplace

pub mod account;
pub mod booking;
pub mod turf;

pub use account::AccountService;
pub use booking::BookingService;
pub use turf::TurfService;
