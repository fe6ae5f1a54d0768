//! Booking domain module.
//!
//! Business rules for time-bounded reservations, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//! - the WAITING → {APPROVED, REJECTED} state machine
//! - booking window validation
//! - the temporal/status filters used by the listing queries
//! - result ordering and the last/next booking summary shown with an item

pub mod booking;
pub mod filter;
pub mod status;
pub mod summary;

pub use booking::{Booking, BookingWindow, NewBooking, sort_newest_first};
pub use filter::{BookingFilter, BookingScope};
pub use status::BookingStatus;
pub use summary::{BookingShort, ItemBookingSummary};
