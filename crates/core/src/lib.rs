//! `shareit-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the shared error taxonomy, pagination and the clock
//! abstraction every temporal rule is evaluated against.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod page;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{BookingId, CommentId, ItemId, RequestId, UserId};
pub use page::PageRequest;
