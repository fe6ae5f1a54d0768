//! Domain error model.

use thiserror::Error;

use crate::id::{BookingId, ItemId, RequestId, UserId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification of a domain failure.
///
/// The HTTP boundary translates a kind into a status code; nothing inside the
/// domain depends on the transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The caller is identified but may not act on this entity.
    Forbidden,
    /// Email or state collision.
    Conflict,
    /// Malformed input, unsupported filter or disallowed state transition.
    InvalidInput,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, authorization). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    #[error("item request {0} not found")]
    RequestNotFound(RequestId),

    /// The user never booked the item, so there is nothing to comment on.
    #[error("user {booker} has no booking of item {item}")]
    NoEligibleBooking { booker: UserId, item: ItemId },

    /// Only the item owner may mutate the item or decide its bookings.
    #[error("only the owner of item {0} may do this")]
    ForbiddenNotOwner(ItemId),

    /// Only the booker or the item owner may read a booking.
    #[error("booking {0} is visible to its booker and the item owner only")]
    ForbiddenAccess(BookingId),

    #[error("owner cannot book their own item {0}")]
    SelfBookingForbidden(ItemId),

    #[error("item {0} is not available for booking")]
    ItemNotAvailable(ItemId),

    #[error("email {0} is already in use")]
    EmailConflict(String),

    #[error("invalid booking window: {0}")]
    InvalidBookingWindow(String),

    #[error("booking is already {0}")]
    InvalidStateTransition(String),

    #[error("Unknown state: {0}")]
    UnsupportedFilter(String),

    #[error("page size must be positive, got {0}")]
    InvalidPageSize(i64),

    #[error("page offset must not be negative, got {0}")]
    InvalidPageOffset(i64),

    /// Comments are accepted only once the rental period has started.
    #[error("comments are accepted only after the booking starts")]
    CommentTooEarly,

    #[error("{0} must not be blank")]
    BlankField(&'static str),

    #[error("{0} is too long (max {1} characters)")]
    FieldTooLong(&'static str, usize),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidBookingWindow(msg.into())
    }

    pub fn unsupported_filter(raw: impl Into<String>) -> Self {
        Self::UnsupportedFilter(raw.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::ItemNotFound(_)
            | DomainError::BookingNotFound(_)
            | DomainError::RequestNotFound(_)
            | DomainError::NoEligibleBooking { .. }
            | DomainError::SelfBookingForbidden(_) => ErrorKind::NotFound,

            DomainError::ForbiddenNotOwner(_) | DomainError::ForbiddenAccess(_) => {
                ErrorKind::Forbidden
            }

            DomainError::EmailConflict(_) => ErrorKind::Conflict,

            DomainError::ItemNotAvailable(_)
            | DomainError::InvalidBookingWindow(_)
            | DomainError::InvalidStateTransition(_)
            | DomainError::UnsupportedFilter(_)
            | DomainError::InvalidPageSize(_)
            | DomainError::InvalidPageOffset(_)
            | DomainError::CommentTooEarly
            | DomainError::BlankField(_)
            | DomainError::FieldTooLong(..)
            | DomainError::InvalidEmail(_)
            | DomainError::InvalidId(_) => ErrorKind::InvalidInput,
        }
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UserNotFound(_) => "user_not_found",
            DomainError::ItemNotFound(_) => "item_not_found",
            DomainError::BookingNotFound(_) => "booking_not_found",
            DomainError::RequestNotFound(_) => "request_not_found",
            DomainError::NoEligibleBooking { .. } => "no_eligible_booking",
            DomainError::ForbiddenNotOwner(_) => "forbidden_not_owner",
            DomainError::ForbiddenAccess(_) => "forbidden_access",
            DomainError::SelfBookingForbidden(_) => "self_booking_forbidden",
            DomainError::ItemNotAvailable(_) => "booking_not_available",
            DomainError::EmailConflict(_) => "email_conflict",
            DomainError::InvalidBookingWindow(_) => "invalid_booking_window",
            DomainError::InvalidStateTransition(_) => "invalid_state_transition",
            DomainError::UnsupportedFilter(_) => "unsupported_filter",
            DomainError::InvalidPageSize(_) => "invalid_page_size",
            DomainError::InvalidPageOffset(_) => "invalid_page_offset",
            DomainError::CommentTooEarly => "comment_too_early",
            DomainError::BlankField(_) => "validation_error",
            DomainError::FieldTooLong(..) => "validation_error",
            DomainError::InvalidEmail(_) => "invalid_email",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}
