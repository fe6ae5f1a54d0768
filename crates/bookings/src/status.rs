use core::str::FromStr;

use serde::{Deserialize, Serialize};

use shareit_core::{DomainError, DomainResult};

/// Booking lifecycle.
///
/// ```text
/// WAITING ──approve(true)──▶ APPROVED
///    │
///    └────approve(false)──▶ REJECTED
/// ```
///
/// APPROVED and REJECTED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Waiting)
    }

    /// The owner's decision on a waiting booking.
    pub fn decide(self, approved: bool) -> DomainResult<BookingStatus> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStateTransition(self.as_str().to_string()));
        }
        Ok(if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        })
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(DomainError::invalid_id(format!("booking status: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_can_be_approved_or_rejected() {
        assert_eq!(BookingStatus::Waiting.decide(true), Ok(BookingStatus::Approved));
        assert_eq!(BookingStatus::Waiting.decide(false), Ok(BookingStatus::Rejected));
    }

    #[test]
    fn decided_bookings_cannot_transition_again() {
        for status in [BookingStatus::Approved, BookingStatus::Rejected] {
            for decision in [true, false] {
                assert!(matches!(
                    status.decide(decision),
                    Err(DomainError::InvalidStateTransition(_))
                ));
            }
        }
    }

    #[test]
    fn string_round_trip_uses_upper_case_names() {
        for status in [
            BookingStatus::Waiting,
            BookingStatus::Approved,
            BookingStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert_eq!(BookingStatus::Approved.to_string(), "APPROVED");
    }
}
