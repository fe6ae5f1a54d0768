use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shareit_core::{DomainError, UserId};

use crate::booking::Booking;
use crate::status::BookingStatus;

/// Booking state query applied when listing bookings.
///
/// Temporal filters are evaluated against a single `now`; APPROVED bookings
/// are reachable only through `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingFilter {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingFilter {
    pub const VARIANTS: [BookingFilter; 6] = [
        BookingFilter::All,
        BookingFilter::Current,
        BookingFilter::Past,
        BookingFilter::Future,
        BookingFilter::Waiting,
        BookingFilter::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingFilter::All => "ALL",
            BookingFilter::Current => "CURRENT",
            BookingFilter::Past => "PAST",
            BookingFilter::Future => "FUTURE",
            BookingFilter::Waiting => "WAITING",
            BookingFilter::Rejected => "REJECTED",
        }
    }

    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Current => booking.is_current(now),
            BookingFilter::Past => booking.is_past(now),
            BookingFilter::Future => booking.is_future(now),
            BookingFilter::Waiting => booking.status == BookingStatus::Waiting,
            BookingFilter::Rejected => booking.status == BookingStatus::Rejected,
        }
    }

    /// Status the filter pins, if it is a status filter.
    pub fn status(&self) -> Option<BookingStatus> {
        match self {
            BookingFilter::Waiting => Some(BookingStatus::Waiting),
            BookingFilter::Rejected => Some(BookingStatus::Rejected),
            _ => None,
        }
    }
}

impl core::fmt::Display for BookingFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingFilter {
    type Err = DomainError;

    /// Case-insensitive; anything else is an input error, never a fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::VARIANTS
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::unsupported_filter(s))
    }
}

/// Whose bookings a listing is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// Bookings placed by the user.
    Booker(UserId),
    /// Bookings placed on items the user owns.
    Owner(UserId),
}

impl BookingScope {
    pub fn user(&self) -> UserId {
        match self {
            BookingScope::Booker(id) | BookingScope::Owner(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shareit_core::{BookingId, ItemId};

    fn booking(start_h: i64, end_h: i64, status: BookingStatus, now: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(1),
            item: ItemId::new(1),
            booker: UserId::new(2),
            start: now + Duration::hours(start_h),
            end: now + Duration::hours(end_h),
            status,
        }
    }

    #[test]
    fn parses_known_filters_case_insensitively() {
        assert_eq!("ALL".parse(), Ok(BookingFilter::All));
        assert_eq!("current".parse(), Ok(BookingFilter::Current));
        assert_eq!(" Rejected ".parse(), Ok(BookingFilter::Rejected));
    }

    #[test]
    fn unknown_filter_is_an_error() {
        let err = "UNSUPPORTED_STATUS".parse::<BookingFilter>().unwrap_err();
        assert_eq!(err, DomainError::UnsupportedFilter("UNSUPPORTED_STATUS".to_string()));
        assert!("APPROVED".parse::<BookingFilter>().is_err());
    }

    #[test]
    fn temporal_filters() {
        let now = Utc::now();
        let current = booking(-1, 1, BookingStatus::Approved, now);
        let past = booking(-3, -2, BookingStatus::Approved, now);
        let future = booking(2, 3, BookingStatus::Waiting, now);

        assert!(BookingFilter::Current.matches(&current, now));
        assert!(!BookingFilter::Current.matches(&past, now));
        assert!(BookingFilter::Past.matches(&past, now));
        assert!(!BookingFilter::Past.matches(&current, now));
        assert!(BookingFilter::Future.matches(&future, now));
        assert!(!BookingFilter::Future.matches(&current, now));
    }

    #[test]
    fn status_filters_ignore_time() {
        let now = Utc::now();
        let waiting_past = booking(-3, -2, BookingStatus::Waiting, now);
        let rejected_future = booking(2, 3, BookingStatus::Rejected, now);
        let approved = booking(2, 3, BookingStatus::Approved, now);

        assert!(BookingFilter::Waiting.matches(&waiting_past, now));
        assert!(BookingFilter::Rejected.matches(&rejected_future, now));
        assert!(!BookingFilter::Waiting.matches(&approved, now));
        assert!(!BookingFilter::Rejected.matches(&approved, now));
        assert!(BookingFilter::All.matches(&approved, now));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn status_strategy() -> impl Strategy<Value = BookingStatus> {
            prop_oneof![
                Just(BookingStatus::Waiting),
                Just(BookingStatus::Approved),
                Just(BookingStatus::Rejected),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Every booking selected by some filter is also selected by ALL.
            #[test]
            fn all_is_a_superset_of_every_filter(
                start_h in -100i64..100,
                len_h in 1i64..100,
                status in status_strategy(),
            ) {
                let now = Utc::now();
                let b = booking(start_h, start_h + len_h, status, now);
                for filter in BookingFilter::VARIANTS {
                    if filter.matches(&b, now) {
                        prop_assert!(BookingFilter::All.matches(&b, now));
                    }
                }
            }

            /// CURRENT, PAST and FUTURE never overlap.
            #[test]
            fn temporal_filters_are_disjoint(
                start_h in -100i64..100,
                len_h in 1i64..100,
                status in status_strategy(),
            ) {
                let now = Utc::now();
                let b = booking(start_h, start_h + len_h, status, now);
                let hits = [BookingFilter::Current, BookingFilter::Past, BookingFilter::Future]
                    .into_iter()
                    .filter(|f| f.matches(&b, now))
                    .count();
                prop_assert!(hits <= 1);
            }
        }
    }
}
