use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shareit_core::{BookingId, DomainError, DomainResult, Entity, ItemId, UserId};

use crate::status::BookingStatus;

/// Half-open rental period `[start, end)` with `start < end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct BookingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingWindow {
    /// Rejects inverted and empty windows.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::invalid_window(format!(
                "start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// New bookings must lie strictly in the future.
    pub fn ensure_future(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.start <= now {
            return Err(DomainError::invalid_window(format!(
                "start {} is not in the future",
                self.start
            )));
        }
        Ok(())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A time-bounded reservation of an item by a non-owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub item: ItemId,
    pub booker: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Booking {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.start < now && now < self.end
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }

    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }
}

/// Validated booking about to be stored. Status is always WAITING on insert,
/// whatever the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item: ItemId,
    pub booker: UserId,
    pub window: BookingWindow,
}

impl NewBooking {
    pub fn initial_status(&self) -> BookingStatus {
        BookingStatus::Waiting
    }
}

/// Listing order: most recently starting first, ties by insertion (id) order.
pub fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(id),
            item: ItemId::new(1),
            booker: UserId::new(2),
            start,
            end,
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn window_requires_start_before_end() {
        let now = Utc::now();
        assert!(BookingWindow::new(now, now).is_err());
        assert!(BookingWindow::new(now + Duration::hours(1), now).is_err());
        assert!(BookingWindow::new(now, now + Duration::hours(1)).is_ok());
    }

    #[test]
    fn window_must_start_in_the_future() {
        let now = Utc::now();
        let past = BookingWindow::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
        assert!(matches!(
            past.ensure_future(now),
            Err(DomainError::InvalidBookingWindow(_))
        ));

        let future = BookingWindow::new(now + Duration::days(1), now + Duration::days(2)).unwrap();
        assert!(future.ensure_future(now).is_ok());
    }

    #[test]
    fn temporal_predicates_are_strict() {
        let now = Utc::now();
        let b = booking(1, now - Duration::hours(1), now + Duration::hours(1));
        assert!(b.is_current(now));
        assert!(!b.is_past(now));
        assert!(!b.is_future(now));

        let starts_now = booking(2, now, now + Duration::hours(1));
        assert!(!starts_now.is_current(now));
        assert!(!starts_now.is_future(now));
    }

    #[test]
    fn newest_first_breaks_ties_by_insertion_order() {
        let now = Utc::now();
        let mut list = vec![
            booking(1, now, now + Duration::hours(1)),
            booking(2, now + Duration::days(1), now + Duration::days(2)),
            booking(3, now, now + Duration::hours(3)),
        ];
        sort_newest_first(&mut list);
        let ids: Vec<i64> = list.iter().map(|b| b.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
