use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shareit_core::{BookingId, UserId};

use crate::booking::Booking;

/// Compact booking reference shown alongside an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingShort {
    pub id: BookingId,
    pub booker: UserId,
}

impl From<&Booking> for BookingShort {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            booker: b.booker,
        }
    }
}

/// Last and next bookings of an item relative to `now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBookingSummary {
    pub last: Option<BookingShort>,
    pub next: Option<BookingShort>,
}

impl ItemBookingSummary {
    /// `last`: started before `now`, latest end wins.
    /// `next`: starts after `now`, earliest start wins.
    ///
    /// The input order is irrelevant.
    pub fn compute(bookings: &[Booking], now: DateTime<Utc>) -> Self {
        let last = bookings
            .iter()
            .filter(|b| b.start < now)
            .max_by(|a, b| a.end.cmp(&b.end).then(b.id.cmp(&a.id)))
            .map(BookingShort::from);
        let next = bookings
            .iter()
            .filter(|b| b.start > now)
            .min_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            .map(BookingShort::from);
        Self { last, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::BookingStatus;
    use chrono::Duration;
    use shareit_core::ItemId;

    fn booking(id: i64, start_h: i64, end_h: i64, now: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(id),
            item: ItemId::new(1),
            booker: UserId::new(10 + id),
            start: now + Duration::hours(start_h),
            end: now + Duration::hours(end_h),
            status: BookingStatus::Approved,
        }
    }

    #[test]
    fn picks_latest_ending_past_and_earliest_upcoming() {
        let now = Utc::now();
        let bookings = vec![
            booking(1, -10, -8, now),
            booking(2, -5, 1, now),
            booking(3, 5, 6, now),
            booking(4, 2, 3, now),
        ];
        let summary = ItemBookingSummary::compute(&bookings, now);
        assert_eq!(summary.last.map(|b| b.id), Some(BookingId::new(2)));
        assert_eq!(summary.next.map(|b| b.id), Some(BookingId::new(4)));
        assert_eq!(summary.next.map(|b| b.booker), Some(UserId::new(14)));
    }

    #[test]
    fn empty_history_has_no_summary() {
        assert_eq!(
            ItemBookingSummary::compute(&[], Utc::now()),
            ItemBookingSummary::default()
        );
    }
}
