//! Booking lifecycle and queries.
//!
//! The engine validates identity and ownership against the user and item
//! tables, then mutates only the bookings table. The WAITING → decided
//! transition is a compare-and-set in the store: when two owners' calls race,
//! the loser re-reads the booking and reports the status that beat it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use shareit_bookings::{
    Booking, BookingFilter, BookingScope, BookingStatus, BookingWindow, NewBooking,
};
use shareit_core::{BookingId, Clock, DomainError, ItemId, PageRequest, UserId};
use shareit_items::Item;
use shareit_users::User;

use super::error::ServiceResult;
use super::users::UserDirectory;
use crate::store::Store;

/// A booking with the item and booker it references, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingView {
    pub booking: Booking,
    pub item: Item,
    pub booker: User,
}

#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    users: UserDirectory,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, users: UserDirectory) -> Self {
        Self {
            store,
            clock,
            users,
        }
    }

    /// Place a WAITING booking on someone else's available item.
    ///
    /// The item's availability flag is left as is; several waiting bookings
    /// may coexist and the owner settles them one by one.
    pub async fn create(
        &self,
        booker: UserId,
        item_id: ItemId,
        window: BookingWindow,
    ) -> ServiceResult<BookingView> {
        let now = self.clock.now();
        window.ensure_future(now)?;

        let item = self.load_item(item_id).await?;
        if !item.available {
            return Err(DomainError::ItemNotAvailable(item_id).into());
        }
        if item.is_owned_by(booker) {
            return Err(DomainError::SelfBookingForbidden(item_id).into());
        }
        let booker_user = self.users.get(booker).await?;

        let booking = self
            .store
            .insert_booking(NewBooking {
                item: item_id,
                booker,
                window,
            })
            .await?;
        info!(
            booking_id = %booking.id,
            item_id = %item_id,
            user_id = %booker,
            status = %booking.status,
            "booking created"
        );
        Ok(BookingView {
            booking,
            item,
            booker: booker_user,
        })
    }

    /// Owner decision on a WAITING booking.
    pub async fn approve(
        &self,
        owner: UserId,
        booking_id: BookingId,
        approved: bool,
    ) -> ServiceResult<BookingView> {
        let current = self.load_booking(booking_id).await?;
        let item = self.load_item(current.item).await?;
        item.ensure_owner(owner)?;

        let target = current.status.decide(approved)?;
        let decided = match self
            .store
            .transition_booking(booking_id, BookingStatus::Waiting, target)
            .await?
        {
            Some(b) => b,
            None => {
                // Someone else decided between our read and the update.
                let winner = self.load_booking(booking_id).await?;
                return Err(DomainError::InvalidStateTransition(
                    winner.status.as_str().to_string(),
                )
                .into());
            }
        };
        info!(
            booking_id = %booking_id,
            item_id = %item.id,
            user_id = %owner,
            status = %decided.status,
            "booking decided"
        );

        let booker = self.users.get(decided.booker).await?;
        Ok(BookingView {
            booking: decided,
            item,
            booker,
        })
    }

    /// Visible to the booker and the item owner only.
    pub async fn get(&self, caller: UserId, booking_id: BookingId) -> ServiceResult<BookingView> {
        let booking = self.load_booking(booking_id).await?;
        let item = self.load_item(booking.item).await?;
        if booking.booker != caller && !item.is_owned_by(caller) {
            return Err(DomainError::ForbiddenAccess(booking_id).into());
        }
        let booker = self.users.get(booking.booker).await?;
        Ok(BookingView {
            booking,
            item,
            booker,
        })
    }

    pub async fn list_by_booker(
        &self,
        booker: UserId,
        filter: BookingFilter,
        page: PageRequest,
    ) -> ServiceResult<Vec<BookingView>> {
        self.list(BookingScope::Booker(booker), filter, page).await
    }

    pub async fn list_by_owner(
        &self,
        owner: UserId,
        filter: BookingFilter,
        page: PageRequest,
    ) -> ServiceResult<Vec<BookingView>> {
        self.list(BookingScope::Owner(owner), filter, page).await
    }

    async fn list(
        &self,
        scope: BookingScope,
        filter: BookingFilter,
        page: PageRequest,
    ) -> ServiceResult<Vec<BookingView>> {
        self.users.ensure_exists(scope.user()).await?;
        let now = self.clock.now();
        let bookings = self.store.list_bookings(scope, filter, now, page).await?;
        debug!(user_id = %scope.user(), filter = %filter, count = bookings.len(), "listed bookings");
        self.resolve(bookings).await
    }

    /// Earliest-starting booking of the item by this booker.
    pub async fn first_booking_of(&self, item: ItemId, booker: UserId) -> ServiceResult<Booking> {
        self.store
            .first_booking_of(item, booker)
            .await?
            .ok_or_else(|| DomainError::NoEligibleBooking { booker, item }.into())
    }

    /// Every booking referencing the item. No ordering guarantee.
    pub async fn list_for_item(&self, item: ItemId) -> ServiceResult<Vec<Booking>> {
        self.list_for_items(&[item]).await
    }

    pub async fn list_for_items(&self, items: &[ItemId]) -> ServiceResult<Vec<Booking>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_bookings_for_items(items).await?)
    }

    async fn load_booking(&self, id: BookingId) -> ServiceResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| DomainError::BookingNotFound(id).into())
    }

    async fn load_item(&self, id: ItemId) -> ServiceResult<Item> {
        self.store
            .find_item(id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(id).into())
    }

    async fn resolve(&self, bookings: Vec<Booking>) -> ServiceResult<Vec<BookingView>> {
        let mut items: HashMap<ItemId, Item> = HashMap::new();
        let mut users: HashMap<UserId, User> = HashMap::new();
        let mut out = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let item = match items.get(&booking.item) {
                Some(i) => i.clone(),
                None => {
                    let i = self.load_item(booking.item).await?;
                    items.insert(i.id, i.clone());
                    i
                }
            };
            let booker = match users.get(&booking.booker) {
                Some(u) => u.clone(),
                None => {
                    let u = self.users.get(booking.booker).await?;
                    users.insert(u.id, u.clone());
                    u
                }
            };
            out.push(BookingView {
                booking,
                item,
                booker,
            });
        }
        Ok(out)
    }
}
