use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use shareit_bookings::{Booking, BookingFilter, BookingScope, BookingStatus, NewBooking};
use shareit_core::{BookingId, ItemId, PageRequest, RequestId, UserId};
use shareit_items::{Comment, Item, NewItem, SearchText};
use shareit_requests::{ItemRequest, NewItemRequest};
use shareit_users::{NewUser, User};

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. The only
/// one with business meaning is `UniqueViolation`, which the user directory
/// turns into an email conflict.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Users table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken. The check is the
    /// store's constraint, not a read-then-write in the caller.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Overwrites the stored record. `Ok(None)` if the user no longer exists.
    async fn update_user(&self, user: User) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn user_exists(&self, id: UserId) -> StoreResult<bool>;

    /// Removes the user and everything that references them.
    async fn delete_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// All users, ordered by id.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// Items table.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert_item(&self, owner: UserId, item: NewItem) -> StoreResult<Item>;

    async fn update_item(&self, item: Item) -> StoreResult<Option<Item>>;

    async fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Ordered by id.
    async fn list_items_by_owner(&self, owner: UserId) -> StoreResult<Vec<Item>>;

    /// Items fulfilling a request, ordered by id.
    async fn list_items_by_request(&self, request: RequestId) -> StoreResult<Vec<Item>>;

    /// Available items whose name or description contains `text`
    /// (case-insensitive), each at most once, ordered by id.
    async fn search_available_items(&self, text: &SearchText) -> StoreResult<Vec<Item>>;
}

/// Item requests table.
#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    async fn insert_request(
        &self,
        requester: UserId,
        request: NewItemRequest,
        created: DateTime<Utc>,
    ) -> StoreResult<ItemRequest>;

    async fn find_request(&self, id: RequestId) -> StoreResult<Option<ItemRequest>>;

    /// The requester's own postings, newest first.
    async fn list_requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<ItemRequest>>;

    /// Everybody else's postings, newest first, paged.
    async fn list_requests_of_others(
        &self,
        requester: UserId,
        page: PageRequest,
    ) -> StoreResult<Vec<ItemRequest>>;
}

/// Bookings table.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores the booking with status WAITING.
    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking>;

    async fn find_booking(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    /// Atomic compare-and-set on the status. Returns `Ok(None)` when the
    /// stored status is not `from` (another caller decided first, or the
    /// booking vanished).
    async fn transition_booking(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> StoreResult<Option<Booking>>;

    /// Filtered listing, newest start first, ties by id ascending.
    async fn list_bookings(
        &self,
        scope: BookingScope,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> StoreResult<Vec<Booking>>;

    /// Earliest-starting booking of `item` by `booker`.
    async fn first_booking_of(&self, item: ItemId, booker: UserId) -> StoreResult<Option<Booking>>;

    /// All bookings of the given items. No ordering guarantee.
    async fn list_bookings_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Booking>>;
}

/// Comments table.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(
        &self,
        item: ItemId,
        author: UserId,
        text: String,
        created: DateTime<Utc>,
    ) -> StoreResult<Comment>;

    /// Comments on the given items, in creation order.
    async fn list_comments_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Comment>>;
}

/// Full storage surface used by the services.
pub trait Store:
    UserRepository + ItemRepository + ItemRequestRepository + BookingRepository + CommentRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + ItemRepository
        + ItemRequestRepository
        + BookingRepository
        + CommentRepository
{
}
