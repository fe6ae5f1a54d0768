use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shareit_bookings::{
    Booking, BookingFilter, BookingScope, BookingStatus, NewBooking, sort_newest_first,
};
use shareit_core::{BookingId, CommentId, Entity, ItemId, PageRequest, RequestId, UserId};
use shareit_items::{Comment, Item, NewItem, SearchText};
use shareit_requests::{ItemRequest, NewItemRequest};
use shareit_users::{NewUser, User};

use super::r#trait::{
    BookingRepository, CommentRepository, ItemRepository, ItemRequestRepository, StoreError,
    StoreResult, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    requests: BTreeMap<RequestId, ItemRequest>,
    bookings: BTreeMap<BookingId, Booking>,
    comments: BTreeMap<CommentId, Comment>,
    last_user: i64,
    last_item: i64,
    last_request: i64,
    last_booking: i64,
    last_comment: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email == email)
    }

    fn owner_of(&self, item: ItemId) -> Option<UserId> {
        self.items.get(&item).map(|i| i.owner)
    }
}

/// In-memory arena holding every table behind one lock.
///
/// Intended for tests/dev. A single lock keeps the email check and the
/// booking status compare-and-set atomic without per-row locking.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

/// Put `entity` into its table under its own id and hand a copy back.
fn put<E>(table: &mut BTreeMap<E::Id, E>, entity: E) -> E
where
    E: Entity + Clone,
    E::Id: Ord,
{
    table.insert(entity.id().clone(), entity.clone());
    entity
}

fn newest_requests_first(requests: &mut [ItemRequest]) {
    requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.write()?;
        if t.email_taken(&user.email, None) {
            return Err(StoreError::UniqueViolation(user.email));
        }
        t.last_user += 1;
        let stored = User {
            id: UserId::new(t.last_user),
            name: user.name,
            email: user.email,
        };
        Ok(put(&mut t.users, stored))
    }

    async fn update_user(&self, user: User) -> StoreResult<Option<User>> {
        let mut t = self.write()?;
        if !t.users.contains_key(&user.id) {
            return Ok(None);
        }
        if t.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::UniqueViolation(user.email));
        }
        Ok(Some(put(&mut t.users, user)))
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.read()?.users.contains_key(&id))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let mut t = self.write()?;
        let Some(user) = t.users.remove(&id) else {
            return Ok(None);
        };

        let owned: Vec<ItemId> = t
            .items
            .values()
            .filter(|i| i.owner == id)
            .map(|i| i.id)
            .collect();
        t.items.retain(|_, i| i.owner != id);
        t.bookings
            .retain(|_, b| b.booker != id && !owned.contains(&b.item));
        t.comments
            .retain(|_, c| c.author != id && !owned.contains(&c.item));

        let posted: Vec<RequestId> = t
            .requests
            .values()
            .filter(|r| r.requester == id)
            .map(|r| r.id)
            .collect();
        t.requests.retain(|_, r| r.requester != id);
        for item in t.items.values_mut() {
            if item.request.is_some_and(|r| posted.contains(&r)) {
                item.request = None;
            }
        }

        Ok(Some(user))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn insert_item(&self, owner: UserId, item: NewItem) -> StoreResult<Item> {
        let mut t = self.write()?;
        t.last_item += 1;
        let stored = Item {
            id: ItemId::new(t.last_item),
            owner,
            name: item.name,
            description: item.description,
            available: item.available,
            request: item.request,
        };
        Ok(put(&mut t.items, stored))
    }

    async fn update_item(&self, item: Item) -> StoreResult<Option<Item>> {
        let mut t = self.write()?;
        match t.items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn list_items_by_owner(&self, owner: UserId) -> StoreResult<Vec<Item>> {
        Ok(self
            .read()?
            .items
            .values()
            .filter(|i| i.owner == owner)
            .cloned()
            .collect())
    }

    async fn list_items_by_request(&self, request: RequestId) -> StoreResult<Vec<Item>> {
        Ok(self
            .read()?
            .items
            .values()
            .filter(|i| i.request == Some(request))
            .cloned()
            .collect())
    }

    async fn search_available_items(&self, text: &SearchText) -> StoreResult<Vec<Item>> {
        Ok(self
            .read()?
            .items
            .values()
            .filter(|i| i.available && i.matches(text))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ItemRequestRepository for InMemoryStore {
    async fn insert_request(
        &self,
        requester: UserId,
        request: NewItemRequest,
        created: DateTime<Utc>,
    ) -> StoreResult<ItemRequest> {
        let mut t = self.write()?;
        t.last_request += 1;
        let stored = ItemRequest {
            id: RequestId::new(t.last_request),
            requester,
            description: request.description,
            created,
        };
        Ok(put(&mut t.requests, stored))
    }

    async fn find_request(&self, id: RequestId) -> StoreResult<Option<ItemRequest>> {
        Ok(self.read()?.requests.get(&id).cloned())
    }

    async fn list_requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<ItemRequest>> {
        let mut out: Vec<ItemRequest> = self
            .read()?
            .requests
            .values()
            .filter(|r| r.requester == requester)
            .cloned()
            .collect();
        newest_requests_first(&mut out);
        Ok(out)
    }

    async fn list_requests_of_others(
        &self,
        requester: UserId,
        page: PageRequest,
    ) -> StoreResult<Vec<ItemRequest>> {
        let mut out: Vec<ItemRequest> = self
            .read()?
            .requests
            .values()
            .filter(|r| r.requester != requester)
            .cloned()
            .collect();
        newest_requests_first(&mut out);
        Ok(page.slice(out))
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut t = self.write()?;
        t.last_booking += 1;
        let stored = Booking {
            id: BookingId::new(t.last_booking),
            item: booking.item,
            booker: booking.booker,
            start: booking.window.start(),
            end: booking.window.end(),
            status: booking.initial_status(),
        };
        Ok(put(&mut t.bookings, stored))
    }

    async fn find_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        Ok(self.read()?.bookings.get(&id).cloned())
    }

    async fn transition_booking(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> StoreResult<Option<Booking>> {
        let mut t = self.write()?;
        match t.bookings.get_mut(&id) {
            Some(b) if b.status == from => {
                b.status = to;
                Ok(Some(b.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_bookings(
        &self,
        scope: BookingScope,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> StoreResult<Vec<Booking>> {
        let t = self.read()?;
        let mut out: Vec<Booking> = t
            .bookings
            .values()
            .filter(|b| match scope {
                BookingScope::Booker(user) => b.booker == user,
                BookingScope::Owner(user) => t.owner_of(b.item) == Some(user),
            })
            .filter(|b| filter.matches(b, now))
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(page.slice(out))
    }

    async fn first_booking_of(&self, item: ItemId, booker: UserId) -> StoreResult<Option<Booking>> {
        Ok(self
            .read()?
            .bookings
            .values()
            .filter(|b| b.item == item && b.booker == booker)
            .min_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn list_bookings_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Booking>> {
        Ok(self
            .read()?
            .bookings
            .values()
            .filter(|b| items.contains(&b.item))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert_comment(
        &self,
        item: ItemId,
        author: UserId,
        text: String,
        created: DateTime<Utc>,
    ) -> StoreResult<Comment> {
        let mut t = self.write()?;
        t.last_comment += 1;
        let stored = Comment {
            id: CommentId::new(t.last_comment),
            item,
            author,
            text,
            created,
        };
        Ok(put(&mut t.comments, stored))
    }

    async fn list_comments_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Comment>> {
        Ok(self
            .read()?
            .comments
            .values()
            .filter(|c| items.contains(&c.item))
            .cloned()
            .collect())
    }
}
