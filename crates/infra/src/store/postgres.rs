//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `UniqueViolation` | Email already registered |
//! | Database (other) | Any other | `Backend` | FK/check violations, other database errors |
//! | Other | N/A | `Backend` | Pool closed, network errors, decode failures |
//!
//! Referential cleanup on user deletion is done by `ON DELETE CASCADE` in the
//! schema (see `migrations/0001_init.sql`).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use shareit_bookings::{Booking, BookingFilter, BookingScope, BookingStatus, NewBooking};
use shareit_core::{BookingId, CommentId, ItemId, PageRequest, RequestId, UserId};
use shareit_items::{Comment, Item, NewItem, SearchText};
use shareit_requests::{ItemRequest, NewItemRequest};
use shareit_users::{NewUser, User};

use super::r#trait::{
    BookingRepository, CommentRepository, ItemRepository, ItemRequestRepository, StoreError,
    StoreResult, UserRepository,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const BOOKING_COLUMNS: &str = "b.id, b.item_id, b.booker_id, b.start_at, b.end_at, b.status";

/// Postgres-backed store for all five tables.
///
/// `Send + Sync`; the pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url` and apply the schema.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded schema. Idempotent.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn page_bounds(page: PageRequest) -> (i64, i64) {
    let limit = i64::try_from(page.size()).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

fn ids<T: Copy + Into<i64>>(values: &[T]) -> Vec<i64> {
    values.iter().map(|v| (*v).into()).collect()
}

fn filter_clause(filter: BookingFilter) -> &'static str {
    match filter {
        BookingFilter::All => "TRUE",
        BookingFilter::Current => "b.start_at < $2 AND b.end_at > $2",
        BookingFilter::Past => "b.end_at < $2",
        BookingFilter::Future => "b.start_at > $2",
        BookingFilter::Waiting => "b.status = 'WAITING'",
        BookingFilter::Rejected => "b.status = 'REJECTED'",
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user), err)]
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(row.into())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: User) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET name = $2, email = $3 WHERE id = $1 RETURNING id, name, email",
        )
        .bind(user.id.get())
        .bind(&user.name)
        .bind(&user.email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(row.map(Into::into))
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        Ok(row.map(Into::into))
    }

    async fn user_exists(&self, id: UserId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1) AS present")
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_exists", e))?;
        row.try_get("present")
            .map_err(|e| map_sqlx_error("user_exists", e))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "DELETE FROM users WHERE id = $1 RETURNING id, name, email",
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

const ITEM_COLUMNS: &str = "id, owner_id, name, description, available, request_id";

#[async_trait]
impl ItemRepository for PostgresStore {
    #[instrument(skip(self, item), fields(owner_id = %owner), err)]
    async fn insert_item(&self, owner: UserId, item: NewItem) -> StoreResult<Item> {
        let sql = format!(
            "INSERT INTO items (owner_id, name, description, available, request_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(owner.get())
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.available)
            .bind(item.request.map(|r| r.get()))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_item", e))?;
        Ok(row.into())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn update_item(&self, item: Item) -> StoreResult<Option<Item>> {
        let sql = format!(
            "UPDATE items SET name = $2, description = $3, available = $4 \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(item.id.get())
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.available)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_item", e))?;
        Ok(row.map(Into::into))
    }

    async fn find_item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_item", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_items_by_owner(&self, owner: UserId) -> StoreResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(owner.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items_by_owner", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_items_by_request(&self, request: RequestId) -> StoreResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE request_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(request.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items_by_request", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_available_items(&self, text: &SearchText) -> StoreResult<Vec<Item>> {
        // strpos avoids LIKE wildcard escaping of user input.
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE available \
               AND (strpos(lower(name), $1) > 0 OR strpos(lower(description), $1) > 0) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(text.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_available_items", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

const REQUEST_COLUMNS: &str = "id, requester_id, description, created_at";

#[async_trait]
impl ItemRequestRepository for PostgresStore {
    #[instrument(skip(self, request), fields(requester_id = %requester), err)]
    async fn insert_request(
        &self,
        requester: UserId,
        request: NewItemRequest,
        created: DateTime<Utc>,
    ) -> StoreResult<ItemRequest> {
        let sql = format!(
            "INSERT INTO item_requests (requester_id, description, created_at) \
             VALUES ($1, $2, $3) RETURNING {REQUEST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(requester.get())
            .bind(&request.description)
            .bind(created)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_request", e))?;
        Ok(row.into())
    }

    async fn find_request(&self, id: RequestId) -> StoreResult<Option<ItemRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM item_requests WHERE id = $1");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_request", e))?;
        Ok(row.map(Into::into))
    }

    async fn list_requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<ItemRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM item_requests WHERE requester_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(requester.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_requests_by_requester", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_requests_of_others(
        &self,
        requester: UserId,
        page: PageRequest,
    ) -> StoreResult<Vec<ItemRequest>> {
        let (limit, offset) = page_bounds(page);
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM item_requests WHERE requester_id <> $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(requester.get())
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_requests_of_others", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl BookingRepository for PostgresStore {
    #[instrument(skip(self, booking), fields(item_id = %booking.item, booker_id = %booking.booker), err)]
    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let sql = format!(
            "INSERT INTO bookings AS b (item_id, booker_id, start_at, end_at, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking.item.get())
            .bind(booking.booker.get())
            .bind(booking.window.start())
            .bind(booking.window.end())
            .bind(booking.initial_status().as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_booking", e))?;
        row.try_into()
    }

    async fn find_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = $1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_booking", e))?;
        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(booking_id = %id), err)]
    async fn transition_booking(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> StoreResult<Option<Booking>> {
        let sql = format!(
            "UPDATE bookings AS b SET status = $3 WHERE b.id = $1 AND b.status = $2 \
             RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.get())
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("transition_booking", e))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_bookings(
        &self,
        scope: BookingScope,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> StoreResult<Vec<Booking>> {
        let (limit, offset) = page_bounds(page);
        let scope_clause = match scope {
            BookingScope::Booker(_) => "b.booker_id = $1",
            BookingScope::Owner(_) => "i.owner_id = $1",
        };
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b JOIN items i ON i.id = b.item_id \
             WHERE {scope_clause} AND {filter} \
             ORDER BY b.start_at DESC, b.id ASC LIMIT $3 OFFSET $4",
            filter = filter_clause(filter),
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(scope.user().get())
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_bookings", e))?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn first_booking_of(&self, item: ItemId, booker: UserId) -> StoreResult<Option<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.item_id = $1 AND b.booker_id = $2 \
             ORDER BY b.start_at ASC, b.id ASC LIMIT 1"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(item.get())
            .bind(booker.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("first_booking_of", e))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_bookings_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.item_id = ANY($1)");
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(ids(items))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_bookings_for_items", e))?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl CommentRepository for PostgresStore {
    #[instrument(skip(self, text), fields(item_id = %item, author_id = %author), err)]
    async fn insert_comment(
        &self,
        item: ItemId,
        author: UserId,
        text: String,
        created: DateTime<Utc>,
    ) -> StoreResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (item_id, author_id, text, created_at) VALUES ($1, $2, $3, $4) \
             RETURNING id, item_id, author_id, text, created_at",
        )
        .bind(item.get())
        .bind(author.get())
        .bind(&text)
        .bind(created)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_comment", e))?;
        Ok(row.into())
    }

    async fn list_comments_for_items(&self, items: &[ItemId]) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, item_id, author_id, text, created_at FROM comments \
             WHERE item_id = ANY($1) ORDER BY id",
        )
        .bind(ids(items))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_comments_for_items", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

#[derive(Debug)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Debug)]
struct ItemRow {
    id: i64,
    owner_id: i64,
    name: String,
    description: String,
    available: bool,
    request_id: Option<i64>,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            available: row.try_get("available")?,
            request_id: row.try_get("request_id")?,
        })
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: ItemId::new(row.id),
            owner: UserId::new(row.owner_id),
            name: row.name,
            description: row.description,
            available: row.available,
            request: row.request_id.map(RequestId::new),
        }
    }
}

#[derive(Debug)]
struct RequestRow {
    id: i64,
    requester_id: i64,
    description: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for RequestRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(RequestRow {
            id: row.try_get("id")?,
            requester_id: row.try_get("requester_id")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<RequestRow> for ItemRequest {
    fn from(row: RequestRow) -> Self {
        ItemRequest {
            id: RequestId::new(row.id),
            requester: UserId::new(row.requester_id),
            description: row.description,
            created: row.created_at,
        }
    }
}

#[derive(Debug)]
struct BookingRow {
    id: i64,
    item_id: i64,
    booker_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    status: String,
}

impl<'r> FromRow<'r, PgRow> for BookingRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(BookingRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            booker_id: row.try_get("booker_id")?,
            start_at: row.try_get("start_at")?,
            end_at: row.try_get("end_at")?,
            status: row.try_get("status")?,
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(|e| {
            StoreError::Backend(format!("booking {} has unreadable status: {e}", row.id))
        })?;
        Ok(Booking {
            id: BookingId::new(row.id),
            item: ItemId::new(row.item_id),
            booker: UserId::new(row.booker_id),
            start: row.start_at,
            end: row.end_at,
            status,
        })
    }
}

#[derive(Debug)]
struct CommentRow {
    id: i64,
    item_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CommentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CommentRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            author_id: row.try_get("author_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId::new(row.id),
            item: ItemId::new(row.item_id),
            author: UserId::new(row.author_id),
            text: row.text,
            created: row.created_at,
        }
    }
}
