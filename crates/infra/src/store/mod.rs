//! Persistence boundary.
//!
//! Repository traits describe the query contracts the services rely on; the
//! in-memory arena backs tests/dev and Postgres backs production. Both enforce
//! email uniqueness and the WAITING compare-and-set inside the store so that
//! concurrent callers cannot both win.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use r#trait::{
    BookingRepository, CommentRepository, ItemRepository, ItemRequestRepository, Store,
    StoreError, StoreResult, UserRepository,
};
