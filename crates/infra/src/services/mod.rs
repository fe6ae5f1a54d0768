//! Application services.
//!
//! Each service is a cheap-to-clone handle over the shared store and clock.
//! Calls are stateless; every temporal check in a call uses one `now`.
//!
//! Collaborators are read-only: the booking engine consults the user
//! directory, the comment ledger consults the booking engine, and the item
//! catalog composes all three for its views.

pub mod bookings;
pub mod comments;
pub mod error;
pub mod items;
pub mod requests;
pub mod users;

use std::sync::Arc;

use shareit_core::{Clock, SystemClock};

use crate::store::Store;

pub use bookings::{BookingEngine, BookingView};
pub use comments::{CommentLedger, CommentView};
pub use error::{ServiceError, ServiceResult};
pub use items::{ItemCatalog, ItemDetails};
pub use requests::{ItemRequestRegistry, RequestView};
pub use users::UserDirectory;

/// All services wired over one store.
#[derive(Clone)]
pub struct Services {
    pub users: UserDirectory,
    pub items: ItemCatalog,
    pub requests: ItemRequestRegistry,
    pub bookings: BookingEngine,
    pub comments: CommentLedger,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let users = UserDirectory::new(store.clone());
        let bookings = BookingEngine::new(store.clone(), clock.clone(), users.clone());
        let comments = CommentLedger::new(store.clone(), clock.clone(), bookings.clone());
        let items = ItemCatalog::new(
            store.clone(),
            clock.clone(),
            users.clone(),
            bookings.clone(),
            comments.clone(),
        );
        let requests = ItemRequestRegistry::new(store, clock, users.clone());
        Self {
            users,
            items,
            requests,
            bookings,
            comments,
        }
    }

    /// Services over `store` using the wall clock.
    pub fn with_system_clock(store: Arc<dyn Store>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }
}
