//! Item request registry domain module ("wanted item" postings).

pub mod request;

pub use request::{ItemRequest, NewItemRequest};
