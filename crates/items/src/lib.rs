//! Item catalog domain module: listings, partial updates, search and the
//! post-rental comment rules.

pub mod comment;
pub mod item;

pub use comment::{Comment, NewComment, ensure_comment_window};
pub use item::{Item, ItemPatch, NewItem, SearchText};
