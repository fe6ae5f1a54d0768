use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use shareit_core::{Clock, DomainError, ItemId, UserId};
use shareit_items::{Comment, NewComment, ensure_comment_window};

use super::bookings::BookingEngine;
use super::error::ServiceResult;
use crate::store::Store;

/// A comment together with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub comment: Comment,
    pub author_name: String,
}

/// Post-rental feedback, gated by the author's booking history.
#[derive(Clone)]
pub struct CommentLedger {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    bookings: BookingEngine,
}

impl CommentLedger {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, bookings: BookingEngine) -> Self {
        Self {
            store,
            clock,
            bookings,
        }
    }

    /// Record a comment by `author` on `item_id`.
    ///
    /// The author's earliest booking of the item must have started. The stored
    /// author is that booking's booker, whatever id the caller presented.
    pub async fn add(
        &self,
        author: UserId,
        item_id: ItemId,
        comment: NewComment,
    ) -> ServiceResult<CommentView> {
        comment.validate()?;
        let now = self.clock.now();

        if self.store.find_item(item_id).await?.is_none() {
            return Err(DomainError::ItemNotFound(item_id).into());
        }
        let booking = self.bookings.first_booking_of(item_id, author).await?;
        ensure_comment_window(booking.start, now)?;

        let booker = self
            .store
            .find_user(booking.booker)
            .await?
            .ok_or(DomainError::UserNotFound(booking.booker))?;
        let stored = self
            .store
            .insert_comment(item_id, booking.booker, comment.text, now)
            .await?;
        info!(item_id = %item_id, user_id = %booker.id, comment_id = %stored.id, "comment added");

        Ok(CommentView {
            comment: stored,
            author_name: booker.name,
        })
    }

    /// Comments on the given items in creation order, authors resolved.
    pub async fn list_for_items(&self, items: &[ItemId]) -> ServiceResult<Vec<CommentView>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let comments = self.store.list_comments_for_items(items).await?;

        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut out = Vec::with_capacity(comments.len());
        for comment in comments {
            let author_name = match names.get(&comment.author) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .store
                        .find_user(comment.author)
                        .await?
                        .map(|u| u.name)
                        .unwrap_or_default();
                    names.insert(comment.author, name.clone());
                    name
                }
            };
            out.push(CommentView {
                comment,
                author_name,
            });
        }
        Ok(out)
    }
}
