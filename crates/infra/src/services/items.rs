use std::sync::Arc;

use tracing::{debug, info};

use shareit_bookings::ItemBookingSummary;
use shareit_core::{Clock, DomainError, ItemId, UserId};
use shareit_items::{Item, ItemPatch, NewItem, SearchText};

use super::bookings::BookingEngine;
use super::comments::{CommentLedger, CommentView};
use super::error::ServiceResult;
use super::users::UserDirectory;
use crate::store::Store;

/// An item as shown to a viewer: its comments and, for the owner only, the
/// last and next bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub item: Item,
    pub bookings: ItemBookingSummary,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct ItemCatalog {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    users: UserDirectory,
    bookings: BookingEngine,
    comments: CommentLedger,
}

impl ItemCatalog {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        users: UserDirectory,
        bookings: BookingEngine,
        comments: CommentLedger,
    ) -> Self {
        Self {
            store,
            clock,
            users,
            bookings,
            comments,
        }
    }

    pub async fn create(&self, owner: UserId, item: NewItem) -> ServiceResult<Item> {
        item.validate()?;
        self.users.ensure_exists(owner).await?;
        if let Some(request) = item.request {
            if self.store.find_request(request).await?.is_none() {
                return Err(DomainError::RequestNotFound(request).into());
            }
        }
        let created = self.store.insert_item(owner, item).await?;
        info!(item_id = %created.id, user_id = %owner, "item created");
        Ok(created)
    }

    /// Owner-only partial update; absent or blank fields are left as they are.
    pub async fn update(
        &self,
        item_id: ItemId,
        caller: UserId,
        patch: ItemPatch,
    ) -> ServiceResult<Item> {
        let mut item = self.get(item_id).await?;
        item.ensure_owner(caller)?;

        let patch = patch.normalized();
        if patch.is_empty() {
            return Ok(item);
        }
        item.apply(&patch);
        debug!(item_id = %item_id, user_id = %caller, "updating item");
        self.store
            .update_item(item)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(item_id).into())
    }

    pub async fn get(&self, item_id: ItemId) -> ServiceResult<Item> {
        self.store
            .find_item(item_id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(item_id).into())
    }

    /// Item with comments; booking summary only if `viewer` owns it.
    pub async fn details(&self, item_id: ItemId, viewer: UserId) -> ServiceResult<ItemDetails> {
        let now = self.clock.now();
        let item = self.get(item_id).await?;
        let comments = self.comments.list_for_items(&[item_id]).await?;
        let bookings = if item.is_owned_by(viewer) {
            let all = self.bookings.list_for_item(item_id).await?;
            ItemBookingSummary::compute(&all, now)
        } else {
            ItemBookingSummary::default()
        };
        Ok(ItemDetails {
            item,
            bookings,
            comments,
        })
    }

    /// The owner's items by id, each with comments and booking summary.
    pub async fn list_by_owner(&self, owner: UserId) -> ServiceResult<Vec<ItemDetails>> {
        self.users.ensure_exists(owner).await?;
        let now = self.clock.now();
        let items = self.store.list_items_by_owner(owner).await?;
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();

        let bookings = self.bookings.list_for_items(&ids).await?;
        let comments = self.comments.list_for_items(&ids).await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let own_bookings: Vec<_> = bookings
                    .iter()
                    .filter(|b| b.item == item.id)
                    .cloned()
                    .collect();
                let own_comments = comments
                    .iter()
                    .filter(|c| c.comment.item == item.id)
                    .cloned()
                    .collect();
                ItemDetails {
                    bookings: ItemBookingSummary::compute(&own_bookings, now),
                    comments: own_comments,
                    item,
                }
            })
            .collect())
    }

    /// Available items matching `text` in name or description. Blank text
    /// yields nothing without touching the store.
    pub async fn search(&self, text: &str) -> ServiceResult<Vec<Item>> {
        let Some(text) = SearchText::parse(text) else {
            return Ok(Vec::new());
        };
        let found = self.store.search_available_items(&text).await?;
        debug!(text = text.as_str(), count = found.len(), "item search");
        Ok(found)
    }
}
