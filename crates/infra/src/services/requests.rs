use std::sync::Arc;

use tracing::info;

use shareit_core::{Clock, DomainError, PageRequest, RequestId, UserId};
use shareit_items::Item;
use shareit_requests::{ItemRequest, NewItemRequest};

use super::error::ServiceResult;
use super::users::UserDirectory;
use crate::store::Store;

/// A request together with the items offered against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}

#[derive(Clone)]
pub struct ItemRequestRegistry {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    users: UserDirectory,
}

impl ItemRequestRegistry {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, users: UserDirectory) -> Self {
        Self {
            store,
            clock,
            users,
        }
    }

    pub async fn create(
        &self,
        requester: UserId,
        request: NewItemRequest,
    ) -> ServiceResult<RequestView> {
        request.validate()?;
        self.users.ensure_exists(requester).await?;
        let created = self
            .store
            .insert_request(requester, request, self.clock.now())
            .await?;
        info!(request_id = %created.id, user_id = %requester, "item request created");
        Ok(RequestView {
            request: created,
            items: Vec::new(),
        })
    }

    /// The requester's own postings, newest first.
    pub async fn list_by_requester(&self, requester: UserId) -> ServiceResult<Vec<RequestView>> {
        self.users.ensure_exists(requester).await?;
        let requests = self.store.list_requests_by_requester(requester).await?;
        self.with_items(requests).await
    }

    /// Other users' postings, newest first, paged.
    pub async fn list_of_others(
        &self,
        requester: UserId,
        page: PageRequest,
    ) -> ServiceResult<Vec<RequestView>> {
        self.users.ensure_exists(requester).await?;
        let requests = self.store.list_requests_of_others(requester, page).await?;
        self.with_items(requests).await
    }

    /// Any existing user may view any request; `requester` is only checked
    /// for existence.
    pub async fn get(
        &self,
        requester: Option<UserId>,
        request_id: RequestId,
    ) -> ServiceResult<RequestView> {
        if let Some(requester) = requester {
            self.users.ensure_exists(requester).await?;
        }
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(DomainError::RequestNotFound(request_id))?;
        let items = self.store.list_items_by_request(request_id).await?;
        Ok(RequestView { request, items })
    }

    async fn with_items(&self, requests: Vec<ItemRequest>) -> ServiceResult<Vec<RequestView>> {
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            let items = self.store.list_items_by_request(request.id).await?;
            out.push(RequestView { request, items });
        }
        Ok(out)
    }
}
