use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shareit_core::{DomainError, DomainResult, Entity, RequestId, UserId};

/// A user's posting describing an item they want.
///
/// Immutable after creation; items fulfilling it point back via
/// `Item::request` and are resolved on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub id: RequestId,
    pub requester: UserId,
    pub description: String,
    pub created: DateTime<Utc>,
}

impl Entity for ItemRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Posting payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemRequest {
    pub description: String,
}

impl NewItemRequest {
    pub const MAX_DESCRIPTION_LEN: usize = 512;

    pub fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::BlankField("description"));
        }
        if self.description.chars().count() > Self::MAX_DESCRIPTION_LEN {
            return Err(DomainError::FieldTooLong(
                "description",
                Self::MAX_DESCRIPTION_LEN,
            ));
        }
        Ok(())
    }
}
