use serde::{Deserialize, Serialize};

use shareit_core::{DomainError, DomainResult, Entity, ItemId, RequestId, UserId};

/// A listed, shareable object.
///
/// Comments are not embedded; they reference the item by id and are resolved
/// on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner: UserId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request: Option<RequestId>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Item {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Update authority is exclusive to the owner.
    pub fn ensure_owner(&self, caller: UserId) -> DomainResult<()> {
        if self.is_owned_by(caller) {
            Ok(())
        } else {
            Err(DomainError::ForbiddenNotOwner(self.id))
        }
    }

    /// Apply a partial update. Absent fields are preserved, never cleared.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
    }

    /// Case-insensitive substring match over name or description.
    pub fn matches(&self, text: &SearchText) -> bool {
        let needle = text.as_str();
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Listing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request: Option<RequestId>,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::BlankField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::BlankField("description"));
        }
        Ok(())
    }
}

/// Partial update of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl ItemPatch {
    /// Blank strings carry no information and are treated as absent.
    pub fn normalized(self) -> Self {
        let keep = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            name: keep(self.name),
            description: keep(self.description),
            available: self.available,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.available.is_none()
    }
}

/// Non-blank search needle, lower-cased. Surrounding whitespace is part of
/// the needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    /// `None` for empty or whitespace-only input: such a search matches nothing
    /// and must not reach the store.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
