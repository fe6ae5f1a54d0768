use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shareit_core::{CommentId, DomainError, DomainResult, Entity, ItemId, UserId};

/// Post-rental feedback on an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub item: ItemId,
    pub author: UserId,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Comment payload as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
}

impl NewComment {
    pub fn validate(&self) -> DomainResult<()> {
        if self.text.trim().is_empty() {
            return Err(DomainError::BlankField("text"));
        }
        Ok(())
    }
}

/// A comment is accepted only once the author's booking has started.
pub fn ensure_comment_window(booking_start: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
    if booking_start > now {
        return Err(DomainError::CommentTooEarly);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn comment_before_start_is_too_early() {
        let now = Utc::now();
        assert_eq!(
            ensure_comment_window(now + Duration::days(10), now),
            Err(DomainError::CommentTooEarly)
        );
    }

    #[test]
    fn comment_after_start_is_accepted() {
        let now = Utc::now();
        assert!(ensure_comment_window(now - Duration::days(1), now).is_ok());
        assert!(ensure_comment_window(now, now).is_ok());
    }

    #[test]
    fn blank_text_is_rejected() {
        let err = NewComment { text: "\n ".to_string() }.validate().unwrap_err();
        assert_eq!(err, DomainError::BlankField("text"));
    }
}
