use std::sync::Arc;

use tracing::{debug, info};

use shareit_core::{DomainError, UserId};
use shareit_users::{NewUser, User, UserPatch};

use super::error::{ServiceError, ServiceResult};
use crate::store::{Store, StoreError};

/// Owns user identity and the one-account-per-email rule.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
}

/// Uniqueness is the store's constraint; surface it as the domain conflict.
fn email_conflict(email: &str) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |err| match err {
        StoreError::UniqueViolation(_) => DomainError::EmailConflict(email.to_string()).into(),
        other => other.into(),
    }
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: NewUser) -> ServiceResult<User> {
        user.validate()?;
        let email = user.email.clone();
        let created = self
            .store
            .insert_user(user)
            .await
            .map_err(email_conflict(&email))?;
        info!(user_id = %created.id, "user created");
        Ok(created)
    }

    pub async fn get(&self, id: UserId) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id).into())
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Merge the present patch fields into the stored user.
    pub async fn update(&self, id: UserId, patch: UserPatch) -> ServiceResult<User> {
        patch.validate()?;
        let mut user = self.get(id).await?;
        let changes_email = patch.changes_email(&user);
        user.apply(&patch);
        debug!(user_id = %id, changes_email, "updating user");

        let email = user.email.clone();
        self.store
            .update_user(user)
            .await
            .map_err(email_conflict(&email))?
            .ok_or_else(|| DomainError::UserNotFound(id).into())
    }

    /// Remove the user and return the final record.
    pub async fn delete(&self, id: UserId) -> ServiceResult<User> {
        let removed = self
            .store
            .delete_user(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))?;
        info!(user_id = %id, "user deleted");
        Ok(removed)
    }

    pub async fn exists(&self, id: UserId) -> ServiceResult<bool> {
        Ok(self.store.user_exists(id).await?)
    }

    /// `UserNotFound` unless the user exists.
    pub async fn ensure_exists(&self, id: UserId) -> ServiceResult<()> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(DomainError::UserNotFound(id).into())
        }
    }
}
