//! User directory port: paginated listing and status write-back.

use crate::suspension::domain::{PageNumber, UserId, UserRecord, UserStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Source of user records and writer-of-record for their status.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns one page of users.
    ///
    /// Callers accumulate pages; an empty page means the listing is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the directory cannot be queried.
    async fn list_users(&self, page: PageNumber) -> UserDirectoryResult<Vec<UserRecord>>;

    /// Applies a status computed by the suspension core.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] for unknown users.
    async fn update_status(
        &self,
        user_id: &UserId,
        status: UserStatus,
    ) -> UserDirectoryResult<()>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// No user exists with the identifier.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Directory backend failure.
    #[error("directory error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
