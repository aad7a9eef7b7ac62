//! Simulated paginated user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, RwLock};

use crate::suspension::{
    domain::{PageNumber, UserId, UserRecord, UserStatus},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

const DEPARTMENTS: [&str; 4] = ["IT", "HR", "Sales", "Marketing"];

/// Deterministic stand-in for a real user directory.
///
/// Page `p` holds users `user-<p>-1` to `user-<p>-<page_size>`, named by
/// their overall ordinal. Every tenth user starts out suspended. Status
/// updates are kept in memory and reflected in later listings.
#[derive(Debug, Clone)]
pub struct SimulatedUserDirectory {
    page_size: u32,
    page_limit: Option<u32>,
    statuses: Arc<RwLock<HashMap<UserId, UserStatus>>>,
}

impl SimulatedUserDirectory {
    /// Default number of users per page.
    pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(20) {
        Some(size) => size,
        None => NonZeroU32::MIN,
    };

    /// Creates an unbounded directory with `page_size` users per page.
    #[must_use]
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page_size: page_size.get(),
            page_limit: None,
            statuses: Arc::default(),
        }
    }

    /// Limits the directory to `pages` pages; later pages are empty.
    #[must_use]
    pub const fn with_page_limit(mut self, pages: u32) -> Self {
        self.page_limit = Some(pages);
        self
    }

    fn has_page(&self, page: u32) -> bool {
        self.page_limit.is_none_or(|limit| page <= limit)
    }

    fn is_known(&self, user_id: &UserId) -> bool {
        let Some(rest) = user_id.as_str().strip_prefix("user-") else {
            return false;
        };
        let Some((page_part, index_part)) = rest.split_once('-') else {
            return false;
        };
        match (page_part.parse::<u32>(), index_part.parse::<u32>()) {
            (Ok(page), Ok(index)) => {
                page >= 1 && self.has_page(page) && (1..=self.page_size).contains(&index)
            }
            _ => false,
        }
    }

    fn user_at(
        &self,
        statuses: &HashMap<UserId, UserStatus>,
        page: u32,
        index: u32,
    ) -> UserDirectoryResult<UserRecord> {
        let ordinal = u64::from(page - 1) * u64::from(self.page_size) + u64::from(index);
        let id = UserId::new(format!("user-{page}-{index}")).map_err(UserDirectoryError::backend)?;
        let default_status = if ordinal.rem_euclid(10) == 0 {
            UserStatus::Suspended
        } else {
            UserStatus::Active
        };
        let status = statuses.get(&id).copied().unwrap_or(default_status);
        let department = DEPARTMENTS
            .get(usize::try_from(ordinal.rem_euclid(4)).unwrap_or_default())
            .copied()
            .unwrap_or_default();
        Ok(UserRecord::new(
            id,
            format!("User {ordinal}"),
            format!("user{ordinal}@example.com"),
            department,
            status,
        ))
    }
}

impl Default for SimulatedUserDirectory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

#[async_trait]
impl UserDirectory for SimulatedUserDirectory {
    async fn list_users(&self, page: PageNumber) -> UserDirectoryResult<Vec<UserRecord>> {
        if !self.has_page(page.value()) {
            return Ok(Vec::new());
        }
        let statuses = self.statuses.read().map_err(|err| {
            UserDirectoryError::backend(std::io::Error::other(err.to_string()))
        })?;
        (1..=self.page_size)
            .map(|index| self.user_at(&statuses, page.value(), index))
            .collect()
    }

    async fn update_status(
        &self,
        user_id: &UserId,
        status: UserStatus,
    ) -> UserDirectoryResult<()> {
        if !self.is_known(user_id) {
            return Err(UserDirectoryError::NotFound(user_id.clone()));
        }
        let mut statuses = self.statuses.write().map_err(|err| {
            UserDirectoryError::backend(std::io::Error::other(err.to_string()))
        })?;
        statuses.insert(user_id.clone(), status);
        Ok(())
    }
}
