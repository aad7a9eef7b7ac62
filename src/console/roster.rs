//! Accumulated directory pages with an optional search filter.

use crate::suspension::domain::{PageNumber, UserRecord};

/// Users loaded so far, in directory order.
#[derive(Debug, Clone)]
pub struct UserRoster {
    users: Vec<UserRecord>,
    next_page: PageNumber,
    exhausted: bool,
    filter: Option<String>,
}

impl Default for UserRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRoster {
    /// Creates an empty roster that will request the first page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            users: Vec::new(),
            next_page: PageNumber::FIRST,
            exhausted: false,
            filter: None,
        }
    }

    /// Returns the page to request next, or `None` once the directory ran
    /// dry.
    #[must_use]
    pub const fn next_page(&self) -> Option<PageNumber> {
        if self.exhausted {
            None
        } else {
            Some(self.next_page)
        }
    }

    /// Returns whether at least one page has been requested.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.next_page != PageNumber::FIRST || self.exhausted
    }

    /// Appends a fetched page. An empty page marks the roster exhausted.
    pub fn append_page(&mut self, users: Vec<UserRecord>) {
        if users.is_empty() {
            self.exhausted = true;
            return;
        }
        self.users.extend(users);
        self.next_page = self.next_page.next();
    }

    /// Returns whether the directory has no further pages.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Sets the search term. A blank term clears the filter.
    pub fn set_filter(&mut self, term: &str) {
        let trimmed = term.trim();
        self.filter = (!trimmed.is_empty()).then(|| trimmed.to_owned());
    }

    /// Removes the search term.
    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    /// Returns the active search term.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Returns the users matching the active filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&UserRecord> {
        self.users
            .iter()
            .filter(|user| self.filter.as_deref().is_none_or(|term| user.matches(term)))
            .collect()
    }

    /// Finds a loaded user by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id().as_str() == id)
    }

    /// Replaces the loaded copy of `updated`, returning whether it was found.
    pub fn apply(&mut self, updated: &UserRecord) -> bool {
        let Some(slot) = self.users.iter_mut().find(|user| user.id() == updated.id()) else {
            return false;
        };
        *slot = updated.clone();
        true
    }
}
