//! Console configuration.

use crate::suspension::{
    adapters::memory::SimulatedUserDirectory,
    domain::{FailurePolicy, PlaceholderCredential, SuspendPolicy},
    services::{DEFAULT_LEDGER_KEY, SuspensionSettings},
};
use camino::Utf8PathBuf;
use std::num::NonZeroU32;
use std::time::Duration;

/// Configuration for an interactive console session.
///
/// # Examples
///
/// ```
/// use offboard::console::ConsoleConfig;
///
/// let config = ConsoleConfig::default();
/// assert_eq!(config.page_size.get(), 20);
///
/// let demo = ConsoleConfig::demo();
/// assert!(demo.work_interval < config.work_interval);
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Directory holding the persisted suspension history.
    pub history_dir: Utf8PathBuf,
    /// Storage key of the ledger inside the history directory.
    pub ledger_key: String,
    /// Simulated work interval per task.
    pub work_interval: Duration,
    /// Upper bound for a single task action.
    pub task_timeout: Option<Duration>,
    /// Credential revealed after the password-reset task.
    pub credential: PlaceholderCredential,
    /// Behaviour after a task fails.
    pub failure_policy: FailurePolicy,
    /// Whether runs that complete nothing still suspend the user.
    pub suspend_policy: SuspendPolicy,
    /// Users fetched per directory page.
    pub page_size: NonZeroU32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            history_dir: Utf8PathBuf::from(".offboard"),
            ledger_key: DEFAULT_LEDGER_KEY.to_owned(),
            work_interval: Duration::from_secs(1),
            task_timeout: None,
            credential: PlaceholderCredential::default(),
            failure_policy: FailurePolicy::Continue,
            suspend_policy: SuspendPolicy::Always,
            page_size: SimulatedUserDirectory::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ConsoleConfig {
    /// Creates a configuration with a short work interval.
    ///
    /// Useful for demonstrations and tests.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            work_interval: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Returns the run settings derived from this configuration.
    #[must_use]
    pub fn suspension_settings(&self) -> SuspensionSettings {
        SuspensionSettings {
            suspend_policy: self.suspend_policy,
            task_timeout: self.task_timeout,
            credential: self.credential.clone(),
        }
    }
}
