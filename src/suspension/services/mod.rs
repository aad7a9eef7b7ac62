//! Application services for suspension orchestration.

mod history;
mod observer;
mod orchestration;

pub use history::{
    DEFAULT_LEDGER_KEY, LedgerLoadOutcome, SuspensionHistoryError, SuspensionHistoryResult,
    SuspensionHistoryService,
};
pub use observer::{RunEvent, RunObserver};
pub use orchestration::{
    SuspensionOutcome, SuspensionService, SuspensionServiceError, SuspensionServiceResult,
    SuspensionSettings,
};
