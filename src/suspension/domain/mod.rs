//! Domain model for suspension orchestration.
//!
//! The domain covers the fixed task catalogues, the per-user task engine,
//! run summaries, the bounded suspension ledger, and the projection of a
//! finished run onto a ledger entry and user status. Nothing here performs
//! I/O.

mod catalogue;
mod credential;
mod engine;
mod error;
mod ids;
mod ledger;
mod projection;
mod record;
mod run;
mod run_state;
mod user;

pub use catalogue::{SystemGroup, TaskCatalogue, TaskDefinition};
pub use credential::PlaceholderCredential;
pub use engine::{GroupBoard, TaskBoard, TaskEngine};
pub use error::{
    EngineError, ParseSystemGroupError, ParseTaskStatusError, ParseUserStatusError,
    ProjectionError, SuspensionDomainError,
};
pub use ids::{PageNumber, RunId, SuspensionRecordId, TaskKey, UserId};
pub use ledger::{LEDGER_CAPACITY, LEDGER_FORMAT_VERSION, LedgerCodecError, SuspensionLedger};
pub use projection::{Projection, SuspendPolicy, project};
pub use record::SuspensionRecord;
pub use run::{FailedTask, FailurePolicy, SuspensionRun, SuspensionRunData, TaskOutcome};
pub use run_state::{TaskRunState, TaskStatus};
pub use user::{UserRecord, UserStatus};
