//! In-memory adapters for tests and the simulated console.

mod ledger_store;
mod user_directory;

pub use ledger_store::InMemoryLedgerStore;
pub use user_directory::SimulatedUserDirectory;
