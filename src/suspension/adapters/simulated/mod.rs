//! Simulated identity-system adapters.

mod task_executor;

pub use task_executor::SimulatedTaskExecutor;
