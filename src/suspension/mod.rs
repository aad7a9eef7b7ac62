//! Suspension orchestration for offboarding a user account.
//!
//! An operator binds the engine to a user, selects remediation tasks from
//! the directory and cloud identity catalogues, and executes them as one
//! sequential run. Each finished run is projected into a bounded,
//! persisted history entry and a suspended user status. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
