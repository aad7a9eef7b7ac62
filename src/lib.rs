//! Offboard: interactive account offboarding across identity systems.
//!
//! This crate provides the task orchestration engine that suspends a user
//! account across a directory service and a cloud identity provider, the
//! bounded suspension history ledger, and the console that drives both.
//!
//! # Architecture
//!
//! Offboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, simulations)
//!
//! # Modules
//!
//! - [`suspension`]: Task engine, history ledger, and run orchestration
//! - [`console`]: Operator-facing command handling and text rendering

pub mod console;
pub mod suspension;
