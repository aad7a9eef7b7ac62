//! Adapter implementations for suspension ports.

pub mod fs;
pub mod memory;
pub mod simulated;
