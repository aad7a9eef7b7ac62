//! Step definitions for suspension run scenarios.

mod given;
mod when;
