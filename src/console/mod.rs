//! Operator console for suspension reviews.
//!
//! The console is the display collaborator of the suspension core: it
//! accumulates directory pages into a searchable roster, renders task boards
//! and history through templates, and turns operator commands into service
//! calls. It owns no suspension state of its own.

mod command;
mod config;
mod render;
mod roster;
mod session;

pub use command::{CommandParseError, ConsoleCommand};
pub use config::ConsoleConfig;
pub use render::ConsoleRenderer;
pub use roster::UserRoster;
pub use session::{ConsoleError, ConsoleSession, SessionReply};
