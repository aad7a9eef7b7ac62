//! Command dispatch for one operator session.

use super::{ConsoleCommand, ConsoleRenderer, UserRoster};
use crate::suspension::{
    ports::{LedgerStore, TaskExecutor, UserDirectory},
    services::{RunObserver, SuspensionService, SuspensionServiceError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A view could not be rendered.
    #[error("failed to render {view}: {reason}")]
    Render {
        /// Template name.
        view: &'static str,
        /// Rendering failure.
        reason: String,
    },
    /// The suspension service rejected the command.
    #[error(transparent)]
    Service(#[from] SuspensionServiceError),
    /// The user is not in the loaded roster.
    #[error("unknown user '{0}', list users first")]
    UnknownUser(String),
    /// A board command was issued before selecting a user.
    #[error("no user selected, use `select <user-id>`")]
    NoUserSelected,
}

impl ConsoleError {
    pub(super) fn render(view: &'static str, err: &minijinja::Error) -> Self {
        Self::Render {
            view,
            reason: err.to_string(),
        }
    }
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// Text to show the operator.
    Output(String),
    /// The operator asked to leave.
    Quit,
}

/// Interactive session state layered over a [`SuspensionService`].
pub struct ConsoleSession<X, S, D, C>
where
    X: TaskExecutor,
    S: LedgerStore,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    service: Arc<SuspensionService<X, S, D, C>>,
    renderer: ConsoleRenderer,
    roster: UserRoster,
    show_credential: bool,
}

impl<X, S, D, C> ConsoleSession<X, S, D, C>
where
    X: TaskExecutor,
    S: LedgerStore,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a session with an empty roster.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] if the templates fail to compile.
    pub fn new(service: Arc<SuspensionService<X, S, D, C>>) -> Result<Self, ConsoleError> {
        Ok(Self {
            service,
            renderer: ConsoleRenderer::new()?,
            roster: UserRoster::new(),
            show_credential: false,
        })
    }

    /// Returns the loaded roster.
    #[must_use]
    pub const fn roster(&self) -> &UserRoster {
        &self.roster
    }

    /// Handles one command, reporting run progress to `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError`] when the command is rejected or its output
    /// cannot be rendered. The session stays usable afterwards.
    pub async fn handle(
        &mut self,
        command: ConsoleCommand,
        observer: &impl RunObserver,
    ) -> Result<SessionReply, ConsoleError> {
        debug!(?command, "console command");
        let output = match command {
            ConsoleCommand::Quit => return Ok(SessionReply::Quit),
            ConsoleCommand::Help => ConsoleCommand::HELP.to_owned(),
            ConsoleCommand::Users => {
                if !self.roster.is_loaded() {
                    self.load_next_page().await?;
                }
                self.render_users()?
            }
            ConsoleCommand::More => {
                self.load_next_page().await?;
                self.render_users()?
            }
            ConsoleCommand::Search(term) => {
                self.roster.set_filter(&term);
                self.render_users()?
            }
            ConsoleCommand::ClearSearch => {
                self.roster.clear_filter();
                self.render_users()?
            }
            ConsoleCommand::Select(id) => {
                let user = self
                    .roster
                    .find(&id)
                    .cloned()
                    .ok_or(ConsoleError::UnknownUser(id))?;
                let board = self.service.select_user(user)?;
                self.show_credential = false;
                self.renderer.board(&board, self.show_credential)?
            }
            ConsoleCommand::Toggle(key) => {
                let board = self.service.toggle_task(&key)?;
                self.renderer.board(&board, self.show_credential)?
            }
            ConsoleCommand::Board => self.render_board()?,
            ConsoleCommand::Reveal => {
                self.show_credential = !self.show_credential;
                self.render_board()?
            }
            ConsoleCommand::Run => {
                let outcome = self.service.execute(observer).await?;
                self.roster.apply(&outcome.updated_user);
                let mut text = self.renderer.outcome(&outcome)?;
                text.push_str(&self.render_board()?);
                text
            }
            ConsoleCommand::History => self.renderer.history(&self.service.history().list())?,
        };
        Ok(SessionReply::Output(output))
    }

    async fn load_next_page(&mut self) -> Result<(), ConsoleError> {
        let Some(page) = self.roster.next_page() else {
            return Ok(());
        };
        let users = self.service.list_users(page).await?;
        debug!(%page, count = users.len(), "loaded directory page");
        self.roster.append_page(users);
        Ok(())
    }

    fn render_users(&self) -> Result<String, ConsoleError> {
        self.renderer.users(
            &self.roster.visible(),
            self.roster.filter(),
            self.roster.is_exhausted(),
        )
    }

    fn render_board(&self) -> Result<String, ConsoleError> {
        let board = self.service.board().ok_or(ConsoleError::NoUserSelected)?;
        self.renderer.board(&board, self.show_credential)
    }
}
