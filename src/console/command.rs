//! Parsing of operator commands.

use thiserror::Error;

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Show the roster, loading the first page if needed.
    Users,
    /// Load the next directory page.
    More,
    /// Filter the roster by name, email or department.
    Search(String),
    /// Remove the roster filter.
    ClearSearch,
    /// Start a suspension review for a user.
    Select(String),
    /// Flip the selection of a task.
    Toggle(String),
    /// Execute the selected tasks.
    Run,
    /// Show the task board.
    Board,
    /// Show or hide the revealed credential.
    Reveal,
    /// Show recent suspensions.
    History,
    /// List available commands.
    Help,
    /// Leave the console.
    Quit,
}

/// Error returned for unparseable input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandParseError {
    /// The line held no command.
    #[error("empty command")]
    Empty,
    /// The command word is not recognised.
    #[error("unknown command '{0}', type `help` for a list")]
    Unknown(String),
    /// The command requires an argument.
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

impl ConsoleCommand {
    /// Help text listing every command.
    pub const HELP: &'static str = "\
users              show the user list
more               load the next page of users
search <term>      filter users by name, email or department
clear              remove the user filter
select <user-id>   review a user for suspension
toggle <task-id>   select or deselect a task
run                start the suspension process
board              show the suspension tasks
reveal             show or hide the temporary password
history            show recent suspensions
help               show this help
quit               leave the console";

    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] for blank lines, unknown commands, and
    /// commands missing their argument.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let trimmed = line.trim();
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(word, rest)| (word, rest.trim()));
        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandParseError::MissingArgument(name))
            } else {
                Ok(rest.to_owned())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "users" | "list" => Ok(Self::Users),
            "more" => Ok(Self::More),
            "search" => argument("search").map(Self::Search),
            "clear" => Ok(Self::ClearSearch),
            "select" => argument("select").map(Self::Select),
            "toggle" => argument("toggle").map(Self::Toggle),
            "run" | "start" => Ok(Self::Run),
            "board" | "tasks" => Ok(Self::Board),
            "reveal" => Ok(Self::Reveal),
            "history" => Ok(Self::History),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(CommandParseError::Unknown(word.to_owned())),
        }
    }
}
