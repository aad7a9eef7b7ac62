//! Text rendering of boards, rosters and history through templates.

use crate::suspension::{
    domain::{SuspensionRecord, TaskBoard, TaskRunState, TaskStatus, UserRecord},
    services::SuspensionOutcome,
};
use minijinja::Environment;
use serde::Serialize;

use super::ConsoleError;

const BOARD: &str = "\
Suspension tasks for {{ user.name }} ({{ user.id }}) [{{ user.status }}]
{% for group in groups %}
{{ group.heading }}
{% for task in group.tasks %}
  [{{ task.mark }}] {{ task.key }}: {{ task.label }}{% if task.progress %} ... {{ task.progress }}{% endif %}

{% endfor %}
{% endfor %}
{% if credential %}
Temporary password: {{ credential }}
{% endif %}
{% if running %}
Suspending...
{% elif can_execute %}
Type `run` to start the suspension process.
{% else %}
Select at least one pending task to start.
{% endif %}
";

const USERS: &str = "\
User List{% if filter %} matching \"{{ filter }}\"{% endif %}

{% for user in users %}
  {{ user.id }}  {{ user.name }} <{{ user.email }}>  {{ user.department }}  [{{ user.status }}]
{% else %}
  No users to show.
{% endfor %}
{% if not exhausted %}
Type `more` to load more users.
{% endif %}
";

const HISTORY: &str = "\
Recent Suspensions
{% for record in records %}
- {{ record.name }} ({{ record.user_id }}) on {{ record.timestamp }}
{% for action in record.actions %}
    * {{ action }}
{% else %}
    * no actions completed
{% endfor %}
{% else %}
No recent suspensions
{% endfor %}
";

const OUTCOME: &str = "\
Suspension complete for {{ name }}: {{ completed }} completed, {{ failed }} failed, {{ skipped }} skipped{% if cancelled %} (cancelled){% endif %}.
{% for failure in failures %}
  ! {{ failure.label }}: {{ failure.reason }}
{% endfor %}
Status: {{ status }}
{% for warning in warnings %}
warning: {{ warning }}
{% endfor %}
";

#[derive(Serialize)]
struct UserView<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    department: &'a str,
    status: &'static str,
}

impl<'a> From<&'a UserRecord> for UserView<'a> {
    fn from(user: &'a UserRecord) -> Self {
        Self {
            id: user.id().as_str(),
            name: user.name(),
            email: user.email(),
            department: user.department(),
            status: user.status().as_str(),
        }
    }
}

#[derive(Serialize)]
struct TaskView<'a> {
    mark: &'static str,
    key: &'a str,
    label: &'a str,
    progress: Option<String>,
}

impl<'a> From<&'a TaskRunState> for TaskView<'a> {
    fn from(task: &'a TaskRunState) -> Self {
        let progress = match task.status() {
            TaskStatus::Idle => None,
            TaskStatus::InProgress => Some("In Progress...".to_owned()),
            TaskStatus::Completed => Some("Completed".to_owned()),
            TaskStatus::Skipped => Some("Skipped".to_owned()),
            TaskStatus::Failed => Some(format!(
                "Failed: {}",
                task.failure_reason().unwrap_or("unknown error")
            )),
        };
        Self {
            mark: if task.is_selected() { "x" } else { " " },
            key: task.key().as_str(),
            label: task.definition().label(),
            progress,
        }
    }
}

#[derive(Serialize)]
struct GroupView<'a> {
    heading: &'static str,
    tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
struct BoardView<'a> {
    user: UserView<'a>,
    groups: Vec<GroupView<'a>>,
    credential: Option<String>,
    running: bool,
    can_execute: bool,
}

#[derive(Serialize)]
struct UsersView<'a> {
    users: Vec<UserView<'a>>,
    filter: Option<&'a str>,
    exhausted: bool,
}

#[derive(Serialize)]
struct RecordView<'a> {
    name: &'a str,
    user_id: &'a str,
    timestamp: String,
    actions: &'a [String],
}

#[derive(Serialize)]
struct HistoryView<'a> {
    records: Vec<RecordView<'a>>,
}

#[derive(Serialize)]
struct FailureView<'a> {
    label: &'a str,
    reason: &'a str,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    name: &'a str,
    completed: usize,
    failed: usize,
    skipped: usize,
    cancelled: bool,
    failures: Vec<FailureView<'a>>,
    status: &'static str,
    warnings: Vec<String>,
}

/// Renders console views from domain snapshots.
#[derive(Debug)]
pub struct ConsoleRenderer {
    environment: Environment<'static>,
}

impl ConsoleRenderer {
    /// Creates a renderer with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] if a built-in template fails to
    /// compile.
    pub fn new() -> Result<Self, ConsoleError> {
        let mut environment = Environment::new();
        environment.set_trim_blocks(true);
        environment.set_lstrip_blocks(true);
        for (name, source) in [
            ("board", BOARD),
            ("users", USERS),
            ("history", HISTORY),
            ("outcome", OUTCOME),
        ] {
            environment
                .add_template(name, source)
                .map_err(|err| ConsoleError::render(name, &err))?;
        }
        Ok(Self { environment })
    }

    /// Renders the task board. The credential is masked unless
    /// `show_credential` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] when rendering fails.
    pub fn board(&self, board: &TaskBoard, show_credential: bool) -> Result<String, ConsoleError> {
        let view = BoardView {
            user: UserView::from(&board.user),
            groups: board
                .groups
                .iter()
                .map(|group| GroupView {
                    heading: group.group.display_name(),
                    tasks: group.tasks.iter().map(TaskView::from).collect(),
                })
                .collect(),
            credential: board.revealed_credential.as_ref().map(|credential| {
                if show_credential {
                    credential.expose().to_owned()
                } else {
                    credential.masked()
                }
            }),
            running: board.running,
            can_execute: board.can_execute,
        };
        self.render("board", &view)
    }

    /// Renders a roster listing.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] when rendering fails.
    pub fn users(
        &self,
        users: &[&UserRecord],
        filter: Option<&str>,
        exhausted: bool,
    ) -> Result<String, ConsoleError> {
        let view = UsersView {
            users: users.iter().map(|user| UserView::from(*user)).collect(),
            filter,
            exhausted,
        };
        self.render("users", &view)
    }

    /// Renders the suspension history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] when rendering fails.
    pub fn history(&self, records: &[SuspensionRecord]) -> Result<String, ConsoleError> {
        let view = HistoryView {
            records: records
                .iter()
                .map(|record| RecordView {
                    name: record.user_display_name(),
                    user_id: record.user_id().as_str(),
                    timestamp: record.timestamp().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    actions: record.actions(),
                })
                .collect(),
        };
        self.render("history", &view)
    }

    /// Renders the summary of a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Render`] when rendering fails.
    pub fn outcome(&self, outcome: &SuspensionOutcome) -> Result<String, ConsoleError> {
        let run = &outcome.run;
        let warnings = outcome
            .ledger_error
            .iter()
            .map(|err| format!("history not saved: {err}"))
            .chain(
                outcome
                    .directory_error
                    .iter()
                    .map(|err| format!("directory not updated: {err}")),
            )
            .collect();
        let view = OutcomeView {
            name: outcome.updated_user.name(),
            completed: run.completed_task_labels().len(),
            failed: run.failed_tasks().len(),
            skipped: run.skipped_task_labels().len(),
            cancelled: run.was_cancelled(),
            failures: run
                .failed_tasks()
                .iter()
                .map(|failure| FailureView {
                    label: &failure.label,
                    reason: &failure.reason,
                })
                .collect(),
            status: outcome.updated_user.status().as_str(),
            warnings,
        };
        self.render("outcome", &view)
    }

    fn render(&self, name: &'static str, view: &impl Serialize) -> Result<String, ConsoleError> {
        self.environment
            .get_template(name)
            .and_then(|template| template.render(view))
            .map_err(|err| ConsoleError::render(name, &err))
    }
}
