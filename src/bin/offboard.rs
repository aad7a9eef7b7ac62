//! Interactive console for offboarding user accounts.
//!
//! Usage:
//!
//! ```text
//! offboard [--history-dir <dir>] [--work-interval-ms <ms>] [--halt-on-failure]
//! ```
//!
//! The console reads one command per line from standard input and writes
//! views to standard output. Diagnostics go to standard error and honour
//! `RUST_LOG`. Type `help` at the prompt for the command list.

use camino::Utf8PathBuf;
use clap::Parser;
use mockable::DefaultClock;
use offboard::console::{
    CommandParseError, ConsoleCommand, ConsoleConfig, ConsoleSession, SessionReply,
};
use offboard::suspension::{
    adapters::{
        fs::FileLedgerStore, memory::SimulatedUserDirectory, simulated::SimulatedTaskExecutor,
    },
    domain::{FailurePolicy, SuspendPolicy, TaskCatalogue, TaskEngine, TaskStatus},
    services::{
        LedgerLoadOutcome, RunEvent, RunObserver, SuspensionHistoryService, SuspensionService,
    },
};
use std::io::{self, Write};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PROMPT: &str = "offboard> ";

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "offboard", version, about = "Interactive account offboarding console")]
struct Cli {
    /// Directory holding the suspension history.
    #[arg(long, default_value = ".offboard")]
    history_dir: Utf8PathBuf,
    /// Simulated work interval per task, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    work_interval_ms: u64,
    /// Upper bound for a single task, in milliseconds.
    #[arg(long)]
    task_timeout_ms: Option<u64>,
    /// Skip the remaining tasks after the first failure.
    #[arg(long)]
    halt_on_failure: bool,
    /// Leave the user active when a run completes no task.
    #[arg(long)]
    require_completed_task: bool,
    /// Users fetched per directory page; must be at least 1.
    #[arg(long, default_value_t = SimulatedUserDirectory::DEFAULT_PAGE_SIZE)]
    page_size: NonZeroU32,
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ConsoleConfig {
        ConsoleConfig {
            history_dir: self.history_dir,
            work_interval: Duration::from_millis(self.work_interval_ms),
            task_timeout: self.task_timeout_ms.map(Duration::from_millis),
            failure_policy: if self.halt_on_failure {
                FailurePolicy::Halt
            } else {
                FailurePolicy::Continue
            },
            suspend_policy: if self.require_completed_task {
                SuspendPolicy::RequireCompletedTask
            } else {
                SuspendPolicy::Always
            },
            page_size: self.page_size,
            ..ConsoleConfig::default()
        }
    }
}

/// Writes run progress to standard output as it happens.
struct ProgressPrinter;

impl RunObserver for ProgressPrinter {
    fn on_event(&self, event: &RunEvent) {
        let line = match event {
            RunEvent::RunStarted { user_id, .. } => format!("Suspending {user_id}..."),
            RunEvent::TaskStarted(task) => format!("  {} ... In Progress", task.label()),
            RunEvent::TaskFinished { task, status } => {
                let outcome = match status {
                    TaskStatus::Completed => "Completed",
                    TaskStatus::Failed => "Failed",
                    TaskStatus::Skipped => "Skipped",
                    TaskStatus::Idle | TaskStatus::InProgress => "Pending",
                };
                format!("  {} ... {outcome}", task.label())
            }
        };
        if let Err(err) = emit(&line) {
            warn!(error = %err, "failed to write progress");
        }
    }
}

fn emit(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end())?;
    stdout.flush()
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{PROMPT}")?;
    stdout.flush()
}

fn init_tracing(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .is_err()
    {
        warn!("tracing subscriber already installed");
    }
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(cli.into_config()))
}

async fn run(config: ConsoleConfig) -> Result<(), BoxError> {
    let store = Arc::new(FileLedgerStore::open(&config.history_dir)?);
    let history = Arc::new(SuspensionHistoryService::new(store, config.ledger_key.clone()));
    if let LedgerLoadOutcome::Recovered { reason } = history.init().await {
        emit(&format!("warning: previous history was unreadable ({reason}), starting fresh"))?;
    }

    let engine = TaskEngine::new(TaskCatalogue::standard()?)
        .with_failure_policy(config.failure_policy);
    let service = Arc::new(
        SuspensionService::new(
            engine,
            Arc::new(SimulatedTaskExecutor::new(config.work_interval)),
            Arc::clone(&history),
            Arc::new(SimulatedUserDirectory::new(config.page_size)),
            Arc::new(DefaultClock),
        )
        .with_settings(config.suspension_settings()),
    );
    let mut session = ConsoleSession::new(service)?;
    info!(history_dir = %config.history_dir, "console started");

    emit("Type `help` for a list of commands.")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match ConsoleCommand::parse(&line) {
            Err(CommandParseError::Empty) => {}
            Err(err) => emit(&format!("error: {err}"))?,
            Ok(command) => match session.handle(command, &ProgressPrinter).await {
                Ok(SessionReply::Output(text)) => emit(&text)?,
                Ok(SessionReply::Quit) => break,
                Err(err) => emit(&format!("error: {err}"))?,
            },
        }
        prompt()?;
    }

    if let Err(err) = history.flush().await {
        warn!(error = %err, "suspension ledger could not be flushed on exit");
    }
    info!("console stopped");
    Ok(())
}
