//! Questify command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `QuestService` use-cases.
//! - Resolve configuration from flags, then environment, then defaults.
//! - Print level-up celebrations as they happen.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use questify_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use questify_core::db::open_db;
use questify_core::{
    core_version, export_file_name, init_logging, xp_reward, CoreConfig, Difficulty, LevelUp,
    NewTask, QuestService, SqliteStateRepository, SystemClock, Task, TaskFilter, TaskId,
    DEFAULT_TREND_DAYS,
};
use std::path::PathBuf;

type Service<'conn> = QuestService<SqliteStateRepository<'conn>, SystemClock>;

#[derive(Parser)]
#[command(name = "questify")]
#[command(about = "Gamified to-do list: earn XP, level up, keep your streak", long_about = None)]
#[command(version)]
struct Cli {
    /// State store path
    #[arg(long, global = true, env = ENV_DB_PATH)]
    db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (file logging is off when unset)
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Difficulty: 1 (easy), 2 (medium) or 3 (hard)
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=3))]
        difficulty: u8,

        /// Category (defaults to "General")
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Complete a task by id or unique id prefix
    Done { id: String },

    /// Undo a completion (XP, streak and history are kept)
    Undo { id: String },

    /// Delete a task
    Rm { id: String },

    /// List active tasks and today's completions
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive title search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show level, XP and streak
    Stats,

    /// Show completions per day
    Trend {
        #[arg(short, long, default_value_t = DEFAULT_TREND_DAYS)]
        days: u32,
    },

    /// Export a JSON backup
    Export {
        /// Output file (defaults to questify-backup-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with a JSON backup
    Import { file: PathBuf },

    /// Delete all tasks, progress and history
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| anyhow!(err))?;
    }

    if matches!(cli.command, Commands::Version) {
        println!("questify_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open state store {}", config.db_path.display()))?;
    let repo = SqliteStateRepository::try_new(&conn)?;
    let mut service = QuestService::open(repo, SystemClock)?;
    service.add_listener(|event: &LevelUp| {
        println!("*** LEVEL UP! {} -> {} ***", event.from, event.to);
    });

    run(&mut service, cli.command)
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::default();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir.clone();
    }
    config
}

fn run(service: &mut Service<'_>, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            title,
            difficulty,
            category,
        } => {
            let mut request =
                NewTask::new(title).difficulty(Difficulty::from_raw(i64::from(difficulty)));
            request.category = category;
            let id = service.create_task(&request)?;
            if let Some(task) = service.state().task(id) {
                println!("Added {}", describe(task));
            }
        }
        Commands::Done { id } => {
            let id = resolve_task_id(service, &id)?;
            match service.complete_task(id)? {
                Some(report) => println!(
                    "+{} XP | streak {} | {} completion(s) on {}",
                    report.reward.xp_awarded, report.streak, report.day_count, report.day
                ),
                None => println!("Already completed."),
            }
            print_stats(service);
        }
        Commands::Undo { id } => {
            let id = resolve_task_id(service, &id)?;
            if service.undo_task(id)? {
                println!("Marked as not done. XP and streak are kept.");
            } else {
                println!("Task was not completed.");
            }
        }
        Commands::Rm { id } => {
            let id = resolve_task_id(service, &id)?;
            if let Some(task) = service.delete_task(id)? {
                println!("Deleted \"{}\"", task.title);
            }
        }
        Commands::List { category, search } => {
            let filter = TaskFilter {
                category,
                query: search,
            };
            let active = service.active_tasks(&filter);
            if active.is_empty() {
                println!("No active quests. Add one with `questify add`.");
            }
            for task in active {
                println!("[ ] {}", describe(task));
            }
            let completed = service.completed_today();
            if !completed.is_empty() {
                println!("Completed today:");
                for task in completed {
                    println!("[x] {}", describe(task));
                }
            }
        }
        Commands::Stats => print_stats(service),
        Commands::Trend { days } => {
            for (day, count) in service.trend(days) {
                println!("{day}  {:>3}  {}", count, "#".repeat(count as usize));
            }
        }
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(service.today())));
            let document = service.export_document()?;
            std::fs::write(&path, document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            service
                .import_document(&raw)
                .with_context(|| format!("import of {} failed", file.display()))?;
            println!("Imported successfully.");
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset deletes all data; rerun with --yes to confirm");
            }
            service.reset()?;
            println!("All data reset.");
        }
        Commands::Version => println!("questify_core version={}", core_version()),
    }
    Ok(())
}

fn print_stats(service: &Service<'_>) {
    let snapshot = service.progress_snapshot();
    let filled = usize::from(snapshot.bar_percent) / 5;
    println!(
        "Level {} | {} / {} XP [{}{}] | streak {}",
        snapshot.level,
        snapshot.xp,
        snapshot.threshold,
        "=".repeat(filled),
        " ".repeat(20 - filled),
        snapshot.streak
    );
}

fn describe(task: &Task) -> String {
    let short_id: String = task.id.to_string().chars().take(8).collect();
    format!(
        "{short_id} {} (D{} +{} XP) [{}]",
        task.title,
        task.difficulty.as_raw(),
        xp_reward(task.difficulty),
        task.category
    )
}

fn resolve_task_id(service: &Service<'_>, raw: &str) -> Result<TaskId> {
    match_task_id(service.state().tasks().as_slice(), raw)
}

/// Accepts a full UUID or a prefix that matches exactly one known task.
fn match_task_id(tasks: &[Task], raw: &str) -> Result<TaskId> {
    let raw = raw.trim().to_ascii_lowercase();
    if raw.is_empty() {
        bail!("task id must not be empty");
    }
    if let Ok(id) = TaskId::parse_str(&raw) {
        if tasks.iter().any(|task| task.id == id) {
            return Ok(id);
        }
        bail!("no task matches `{raw}`");
    }

    let mut matches = tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(&raw));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => bail!("no task matches `{raw}`"),
        (Some(_), Some(_)) => bail!("`{raw}` matches more than one task; use a longer prefix"),
    }
}
