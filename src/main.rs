use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use jiff::{Span, civil::Date};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use dayplan::{
    config::Config,
    models::{
        store::{Filter, Store},
        task::{Priority, RecurringRule},
    },
    services::{
        labels::{create_label, delete_label, rename_label},
        metrics::{daily_progress, dashboard, reset_metrics},
        tasks::{
            AddTaskParameters, ToggleOutcome, add_label_to_task, add_task, delete_task,
            remove_label_from_task, reorder_tasks, toggle_favorite, toggle_task,
        },
        views::{
            SortMode, ViewOptions, day_view, filtered_view, label_summaries, set_filter,
            week_board,
        },
    },
    storage::{json::JsonFileStorage, load_store},
    ui,
};

#[derive(Parser)]
#[command(name = "dayplan", about = "A day-by-day planner for your terminal")]
struct Cli {
    /// Directory holding the data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tasks of one day
    Day {
        /// Date to show (e.g., "tomorrow", "2025-03-01"), defaults to today
        date: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show seven days starting at a date
    Week {
        /// First day of the board, defaults to today
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Schedule for a specific date (e.g., "tomorrow", "2025-03-01")
        #[arg(short, long)]
        date: Option<String>,

        /// Priority from 1 (highest) to 4
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        priority: Option<u8>,

        /// Add labels (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        label: Vec<String>,

        /// Repeat every day
        #[arg(long, conflicts_with_all = ["weekly", "every"])]
        daily: bool,

        /// Repeat every week
        #[arg(long, conflicts_with = "every")]
        weekly: bool,

        /// Repeat every N days
        #[arg(long)]
        every: Option<u32>,
    },

    /// Complete or reopen a task
    Toggle { task: String },

    /// Delete a task
    Delete { task: String },

    /// Move a task to the position of another task
    Move { task: String, over: String },

    /// Star or unstar a task
    Fav { task: String },

    /// List starred tasks
    Favorites,

    /// Manage labels
    #[command(subcommand)]
    Label(LabelCommands),

    /// Show the progress dashboard
    Stats {
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every task and restore the starter labels
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Only show tasks with this label
    #[arg(short, long)]
    label: Option<String>,

    /// Hide completed tasks
    #[arg(long)]
    hide_completed: bool,

    /// Sort order: manual, priority or alpha
    #[arg(short, long, default_value = "manual")]
    sort: SortMode,
}

impl From<ViewArgs> for ViewOptions {
    fn from(args: ViewArgs) -> Self {
        Self {
            label: args.label,
            show_completed: !args.hide_completed,
            sort: args.sort,
        }
    }
}

#[derive(Debug, Subcommand)]
enum LabelCommands {
    /// Create a new label
    New { name: String },
    /// Rename a label and every task using it
    Rename { old: String, new: String },
    /// Delete a label and remove it from tasks
    Delete { name: String },
    /// List all labels
    List,
    /// View tasks with a specific label
    View { name: String },
    /// Attach a label to a task
    Add { task: String, name: String },
    /// Detach a label from a task
    Remove { task: String, name: String },
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn parse_date(input: &str, today: Date) -> Date {
    let offset = match input.trim().to_lowercase().as_str() {
        "today" => Some(0),
        "tomorrow" => Some(1),
        "yesterday" => Some(-1),
        _ => None,
    };
    match offset {
        Some(days) => today.saturating_add(Span::new().days(days)),
        None => input
            .trim()
            .parse::<Date>()
            .unwrap_or_else(|e| fail(format!("Invalid date '{}': {}", input, e))),
    }
}

fn resolve(store: &Store, input: &str) -> Uuid {
    store.resolve_task_id(input).unwrap_or_else(|e| fail(e))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir);

    std::fs::create_dir_all(&config.data_dir).unwrap_or_else(|e| {
        fail(format!("Failed to create data directory: {}", e));
    });

    let storage = JsonFileStorage::new(config.data_dir);
    let today = jiff::Zoned::now().date();
    let mut store = load_store(&storage, today);

    match cli.command.unwrap_or(Commands::Day {
        date: None,
        view: ViewArgs {
            label: None,
            hide_completed: false,
            sort: SortMode::Manual,
        },
    }) {
        Commands::Day { date, view } => {
            let date = date.map_or(today, |d| parse_date(&d, today));
            store.view.selected_date = date;
            let tasks = day_view(&store, date, &view.into());
            if tasks.is_empty() {
                println!("No tasks for {}", ui::format_date_header(date));
            } else {
                ui::render_view_header(
                    &format!("{} ({})", ui::format_date_header(date), date.strftime("%b %d")),
                    tasks.len(),
                );
                for task in tasks {
                    ui::render_task_line(task, false);
                }
                println!();
                ui::render_progress(daily_progress(&store, date));
            }
        }
        Commands::Week { from, view } => {
            let start = from.map_or(today, |d| parse_date(&d, today));
            let board = week_board(&store, start, &view.into());
            let total: usize = board.iter().map(|c| c.tasks.len()).sum();
            ui::render_view_header("Week", total);
            for column in board {
                ui::render_section_header(&format!(
                    "{} ({})",
                    ui::format_date_header(column.date),
                    column.date.strftime("%b %d")
                ));
                if column.tasks.is_empty() {
                    println!("  {}", "Nothing planned".dimmed());
                }
                for task in column.tasks {
                    ui::render_task_line(task, false);
                }
            }
        }
        Commands::Add {
            title,
            date,
            priority,
            label,
            daily,
            weekly,
            every,
        } => {
            let recurring_rule = match (daily, weekly, every) {
                (true, _, _) => Some(RecurringRule::daily()),
                (_, true, _) => Some(RecurringRule::weekly()),
                (_, _, Some(n)) => Some(RecurringRule::every_days(n)),
                _ => None,
            };
            let priority = match priority.map(Priority::try_from) {
                Some(Ok(p)) => p,
                Some(Err(e)) => fail(e),
                None => Priority::default(),
            };
            let parameters = AddTaskParameters {
                recurring_rule,
                labels: label,
                priority,
                ..AddTaskParameters::new(title, date.map_or(today, |d| parse_date(&d, today)))
            };

            match add_task(&mut store, &storage, parameters) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!(
                        "  {} · {}",
                        &task.id.simple().to_string()[..8],
                        ui::format_date_header(task.date)
                    );
                }
                Err(e) => fail(e),
            }
        }
        Commands::Toggle { task } => {
            let id = resolve(&store, &task);
            match toggle_task(&mut store, &storage, id) {
                Ok(ToggleOutcome::Completed(task)) => println!("✓ Task completed: {}", task.title),
                Ok(ToggleOutcome::Reopened(task)) => println!("○ Task reopened: {}", task.title),
                Ok(ToggleOutcome::RolledOver { live, .. }) => {
                    println!("✓ Task completed: {}", live.title);
                    println!("  ↻ Next on {}", ui::format_date_header(live.date));
                }
                Err(e) => fail(e),
            }
        }
        Commands::Delete { task } => {
            let id = resolve(&store, &task);
            match delete_task(&mut store, &storage, id) {
                Ok(task) => println!("✗ Task deleted: {}", task.title),
                Err(e) => fail(e),
            }
        }
        Commands::Move { task, over } => {
            let active = resolve(&store, &task);
            let over = resolve(&store, &over);
            match reorder_tasks(&mut store, &storage, active, over) {
                Ok(true) => println!("Task moved"),
                Ok(false) => println!("Task already in place"),
                Err(e) => fail(e),
            }
        }
        Commands::Fav { task } => {
            let id = resolve(&store, &task);
            match toggle_favorite(&mut store, &storage, id) {
                Ok(true) => println!("★ Task starred"),
                Ok(false) => println!("☆ Task unstarred"),
                Err(e) => fail(e),
            }
        }
        Commands::Favorites => {
            if let Err(e) = set_filter(&mut store, Some(Filter::Favorites)) {
                fail(e);
            }
            let tasks = filtered_view(&store);
            if tasks.is_empty() {
                println!("No starred tasks");
            } else {
                ui::render_view_header("Favorites", tasks.len());
                for task in tasks {
                    ui::render_task_line(task, true);
                }
            }
        }
        Commands::Label(LabelCommands::New { name }) => {
            match create_label(&mut store, &storage, &name) {
                Ok(name) => println!("✓ Label created: {}", name),
                Err(e) => fail(e),
            }
        }
        Commands::Label(LabelCommands::Rename { old, new }) => {
            match rename_label(&mut store, &storage, &old, &new) {
                Ok(result) => {
                    println!("✓ Label renamed: {} → {}", result.old_name, result.new_name);
                    if result.cascaded_tasks_count > 0 {
                        println!("  {} tasks updated", result.cascaded_tasks_count);
                    }
                }
                Err(e) => fail(e),
            }
        }
        Commands::Label(LabelCommands::Delete { name }) => {
            match delete_label(&mut store, &storage, &name) {
                Ok(result) => {
                    println!("✗ Label deleted: {}", result.name);
                    if result.cascaded_tasks_count > 0 {
                        println!("  Removed from {} tasks", result.cascaded_tasks_count);
                    }
                }
                Err(e) => fail(e),
            }
        }
        Commands::Label(LabelCommands::List) => {
            ui::render_label_summaries(&label_summaries(&store));
        }
        Commands::Label(LabelCommands::View { name }) => {
            if let Err(e) = set_filter(&mut store, Some(Filter::Label(name.clone()))) {
                fail(e);
            }
            let tasks = filtered_view(&store);
            if tasks.is_empty() {
                println!("No tasks with label '{}'", name);
            } else {
                ui::render_view_header(&format!("@{}", name), tasks.len());
                for task in tasks {
                    ui::render_task_line(task, true);
                }
            }
        }
        Commands::Label(LabelCommands::Add { task, name }) => {
            let id = resolve(&store, &task);
            match add_label_to_task(&mut store, &storage, id, &name) {
                Ok(true) => println!("✓ Label added: {}", name.trim()),
                Ok(false) => println!("Task already has label '{}'", name.trim()),
                Err(e) => fail(e),
            }
        }
        Commands::Label(LabelCommands::Remove { task, name }) => {
            let id = resolve(&store, &task);
            match remove_label_from_task(&mut store, &storage, id, &name) {
                Ok(true) => println!("✓ Label removed: {}", name),
                Ok(false) => println!("Task does not have label '{}'", name),
                Err(e) => fail(e),
            }
        }
        Commands::Stats { json } => {
            let board = dashboard(&store, today);
            if json {
                match serde_json::to_string_pretty(&board) {
                    Ok(out) => println!("{}", out),
                    Err(e) => fail(e),
                }
            } else {
                ui::render_dashboard(&board);
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                fail("Reset deletes every task. Run again with --yes to confirm.");
            }
            reset_metrics(&mut store, &storage, today);
            println!("✓ All tasks deleted, labels restored");
        }
    }
}
