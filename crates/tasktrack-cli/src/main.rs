mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tasktrack", about = "Track tasks in a JSON file", version)]
struct Cli {
    /// Task file to read and write
    #[arg(long, global = true, env = "TASKTRACK_FILE", default_value = "tasks.json")]
    file: PathBuf,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Bypass the read cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        /// Task description (10-100 characters once cleaned up)
        description: String,

        /// Priority (high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Explicit id instead of the next free one
        #[arg(long)]
        id: Option<u64>,
    },

    /// List tasks, optionally filtered
    List {
        /// Filter by status (pending, in-progress, completed, cancelled)
        #[arg(long)]
        status: Option<String>,

        /// Filter by priority (high, medium, low)
        #[arg(long)]
        priority: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one task
    Show {
        id: u64,
    },

    /// Case-insensitive search in descriptions
    Search {
        term: String,
    },

    /// List open tasks that are past their due date
    Overdue,

    /// Change a task's status
    Status {
        id: u64,

        /// New status (pending, in-progress, completed, cancelled)
        status: String,
    },

    /// Change a task's priority
    Priority {
        id: u64,

        /// New priority (high, medium, low)
        priority: String,
    },

    /// Add a category to a task
    Category {
        id: u64,

        category: String,
    },

    /// Edit a task's description or due date
    Edit {
        id: u64,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task
    Delete {
        id: u64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = commands::open_service(&cli.file, cli.no_cache).and_then(|service| {
        let json = cli.json;
        match cli.command {
            Commands::Add {
                description,
                priority,
                due,
                category,
                id,
            } => commands::add::run(&service, description, priority, due, category, id, json),
            Commands::List {
                status,
                priority,
                category,
            } => commands::list::run(&service, status, priority, category, json),
            Commands::Show { id } => commands::show::run(&service, id, json),
            Commands::Search { term } => commands::list::search(&service, term, json),
            Commands::Overdue => commands::list::overdue(&service, json),
            Commands::Status { id, status } => commands::update::status(&service, id, status, json),
            Commands::Priority { id, priority } => {
                commands::update::priority(&service, id, priority, json)
            }
            Commands::Category { id, category } => {
                commands::update::category(&service, id, category, json)
            }
            Commands::Edit {
                id,
                description,
                due,
                clear_due,
            } => commands::update::edit(&service, id, description, due, clear_due, json),
            Commands::Delete { id } => commands::delete::run(&service, id, json),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
