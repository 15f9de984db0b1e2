use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(
    name = "autoplan",
    version,
    about = "Automatic task scheduling and focus time protection"
)]
struct Cli {
    /// User whose calendar and backlog are used
    #[arg(long, global = true, env = "AUTOPLAN_USER", default_value = "local")]
    user: String,

    /// SQLite database path (default: ~/.config/autoplan/autoplan.db)
    #[arg(long, global = true, env = "AUTOPLAN_DB")]
    db: Option<PathBuf>,

    /// Config file path (default: ~/.config/autoplan/config.toml)
    #[arg(long, global = true, env = "AUTOPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate as if the current instant were this RFC 3339 time
    #[arg(long, global = true)]
    now: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task backlog management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// User-created calendar events
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Show free slots for one day
    Slots(commands::slots::SlotsArgs),
    /// Focus block suggestions and protection
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Automatic task scheduling
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: {e}");
    }

    let ctx = commands::Context {
        user: cli.user,
        db_path: cli.db,
        config_path: cli.config,
        now: cli.now,
    };

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(&ctx, action),
        Commands::Event { action } => commands::event::run(&ctx, action),
        Commands::Slots(args) => commands::slots::run(&ctx, args),
        Commands::Focus { action } => commands::focus::run(&ctx, action),
        Commands::Schedule { action } => commands::schedule::run(&ctx, action),
        Commands::Config { action } => commands::config::run(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
