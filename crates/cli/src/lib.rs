pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "gamescout",
    about = "Gamescout operator CLI",
    long_about = "Inspect price-intent parsing, run guarded catalog searches, and check runtime \
                  readiness.",
    after_help = "Examples:\n  gamescout explain \"co-op games under $20\"\n  \
                  gamescout search \"strategy between 10 and 30\" --limit 3\n  \
                  gamescout doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Show the price intent, reduced query and search gate verdict for a message")]
    Explain {
        #[arg(help = "User message to analyze")]
        text: String,
    },
    #[command(about = "Run a guarded catalog search for a message against the configured catalog")]
    Search {
        #[arg(help = "User message to search for")]
        text: String,
        #[arg(long, help = "Maximum number of results (capped by guard.max_limit when set)")]
        limit: Option<u32>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and check catalog reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Explain { text } => commands::explain::run(&text),
        Command::Search { text, limit } => commands::search::run(&text, limit),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            let (output, passed) = commands::doctor::run(json);
            commands::CommandResult { exit_code: if passed { 0 } else { 1 }, output }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
