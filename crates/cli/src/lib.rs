pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "rentdesk",
    about = "Rentdesk operator CLI",
    long_about = "Operate the rentdesk assistant: migrations, demo catalog, config inspection, readiness checks, and one-shot questions.",
    after_help = "Examples:\n  rentdesk doctor --json\n  rentdesk seed\n  rentdesk ask \"any blue cars in Miami?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo car catalog (idempotent) and verify row counts")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM client setup, and catalog database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Route one message through the assistant against the configured catalog")]
    Ask {
        #[arg(long, help = "Conversation to attach the message to")]
        conversation: Option<String>,
        #[arg(required = true, num_args = 1.., help = "Message text")]
        text: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Ask { conversation, text } => {
            commands::ask::run(conversation.as_deref(), &text.join(" "))
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
