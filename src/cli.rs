use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};

#[derive(Parser)]
#[command(
    name = "parley",
    version,
    about = "Persona chat sessions with hybrid sliding-window + summary memory"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session; one turn per input line
    Chat,
    /// Run a single chat turn and print the reply
    Once {
        /// User message for the turn
        #[arg(long)]
        message: String,
    },
    /// Show resolved paths, configuration, and provider
    Status,
}

fn print_report(report: &CommandReport) -> Result<()> {
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
    if report.ok {
        Ok(())
    } else {
        anyhow::bail!("`{}` completed with issues", report.command)
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Chat => commands::chat::run()?,
        Commands::Once { message } => commands::once::run(&commands::once::OnceOptions { message })?,
        Commands::Status => commands::status::run()?,
    };

    print_report(&report)
}
