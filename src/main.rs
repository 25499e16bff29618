mod cache;
mod cli;
mod commands;
mod model;
mod schedule;
mod storage;
mod timeline;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init { name } => commands::init(name),
        cli::Command::Vision {
            title,
            description,
            date,
        } => commands::add_vision(title, description, date),
        cli::Command::Bhag {
            title,
            vision,
            date,
        } => commands::add_bhag(title, vision, date),
        cli::Command::Milestone { title, bhag, date } => commands::add_milestone(title, bhag, date),
        cli::Command::Goals => commands::list_goals(),
        cli::Command::Complete { kind, id } => commands::complete(kind, id),
        cli::Command::Journal { action } => commands::journal(action),
        cli::Command::Schedule { action } => commands::schedule(action),
        cli::Command::Quote { action } => commands::quote(action),
        cli::Command::Tui => commands::tui(),
    }
}
