//! Coursekit CLI: the `coursekit` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            course,
            vocabulary,
            no_inheritance,
            json,
        } => commands::resolve::run(course, vocabulary, no_inheritance, json),

        Commands::Check {
            course,
            vocabulary,
            json,
        } => commands::check::run(course, vocabulary, json),

        Commands::Outline { course, json } => commands::outline::run(course, json),
    }
}
