mod backend;
mod cli;
mod engine;
mod error;
mod fmt;
mod layout;
mod models;
mod paint;
mod reports;
mod settings;
mod stamp;
mod theme;

use std::process;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::ReportError;

fn main() {
    let level = std::env::var("MDA_REPORTS_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        let code = match e.downcast_ref::<ReportError>() {
            Some(err) if err.is_configuration() => 2,
            _ => 1,
        };
        process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Export {
            report_type,
            data,
            from_date,
            to_date,
            backend,
            output,
        } => cli::export::run(&report_type, &data, from_date, to_date, backend, output),
        Commands::Plan { report_type, data } => cli::plan::run(&report_type, &data),
        Commands::Init { output_dir, force } => Ok(cli::init::run(output_dir, force)?),
        Commands::Completions { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    }
}
