pub mod completions;
pub mod export;
pub mod init;
pub mod plan;

use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::models::{ReportPayload, ReportType};

#[derive(Parser)]
#[command(
    name = "mda-reports",
    version,
    about = "Paginated PDF reports for the MDA management portal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report PDF from an aggregated data file.
    Export {
        /// Report type: overview, financial, projects or users
        report_type: String,
        /// JSON payload file, or '-' to read stdin
        #[arg(long)]
        data: String,
        /// Start of the reporting period shown in the header
        #[arg(long = "from", requires = "to_date")]
        from_date: Option<String>,
        /// End of the reporting period shown in the header
        #[arg(long = "to", requires = "from_date")]
        to_date: Option<String>,
        /// Rendering backend: imperative or declarative (default from settings)
        #[arg(long)]
        backend: Option<String>,
        /// Output file path (default: <output_dir>/report-<type>-<date>.pdf)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the page plan for a report without rendering it.
    Plan {
        /// Report type: overview, financial, projects or users
        report_type: String,
        /// JSON payload file, or '-' to read stdin
        #[arg(long)]
        data: String,
    },
    /// Write a default settings file.
    Init {
        /// Default export directory (default: ~/Documents/mda-reports)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Read a payload file, `-` meaning stdin.
pub(crate) fn read_data(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading payload {path}"))
}

/// Resolve the report type first so a bad type fails before any IO.
pub(crate) fn load_payload(report_type: &str, data: &str) -> anyhow::Result<ReportPayload> {
    let report_type: ReportType = report_type.parse()?;
    let json = read_data(data)?;
    Ok(ReportPayload::from_json(report_type, &json)?)
}
