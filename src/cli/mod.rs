pub mod companies;
pub mod config;
pub mod report;
pub mod validate;
pub mod view;

use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::Result;
use crate::loader::load_dataset;
use crate::models::Dataset;
use crate::settings::load_settings;

/// Load a dataset, falling back to the configured sheet when `--sheet` is absent.
pub(crate) fn load_with_settings(file: &str, sheet: Option<&str>) -> Result<Dataset> {
    let settings = load_settings();
    let sheet = sheet.map(str::to_string).or(settings.sheet);
    load_dataset(Path::new(file), sheet.as_deref())
}

#[derive(Parser)]
#[command(
    name = "forensic",
    about = "Forensic financial health dashboard: Piotroski F-Score, Montier C-Score, Ohlson O-Score."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard.
    View {
        /// Path to an XLSX/XLS/ODS workbook or CSV file (prompted for when omitted)
        file: Option<String>,
        /// Company to select first
        #[arg(long)]
        company: Option<String>,
        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Print one company's scorecards, verdict, accrual zone and trend.
    Report {
        /// Path to an XLSX/XLS/ODS workbook or CSV file
        file: String,
        /// Company name (default: first company in the file)
        #[arg(long)]
        company: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
        /// Write to this file instead of stdout
        #[arg(long, conflicts_with = "export")]
        output: Option<String>,
        /// Write to the configured export directory
        #[arg(long)]
        export: bool,
        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// List companies with their latest verdict.
    Companies {
        /// Path to an XLSX/XLS/ODS workbook or CSV file
        file: String,
        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Check that a file has every required column and well-formed values.
    Validate {
        /// Path to an XLSX/XLS/ODS workbook or CSV file
        file: String,
        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Show or change settings.
    Config {
        /// Directory used by `report --export`
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
        /// Default worksheet name
        #[arg(long, conflicts_with = "clear_sheet")]
        sheet: Option<String>,
        /// Forget the default worksheet
        #[arg(long = "clear-sheet")]
        clear_sheet: bool,
    },
}
