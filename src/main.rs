mod cli;
mod error;
mod fmt;
mod interpret;
mod loader;
mod models;
mod reports;
mod settings;
mod tui;

use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};

fn main() {
    // Diagnostics go to stderr and stay silent unless RUST_LOG is set.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    let result = match cli.command {
        None => cli::view::run(None, None, None),
        Some(Commands::View {
            file,
            company,
            sheet,
        }) => cli::view::run(file.as_deref(), company.as_deref(), sheet.as_deref()),
        Some(Commands::Report {
            file,
            company,
            format,
            output,
            export,
            sheet,
        }) => cli::report::run(
            &file,
            company.as_deref(),
            format,
            output,
            export,
            sheet.as_deref(),
        ),
        Some(Commands::Companies { file, sheet }) => cli::companies::run(&file, sheet.as_deref()),
        Some(Commands::Validate { file, sheet }) => cli::validate::run(&file, sheet.as_deref()),
        Some(Commands::Config {
            export_dir,
            sheet,
            clear_sheet,
        }) => cli::config::run(export_dir, sheet, clear_sheet),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
