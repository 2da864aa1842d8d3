mod analytics;
mod cli;
mod currency;
mod dates;
mod error;
mod filters;
mod fmt;
mod importer;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod settings;
mod template;
mod validator;

use clap::Parser;

use cli::{Cli, Commands};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbooks=warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file, json } => cli::check::run(&file, json),
        Commands::Report {
            file,
            filter,
            display,
            json,
        } => cli::report::run(&file, &filter, &display, json),
        #[cfg(feature = "pdf")]
        Commands::Export {
            file,
            filter,
            display,
            output,
        } => cli::export::run(&file, &filter, &display, output).map(|_| ()),
        Commands::Template { output } => cli::template::run(output),
        Commands::Config {
            company,
            language,
            currency,
            rates,
        } => cli::config::run(company, language, currency, rates),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
