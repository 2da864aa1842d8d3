pub mod check;
pub mod config;
#[cfg(feature = "pdf")]
pub mod export;
pub mod report;
pub mod template;

use std::path::Path;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::info;

use crate::currency::{Currency, CurrencyFormatter, ExchangeRates, Language};
use crate::error::{Result, SheetbooksError};
use crate::filters::DashboardFilter;
use crate::importer::{check_extension, ingest_file};
use crate::models::{CounterpartyType, IngestResult, Transaction, ValidationError};
use crate::settings::Settings;

/// Accepts `YYYY-MM` or a bare month number.
pub(crate) fn parse_month_opt(month: &Option<String>) -> (Option<i32>, Option<u32>) {
    let Some(m) = month else {
        return (None, None);
    };
    let valid = |n: u32| (1..=12).contains(&n).then_some(n);
    match m.split_once('-') {
        Some((y, mm)) => (y.parse().ok(), mm.parse().ok().and_then(valid)),
        None => (None, m.parse().ok().and_then(valid)),
    }
}

fn parse_counterparty(raw: &str) -> std::result::Result<CounterpartyType, String> {
    CounterpartyType::parse(raw).ok_or_else(|| format!("expected 'vendor' or 'customer', got '{raw}'"))
}

fn parse_currency(raw: &str) -> std::result::Result<Currency, String> {
    Currency::parse(raw).ok_or_else(|| format!("unsupported currency '{raw}' (USD, BRL, PYG, ARS)"))
}

fn parse_language(raw: &str) -> std::result::Result<Language, String> {
    Language::parse(raw).ok_or_else(|| format!("unsupported language '{raw}' (en, es, pt)"))
}

#[derive(Parser)]
#[command(
    name = "sheetbooks",
    version,
    about = "Validate a transactions spreadsheet and explore its cash-flow analytics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a spreadsheet and list every problem found.
    Check {
        /// Path to the .xlsx/.xls file
        file: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the analytics dashboard for a clean spreadsheet.
    Report {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        display: DisplayArgs,
        /// Print the dashboard as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Export the dashboard to PDF.
    #[cfg(feature = "pdf")]
    Export {
        file: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        display: DisplayArgs,
        /// Output file path (default: FinanceReport_<year>_<month>.pdf)
        #[arg(long)]
        output: Option<String>,
    },
    /// Write a blank spreadsheet template with example rows.
    Template {
        /// Output file path (default: FinanceReports_Template.xlsx)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show or update saved settings.
    Config {
        /// Company name printed on exports
        #[arg(long)]
        company: Option<String>,
        /// Display language: en, es, pt
        #[arg(long = "lang", value_parser = parse_language)]
        language: Option<Language>,
        /// Display currency: USD, BRL, PYG, ARS
        #[arg(long, value_parser = parse_currency)]
        currency: Option<Currency>,
        /// Exchange rate override against USD, e.g. BRL=5.4 (repeatable)
        #[arg(long = "rate")]
        rates: Vec<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Year filter: YYYY
    #[arg(long)]
    pub year: Option<i32>,
    /// Month filter: YYYY-MM or MM
    #[arg(long)]
    pub month: Option<String>,
    /// Exact category name
    #[arg(long)]
    pub category: Option<String>,
    /// Counterparty type: vendor or customer
    #[arg(long = "type", value_parser = parse_counterparty)]
    pub counterparty: Option<CounterpartyType>,
    /// Start on the current year/month when the file has data there
    #[arg(long, conflicts_with_all = ["year", "month"])]
    pub current: bool,
}

impl FilterArgs {
    pub fn to_filter(&self, data: &[Transaction]) -> DashboardFilter {
        let mut filter = if self.current {
            DashboardFilter::initial(data, chrono::Local::now().date_naive())
        } else {
            let (my, mm) = parse_month_opt(&self.month);
            DashboardFilter {
                year: self.year.or(my),
                month: mm,
                ..Default::default()
            }
        };
        filter.category = self.category.clone();
        filter.counterparty = self.counterparty;
        filter
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Display currency, overrides settings
    #[arg(long, value_parser = parse_currency)]
    pub currency: Option<Currency>,
    /// Display language, overrides settings
    #[arg(long = "lang", value_parser = parse_language)]
    pub language: Option<Language>,
}

impl DisplayArgs {
    pub fn formatter(&self, settings: &Settings) -> CurrencyFormatter {
        let language = self.language.unwrap_or(settings.language);
        let currency = self
            .currency
            .or(settings.currency)
            .unwrap_or_else(|| language.default_currency());
        CurrencyFormatter::new(
            currency,
            language,
            ExchangeRates::with_overrides(&settings.exchange_rates),
        )
    }
}

pub(crate) fn errors_table(errors: &[ValidationError]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Column", "Message"]);
    for e in errors {
        let row = if e.row == 0 { "-".to_string() } else { e.row.to_string() };
        table.add_row(vec![Cell::new(row), Cell::new(&e.column), Cell::new(&e.message)]);
    }
    table
}

/// Runs the caller-side extension check, then ingestion.
pub(crate) fn ingest_checked(file: &str) -> Result<IngestResult> {
    let path = Path::new(file);
    if let Some(err) = check_extension(path) {
        return Ok(IngestResult::failed(err));
    }
    info!(file, "ingesting");
    ingest_file(path)
}

/// Analytics only run on files that validate with zero errors.
pub(crate) fn load_clean(file: &str) -> Result<Vec<Transaction>> {
    let result = ingest_checked(file)?;
    if !result.is_clean() {
        eprintln!("{}", errors_table(&result.errors));
        return Err(SheetbooksError::Other(format!(
            "{} validation error(s) found; fix the file and try again",
            result.errors.len()
        )));
    }
    Ok(result.transactions)
}

pub(crate) fn success(msg: &str) {
    println!("{}", msg.green());
}
