use comfy_table::{Cell, Table};

use crate::cli::success;
use crate::currency::{Currency, Language};
use crate::error::{Result, SheetbooksError};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

/// Parses `CODE=RATE`, e.g. `BRL=5.4`.
fn parse_rate(raw: &str) -> Result<(String, f64)> {
    let bad = || SheetbooksError::Settings(format!("invalid rate '{raw}', expected CODE=VALUE"));
    let (code, value) = raw.split_once('=').ok_or_else(bad)?;
    let code = Currency::parse(code).ok_or_else(bad)?.code().to_string();
    let value: f64 = value.trim().parse().map_err(|_| bad())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(bad());
    }
    Ok((code, value))
}

fn apply(
    settings: &mut Settings,
    company: Option<String>,
    language: Option<Language>,
    currency: Option<Currency>,
    rates: &[String],
) -> Result<bool> {
    let mut changed = false;
    if let Some(name) = company {
        settings.company_name = name;
        changed = true;
    }
    if let Some(lang) = language {
        settings.language = lang;
        changed = true;
    }
    if let Some(c) = currency {
        settings.currency = Some(c);
        changed = true;
    }
    for raw in rates {
        let (code, value) = parse_rate(raw)?;
        settings.exchange_rates.insert(code, value);
        changed = true;
    }
    Ok(changed)
}

pub fn run(
    company: Option<String>,
    language: Option<Language>,
    currency: Option<Currency>,
    rates: Vec<String>,
) -> Result<()> {
    let mut settings = load_settings();
    if apply(&mut settings, company, language, currency, &rates)? {
        save_settings(&settings)?;
        success("Settings saved.");
    }

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("File"), Cell::new(settings_path().display())]);
    table.add_row(vec![Cell::new("Company"), Cell::new(&settings.company_name)]);
    table.add_row(vec![Cell::new("Language"), Cell::new(format!("{:?}", settings.language).to_lowercase())]);
    table.add_row(vec![Cell::new("Currency"), Cell::new(settings.display_currency().code())]);
    let formatter = settings.formatter();
    for c in crate::currency::AVAILABLE_CURRENCIES {
        let rate = formatter.rates.rate(c).map_or("-".to_string(), |r| r.to_string());
        table.add_row(vec![Cell::new(format!("Rate USD->{}", c.code())), Cell::new(rate)]);
    }
    println!("{table}");
    Ok(())
}
