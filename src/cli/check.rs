use colored::Colorize;

use crate::cli::{errors_table, ingest_checked, success};
use crate::error::{Result, SheetbooksError};

pub fn run(file: &str, json: bool) -> Result<()> {
    let result = ingest_checked(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_clean() {
        success(&format!("{} valid transactions, no errors.", result.transactions.len()));
    } else {
        println!(
            "{} {} error(s) found ({} valid rows)",
            "✗".red().bold(),
            result.errors.len(),
            result.transactions.len()
        );
        println!("{}", errors_table(&result.errors));
    }

    if result.is_clean() {
        Ok(())
    } else {
        Err(SheetbooksError::Other(format!(
            "{} validation error(s) found",
            result.errors.len()
        )))
    }
}
