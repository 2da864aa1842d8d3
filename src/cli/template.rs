use std::path::PathBuf;

use crate::cli::success;
use crate::error::Result;
use crate::template::{write_template, DEFAULT_FILE_NAME};

pub fn run(output: Option<String>) -> Result<()> {
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME));
    write_template(&path)?;
    success(&format!("Template written to {}", path.display()));
    println!("Fill in the yellow columns; the rest are optional.");
    Ok(())
}
