use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::{load_clean, DisplayArgs, FilterArgs};
use crate::error::Result;
use crate::filters::DashboardFilter;
use crate::reports::build_dashboard;
use crate::settings::load_settings;

fn default_path(filter: &DashboardFilter) -> PathBuf {
    PathBuf::from(format!("FinanceReport_{}.pdf", filter.file_suffix()))
}

fn write_pdf(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

pub fn run(
    file: &str,
    filter: &FilterArgs,
    display: &DisplayArgs,
    output: Option<String>,
) -> Result<String> {
    let data = load_clean(file)?;
    let filter = filter.to_filter(&data);
    let report = build_dashboard(&data, &filter);

    let settings = load_settings();
    let money = display.formatter(&settings);
    let bytes = crate::pdf::render_dashboard(&report, money, &settings.company_name, &filter.describe())?;
    info!(bytes = bytes.len(), "dashboard rendered");

    let path = output.map(PathBuf::from).unwrap_or_else(|| default_path(&filter));
    write_pdf(&bytes, &path)
}
