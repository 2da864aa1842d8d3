use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::currency::{Currency, CurrencyFormatter, ExchangeRates, Language};
use crate::error::{Result, SheetbooksError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub language: Language,
    /// Display currency; falls back to the language default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// USD-based overrides for the built-in fallback rates.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exchange_rates: BTreeMap<String, f64>,
}

impl Settings {
    pub fn display_currency(&self) -> Currency {
        self.currency.unwrap_or_else(|| self.language.default_currency())
    }

    pub fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(
            self.display_currency(),
            self.language,
            ExchangeRates::with_overrides(&self.exchange_rates),
        )
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sheetbooks")
}

pub fn settings_path() -> PathBuf {
    std::env::var_os("SHEETBOOKS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("settings.json"))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), "ignoring malformed settings: {e}");
        Settings::default()
    })
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SheetbooksError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings {
            company_name: "Acme".to_string(),
            language: Language::Es,
            currency: Some(Currency::Pyg),
            exchange_rates: BTreeMap::new(),
        };
        settings.exchange_rates.insert("PYG".to_string(), 7300.0);
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("absent.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.display_currency(), Currency::Usd);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"language": "pt"}"#).unwrap();
        assert!(s.company_name.is_empty());
        assert_eq!(s.currency, None);
        assert_eq!(s.display_currency(), Currency::Brl);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_formatter_uses_overrides() {
        let mut s = Settings {
            currency: Some(Currency::Brl),
            ..Default::default()
        };
        s.exchange_rates.insert("BRL".to_string(), 6.0);
        assert_eq!(s.formatter().convert(10.0), 60.0);
    }
}
