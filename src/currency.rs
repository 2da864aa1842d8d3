use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fmt::{money_with, Separators, EN_SEPARATORS, LATAM_SEPARATORS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Pt,
}

impl Language {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "pt" => Some(Self::Pt),
            _ => None,
        }
    }

    /// Portuguese shows reais; English and Spanish show dollars.
    pub fn default_currency(&self) -> Currency {
        match self {
            Self::Pt => Currency::Brl,
            Self::En | Self::Es => Currency::Usd,
        }
    }

    fn separators(&self) -> Separators {
        match self {
            Self::En => EN_SEPARATORS,
            Self::Es | Self::Pt => LATAM_SEPARATORS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Brl,
    Pyg,
    Ars,
}

pub const AVAILABLE_CURRENCIES: [Currency; 4] =
    [Currency::Usd, Currency::Brl, Currency::Pyg, Currency::Ars];

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Brl => "BRL",
            Self::Pyg => "PYG",
            Self::Ars => "ARS",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Brl => "R$",
            Self::Pyg => "₲",
            Self::Ars => "AR$",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        AVAILABLE_CURRENCIES
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(raw.trim()))
    }
}

/// USD-based rates. Best effort: unknown targets leave amounts unconverted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRates {
    rates: BTreeMap<String, f64>,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::fallback()
    }
}

impl ExchangeRates {
    pub fn fallback() -> Self {
        let rates = [("USD", 1.0), ("BRL", 5.0), ("PYG", 7500.0), ("ARS", 1000.0)]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();
        Self { rates }
    }

    /// Configured rates override the fallback table code by code.
    pub fn with_overrides(overrides: &BTreeMap<String, f64>) -> Self {
        let mut rates = Self::fallback();
        for (code, rate) in overrides {
            if rate.is_finite() && *rate > 0.0 {
                rates.rates.insert(code.to_ascii_uppercase(), *rate);
            }
        }
        rates
    }

    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(currency.code()).copied()
    }

    pub fn convert(&self, amount: f64, to: Currency) -> f64 {
        match self.rate(to) {
            Some(rate) => amount * rate,
            None => amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    pub currency: Currency,
    pub language: Language,
    pub rates: ExchangeRates,
}

impl CurrencyFormatter {
    pub fn new(currency: Currency, language: Language, rates: ExchangeRates) -> Self {
        Self {
            currency,
            language,
            rates,
        }
    }

    pub fn convert(&self, amount: f64) -> f64 {
        self.rates.convert(amount, self.currency)
    }

    pub fn format(&self, amount: f64) -> String {
        money_with(self.convert(amount), self.currency.symbol(), self.language.separators())
    }
}
