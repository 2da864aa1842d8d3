use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::models::{CounterpartyType, Transaction};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Dashboard selection. `None` in any slot means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: Option<String>,
    pub counterparty: Option<CounterpartyType>,
}

impl DashboardFilter {
    /// Starts on the current year/month, but only when the data has rows there.
    pub fn initial(data: &[Transaction], today: NaiveDate) -> Self {
        let has_year = data.iter().any(|t| t.date.year() == today.year());
        let has_month = data
            .iter()
            .any(|t| t.date.year() == today.year() && t.date.month() == today.month());
        Self {
            year: has_year.then_some(today.year()),
            month: has_month.then_some(today.month()),
            category: None,
            counterparty: None,
        }
    }

    fn matches_period(&self, t: &Transaction) -> bool {
        self.year.map_or(true, |y| t.date.year() == y)
            && self.month.map_or(true, |m| t.date.month() == m)
    }

    fn matches_counterparty(&self, t: &Transaction) -> bool {
        self.counterparty.map_or(true, |c| t.type_vendor_customer == c)
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.matches_period(t)
            && self.matches_counterparty(t)
            && self.category.as_deref().map_or(true, |c| t.category == c)
    }

    pub fn apply(&self, data: &[Transaction]) -> Vec<Transaction> {
        data.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    /// Feed for the expenses-by-category view, which must show every category.
    pub fn apply_ignoring_category(&self, data: &[Transaction]) -> Vec<Transaction> {
        data.iter()
            .filter(|t| self.matches_period(t) && self.matches_counterparty(t))
            .cloned()
            .collect()
    }

    pub fn describe(&self) -> String {
        let year = self.year.map_or_else(|| "all".to_string(), |y| y.to_string());
        let month = self.month.and_then(month_name).unwrap_or("all");
        let category = self.category.as_deref().unwrap_or("all");
        let kind = self.counterparty.map_or("all", |c| c.key());
        format!("Date: {year} / {month}, Category: {category}, Type: {kind}")
    }

    /// Suffix used for default export file names, e.g. `2026_03` or `all_all`.
    pub fn file_suffix(&self) -> String {
        let year = self.year.map_or_else(|| "all".to_string(), |y| y.to_string());
        let month = self.month.map_or_else(|| "all".to_string(), |m| format!("{m:02}"));
        format!("{year}_{month}")
    }
}

pub fn years(data: &[Transaction]) -> Vec<i32> {
    data.iter()
        .map(|t| t.date.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn categories(data: &[Transaction]) -> Vec<String> {
    data.iter()
        .map(|t| t.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
