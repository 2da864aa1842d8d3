use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Name of the only worksheet the importer reads.
pub const SHEET_NAME: &str = "transactions_finance";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "transaction_date",
    "transaction_type",
    "category",
    "amount",
    "currency",
    "payment_method",
    "type_vendor_customer",
];

pub const OPTIONAL_COLUMNS: [&str; 6] = [
    "cost_center",
    "vendor_customer",
    "invoice_number",
    "project",
    "account_code",
    "notes",
];

/// A single cell as decoded from the workbook, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Empty cells and whitespace-only text both count as missing.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Text rendering used for free-form string fields.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }
}

/// One data row keyed by header name. Column order in the file is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Missing columns read as `CellValue::Empty`.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Empty)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyType {
    Vendor,
    Customer,
}

impl CounterpartyType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vendor" => Some(Self::Vendor),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Customer => "customer",
        }
    }
}

/// Validated transaction. Only the row validator builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: u64,
    /// Canonical `DD/MM/YYYY`.
    pub transaction_date: String,
    #[serde(skip)]
    pub date: NaiveDate,
    pub transaction_type: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub type_vendor_customer: CounterpartyType,
    pub cost_center: Option<String>,
    pub vendor_customer: Option<String>,
    pub invoice_number: Option<String>,
    pub project: Option<String>,
    pub account_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub row: u32,
    pub column: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(row: u32, column: &str, message: &str) -> Self {
        Self {
            row,
            column: column.to_string(),
            message: message.to_string(),
        }
    }

    /// Row-0 error for problems with the file as a whole.
    pub fn structural(column: &str, message: &str) -> Self {
        Self::new(0, column, message)
    }
}

/// Output of one ingestion call. Owned by the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestResult {
    pub transactions: Vec<Transaction>,
    pub errors: Vec<ValidationError>,
}

impl IngestResult {
    pub fn failed(error: ValidationError) -> Self {
        Self {
            transactions: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
