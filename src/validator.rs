use crate::dates::normalize_date;
use crate::models::{CellValue, CounterpartyType, RawRow, Transaction, ValidationError, REQUIRED_COLUMNS};

pub const MSG_REQUIRED: &str = "Campo requerido faltante";
pub const MSG_NOT_NUMERIC: &str = "Debe ser un valor numérico";
pub const MSG_BAD_DATE: &str = "Formato inválido. Use DD/MM/YYYY o YYYY/MM/DD";
pub const MSG_BAD_COUNTERPARTY: &str = "Debe ser 'vendor' o 'customer'";

/// Numeric coercion for the amount cell. Dates and non-finite values are not amounts.
pub fn coerce_amount(value: &CellValue) -> Option<f64> {
    let n = match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Empty | CellValue::Date(_) => return None,
    };
    n.is_finite().then_some(n)
}

fn optional(row: &RawRow, column: &str) -> Option<String> {
    let value = row.get(column);
    if value.is_blank() {
        None
    } else {
        Some(value.as_text())
    }
}

/// Validates one data row. Every check runs, so a bad row reports all of its problems at once.
pub fn validate_row(row: &RawRow, row_num: u32, id: u64) -> Result<Transaction, Vec<ValidationError>> {
    let mut errors = Vec::new();

    for col in REQUIRED_COLUMNS {
        if row.get(col).is_blank() {
            errors.push(ValidationError::new(row_num, col, MSG_REQUIRED));
        }
    }

    let amount_cell = row.get("amount");
    let amount = coerce_amount(amount_cell);
    if !amount_cell.is_blank() && amount.is_none() {
        errors.push(ValidationError::new(row_num, "amount", MSG_NOT_NUMERIC));
    }

    let date_cell = row.get("transaction_date");
    let date = normalize_date(date_cell);
    if !date_cell.is_blank() && date.is_none() {
        errors.push(ValidationError::new(row_num, "transaction_date", MSG_BAD_DATE));
    }

    let counterparty_cell = row.get("type_vendor_customer");
    let counterparty = CounterpartyType::parse(&counterparty_cell.as_text());
    if !counterparty_cell.is_blank() && counterparty.is_none() {
        errors.push(ValidationError::new(row_num, "type_vendor_customer", MSG_BAD_COUNTERPARTY));
    }

    let (Some(amount), Some(date), Some(counterparty)) = (amount, date, counterparty) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Transaction {
        id,
        transaction_date: date.canonical,
        date: date.date,
        transaction_type: row.get("transaction_type").as_text(),
        category: row.get("category").as_text(),
        amount,
        currency: row.get("currency").as_text(),
        payment_method: row.get("payment_method").as_text(),
        type_vendor_customer: counterparty,
        cost_center: optional(row, "cost_center"),
        vendor_customer: optional(row, "vendor_customer"),
        invoice_number: optional(row, "invoice_number"),
        project: optional(row, "project"),
        account_code: optional(row, "account_code"),
        notes: optional(row, "notes"),
    })
}
