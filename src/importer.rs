use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::{debug, info, warn};

use crate::dates::excel_serial_to_date;
use crate::error::Result;
use crate::models::{CellValue, IngestResult, RawRow, ValidationError, SHEET_NAME};
use crate::validator::validate_row;

pub const MSG_BAD_EXTENSION: &str = "Formato de archivo inválido. Sube un archivo .xlsx o .xls";
pub const MSG_MISSING_SHEET: &str =
    "Falta la hoja \"transactions_finance\". ¿Usaste el template correcto?";
pub const MSG_EMPTY: &str = "El archivo está vacío";
pub const MSG_UNREADABLE: &str = "Error al leer el archivo. Asegúrate de que no esté corrupto.";

const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

// ---------------------------------------------------------------------------
// Cell decoding
// ---------------------------------------------------------------------------

fn parse_iso_date(s: &str) -> Option<chrono::NaiveDate> {
    let day = s.get(..10)?;
    chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Date-formatted cells come back as native dates, everything else keeps its shape.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date())
            .or_else(|| excel_serial_to_date(dt.as_f64()))
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_date(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}

/// First row is the header; every later non-blank row becomes a header-keyed `RawRow`.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let mut seen: HashMap<String, usize> = HashMap::new();
    let headers: Vec<Option<String>> = header
        .iter()
        .map(|cell| {
            let name = cell_value(cell).as_text();
            if name.is_empty() {
                return None;
            }
            // repeated headers keep the first column under the plain name
            let n = seen.entry(name.clone()).or_insert(0);
            let key = if *n == 0 { name.clone() } else { format!("{name}_{n}") };
            *n += 1;
            Some(key)
        })
        .collect();

    rows.map(|cells| {
        headers
            .iter()
            .zip(cells)
            .filter_map(|(h, cell)| h.as_ref().map(|h| (h.clone(), cell_value(cell))))
            .collect::<RawRow>()
    })
    .filter(|row| !row.is_blank())
    .collect()
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Caller-side guard run before ingestion.
pub fn check_extension(file_path: &Path) -> Option<ValidationError> {
    let ok = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| ACCEPTED_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)));
    if ok {
        None
    } else {
        Some(ValidationError::structural("File", MSG_BAD_EXTENSION))
    }
}

/// Validates every row in one pass. Row numbers are display numbers: index + 2 for the header.
pub fn ingest_rows(rows: &[RawRow]) -> IngestResult {
    if rows.is_empty() {
        return IngestResult::failed(ValidationError::structural("Data", MSG_EMPTY));
    }

    let mut result = IngestResult::default();
    let mut next_id = 1u64;
    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 2;
        match validate_row(row, row_num, next_id) {
            Ok(txn) => {
                result.transactions.push(txn);
                next_id += 1;
            }
            Err(errors) => {
                debug!(row = row_num, count = errors.len(), "row rejected");
                result.errors.extend(errors);
            }
        }
    }
    info!(
        rows = rows.len(),
        valid = result.transactions.len(),
        errors = result.errors.len(),
        "sheet validated"
    );
    result
}

/// Decodes a workbook payload. Content problems come back as errors in the result, never as `Err`.
pub fn ingest_bytes(bytes: &[u8]) -> IngestResult {
    let mut workbook = match open_workbook_auto_from_rs(Cursor::new(bytes)) {
        Ok(wb) => wb,
        Err(e) => {
            warn!("workbook decode failed: {e}");
            return IngestResult::failed(ValidationError::structural("File", MSG_UNREADABLE));
        }
    };

    if !workbook.sheet_names().iter().any(|name| name == SHEET_NAME) {
        debug!(sheets = ?workbook.sheet_names(), "required sheet missing");
        return IngestResult::failed(ValidationError::structural("Sheet", MSG_MISSING_SHEET));
    }

    let range = match workbook.worksheet_range(SHEET_NAME) {
        Ok(range) => range,
        Err(e) => {
            warn!("sheet {SHEET_NAME} unreadable: {e}");
            return IngestResult::failed(ValidationError::structural("File", MSG_UNREADABLE));
        }
    };

    ingest_rows(&rows_from_range(&range))
}

/// The only step that can fail: reading the bytes off disk.
pub fn read_file(file_path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(file_path)?;
    debug!(path = %file_path.display(), bytes = bytes.len(), "file read");
    Ok(bytes)
}

pub fn ingest_file(file_path: &Path) -> Result<IngestResult> {
    let bytes = read_file(file_path)?;
    Ok(ingest_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CounterpartyType, REQUIRED_COLUMNS};
    use crate::validator::{MSG_BAD_DATE, MSG_REQUIRED};
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn range_of(rows: &[Vec<Data>]) -> Range<Data> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn header() -> Vec<Data> {
        REQUIRED_COLUMNS.into_iter().map(s).collect()
    }

    fn income_row() -> Vec<Data> {
        vec![s("15/01/2026"), s("income"), s("Sales"), Data::Float(5000.0), s("USD"), s("Wire"), s("customer")]
    }

    fn expense_row() -> Vec<Data> {
        vec![s("18/01/2026"), s("expense"), s("Software"), Data::Int(450), s("USD"), s("Card"), s("vendor")]
    }

    fn workbook_bytes(sheet_name: &str, rows: &[Vec<&str>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name(sheet_name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_rows_keyed_by_header_name() {
        let mut reversed_header = header();
        reversed_header.reverse();
        let mut row = income_row();
        row.reverse();
        let rows = rows_from_range(&range_of(&[reversed_header, row]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("category"), &CellValue::Text("Sales".into()));
        assert_eq!(rows[0].get("amount"), &CellValue::Number(5000.0));
    }

    #[test]
    fn test_repeated_header_keeps_first_column() {
        let mut head = header();
        head.push(s("amount"));
        head.push(s("amount"));
        let mut row = income_row();
        row.push(s("abc"));
        row.push(s("def"));
        let rows = rows_from_range(&range_of(&[head, row]));
        assert_eq!(rows[0].get("amount"), &CellValue::Number(5000.0));
        assert_eq!(rows[0].get("amount_1"), &CellValue::Text("abc".into()));
        assert_eq!(rows[0].get("amount_2"), &CellValue::Text("def".into()));
        let result = ingest_rows(&rows);
        assert!(result.is_clean());
    }

    #[test]
    fn test_date_cells_honor_1904_system() {
        use calamine::{ExcelDateTime as CellDateTime, ExcelDateTimeType};

        let jan_10_2025 = chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let cell_1900 = Data::DateTime(CellDateTime::new(45667.0, ExcelDateTimeType::DateTime, false));
        let cell_1904 = Data::DateTime(CellDateTime::new(44205.0, ExcelDateTimeType::DateTime, true));
        assert_eq!(cell_value(&cell_1900), CellValue::Date(jan_10_2025));
        assert_eq!(cell_value(&cell_1904), CellValue::Date(jan_10_2025));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let blank = vec![Data::Empty; 7];
        let rows = rows_from_range(&range_of(&[header(), income_row(), blank, expense_row()]));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_end_to_end_rows() {
        let rows = rows_from_range(&range_of(&[header(), income_row(), expense_row()]));
        let result = ingest_rows(&rows);
        assert!(result.errors.is_empty());
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.transactions[0].amount, 5000.0);
        assert_eq!(result.transactions[1].amount, 450.0);
        assert_eq!(result.transactions[1].type_vendor_customer, CounterpartyType::Vendor);
        assert_ne!(result.transactions[0].id, result.transactions[1].id);
    }

    #[test]
    fn test_partial_success_keeps_valid_rows() {
        let mut bad = expense_row();
        bad[0] = s("31/02/2026");
        bad[2] = Data::Empty;
        let rows = rows_from_range(&range_of(&[header(), income_row(), bad, expense_row()]));
        let result = ingest_rows(&rows);
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(
            result.errors,
            vec![
                ValidationError::new(3, "category", MSG_REQUIRED),
                ValidationError::new(3, "transaction_date", MSG_BAD_DATE),
            ]
        );
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let result = ingest_rows(&rows_from_range(&range_of(&[header()])));
        assert!(result.transactions.is_empty());
        assert_eq!(result.errors, vec![ValidationError::structural("Data", MSG_EMPTY)]);
    }

    #[test]
    fn test_missing_sheet() {
        let bytes = workbook_bytes("Sheet1", &[vec!["transaction_date"], vec!["15/01/2026"]]);
        let result = ingest_bytes(&bytes);
        assert!(result.transactions.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 0);
        assert_eq!(result.errors[0].column, "Sheet");
    }

    #[test]
    fn test_sheet_name_is_case_sensitive() {
        let bytes = workbook_bytes("Transactions_Finance", &[vec!["transaction_date"]]);
        assert_eq!(ingest_bytes(&bytes).errors[0].column, "Sheet");
    }

    #[test]
    fn test_empty_sheet() {
        let bytes = workbook_bytes(SHEET_NAME, &[]);
        let result = ingest_bytes(&bytes);
        assert_eq!(result.errors, vec![ValidationError::structural("Data", MSG_EMPTY)]);
    }

    #[test]
    fn test_corrupt_payload() {
        let result = ingest_bytes(b"definitely not a spreadsheet");
        assert!(result.transactions.is_empty());
        assert_eq!(result.errors, vec![ValidationError::structural("File", MSG_UNREADABLE)]);
    }

    #[test]
    fn test_ingest_bytes_reads_native_dates() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name(SHEET_NAME).unwrap();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        for (c, name) in REQUIRED_COLUMNS.iter().enumerate() {
            sheet.write_string(0, c as u16, *name).unwrap();
        }
        let date = ExcelDateTime::from_ymd(2026, 3, 5).unwrap();
        sheet.write_datetime_with_format(1, 0, &date, &date_format).unwrap();
        sheet.write_string(1, 1, "Gasto").unwrap();
        sheet.write_string(1, 2, "Rent").unwrap();
        sheet.write_number(1, 3, 1200.0).unwrap();
        sheet.write_string(1, 4, "USD").unwrap();
        sheet.write_string(1, 5, "Transfer").unwrap();
        sheet.write_string(1, 6, "vendor").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let result = ingest_bytes(&bytes);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.transactions[0].transaction_date, "05/03/2026");
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("book.xlsx")).is_none());
        assert!(check_extension(Path::new("BOOK.XLS")).is_none());
        let err = check_extension(Path::new("book.csv")).unwrap();
        assert_eq!(err.row, 0);
        assert_eq!(err.column, "File");
        assert!(check_extension(Path::new("book")).is_some());
    }

    #[test]
    fn test_read_file_missing_is_err() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ingest_file(&dir.path().join("nope.xlsx")).is_err());
    }

    #[test]
    fn test_ingest_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let bytes = workbook_bytes(
            SHEET_NAME,
            &[
                vec!["amount", "transaction_date", "transaction_type", "category", "currency", "payment_method", "type_vendor_customer"],
                vec!["99.5", "2026-02-01", "expense", "Travel", "USD", "Card", "vendor"],
            ],
        );
        std::fs::write(&path, bytes).unwrap();
        let result = ingest_file(&path).unwrap();
        assert!(result.is_clean());
        assert_eq!(result.transactions[0].amount, 99.5);
        assert_eq!(result.transactions[0].transaction_date, "01/02/2026");
    }
}
