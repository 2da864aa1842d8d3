use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::models::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS, SHEET_NAME};

pub const DEFAULT_FILE_NAME: &str = "FinanceReports_Template.xlsx";

const COLUMN_WIDTH: f64 = 20.0;

enum SampleValue {
    Text(&'static str),
    Number(f64),
}

use SampleValue::{Number, Text};

const SAMPLE_ROWS: [[SampleValue; 13]; 3] = [
    [
        Text("15/01/2026"),
        Text("income"),
        Text("Sales"),
        Number(5000.0),
        Text("USD"),
        Text("Wire Transfer"),
        Text("customer"),
        Text("Revenue"),
        Text("Acme Corp"),
        Text("INV-2024-001"),
        Text("Q1 Campaign"),
        Text("4000"),
        Text("January Retainer"),
    ],
    [
        Text("18/01/2026"),
        Text("expense"),
        Text("Software"),
        Number(450.0),
        Text("USD"),
        Text("Credit Card"),
        Text("vendor"),
        Text("IT"),
        Text("AWS"),
        Text("AWS-jan"),
        Text("Infrastructure"),
        Text("6000"),
        Text("Cloud hosting"),
    ],
    [
        Text("20/01/2026"),
        Text("expense"),
        Text("Office Supplies"),
        Number(125.50),
        Text("USD"),
        Text("Credit Card"),
        Text("vendor"),
        Text("Admin"),
        Text("Staples"),
        Text("ST-889"),
        Text(""),
        Text("6100"),
        Text("Paper and ink"),
    ],
];

pub fn headers() -> impl Iterator<Item = &'static str> {
    REQUIRED_COLUMNS.into_iter().chain(OPTIONAL_COLUMNS)
}

fn header_format(required: bool) -> Format {
    let fill = if required { Color::Yellow } else { Color::White };
    Format::new()
        .set_bold()
        .set_font_color(Color::Black)
        .set_background_color(fill)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

fn write_sheet(sheet: &mut Worksheet) -> Result<()> {
    let required = header_format(true);
    let optional = header_format(false);
    for (col, name) in headers().enumerate() {
        let col = col as u16;
        let format = if REQUIRED_COLUMNS.contains(&name) { &required } else { &optional };
        sheet.write_string_with_format(0, col, name, format)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (r, row) in SAMPLE_ROWS.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            match value {
                Text("") => {}
                Text(s) => {
                    sheet.write_string(r, col, *s)?;
                }
                Number(n) => {
                    sheet.write_number(r, col, *n)?;
                }
            }
        }
    }
    Ok(())
}

/// Blank workbook with the expected sheet, styled headers and three example rows.
pub fn build() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name(SHEET_NAME)?;
    write_sheet(sheet)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, build()?)?;
    Ok(())
}
