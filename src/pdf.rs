use std::io::BufWriter;

use printpdf::*;

use crate::analytics::NamedValue;
use crate::currency::CurrencyFormatter;
use crate::error::{Result, SheetbooksError};
use crate::reports::DashboardReport;

// A4 portrait (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 9.5;
const TITLE_SIZE: f32 = 16.0;
const SECTION_SIZE: f32 = 11.5;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn pdf_err(e: impl std::fmt::Debug) -> SheetbooksError {
    SheetbooksError::Pdf(format!("{e:?}"))
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

fn col(width: f32, align: Align) -> Col {
    Col { width, align }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    y: f32,
    money: CurrencyFormatter,
}

impl PdfWriter {
    fn new(title: &str, money: CurrencyFormatter) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        Ok(Self {
            doc,
            font,
            font_bold,
            page,
            layer,
            y: MARGIN,
            money,
        })
    }

    /// Builtin fonts only cover WinAnsi, so the guaraní sign is spelled out.
    fn amount(&self, value: f64) -> String {
        self.money.format(value).replace('₲', "PYG ")
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
            self.page = page;
            self.layer = layer;
            self.y = MARGIN;
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.use_text(s, size, Mm(x), Mm(PAGE_H - self.y), font);
    }

    fn rule(&mut self) {
        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.set_outline_thickness(0.4);
        let y = Mm(PAGE_H - self.y);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), y), false),
                (Point::new(Mm(PAGE_W - MARGIN), y), false),
            ],
            is_closed: false,
        });
        self.y += 2.5;
    }

    fn header(&mut self, company: &str, filter_summary: &str) {
        self.text("Financial Report", MARGIN, TITLE_SIZE, true);
        self.y += 7.0;
        if !company.is_empty() {
            self.text(company, MARGIN, SECTION_SIZE, false);
            self.y += 5.5;
        }
        self.text(filter_summary, MARGIN, FONT_SIZE, false);
        self.y += 5.0;
        let generated = chrono::Local::now().format("Generated %Y-%m-%d %H:%M").to_string();
        self.text(&generated, MARGIN, 8.0, false);
        self.y += 4.0;
        self.rule();
        self.y += 3.0;
    }

    fn section(&mut self, label: &str) {
        self.ensure_space(ROW_H * 3.0);
        self.y += 2.0;
        self.text(label, MARGIN, SECTION_SIZE, true);
        self.y += ROW_H + 1.0;
    }

    fn row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN;
        for (c, value) in cols.iter().zip(values) {
            match c.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + c.width - tw, FONT_SIZE, bold);
                }
            }
            x += c.width;
        }
        self.y += ROW_H;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.row(cols, headers, true);
        self.rule();
    }

    fn named_values(&mut self, label: &str, items: &[NamedValue], as_amount: bool) {
        if items.is_empty() {
            return;
        }
        self.section(label);
        let cols = [col(CONTENT_W - 50.0, Align::Left), col(50.0, Align::Right)];
        for item in items {
            let value = if as_amount {
                self.amount(item.value)
            } else {
                format!("{}", item.value as u64)
            };
            self.row(&cols, &[&item.name, &value], false);
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(|e| SheetbooksError::Pdf(e.to_string()))
    }
}

pub fn render_dashboard(
    report: &DashboardReport,
    money: CurrencyFormatter,
    company: &str,
    filter_summary: &str,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Financial Report", money)?;
    pdf.header(company, filter_summary);

    pdf.section("Summary");
    let summary_cols = [col(CONTENT_W - 50.0, Align::Left), col(50.0, Align::Right)];
    let m = &report.metrics;
    for (label, value) in [
        ("Income", pdf.amount(m.income)),
        ("Expenses", pdf.amount(m.expense)),
        ("Balance", pdf.amount(m.balance)),
        ("Transactions", m.count.to_string()),
    ] {
        pdf.row(&summary_cols, &[label, &value], label == "Balance");
    }

    if !report.monthly_flow.is_empty() {
        pdf.section("Monthly Cash Flow");
        let cols = [
            col(44.0, Align::Left),
            col(45.0, Align::Right),
            col(45.0, Align::Right),
            col(CONTENT_W - 134.0, Align::Right),
        ];
        pdf.table_header(&cols, &["Month", "Income", "Expenses", "Net"]);
        for month in &report.monthly_flow {
            let income = pdf.amount(month.income);
            let expense = pdf.amount(month.expense);
            let net = pdf.amount(month.income - month.expense);
            pdf.row(&cols, &[&month.name, &income, &expense, &net], false);
        }
        let trend = &report.trend;
        if !trend.expense_growth_months.is_empty() || !trend.income_growth_months.is_empty() {
            pdf.y += 1.5;
            let line = format!(
                "Expenses rose in: {}. Income rose in: {}.",
                none_if_empty(&trend.expense_growth_months),
                none_if_empty(&trend.income_growth_months),
            );
            pdf.row(&[col(CONTENT_W, Align::Left)], &[&line], false);
        }
    }

    pdf.named_values("Expenses by Category", &report.expenses_by_category, true);
    pdf.named_values("Transactions by Payment Method", &report.payment_methods, false);
    pdf.named_values("Top Vendors / Customers", &report.top_vendors, true);

    if !report.recent.is_empty() {
        pdf.section("Recent Transactions");
        let cols = [
            col(24.0, Align::Left),
            col(50.0, Align::Left),
            col(44.0, Align::Left),
            col(CONTENT_W - 118.0, Align::Right),
        ];
        pdf.table_header(&cols, &["Date", "Category", "Vendor / Customer", "Amount"]);
        for t in &report.recent {
            let amount = pdf.amount(t.amount);
            let vendor = t.vendor_customer.as_deref().unwrap_or("-");
            pdf.row(&cols, &[&t.transaction_date, &t.category, vendor, &amount], false);
        }
    }

    pdf.to_bytes()
}

fn none_if_empty(months: &[String]) -> String {
    if months.is_empty() {
        "none".to_string()
    } else {
        months.join(", ")
    }
}
