use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::analytics::NamedValue;
use crate::cli::{load_clean, DisplayArgs, FilterArgs};
use crate::currency::CurrencyFormatter;
use crate::error::Result;
use crate::reports::{build_dashboard, DashboardReport};
use crate::settings::load_settings;

fn signed(money: &CurrencyFormatter, value: f64) -> String {
    if value >= 0.0 {
        money.format(value).green().to_string()
    } else {
        money.format(value).red().to_string()
    }
}

fn named_table(header: &str, items: &[NamedValue], money: Option<&CurrencyFormatter>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header, if money.is_some() { "Amount" } else { "Count" }]);
    for item in items {
        let value = match money {
            Some(m) => m.format(item.value),
            None => format!("{}", item.value as u64),
        };
        table.add_row(vec![Cell::new(&item.name), Cell::new(value)]);
    }
    table
}

pub fn print_dashboard(report: &DashboardReport, money: &CurrencyFormatter, summary: &str) {
    println!("{}", summary.dimmed());
    if !report.available_years.is_empty() {
        let years: Vec<String> = report.available_years.iter().map(i32::to_string).collect();
        println!(
            "{}",
            format!(
                "Years: {}  Categories: {}",
                years.join(", "),
                report.available_categories.join(", ")
            )
            .dimmed()
        );
    }

    let m = &report.metrics;
    let mut metrics = Table::new();
    metrics.set_header(vec!["Income", "Expenses", "Balance", "Transactions"]);
    metrics.add_row(vec![
        Cell::new(money.format(m.income)),
        Cell::new(money.format(m.expense)),
        Cell::new(signed(money, m.balance)),
        Cell::new(m.count),
    ]);
    println!("Summary\n{metrics}");

    if !report.monthly_flow.is_empty() {
        let mut flow = Table::new();
        flow.set_header(vec!["Month", "Income", "Expenses", "Net"]);
        for month in &report.monthly_flow {
            flow.add_row(vec![
                Cell::new(&month.name),
                Cell::new(money.format(month.income)),
                Cell::new(money.format(month.expense)),
                Cell::new(signed(money, month.income - month.expense)),
            ]);
        }
        println!("\nMonthly Cash Flow\n{flow}");

        let trend = &report.trend;
        if !trend.expense_growth_months.is_empty() {
            println!(
                "{}",
                format!("Expenses rose in: {}", trend.expense_growth_months.join(", ")).yellow()
            );
        }
        if !trend.income_growth_months.is_empty() {
            println!("Income rose in: {}", trend.income_growth_months.join(", "));
        }
    }

    if !report.expenses_by_category.is_empty() {
        let table = named_table("Category", &report.expenses_by_category, Some(money));
        println!("\nExpenses by Category\n{table}");
    }
    if !report.payment_methods.is_empty() {
        let table = named_table("Payment Method", &report.payment_methods, None);
        println!("\nTransactions by Payment Method\n{table}");
    }
    if !report.top_vendors.is_empty() {
        let table = named_table("Vendor / Customer", &report.top_vendors, Some(money));
        println!("\nTop Vendors / Customers\n{table}");
    }

    if report.recent.is_empty() {
        println!("\nNo transactions match the current filter.");
        return;
    }
    let mut recent = Table::new();
    recent.set_header(vec!["Date", "Type", "Category", "Vendor / Customer", "Method", "Amount"]);
    for t in &report.recent {
        recent.add_row(vec![
            Cell::new(&t.transaction_date),
            Cell::new(&t.transaction_type),
            Cell::new(&t.category),
            Cell::new(t.vendor_customer.as_deref().unwrap_or("-")),
            Cell::new(&t.payment_method),
            Cell::new(money.format(t.amount)),
        ]);
    }
    println!("\nRecent Transactions\n{recent}");
}

pub fn run(file: &str, filter: &FilterArgs, display: &DisplayArgs, json: bool) -> Result<()> {
    let data = load_clean(file)?;
    let filter = filter.to_filter(&data);
    let report = build_dashboard(&data, &filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let money = display.formatter(&load_settings());
    print_dashboard(&report, &money, &filter.describe());
    Ok(())
}
