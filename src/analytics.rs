use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Transaction;

pub const TOP_LIMIT: usize = 10;
pub const RECENT_LIMIT: usize = 20;
pub const UNKNOWN_VENDOR: &str = "Unknown";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Substring match on the free-text type, English or Spanish.
pub fn is_income(t: &Transaction) -> bool {
    let kind = t.transaction_type.to_lowercase();
    kind.contains("income") || kind.contains("ingreso")
}

pub fn is_expense(t: &Transaction) -> bool {
    let kind = t.transaction_type.to_lowercase();
    kind.contains("expense") || kind.contains("gasto")
}

// ---------------------------------------------------------------------------
// Aggregate shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyFlow {
    pub name: String,
    pub income: f64,
    pub expense: f64,
    #[serde(skip)]
    pub first_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CashflowTrend {
    pub expense_growth_months: Vec<String>,
    pub income_growth_months: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Groups in first-seen order and folds each group's values.
fn group_in_order<'a, I>(items: I) -> Vec<NamedValue>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<NamedValue> = Vec::new();
    for (key, value) in items {
        match index.get(key) {
            Some(&i) => groups[i].value += value,
            None => {
                index.insert(key, groups.len());
                groups.push(NamedValue {
                    name: key.to_string(),
                    value,
                });
            }
        }
    }
    groups
}

/// Stable descending sort, so ties keep first-occurrence order.
fn top_descending(mut groups: Vec<NamedValue>, limit: usize) -> Vec<NamedValue> {
    groups.sort_by(|a, b| b.value.total_cmp(&a.value));
    groups.truncate(limit);
    groups
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %y").to_string()
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Sums in ascending order so the total does not depend on row order.
fn stable_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

/// Unknown types are left out of both sums but still counted.
pub fn calculate_metrics(data: &[Transaction]) -> Metrics {
    let income = stable_sum(data.iter().filter(|t| is_income(t)).map(|t| t.amount).collect());
    let expense = stable_sum(data.iter().filter(|t| is_expense(t)).map(|t| t.amount).collect());
    Metrics {
        income,
        expense,
        balance: income - expense,
        count: data.len(),
    }
}

/// One bucket per calendar month; anything that is not income lands in `expense`.
/// Buckets are ordered by the first date seen in each, not by label.
pub fn monthly_flow(data: &[Transaction]) -> Vec<MonthlyFlow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<MonthlyFlow> = Vec::new();
    for t in data {
        let name = month_label(t.date);
        let i = *index.entry(name.clone()).or_insert_with(|| {
            buckets.push(MonthlyFlow {
                name,
                income: 0.0,
                expense: 0.0,
                first_date: t.date,
            });
            buckets.len() - 1
        });
        if is_income(t) {
            buckets[i].income += t.amount;
        } else {
            buckets[i].expense += t.amount;
        }
    }
    buckets.sort_by_key(|b| b.first_date);
    buckets
}

pub fn expenses_by_category(data: &[Transaction]) -> Vec<NamedValue> {
    let groups = group_in_order(
        data.iter()
            .filter(|t| is_expense(t))
            .map(|t| (t.category.as_str(), t.amount)),
    );
    top_descending(groups, TOP_LIMIT)
}

/// Occurrence counts per payment method, in first-seen order.
pub fn transactions_by_payment(data: &[Transaction]) -> Vec<NamedValue> {
    group_in_order(data.iter().map(|t| (t.payment_method.as_str(), 1.0)))
}

pub fn top_vendors(data: &[Transaction]) -> Vec<NamedValue> {
    let groups = group_in_order(data.iter().map(|t| {
        let vendor = t.vendor_customer.as_deref().unwrap_or(UNKNOWN_VENDOR);
        (vendor, t.amount)
    }));
    top_descending(groups, TOP_LIMIT)
}

/// Latest first; equal dates keep input order.
pub fn recent_transactions(data: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

/// Months whose expense (or income) rose over the previous bucket; last two of each.
pub fn cashflow_trend(flow: &[MonthlyFlow]) -> CashflowTrend {
    let rising = |value: fn(&MonthlyFlow) -> f64| -> Vec<String> {
        let names: Vec<String> = flow
            .windows(2)
            .filter(|w| value(&w[1]) > value(&w[0]))
            .map(|w| w[1].name.clone())
            .collect();
        let skip = names.len().saturating_sub(2);
        names.into_iter().skip(skip).collect()
    };
    CashflowTrend {
        expense_growth_months: rising(|m| m.expense),
        income_growth_months: rising(|m| m.income),
    }
}
