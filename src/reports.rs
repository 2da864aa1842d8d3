use serde::Serialize;

use crate::analytics::{
    calculate_metrics, cashflow_trend, expenses_by_category, monthly_flow, recent_transactions,
    top_vendors, transactions_by_payment, CashflowTrend, Metrics, MonthlyFlow, NamedValue,
};
use crate::filters::{categories, years, DashboardFilter};
use crate::models::Transaction;

/// Every dashboard view computed for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metrics: Metrics,
    pub monthly_flow: Vec<MonthlyFlow>,
    pub trend: CashflowTrend,
    pub expenses_by_category: Vec<NamedValue>,
    pub payment_methods: Vec<NamedValue>,
    pub top_vendors: Vec<NamedValue>,
    pub recent: Vec<Transaction>,
    /// Filter choices offered by the whole file, not just the current selection.
    pub available_years: Vec<i32>,
    pub available_categories: Vec<String>,
}

pub fn build_dashboard(data: &[Transaction], filter: &DashboardFilter) -> DashboardReport {
    let filtered = filter.apply(data);
    let category_feed = filter.apply_ignoring_category(data);
    let flow = monthly_flow(&filtered);
    DashboardReport {
        metrics: calculate_metrics(&filtered),
        trend: cashflow_trend(&flow),
        monthly_flow: flow,
        expenses_by_category: expenses_by_category(&category_feed),
        payment_methods: transactions_by_payment(&filtered),
        top_vendors: top_vendors(&filtered),
        recent: recent_transactions(&filtered),
        available_years: years(data),
        available_categories: categories(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ingest_bytes;
    use crate::template;

    fn template_data() -> Vec<Transaction> {
        ingest_bytes(&template::build().unwrap()).transactions
    }

    #[test]
    fn test_build_dashboard_unfiltered() {
        let report = build_dashboard(&template_data(), &DashboardFilter::default());
        assert_eq!(report.metrics.count, 3);
        assert_eq!(report.monthly_flow.len(), 1);
        assert_eq!(report.monthly_flow[0].name, "Jan 26");
        assert_eq!(report.expenses_by_category[0].name, "Software");
        assert_eq!(report.payment_methods.len(), 2);
        assert_eq!(report.top_vendors[0].name, "Acme Corp");
        assert_eq!(report.recent[0].transaction_date, "20/01/2026");
    }

    #[test]
    fn test_category_filter_does_not_narrow_category_chart() {
        let filter = DashboardFilter {
            category: Some("Sales".to_string()),
            ..Default::default()
        };
        let report = build_dashboard(&template_data(), &filter);
        assert_eq!(report.metrics.count, 1);
        assert_eq!(report.expenses_by_category.len(), 2);
        assert_eq!(report.available_categories, ["Office Supplies", "Sales", "Software"]);
        assert_eq!(report.available_years, [2026]);
    }

    #[test]
    fn test_report_serializes() {
        let report = build_dashboard(&template_data(), &DashboardFilter::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metrics"]["count"], 3);
        assert_eq!(json["recent"][0]["type_vendor_customer"], "vendor");
    }
}
