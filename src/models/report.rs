//! The aggregated dashboard report: the JSON contract consumed by the
//! dashboard frontend and handed verbatim to the assistant as context.
//!
//! Cards carry both the raw numeric value and a display string so consumers
//! never re-derive formatting, and tests can assert unformatted numbers.

use serde::{Deserialize, Serialize};

use crate::format;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub title: String,
    pub value: Option<f64>,
    pub display: String,
}

impl MetricCard {
    pub fn amount(title: &str, value: f64) -> Self {
        let rounded = format::round2(value);
        Self {
            title: title.to_string(),
            value: Some(rounded),
            display: format::compact(rounded),
        }
    }

    pub fn count(title: &str, value: u64) -> Self {
        Self {
            title: title.to_string(),
            value: Some(value as f64),
            display: value.to_string(),
        }
    }

    pub fn percent(title: &str, value: f64) -> Self {
        let rounded = format::round2(value);
        Self {
            title: title.to_string(),
            value: Some(rounded),
            display: format::percent(rounded),
        }
    }

    pub fn ratio(title: &str, value: f64) -> Self {
        let rounded = format::round2(value);
        Self {
            title: title.to_string(),
            value: Some(rounded),
            display: format!("{:.2}", rounded),
        }
    }

    /// Metric the connected platforms do not expose (kept on the card list
    /// so the dashboard layout stays stable).
    pub fn unavailable(title: &str) -> Self {
        Self {
            title: title.to_string(),
            value: None,
            display: "—".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: String,
    pub revenue: f64,
    pub orders: u64,
    pub cogs: f64,
    pub ad_spend: f64,
    pub shipping_cost: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStat {
    pub id: String,
    pub name: String,
    pub units_sold: u64,
    pub revenue: f64,
    pub cogs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRankings {
    pub best: Vec<ProductStat>,
    pub least: Vec<ProductStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBreakdown {
    pub id: String,
    pub name: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub reach: u64,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodBreakdown {
    pub cod_orders: u64,
    pub prepaid_orders: u64,
    pub cod_pending: u64,
    pub cod_remitted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCustomerMix {
    pub name: String,
    pub new_customers: u64,
    pub returning_customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossRow {
    pub month: String,
    pub year: i32,
    pub sales: f64,
    pub cogs: f64,
    pub ads_spend: f64,
    pub shipping: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrends {
    pub sales: Vec<MonthPoint>,
    pub orders: Vec<MonthPoint>,
    pub customer_mix: Vec<MonthCustomerMix>,
    pub roas: Vec<MonthPoint>,
    pub cpp: Vec<MonthPoint>,
    pub shipping_cost: Vec<MonthPoint>,
    pub profit_loss: Vec<ProfitLossRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdowns {
    pub campaigns: Vec<CampaignBreakdown>,
    pub shipment_status: Vec<StatusCount>,
    pub payment_mode: Vec<StatusCount>,
    pub cod: CodBreakdown,
    pub monthly: MonthlyTrends,
}

/// Per-source failure markers. A populated field means that platform's
/// sections are zero-valued defaults, not real data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceErrors {
    pub shopify: Option<String>,
    pub meta_ads: Option<String>,
    pub shiprocket: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    pub window: ReportWindow,
    pub summary: Vec<MetricCard>,
    pub marketing: Vec<MetricCard>,
    pub website: Vec<MetricCard>,
    pub shipping: Vec<MetricCard>,
    pub daily_series: Vec<DayBucket>,
    pub product_rankings: ProductRankings,
    pub breakdowns: Breakdowns,
    pub source_errors: SourceErrors,
}
