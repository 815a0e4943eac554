//! Raw Meta Marketing API insight rows. The Graph API quotes every number
//! as a string.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::de;

#[derive(Debug, Clone, Deserialize)]
pub struct RawInsightRow {
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub spend: Decimal,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub reach: u64,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    #[serde(default)]
    pub action_type: String,
    #[serde(default, deserialize_with = "de::f64_flex")]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCampaignRow {
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub spend: Decimal,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub reach: u64,
}

/// One report's worth of Meta data: the window aggregate, the per-day and
/// per-month breakdowns, and the campaign-level rows.
#[derive(Debug, Clone, Default)]
pub struct MetaFetch {
    pub window_rows: Vec<RawInsightRow>,
    pub daily_rows: Vec<RawInsightRow>,
    pub monthly_rows: Vec<RawInsightRow>,
    pub campaign_rows: Vec<RawCampaignRow>,
}
