//! Raw Shopify Admin API payloads, restricted to the fields the report
//! actually consumes (the fetch requests ask for exactly these).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::de;

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub total_price: Decimal,
    #[serde(default)]
    pub customer: Option<RawOrderCustomer>,
    #[serde(default)]
    pub line_items: Vec<RawLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderCustomer {
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub quantity: u64,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomer {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "de::u64_flex")]
    pub orders_count: u64,
}

/// Everything the engine needs from Shopify for one report: the in-window
/// order and customer sets plus the trailing-months sets behind the trend
/// charts. Fetched once, sliced into every granularity downstream.
#[derive(Debug, Clone, Default)]
pub struct ShopifyFetch {
    pub orders: Vec<RawOrder>,
    pub customers: Vec<RawCustomer>,
    pub trend_orders: Vec<RawOrder>,
    pub trend_customers: Vec<RawCustomer>,
}
