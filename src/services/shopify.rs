//! Shopify Admin API adapter.
//!
//! Orders and customers are fetched once per report and sliced into every
//! granularity downstream; there is no separate daily-series call.

use reqwest::Client;

use crate::error::Result;
use crate::models::shopify::{RawCustomer, RawOrder, ShopifyFetch};
use crate::models::{DateWindow, ShopifyCredentials};
use crate::pagination::fetch_link_header_pages;
use crate::services::shopify_admin_base;

const SOURCE: &str = "shopify";

// Only the fields the report consumes; keeps page payloads small.
const ORDER_FIELDS: &str = "id,created_at,total_price,customer,line_items";
const CUSTOMER_FIELDS: &str = "id,created_at,orders_count";

#[derive(Clone)]
pub struct ShopifyService {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ShopifyService {
    pub fn new(client: Client, credentials: &ShopifyCredentials) -> Self {
        Self {
            client,
            base_url: shopify_admin_base(&credentials.store_url),
            access_token: credentials.access_token.clone(),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("X-Shopify-Access-Token", self.access_token.clone())]
    }

    /// Paid orders created inside the window, all pages.
    pub async fn fetch_orders(&self, window: &DateWindow) -> Result<Vec<RawOrder>> {
        let query = vec![
            ("status".to_string(), "any".to_string()),
            ("financial_status".to_string(), "paid".to_string()),
            ("fields".to_string(), ORDER_FIELDS.to_string()),
            ("created_at_min".to_string(), window.start_bound()),
            ("created_at_max".to_string(), window.end_bound()),
        ];
        fetch_link_header_pages(
            &self.client,
            SOURCE,
            &format!("{}/orders.json", self.base_url),
            &self.headers(),
            &query,
            "orders",
        )
        .await
    }

    /// Customers created inside the window, with their lifetime order count.
    pub async fn fetch_customers(&self, window: &DateWindow) -> Result<Vec<RawCustomer>> {
        let query = vec![
            ("fields".to_string(), CUSTOMER_FIELDS.to_string()),
            ("created_at_min".to_string(), window.start_bound()),
            ("created_at_max".to_string(), window.end_bound()),
        ];
        fetch_link_header_pages(
            &self.client,
            SOURCE,
            &format!("{}/customers.json", self.base_url),
            &self.headers(),
            &query,
            "customers",
        )
        .await
    }

    /// Full fetch for one report: window sets plus the trailing-months sets
    /// behind the trend charts.
    pub async fn fetch_all(
        &self,
        window: &DateWindow,
        trend_window: &DateWindow,
    ) -> Result<ShopifyFetch> {
        let orders = self.fetch_orders(window).await?;
        let customers = self.fetch_customers(window).await?;
        let trend_orders = self.fetch_orders(trend_window).await?;
        let trend_customers = self.fetch_customers(trend_window).await?;
        Ok(ShopifyFetch {
            orders,
            customers,
            trend_orders,
            trend_customers,
        })
    }
}
