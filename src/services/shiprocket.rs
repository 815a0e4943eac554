//! Shiprocket external API adapter.
//!
//! The orders endpoint is page-number paginated (500 per page) and nests
//! shipment records inside each order; the adapter flattens them.

use reqwest::Client;

use crate::error::Result;
use crate::models::shiprocket::{RawShipment, RawShiprocketOrder, ShiprocketFetch};
use crate::models::{DateWindow, ShiprocketCredentials};
use crate::pagination::fetch_page_number_pages;

const SOURCE: &str = "shiprocket";
const PER_PAGE: u32 = 500;

#[derive(Clone)]
pub struct ShiprocketService {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ShiprocketService {
    pub fn new(client: Client, base_url: &str, credentials: &ShiprocketCredentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: credentials.access_token.clone(),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", self.access_token))]
    }

    /// All shipments of orders placed inside the window.
    pub async fn fetch_shipments(&self, window: &DateWindow) -> Result<Vec<RawShipment>> {
        let query = vec![
            ("from".to_string(), window.start.to_string()),
            ("to".to_string(), window.end.to_string()),
        ];
        let orders: Vec<RawShiprocketOrder> = fetch_page_number_pages(
            &self.client,
            SOURCE,
            &format!("{}/orders", self.base_url),
            &self.headers(),
            &query,
            "data",
            PER_PAGE,
        )
        .await?;
        Ok(orders
            .into_iter()
            .flat_map(RawShiprocketOrder::into_shipments)
            .collect())
    }

    /// Full fetch for one report: window shipments plus the trailing-months
    /// slice behind the shipping-cost trend.
    pub async fn fetch_all(
        &self,
        window: &DateWindow,
        trend_window: &DateWindow,
    ) -> Result<ShiprocketFetch> {
        let shipments = self.fetch_shipments(window).await?;
        let trend_shipments = self.fetch_shipments(trend_window).await?;
        Ok(ShiprocketFetch {
            shipments,
            trend_shipments,
        })
    }
}
