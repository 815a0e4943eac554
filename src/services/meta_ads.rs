//! Meta Marketing API adapter.
//!
//! Account-level insights for the window (or the rolling `last_30d` preset
//! when no window is given), plus per-day, per-month, and per-campaign
//! breakdowns of the same metrics.

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;

use crate::error::Result;
use crate::models::meta_ads::{MetaFetch, RawCampaignRow, RawInsightRow};
use crate::models::{DateWindow, MetaAdsCredentials};
use crate::pagination::fetch_body_cursor_pages;

const SOURCE: &str = "meta_ads";

const ACCOUNT_FIELDS: &str = "spend,impressions,clicks,reach,actions";
const CAMPAIGN_FIELDS: &str = "campaign_id,campaign_name,spend,impressions,clicks,reach";

#[derive(Clone)]
pub struct MetaAdsService {
    client: Client,
    base_url: String,
    ad_account: String,
    access_token: String,
}

impl MetaAdsService {
    pub fn new(client: Client, base_url: &str, credentials: &MetaAdsCredentials) -> Self {
        let raw = credentials.ad_account_id.trim();
        let ad_account = if raw.starts_with("act_") {
            raw.to_string()
        } else {
            format!("act_{}", raw)
        };
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ad_account,
            access_token: credentials.access_token.clone(),
        }
    }

    fn insights_url(&self) -> String {
        format!("{}/{}/insights", self.base_url, self.ad_account)
    }

    fn base_query(&self, level: &str, fields: &str) -> Vec<(String, String)> {
        vec![
            ("access_token".to_string(), self.access_token.clone()),
            ("level".to_string(), level.to_string()),
            ("fields".to_string(), fields.to_string()),
        ]
    }

    fn time_range(since: NaiveDate, until: NaiveDate) -> (String, String) {
        (
            "time_range".to_string(),
            json!({ "since": since.to_string(), "until": until.to_string() }).to_string(),
        )
    }

    /// One aggregate insight row for the window (`last_30d` preset when the
    /// caller has no window).
    pub async fn fetch_window_insights(
        &self,
        window: Option<&DateWindow>,
    ) -> Result<Vec<RawInsightRow>> {
        let mut query = self.base_query("account", ACCOUNT_FIELDS);
        match window {
            Some(w) => query.push(Self::time_range(w.start, w.end)),
            None => query.push(("date_preset".to_string(), "last_30d".to_string())),
        }
        fetch_body_cursor_pages(&self.client, SOURCE, &self.insights_url(), &query).await
    }

    /// One insight row per day of the window.
    pub async fn fetch_daily_insights(&self, window: &DateWindow) -> Result<Vec<RawInsightRow>> {
        let mut query = self.base_query("account", ACCOUNT_FIELDS);
        query.push(("time_increment".to_string(), "1".to_string()));
        query.push(Self::time_range(window.start, window.end));
        fetch_body_cursor_pages(&self.client, SOURCE, &self.insights_url(), &query).await
    }

    /// One insight row per calendar month of the given range.
    pub async fn fetch_monthly_insights(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<RawInsightRow>> {
        let mut query = self.base_query("account", ACCOUNT_FIELDS);
        query.push(("time_increment".to_string(), "monthly".to_string()));
        query.push(Self::time_range(since, until));
        fetch_body_cursor_pages(&self.client, SOURCE, &self.insights_url(), &query).await
    }

    /// Per-campaign totals for the window.
    pub async fn fetch_campaign_insights(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<RawCampaignRow>> {
        let mut query = self.base_query("campaign", CAMPAIGN_FIELDS);
        query.push(Self::time_range(window.start, window.end));
        fetch_body_cursor_pages(&self.client, SOURCE, &self.insights_url(), &query).await
    }

    /// Full fetch for one report.
    pub async fn fetch_all(
        &self,
        window: &DateWindow,
        trend_window: &DateWindow,
    ) -> Result<MetaFetch> {
        let window_rows = self.fetch_window_insights(Some(window)).await?;
        let daily_rows = self.fetch_daily_insights(window).await?;
        let monthly_rows = self
            .fetch_monthly_insights(trend_window.start, trend_window.end)
            .await?;
        let campaign_rows = self.fetch_campaign_insights(window).await?;
        Ok(MetaFetch {
            window_rows,
            daily_rows,
            monthly_rows,
            campaign_rows,
        })
    }
}
