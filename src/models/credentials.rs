//! Account credential bundle and product cost overrides.
//!
//! Authentication and onboarding live in a separate service; this one
//! receives a pre-validated bundle. Any platform may be unlinked, in which
//! case its report section degrades to zeroes with an error marker. Only a
//! missing commerce connection is fatal, since it identifies the account.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct ShopifyCredentials {
    pub store_url: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct MetaAdsCredentials {
    pub ad_account_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct ShiprocketCredentials {
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub shopify: Option<ShopifyCredentials>,
    pub meta_ads: Option<MetaAdsCredentials>,
    pub shiprocket: Option<ShiprocketCredentials>,
}

impl AccountCredentials {
    /// The account identity used in cache keys. The store URL is the one
    /// credential the service cannot operate without.
    pub fn account_id(&self) -> Result<&str> {
        self.shopify
            .as_ref()
            .map(|c| c.store_url.as_str())
            .ok_or_else(|| AppError::configuration("no Shopify credentials on file"))
    }

    /// Single-tenant bundle from the environment.
    pub fn from_env() -> Self {
        let shopify = match (env::var("SHOPIFY_STORE_URL"), env::var("SHOPIFY_ACCESS_TOKEN")) {
            (Ok(store_url), Ok(access_token)) => Some(ShopifyCredentials {
                store_url,
                access_token,
            }),
            _ => None,
        };
        let meta_ads = match (env::var("META_AD_ACCOUNT_ID"), env::var("META_ACCESS_TOKEN")) {
            (Ok(ad_account_id), Ok(access_token)) => Some(MetaAdsCredentials {
                ad_account_id,
                access_token,
            }),
            _ => None,
        };
        let shiprocket = env::var("SHIPROCKET_TOKEN")
            .ok()
            .map(|access_token| ShiprocketCredentials { access_token });

        Self {
            shopify,
            meta_ads,
            shiprocket,
        }
    }
}

/// Manufacturing cost per product id, maintained by the onboarding flow and
/// supplied here as a whole map. A missing product simply contributes zero
/// COGS.
pub type CostOverrides = HashMap<String, Decimal>;

#[derive(Debug, Deserialize)]
struct CostEntry {
    #[serde(alias = "productId")]
    product_id: String,
    cost: Decimal,
}

/// Load cost overrides from the JSON file at `PRODUCT_COSTS_PATH`.
///
/// Accepts either an object map (`{"123": "45.50"}`) or the onboarding
/// export shape (`[{"productId": "123", "cost": 45.50}]`).
pub fn load_cost_overrides() -> CostOverrides {
    let Some(path) = env::var("PRODUCT_COSTS_PATH").ok() else {
        info!("PRODUCT_COSTS_PATH not set, COGS will be reported as 0");
        return CostOverrides::new();
    };
    match read_cost_overrides(Path::new(&path)) {
        Ok(costs) => {
            info!("loaded {} product cost overrides from {}", costs.len(), path);
            costs
        }
        Err(e) => {
            warn!("failed to load product costs from {}: {}", path, e);
            CostOverrides::new()
        }
    }
}

fn read_cost_overrides(path: &Path) -> Result<CostOverrides> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::configuration(format!("cannot read {}: {}", path.display(), e)))?;
    if let Ok(map) = serde_json::from_str::<HashMap<String, Decimal>>(&raw) {
        return Ok(map);
    }
    let entries: Vec<CostEntry> = serde_json::from_str(&raw)?;
    Ok(entries
        .into_iter()
        .map(|e| (e.product_id, e.cost))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_requires_shopify() {
        let creds = AccountCredentials {
            shopify: None,
            meta_ads: None,
            shiprocket: None,
        };
        assert!(creds.account_id().is_err());

        let creds = AccountCredentials {
            shopify: Some(ShopifyCredentials {
                store_url: "mystore.example.com".into(),
                access_token: "shpat_test".into(),
            }),
            meta_ads: None,
            shiprocket: None,
        };
        assert_eq!(creds.account_id().unwrap(), "mystore.example.com");
    }
}
