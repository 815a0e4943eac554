//! Upstream platform adapters.
//!
//! One service struct per platform, each owning the shared HTTP client,
//! the account credentials, and a base URL that can be pointed at a mock
//! server in tests.

pub mod meta_ads;
pub mod shiprocket;
pub mod shopify;

pub use meta_ads::MetaAdsService;
pub use shiprocket::ShiprocketService;
pub use shopify::ShopifyService;

use std::env;

pub const SHOPIFY_API_VERSION: &str = "2024-01";

const DEFAULT_META_BASE_URL: &str = "https://graph.facebook.com/v18.0";
const DEFAULT_SHIPROCKET_BASE_URL: &str = "https://apiv2.shiprocket.in/v1/external";

/// Upstream base URLs, env-overridable per deployment.
#[derive(Debug, Clone)]
pub struct PlatformEndpoints {
    pub meta_base_url: String,
    pub shiprocket_base_url: String,
}

impl PlatformEndpoints {
    pub fn from_env() -> Self {
        Self {
            meta_base_url: env::var("META_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_META_BASE_URL.to_string()),
            shiprocket_base_url: env::var("SHIPROCKET_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_SHIPROCKET_BASE_URL.to_string()),
        }
    }
}

impl Default for PlatformEndpoints {
    fn default() -> Self {
        Self {
            meta_base_url: DEFAULT_META_BASE_URL.to_string(),
            shiprocket_base_url: DEFAULT_SHIPROCKET_BASE_URL.to_string(),
        }
    }
}

/// Admin API root for a store. Store URLs normally arrive bare
/// (`mystore.myshopify.com`); an explicit scheme is respected so local
/// deployments and tests can target plain HTTP.
pub fn shopify_admin_base(store_url: &str) -> String {
    let trimmed = store_url.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        format!("{}/admin/api/{}", trimmed, SHOPIFY_API_VERSION)
    } else {
        format!("https://{}/admin/api/{}", trimmed, SHOPIFY_API_VERSION)
    }
}
