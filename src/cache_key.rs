//! Cache key generation utilities
//!
//! This module provides consistent cache key generation
//! across the application for different data types.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Short stable hash of an account identity (store URLs make poor raw keys)
pub fn account_hash(account_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.as_bytes());
    hex::encode(hasher.finalize())[..12].to_string()
}

/// Generate cache key for an aggregated dashboard report
pub fn dashboard_report(account_id: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!("dashboard_report:{}:{}:{}", account_hash(account_id), start, end)
}
