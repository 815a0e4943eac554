//! Per-source normalizers: pure functions from raw upstream payloads to
//! totals, dense day buckets, and breakdowns. No network or cache access
//! happens here.

pub mod meta_ads;
pub mod shiprocket;
pub mod shopify;
