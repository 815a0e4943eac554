//! Paginated fetching for the three upstream wire protocols.
//!
//! Every adapter accumulates complete result sets through one of three
//! pagination contracts:
//! - `Link` response header carrying an opaque `page_info` cursor
//!   (commerce REST API; filter params are only legal on the first page),
//! - body cursor block `paging.cursors.after` + `paging.next`
//!   (ad platform graph API),
//! - incrementing `page` parameter, terminated by a short or empty page
//!   (logistics REST API).
//!
//! An empty first page is a valid zero-result fetch. Any failed page fails
//! the whole sequence; callers degrade per-source. `MAX_PAGES` caps
//! pathological accounts — truncation is logged, not silent.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{AppError, Result};

pub const MAX_PAGES: usize = 200;
pub const PAGE_LIMIT: u32 = 250;

lazy_static! {
    static ref NEXT_PAGE_INFO: Regex =
        Regex::new(r#"<[^>]*[?&]page_info=([^>&]+)[^>]*>;\s*rel="next""#)
            .expect("static pagination regex");
}

/// Extract the `page_info` cursor of the `rel="next"` link, if any.
pub fn next_page_info(link_header: &str) -> Option<String> {
    NEXT_PAGE_INFO
        .captures(link_header)
        .map(|caps| caps[1].to_string())
}

fn parse_items<T: DeserializeOwned>(
    body: &Value,
    items_key: &str,
    source: &'static str,
) -> Result<Vec<T>> {
    let items = body.get(items_key).and_then(Value::as_array).ok_or_else(|| {
        AppError::malformed(source, format!("missing '{}' array in response", items_key))
    })?;
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone())
                .map_err(|e| AppError::malformed(source, e.to_string()))
        })
        .collect()
}

async fn read_json(resp: reqwest::Response, source: &'static str) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::upstream(source, format!("HTTP {}", status)));
    }
    resp.json::<Value>()
        .await
        .map_err(|e| AppError::malformed(source, e.to_string()))
}

/// Follow `Link`-header cursor pagination, accumulating every page.
pub async fn fetch_link_header_pages<T: DeserializeOwned>(
    client: &Client,
    source: &'static str,
    url: &str,
    headers: &[(&'static str, String)],
    first_page_query: &[(String, String)],
    items_key: &str,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    for page in 0.. {
        if page >= MAX_PAGES {
            warn!(
                source,
                pages = MAX_PAGES,
                "pagination cap reached, result set truncated"
            );
            break;
        }

        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let limit = PAGE_LIMIT.to_string();
        // Cursor pages must carry only the cursor; filters ride the first
        // page and are baked into the cursor by the upstream.
        request = match &cursor {
            Some(page_info) => {
                request.query(&[("limit", limit.as_str()), ("page_info", page_info.as_str())])
            }
            None => request
                .query(first_page_query)
                .query(&[("limit", limit.as_str())]),
        };

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::upstream(source, e.to_string()))?;
        let link = resp
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = read_json(resp, source).await?;
        items.extend(parse_items::<T>(&body, items_key, source)?);

        cursor = link.as_deref().and_then(next_page_info);
        if cursor.is_none() {
            break;
        }
    }

    Ok(items)
}

/// Follow graph-style body-cursor pagination (`paging.cursors.after`,
/// continue while `paging.next` is present).
pub async fn fetch_body_cursor_pages<T: DeserializeOwned>(
    client: &Client,
    source: &'static str,
    url: &str,
    base_query: &[(String, String)],
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut after: Option<String> = None;

    for page in 0.. {
        if page >= MAX_PAGES {
            warn!(
                source,
                pages = MAX_PAGES,
                "pagination cap reached, result set truncated"
            );
            break;
        }

        let mut request = client.get(url).query(base_query);
        if let Some(cursor) = &after {
            request = request.query(&[("after", cursor.as_str())]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::upstream(source, e.to_string()))?;
        let body = read_json(resp, source).await?;
        if let Some(err) = body.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("platform error");
            return Err(AppError::upstream(source, message.to_string()));
        }
        items.extend(parse_items::<T>(&body, "data", source)?);

        let has_next = body.pointer("/paging/next").and_then(Value::as_str).is_some();
        after = if has_next {
            body.pointer("/paging/cursors/after")
                .and_then(Value::as_str)
                .map(str::to_string)
        } else {
            None
        };
        if after.is_none() {
            break;
        }
    }

    Ok(items)
}

/// Follow page-number pagination; a short or empty page terminates.
pub async fn fetch_page_number_pages<T: DeserializeOwned>(
    client: &Client,
    source: &'static str,
    url: &str,
    headers: &[(&'static str, String)],
    base_query: &[(String, String)],
    items_key: &str,
    per_page: u32,
) -> Result<Vec<T>> {
    let mut items = Vec::new();

    for page in 1..=MAX_PAGES {
        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let request = request.query(base_query).query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ]);

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::upstream(source, e.to_string()))?;
        let body = read_json(resp, source).await?;
        let page_items = parse_items::<T>(&body, items_key, source)?;
        let short_page = page_items.len() < per_page as usize;
        items.extend(page_items);

        if short_page {
            return Ok(items);
        }
    }

    warn!(
        source,
        pages = MAX_PAGES,
        "pagination cap reached, result set truncated"
    );
    Ok(items)
}
