//! Pure transformations over raw Meta insight rows.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::meta_ads::{RawAction, RawCampaignRow, RawInsightRow};
use crate::models::window::parse_event_date;
use crate::models::{DateWindow, MonthKey};

#[derive(Debug, Clone, Default)]
pub struct AdsTotals {
    pub spend: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub reach: u64,
    pub purchase_count: f64,
    pub purchase_value: Decimal,
}

/// Purchase attribution: sum the `value` of every action whose type contains
/// "purchase" (case-insensitive). When the platform reports overlapping
/// attribution windows (`purchase` plus `omni_purchase` etc.) the values are
/// summed together — a known over-counting limitation of this extraction,
/// kept to match what the platform surfaces per action type.
pub fn purchase_totals(actions: &[RawAction]) -> (f64, Decimal) {
    let mut count = 0.0;
    let mut value = Decimal::ZERO;
    for action in actions {
        if action.action_type.to_lowercase().contains("purchase") {
            count += action.value;
            value += Decimal::from_f64_retain(action.value).unwrap_or_default();
        }
    }
    (count, value)
}

/// Totals across a set of insight rows (one aggregate row, or many
/// daily/monthly rows).
pub fn summarize(rows: &[RawInsightRow]) -> AdsTotals {
    let mut totals = AdsTotals::default();
    for row in rows {
        totals.spend += row.spend;
        totals.impressions += row.impressions;
        totals.clicks += row.clicks;
        totals.reach += row.reach;
        let (count, value) = purchase_totals(&row.actions);
        totals.purchase_count += count;
        totals.purchase_value += value;
    }
    totals
}

/// Dense per-day spend over the window.
pub fn daily_spend(rows: &[RawInsightRow], window: &DateWindow) -> BTreeMap<NaiveDate, Decimal> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> =
        window.days().map(|day| (day, Decimal::ZERO)).collect();
    for row in rows {
        let Some(day) = row.date_start.as_deref().and_then(parse_event_date) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&day) {
            *bucket += row.spend;
        }
    }
    buckets
}

#[derive(Debug, Clone, Default)]
pub struct AdsMonth {
    pub spend: Decimal,
    pub purchase_count: f64,
    pub purchase_value: Decimal,
}

/// Per-month totals aligned with `months`, zero-filled.
pub fn monthly_buckets(rows: &[RawInsightRow], months: &[MonthKey]) -> Vec<AdsMonth> {
    let index: HashMap<MonthKey, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (*m, i))
        .collect();
    let mut buckets: Vec<AdsMonth> = months.iter().map(|_| AdsMonth::default()).collect();

    for row in rows {
        let Some(day) = row.date_start.as_deref().and_then(parse_event_date) else {
            continue;
        };
        if let Some(&i) = index.get(&MonthKey::of(day)) {
            buckets[i].spend += row.spend;
            let (count, value) = purchase_totals(&row.actions);
            buckets[i].purchase_count += count;
            buckets[i].purchase_value += value;
        }
    }

    buckets
}

#[derive(Debug, Clone)]
pub struct CampaignTotals {
    pub id: String,
    pub name: String,
    pub spend: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub reach: u64,
}

/// Merge campaign rows by campaign id, preserving first-encounter order.
pub fn campaign_totals(rows: &[RawCampaignRow]) -> Vec<CampaignTotals> {
    let mut totals: Vec<CampaignTotals> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let i = *index.entry(row.campaign_id.clone()).or_insert_with(|| {
            totals.push(CampaignTotals {
                id: row.campaign_id.clone(),
                name: row.campaign_name.clone(),
                spend: Decimal::ZERO,
                impressions: 0,
                clicks: 0,
                reach: 0,
            });
            totals.len() - 1
        });
        totals[i].spend += row.spend;
        totals[i].impressions += row.impressions;
        totals[i].clicks += row.clicks;
        totals[i].reach += row.reach;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(action_type: &str, value: f64) -> RawAction {
        serde_json::from_value(serde_json::json!({
            "action_type": action_type,
            "value": value,
        }))
        .unwrap()
    }

    #[test]
    fn purchase_matching_is_substring_and_case_insensitive() {
        let actions = vec![
            action("purchase", 10.0),
            action("OMNI_PURCHASE", 10.0),
            action("offsite_conversion.fb_pixel_purchase", 5.0),
            action("link_click", 400.0),
        ];
        let (count, value) = purchase_totals(&actions);
        // Overlapping purchase action types are summed, not deduplicated
        assert_eq!(count, 25.0);
        assert_eq!(value, Decimal::from(25));
    }

    #[test]
    fn summarize_accumulates_across_rows() {
        let rows: Vec<RawInsightRow> = serde_json::from_value(serde_json::json!([
            {"spend": "100.50", "impressions": "1000", "clicks": "50", "reach": "800",
             "actions": [{"action_type": "purchase", "value": "3"}]},
            {"spend": "49.50", "impressions": "500", "clicks": "10", "reach": "400"}
        ]))
        .unwrap();
        let totals = summarize(&rows);
        assert_eq!(totals.spend, Decimal::new(15000, 2));
        assert_eq!(totals.impressions, 1500);
        assert_eq!(totals.clicks, 60);
        assert_eq!(totals.purchase_count, 3.0);
    }

    #[test]
    fn daily_spend_is_dense_and_zero_filled() {
        let rows: Vec<RawInsightRow> = serde_json::from_value(serde_json::json!([
            {"date_start": "2025-06-02", "spend": "75.00"}
        ]))
        .unwrap();
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        )
        .unwrap();
        let buckets = daily_spend(&rows, &window);
        assert_eq!(buckets.len(), 3);
        let values: Vec<_> = buckets.values().copied().collect();
        assert_eq!(values, vec![Decimal::ZERO, Decimal::from(75), Decimal::ZERO]);
    }

    #[test]
    fn campaign_rows_merge_by_id_in_encounter_order() {
        let rows: Vec<RawCampaignRow> = serde_json::from_value(serde_json::json!([
            {"campaign_id": "c2", "campaign_name": "Prospecting", "spend": "60", "clicks": "6"},
            {"campaign_id": "c1", "campaign_name": "Retargeting", "spend": "40", "clicks": "4"},
            {"campaign_id": "c2", "campaign_name": "Prospecting", "spend": "40", "clicks": "4"}
        ]))
        .unwrap();
        let totals = campaign_totals(&rows);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].id, "c2");
        assert_eq!(totals[0].spend, Decimal::from(100));
        assert_eq!(totals[0].clicks, 10);
        assert_eq!(totals[1].id, "c1");
    }
}
