//! Pure transformations over raw shipment records, including the status
//! classifier.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::shiprocket::RawShipment;
use crate::models::window::parse_event_date;
use crate::models::{DateWindow, MonthKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipmentStatus {
    Rto,
    PickupPending,
    InTransit,
    NdrPending,
    Delivered,
    Cancelled,
    Undelivered,
}

impl ShipmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Rto => "RTO",
            ShipmentStatus::PickupPending => "Pickup Pending",
            ShipmentStatus::InTransit => "In-Transit",
            ShipmentStatus::NdrPending => "NDR Pending",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
            ShipmentStatus::Undelivered => "Undelivered",
        }
    }
}

/// Ordered classification rules; the first matching substring wins.
///
/// Upstream status strings are free-ish text ("RTO DELIVERED",
/// "OUT FOR PICKUP", "UNDELIVERED 3RD ATTEMPT"), so several naive checks
/// can match one status. The order here is the contract: RTO outranks a
/// delivery mention, and "undelivered" must be tested before "delivered"
/// to avoid being swallowed by the substring match.
pub const STATUS_RULES: &[(&str, ShipmentStatus)] = &[
    ("rto", ShipmentStatus::Rto),
    ("pickup", ShipmentStatus::PickupPending),
    ("transit", ShipmentStatus::InTransit),
    ("ndr", ShipmentStatus::NdrPending),
    ("undelivered", ShipmentStatus::Undelivered),
    ("delivered", ShipmentStatus::Delivered),
    ("cancel", ShipmentStatus::Cancelled),
];

pub fn classify(status_text: &str) -> ShipmentStatus {
    let normalized = status_text.to_lowercase();
    for (needle, status) in STATUS_RULES {
        if normalized.contains(needle) {
            return *status;
        }
    }
    ShipmentStatus::Undelivered
}

/// Cost attributed to one shipment: freight plus COD handling, plus the
/// reversal charge only when the shipment came back.
pub fn shipment_cost(shipment: &RawShipment, status: ShipmentStatus) -> Decimal {
    let mut cost = shipment.freight_charge + shipment.cod_charges;
    if status == ShipmentStatus::Rto {
        cost += shipment.rto_charges;
    }
    cost
}

/// The calendar day a shipment's cost is attributed to: ship date when
/// known, order creation otherwise.
fn cost_day(shipment: &RawShipment) -> Option<NaiveDate> {
    parse_event_date(&shipment.shipped_date).or_else(|| parse_event_date(&shipment.created_at))
}

#[derive(Debug, Clone, Default)]
pub struct ShippingSummary {
    pub total_shipments: u64,
    pub total_cost: Decimal,
    pub delivered: u64,
    pub in_transit: u64,
    pub pickup_pending: u64,
    pub ndr_pending: u64,
    pub rto: u64,
    pub cancelled: u64,
    pub undelivered: u64,
    pub cod_orders: u64,
    pub prepaid_orders: u64,
    pub cod_pending: u64,
    pub cod_remitted: Decimal,
}

/// Window totals. `as_of` anchors the COD remittance cutoff (amounts for
/// shipments older than 30 days count as remitted) so reports stay
/// reproducible for a fixed window.
pub fn summarize(shipments: &[RawShipment], as_of: NaiveDate) -> ShippingSummary {
    let remit_cutoff = as_of - Duration::days(30);
    let mut summary = ShippingSummary::default();

    for shipment in shipments {
        let status = classify(&shipment.status);
        summary.total_shipments += 1;
        summary.total_cost += shipment_cost(shipment, status);

        match status {
            ShipmentStatus::Rto => summary.rto += 1,
            ShipmentStatus::PickupPending => summary.pickup_pending += 1,
            ShipmentStatus::InTransit => summary.in_transit += 1,
            ShipmentStatus::NdrPending => summary.ndr_pending += 1,
            ShipmentStatus::Delivered => summary.delivered += 1,
            ShipmentStatus::Cancelled => summary.cancelled += 1,
            ShipmentStatus::Undelivered => summary.undelivered += 1,
        }

        let payment = shipment.payment_mode.to_lowercase();
        if payment.contains("cod") {
            summary.cod_orders += 1;
            if status != ShipmentStatus::Delivered {
                summary.cod_pending += 1;
            }
            if let Some(created) = parse_event_date(&shipment.created_at) {
                if created <= remit_cutoff {
                    summary.cod_remitted += shipment.cod_amount;
                }
            }
        } else if payment.contains("prepaid") {
            summary.prepaid_orders += 1;
        }
    }

    summary
}

/// Dense per-day shipping cost over the window.
pub fn daily_costs(shipments: &[RawShipment], window: &DateWindow) -> BTreeMap<NaiveDate, Decimal> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> =
        window.days().map(|day| (day, Decimal::ZERO)).collect();
    for shipment in shipments {
        let Some(day) = cost_day(shipment) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&day) {
            *bucket += shipment_cost(shipment, classify(&shipment.status));
        }
    }
    buckets
}

/// Per-month shipping cost aligned with `months`, zero-filled.
pub fn monthly_costs(shipments: &[RawShipment], months: &[MonthKey]) -> Vec<Decimal> {
    let index: HashMap<MonthKey, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (*m, i))
        .collect();
    let mut buckets: Vec<Decimal> = months.iter().map(|_| Decimal::ZERO).collect();
    for shipment in shipments {
        let Some(day) = cost_day(shipment) else {
            continue;
        };
        if let Some(&i) = index.get(&MonthKey::of(day)) {
            buckets[i] += shipment_cost(shipment, classify(&shipment.status));
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(json: serde_json::Value) -> RawShipment {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn rto_outranks_delivered() {
        // Matches both "rto" and "delivered"; the earlier rule wins
        assert_eq!(classify("RTO DELIVERED"), ShipmentStatus::Rto);
        assert_eq!(classify("rto initiated"), ShipmentStatus::Rto);
    }

    #[test]
    fn undelivered_is_not_swallowed_by_delivered() {
        assert_eq!(classify("UNDELIVERED 3RD ATTEMPT"), ShipmentStatus::Undelivered);
        assert_eq!(classify("DELIVERED"), ShipmentStatus::Delivered);
    }

    #[test]
    fn each_rule_classifies_its_own_family() {
        assert_eq!(classify("OUT FOR PICKUP"), ShipmentStatus::PickupPending);
        assert_eq!(classify("IN TRANSIT"), ShipmentStatus::InTransit);
        assert_eq!(classify("NDR RAISED"), ShipmentStatus::NdrPending);
        assert_eq!(classify("CANCELED"), ShipmentStatus::Cancelled);
        assert_eq!(classify("something unknown"), ShipmentStatus::Undelivered);
        assert_eq!(classify(""), ShipmentStatus::Undelivered);
    }

    #[test]
    fn rto_reversal_charge_applies_only_to_rto() {
        let returned = shipment(serde_json::json!({
            "status": "RTO", "freight_charge": "80", "cod_charges": "25", "rto_charges": "40"
        }));
        let delivered = shipment(serde_json::json!({
            "status": "DELIVERED", "freight_charge": "80", "cod_charges": "25", "rto_charges": "40"
        }));
        assert_eq!(
            shipment_cost(&returned, classify(&returned.status)),
            Decimal::from(145)
        );
        assert_eq!(
            shipment_cost(&delivered, classify(&delivered.status)),
            Decimal::from(105)
        );
    }

    #[test]
    fn cod_metrics_follow_payment_mode_and_cutoff() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let shipments = vec![
            // COD, delivered, older than the cutoff: remitted, not pending
            shipment(serde_json::json!({
                "status": "DELIVERED", "payment_mode": "COD",
                "cod_amount": "500", "created_at": "2025-05-01 10:00:00"
            })),
            // COD, in transit, recent: pending, not remitted
            shipment(serde_json::json!({
                "status": "IN TRANSIT", "payment_mode": "cod",
                "cod_amount": "300", "created_at": "2025-06-25 10:00:00"
            })),
            shipment(serde_json::json!({
                "status": "DELIVERED", "payment_mode": "Prepaid"
            })),
        ];
        let summary = summarize(&shipments, as_of);
        assert_eq!(summary.cod_orders, 2);
        assert_eq!(summary.prepaid_orders, 1);
        assert_eq!(summary.cod_pending, 1);
        assert_eq!(summary.cod_remitted, Decimal::from(500));
    }

    #[test]
    fn daily_costs_are_dense_over_the_window() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        )
        .unwrap();
        let shipments = vec![shipment(serde_json::json!({
            "status": "DELIVERED", "freight_charge": "90",
            "shipped_date": "2025-06-02 09:00:00"
        }))];
        let buckets = daily_costs(&shipments, &window);
        assert_eq!(buckets.len(), 3);
        let values: Vec<_> = buckets.values().copied().collect();
        assert_eq!(values, vec![Decimal::ZERO, Decimal::from(90), Decimal::ZERO]);
    }
}
