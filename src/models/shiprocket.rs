//! Raw Shiprocket order/shipment payloads.
//!
//! The orders endpoint nests shipments either as a `shipments` array or a
//! single `shipment` object depending on account configuration; both shapes
//! are accepted. Absent dates arrive as `"0000-00-00 00:00:00"`.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::de;

#[derive(Debug, Clone, Deserialize)]
pub struct RawShiprocketOrder {
    #[serde(default)]
    pub shipments: Vec<RawShipment>,
    #[serde(default)]
    pub shipment: Option<RawShipment>,
}

impl RawShiprocketOrder {
    pub fn into_shipments(self) -> Vec<RawShipment> {
        if !self.shipments.is_empty() {
            self.shipments
        } else if let Some(single) = self.shipment {
            vec![single]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShipment {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub freight_charge: Decimal,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub cod_charges: Decimal,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub rto_charges: Decimal,
    #[serde(default, deserialize_with = "de::decimal_flex")]
    pub cod_amount: Decimal,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub pickup_scheduled_date: String,
    #[serde(default)]
    pub shipped_date: String,
    #[serde(default)]
    pub delivered_date: String,
}

/// Shipment sets for one report: the window slice plus the trailing-months
/// slice behind the shipping-cost trend.
#[derive(Debug, Clone, Default)]
pub struct ShiprocketFetch {
    pub shipments: Vec<RawShipment>,
    pub trend_shipments: Vec<RawShipment>,
}
