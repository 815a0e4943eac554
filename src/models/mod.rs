pub mod credentials;
pub mod meta_ads;
pub mod report;
pub mod shiprocket;
pub mod shopify;
pub mod window;

pub use credentials::{
    AccountCredentials, CostOverrides, MetaAdsCredentials, ShiprocketCredentials,
    ShopifyCredentials,
};
pub use window::{DateWindow, MonthKey, REPORTING_TZ};

/// Lenient deserializers for upstream payloads. The platforms disagree on
/// whether numbers arrive as JSON numbers or quoted strings, and sometimes
/// omit them entirely.
pub(crate) mod de {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn decimal_flex<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Decimal::from_str(s.trim()).unwrap_or_default(),
            Value::Number(n) => n
                .as_f64()
                .and_then(Decimal::from_f64_retain)
                .unwrap_or_default(),
            _ => Decimal::ZERO,
        })
    }

    pub fn u64_flex<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s.trim().parse().unwrap_or(0),
            Value::Number(n) => n.as_u64().unwrap_or(0),
            _ => 0,
        })
    }

    pub fn f64_flex<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use std::str::FromStr;

    #[derive(Deserialize)]
    struct Flexible {
        #[serde(default, deserialize_with = "super::de::decimal_flex")]
        amount: Decimal,
        #[serde(default, deserialize_with = "super::de::u64_flex")]
        count: u64,
    }

    #[test]
    fn flex_fields_accept_strings_numbers_and_absence() {
        let a: Flexible = serde_json::from_str(r#"{"amount":"123.45","count":"7"}"#).unwrap();
        assert_eq!(a.amount, Decimal::from_str("123.45").unwrap());
        assert_eq!(a.count, 7);

        let b: Flexible = serde_json::from_str(r#"{"amount":99.5,"count":7}"#).unwrap();
        assert_eq!(b.amount, Decimal::from_str("99.5").unwrap());

        let c: Flexible = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(c.amount, Decimal::ZERO);
        assert_eq!(c.count, 0);

        let d: Flexible = serde_json::from_str(r#"{"amount":null,"count":"junk"}"#).unwrap();
        assert_eq!(d.amount, Decimal::ZERO);
        assert_eq!(d.count, 0);
    }
}
