//! The canonical derived-metric formulas.
//!
//! Every ratio defines its zero-denominator case as 0 — a report must never
//! carry NaN or infinity. ROAS divides attributed purchase value by spend;
//! POAS divides net profit by spend, expressed in percent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `numerator / denominator`, 0 when the denominator is 0 or either side is
/// not finite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator × 100`, same guards as [`ratio`].
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[derive(Debug, Clone, Default)]
pub struct MetricInputs {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub ad_spend: Decimal,
    pub shipping_cost: Decimal,
    pub purchase_count: f64,
    pub purchase_value: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub orders: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ProfitMetrics {
    pub revenue: f64,
    pub cogs: f64,
    pub ad_spend: f64,
    pub shipping_cost: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub gross_margin_pct: f64,
    pub net_margin_pct: f64,
    pub roas: f64,
    pub poas_pct: f64,
    pub aov: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub ctr_pct: f64,
    pub cpp: f64,
}

pub fn compute(inputs: &MetricInputs) -> ProfitMetrics {
    let revenue = to_f64(inputs.revenue);
    let cogs = to_f64(inputs.cogs);
    let ad_spend = to_f64(inputs.ad_spend);
    let shipping_cost = to_f64(inputs.shipping_cost);
    let purchase_value = to_f64(inputs.purchase_value);

    let gross_profit = to_f64(inputs.revenue - inputs.cogs);
    let net_profit = to_f64(inputs.revenue - inputs.cogs - inputs.ad_spend - inputs.shipping_cost);

    ProfitMetrics {
        revenue,
        cogs,
        ad_spend,
        shipping_cost,
        gross_profit,
        net_profit,
        gross_margin_pct: pct(gross_profit, revenue),
        net_margin_pct: pct(net_profit, revenue),
        roas: ratio(purchase_value, ad_spend),
        poas_pct: pct(net_profit, ad_spend),
        aov: ratio(revenue, inputs.orders as f64),
        cpc: ratio(ad_spend, inputs.clicks as f64),
        cpm: ratio(ad_spend, inputs.impressions as f64) * 1000.0,
        ctr_pct: pct(inputs.clicks as f64, inputs.impressions as f64),
        cpp: ratio(ad_spend, inputs.purchase_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_profit_example() {
        let metrics = compute(&MetricInputs {
            revenue: Decimal::from(10_000),
            cogs: Decimal::from(4_000),
            ad_spend: Decimal::from(1_000),
            shipping_cost: Decimal::from(500),
            ..Default::default()
        });
        assert_eq!(metrics.gross_profit, 6_000.0);
        assert_eq!(metrics.net_profit, 4_500.0);
        assert_eq!(metrics.gross_margin_pct, 60.0);
        assert_eq!(metrics.net_margin_pct, 45.0);
    }

    #[test]
    fn roas_uses_purchase_value_over_spend() {
        let metrics = compute(&MetricInputs {
            ad_spend: Decimal::from(1_000),
            purchase_value: Decimal::from(2_500),
            ..Default::default()
        });
        assert_eq!(metrics.roas, 2.5);
    }

    #[test]
    fn zero_denominators_yield_zero_not_errors() {
        let metrics = compute(&MetricInputs::default());
        assert_eq!(metrics.roas, 0.0);
        assert_eq!(metrics.poas_pct, 0.0);
        assert_eq!(metrics.aov, 0.0);
        assert_eq!(metrics.cpc, 0.0);
        assert_eq!(metrics.cpm, 0.0);
        assert_eq!(metrics.ctr_pct, 0.0);
        assert_eq!(metrics.cpp, 0.0);
        assert_eq!(metrics.gross_margin_pct, 0.0);

        let with_profit_no_spend = compute(&MetricInputs {
            revenue: Decimal::from(100),
            ..Default::default()
        });
        assert_eq!(with_profit_no_spend.poas_pct, 0.0);
        assert!(with_profit_no_spend.net_profit.is_finite());
    }

    #[test]
    fn cac_components_follow_standard_definitions() {
        let metrics = compute(&MetricInputs {
            ad_spend: Decimal::from(1_000),
            impressions: 200_000,
            clicks: 500,
            purchase_count: 40.0,
            ..Default::default()
        });
        assert_eq!(metrics.cpc, 2.0);
        assert_eq!(metrics.cpm, 5.0);
        assert_eq!(metrics.ctr_pct, 0.25);
        assert_eq!(metrics.cpp, 25.0);
    }

    #[test]
    fn no_derived_ratio_is_ever_nan() {
        let metrics = compute(&MetricInputs {
            revenue: Decimal::ZERO,
            orders: 0,
            ..Default::default()
        });
        for value in [
            metrics.roas,
            metrics.poas_pct,
            metrics.aov,
            metrics.cpc,
            metrics.cpm,
            metrics.ctr_pct,
            metrics.cpp,
            metrics.gross_margin_pct,
            metrics.net_margin_pct,
        ] {
            assert!(value.is_finite());
        }
    }
}
