//! Pure transformations over raw Shopify records.
//!
//! Money accumulates in `Decimal` end to end; rounding happens once, at
//! response shaping. Daily buckets are dense: every calendar day of the
//! window appears, zero-valued when nothing happened.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::shopify::{RawCustomer, RawOrder};
use crate::models::window::parse_event_date;
use crate::models::{CostOverrides, DateWindow, MonthKey};

#[derive(Debug, Clone)]
pub struct ProductSales {
    pub id: String,
    pub title: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ShopifySummary {
    pub total_revenue: Decimal,
    pub orders_count: u64,
    pub product_sales_total: Decimal,
    pub customers_count: u64,
    pub new_customers: u64,
    pub returning_customers: u64,
    /// Per-product sales in first-encounter order (the stable tie-break
    /// for rankings).
    pub products: Vec<ProductSales>,
}

impl ShopifySummary {
    pub fn avg_order_value(&self) -> Decimal {
        if self.orders_count == 0 {
            Decimal::ZERO
        } else {
            self.total_revenue / Decimal::from(self.orders_count)
        }
    }

    pub fn returning_rate_pct(&self) -> f64 {
        if self.customers_count == 0 {
            0.0
        } else {
            self.returning_customers as f64 / self.customers_count as f64 * 100.0
        }
    }
}

/// Window totals from one pass over the order and customer sets.
///
/// Customer classification is a property of the window, not the customer:
/// a single lifetime order means "new", more means "returning".
pub fn summarize(orders: &[RawOrder], customers: &[RawCustomer]) -> ShopifySummary {
    let mut summary = ShopifySummary::default();
    let mut product_index: HashMap<String, usize> = HashMap::new();

    for order in orders {
        summary.orders_count += 1;
        summary.total_revenue += order.total_price;
        for item in &order.line_items {
            let line_revenue = item.price * Decimal::from(item.quantity);
            summary.product_sales_total += line_revenue;

            let key = product_key(item.product_id, &item.title);
            let idx = *product_index.entry(key.clone()).or_insert_with(|| {
                summary.products.push(ProductSales {
                    id: key,
                    title: item.title.clone(),
                    quantity: 0,
                    revenue: Decimal::ZERO,
                });
                summary.products.len() - 1
            });
            summary.products[idx].quantity += item.quantity;
            summary.products[idx].revenue += line_revenue;
        }
    }

    summary.customers_count = customers.len() as u64;
    summary.new_customers = customers.iter().filter(|c| c.orders_count == 1).count() as u64;
    summary.returning_customers = summary.customers_count - summary.new_customers;
    summary
}

fn product_key(product_id: Option<i64>, title: &str) -> String {
    match product_id {
        Some(id) => id.to_string(),
        // Custom line items carry no product id; the title is all there is.
        None => title.to_string(),
    }
}

/// COGS for a product set against the cost override map. A product with no
/// override contributes zero.
pub fn product_cogs(product_id: &str, quantity: u64, costs: &CostOverrides) -> Decimal {
    costs
        .get(product_id)
        .copied()
        .unwrap_or(Decimal::ZERO)
        * Decimal::from(quantity)
}

fn order_cogs(order: &RawOrder, costs: &CostOverrides) -> Decimal {
    order
        .line_items
        .iter()
        .map(|item| product_cogs(&product_key(item.product_id, &item.title), item.quantity, costs))
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommerceDay {
    pub revenue: Decimal,
    pub orders: u64,
    pub cogs: Decimal,
}

/// Dense day buckets over the window.
pub fn daily_buckets(
    orders: &[RawOrder],
    window: &DateWindow,
    costs: &CostOverrides,
) -> BTreeMap<NaiveDate, CommerceDay> {
    let mut buckets: BTreeMap<NaiveDate, CommerceDay> =
        window.days().map(|day| (day, CommerceDay::default())).collect();

    for order in orders {
        let Some(day) = parse_event_date(&order.created_at) else {
            continue;
        };
        let Some(bucket) = buckets.get_mut(&day) else {
            continue;
        };
        bucket.revenue += order.total_price;
        bucket.orders += 1;
        bucket.cogs += order_cogs(order, costs);
    }

    buckets
}

#[derive(Debug, Clone, Default)]
pub struct CommerceMonth {
    pub sales: Decimal,
    pub orders: u64,
    pub cogs: Decimal,
    pub new_customers: u64,
    pub returning_customers: u64,
}

/// Per-month totals aligned with `months`, zero-filled.
pub fn monthly_buckets(
    orders: &[RawOrder],
    customers: &[RawCustomer],
    months: &[MonthKey],
    costs: &CostOverrides,
) -> Vec<CommerceMonth> {
    let index: HashMap<MonthKey, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (*m, i))
        .collect();
    let mut buckets: Vec<CommerceMonth> = months.iter().map(|_| CommerceMonth::default()).collect();

    for order in orders {
        let Some(day) = parse_event_date(&order.created_at) else {
            continue;
        };
        if let Some(&i) = index.get(&MonthKey::of(day)) {
            buckets[i].sales += order.total_price;
            buckets[i].orders += 1;
            buckets[i].cogs += order_cogs(order, costs);
        }
    }

    for customer in customers {
        let Some(day) = parse_event_date(&customer.created_at) else {
            continue;
        };
        if let Some(&i) = index.get(&MonthKey::of(day)) {
            if customer.orders_count == 1 {
                buckets[i].new_customers += 1;
            } else {
                buckets[i].returning_customers += 1;
            }
        }
    }

    buckets
}

/// Best and least sellers by quantity. Stable sorts keep the original
/// encounter order for ties.
pub fn rank_products(products: &[ProductSales], n: usize) -> (Vec<ProductSales>, Vec<ProductSales>) {
    let mut best = products.to_vec();
    best.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    best.truncate(n);

    let mut least = products.to_vec();
    least.sort_by(|a, b| a.quantity.cmp(&b.quantity));
    least.truncate(n);

    (best, least)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(created_at: &str, total: i64, items: Vec<(i64, &str, u64, i64)>) -> RawOrder {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "created_at": created_at,
            "total_price": total.to_string(),
            "line_items": items.iter().map(|(pid, title, qty, price)| serde_json::json!({
                "product_id": pid,
                "title": title,
                "quantity": qty,
                "price": price.to_string(),
            })).collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    fn customer(orders_count: u64) -> RawCustomer {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "created_at": "2025-06-01T10:00:00+05:30",
            "orders_count": orders_count,
        }))
        .unwrap()
    }

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn three_day_window_buckets_densely() {
        // Two orders on day one, nothing after
        let orders = vec![
            order("2025-06-01T10:00:00+05:30", 500, vec![]),
            order("2025-06-01T18:00:00+05:30", 300, vec![]),
        ];
        let w = window((2025, 6, 1), (2025, 6, 3));
        let buckets = daily_buckets(&orders, &w, &CostOverrides::new());

        assert_eq!(buckets.len(), 3);
        let values: Vec<_> = buckets.values().collect();
        assert_eq!(values[0].revenue, Decimal::from(800));
        assert_eq!(values[0].orders, 2);
        assert_eq!(values[1].revenue, Decimal::ZERO);
        assert_eq!(values[2].revenue, Decimal::ZERO);

        let summary = summarize(&orders, &[]);
        assert_eq!(summary.total_revenue, Decimal::from(800));
        assert_eq!(summary.orders_count, 2);
        assert_eq!(summary.avg_order_value(), Decimal::from(400));

        // Daily buckets re-sum to the window total exactly
        let daily_total: Decimal = buckets.values().map(|b| b.revenue).sum();
        assert_eq!(daily_total, summary.total_revenue);
    }

    #[test]
    fn aov_is_zero_without_orders() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.avg_order_value(), Decimal::ZERO);
        assert_eq!(summary.returning_rate_pct(), 0.0);
    }

    #[test]
    fn customers_classify_per_window() {
        let customers = vec![customer(1), customer(1), customer(3)];
        let summary = summarize(&[], &customers);
        assert_eq!(summary.customers_count, 3);
        assert_eq!(summary.new_customers, 2);
        assert_eq!(summary.returning_customers, 1);
        let rate = summary.returning_rate_pct();
        assert!((rate - 33.333).abs() < 0.01);
    }

    #[test]
    fn product_rankings_are_stable_for_ties() {
        let orders = vec![order(
            "2025-06-01T10:00:00+05:30",
            900,
            vec![
                (1, "Tote Bag", 3, 100),
                (2, "Mug", 5, 60),
                (3, "Sticker Pack", 3, 100),
            ],
        )];
        let summary = summarize(&orders, &[]);
        let (best, least) = rank_products(&summary.products, 2);

        assert_eq!(best[0].id, "2");
        // Tote Bag ties Sticker Pack at 3 units; first encountered wins
        assert_eq!(best[1].id, "1");
        assert_eq!(least[0].id, "1");
        assert_eq!(least[1].id, "3");
    }

    #[test]
    fn cogs_defaults_to_zero_for_unknown_products() {
        let mut costs = CostOverrides::new();
        costs.insert("1".to_string(), Decimal::from(40));

        let orders = vec![order(
            "2025-06-01T10:00:00+05:30",
            500,
            vec![(1, "Tote Bag", 2, 100), (99, "Mystery", 5, 60)],
        )];
        let w = window((2025, 6, 1), (2025, 6, 1));
        let buckets = daily_buckets(&orders, &w, &costs);
        assert_eq!(buckets.values().next().unwrap().cogs, Decimal::from(80));
    }

    #[test]
    fn late_evening_utc_orders_land_on_the_local_day() {
        // 2025-06-01T20:30:00Z is June 2 in Kolkata
        let orders = vec![order("2025-06-01T20:30:00Z", 100, vec![])];
        let w = window((2025, 6, 1), (2025, 6, 2));
        let buckets = daily_buckets(&orders, &w, &CostOverrides::new());
        let values: Vec<_> = buckets.values().collect();
        assert_eq!(values[0].orders, 0);
        assert_eq!(values[1].orders, 1);
    }
}
