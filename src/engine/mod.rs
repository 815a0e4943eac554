//! The aggregation engine: fan out to the three platforms, normalize,
//! join by calendar day and product identity, derive the canonical
//! metrics, shape the report, cache it.
//!
//! Per-source failure isolation happens here: each platform's fetch result
//! is caught independently and replaced with a zero-valued default plus an
//! error marker, so the join/derive logic below always sees well-formed
//! inputs. Only a completely missing Shopify connection aborts the request.

pub mod metrics;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::cache::ReportCache;
use crate::cache_key;
use crate::cache_ttl;
use crate::error::{AppError, Result};
use crate::format::round2;
use crate::models::meta_ads::MetaFetch;
use crate::models::report::{
    AggregatedReport, Breakdowns, CampaignBreakdown, CodBreakdown, DayBucket, MetricCard,
    MonthCustomerMix, MonthPoint, MonthlyTrends, ProductRankings, ProductStat, ProfitLossRow,
    ReportWindow, SourceErrors, StatusCount,
};
use crate::models::shiprocket::ShiprocketFetch;
use crate::models::shopify::ShopifyFetch;
use crate::models::window::trailing_months;
use crate::models::{AccountCredentials, CostOverrides, DateWindow, MonthKey};
use crate::normalize::meta_ads as ads;
use crate::normalize::shiprocket as shipping;
use crate::normalize::shopify as commerce;
use crate::services::{MetaAdsService, PlatformEndpoints, ShiprocketService, ShopifyService};

use metrics::{pct, ratio, to_f64, MetricInputs};

const TREND_MONTHS: usize = 6;
const RANKING_SIZE: usize = 5;

/// A platform fetch that can no longer fail: either real data, or the
/// zero-valued default with the failure recorded.
struct SourceOutcome<T> {
    data: T,
    error: Option<String>,
}

fn isolate<T: Default>(source: &'static str, result: Result<T>) -> SourceOutcome<T> {
    match result {
        Ok(data) => SourceOutcome { data, error: None },
        Err(e) => {
            warn!(source, error = %e, "source fetch failed, section degrades to zeroes");
            SourceOutcome {
                data: T::default(),
                error: Some(e.to_string()),
            }
        }
    }
}

pub struct DashboardEngine {
    http: Client,
    cache: Arc<dyn ReportCache>,
    endpoints: PlatformEndpoints,
}

impl DashboardEngine {
    pub fn new(http: Client, cache: Arc<dyn ReportCache>, endpoints: PlatformEndpoints) -> Self {
        Self {
            http,
            cache,
            endpoints,
        }
    }

    /// Build the aggregated report for one account and window, serving from
    /// cache when a fresh entry exists.
    pub async fn build_report(
        &self,
        credentials: &AccountCredentials,
        costs: &CostOverrides,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<AggregatedReport> {
        let Some(shopify_creds) = credentials.shopify.as_ref() else {
            return Err(AppError::configuration("no Shopify credentials on file"));
        };
        let window = DateWindow::resolve(start_date, end_date)?;

        let key = cache_key::dashboard_report(&shopify_creds.store_url, window.start, window.end);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "dashboard report cache hit");
            return Ok(cached);
        }

        let months = trailing_months(window.end, TREND_MONTHS);
        let trend_window = DateWindow::new(months[0].first_day(), window.end)?;

        let shopify = ShopifyService::new(self.http.clone(), shopify_creds);
        let shopify_fut = shopify.fetch_all(&window, &trend_window);

        let meta_fut = async {
            match credentials.meta_ads.as_ref() {
                Some(creds) => {
                    MetaAdsService::new(self.http.clone(), &self.endpoints.meta_base_url, creds)
                        .fetch_all(&window, &trend_window)
                        .await
                }
                None => Err(AppError::MissingCredentials { provider: "meta_ads" }),
            }
        };

        let shiprocket_fut = async {
            match credentials.shiprocket.as_ref() {
                Some(creds) => {
                    ShiprocketService::new(
                        self.http.clone(),
                        &self.endpoints.shiprocket_base_url,
                        creds,
                    )
                    .fetch_all(&window, &trend_window)
                    .await
                }
                None => Err(AppError::MissingCredentials { provider: "shiprocket" }),
            }
        };

        let (shopify_res, meta_res, shiprocket_res) =
            tokio::join!(shopify_fut, meta_fut, shiprocket_fut);

        let report = assemble(
            &window,
            &months,
            isolate("shopify", shopify_res),
            isolate("meta_ads", meta_res),
            isolate("shiprocket", shiprocket_res),
            costs,
        );

        let ttl = Duration::from_secs(cache_ttl::get_dashboard_report_ttl());
        self.cache.set(&key, &report, ttl).await;
        info!(
            window_start = %window.start,
            window_end = %window.end,
            "dashboard report built and cached"
        );
        Ok(report)
    }
}

/// Join the three normalized sources into the final report. Pure; the
/// result is identical regardless of upstream call completion order.
fn assemble(
    window: &DateWindow,
    months: &[MonthKey],
    shopify: SourceOutcome<ShopifyFetch>,
    meta: SourceOutcome<MetaFetch>,
    shiprocket: SourceOutcome<ShiprocketFetch>,
    costs: &CostOverrides,
) -> AggregatedReport {
    let shop_summary = commerce::summarize(&shopify.data.orders, &shopify.data.customers);
    let shop_daily = commerce::daily_buckets(&shopify.data.orders, window, costs);
    let shop_monthly = commerce::monthly_buckets(
        &shopify.data.trend_orders,
        &shopify.data.trend_customers,
        months,
        costs,
    );

    let ads_totals = ads::summarize(&meta.data.window_rows);
    let ads_daily = ads::daily_spend(&meta.data.daily_rows, window);
    let ads_monthly = ads::monthly_buckets(&meta.data.monthly_rows, months);
    let campaigns = ads::campaign_totals(&meta.data.campaign_rows);

    let ship_summary = shipping::summarize(&shiprocket.data.shipments, window.end);
    let ship_daily = shipping::daily_costs(&shiprocket.data.shipments, window);
    let ship_monthly = shipping::monthly_costs(&shiprocket.data.trend_shipments, months);

    let total_cogs: Decimal = shop_summary
        .products
        .iter()
        .map(|p| commerce::product_cogs(&p.id, p.quantity, costs))
        .sum();

    let m = metrics::compute(&MetricInputs {
        revenue: shop_summary.total_revenue,
        cogs: total_cogs,
        ad_spend: ads_totals.spend,
        shipping_cost: ship_summary.total_cost,
        purchase_count: ads_totals.purchase_count,
        purchase_value: ads_totals.purchase_value,
        impressions: ads_totals.impressions,
        clicks: ads_totals.clicks,
        orders: shop_summary.orders_count,
    });

    // Dense daily join; every map already covers exactly the window's days.
    let daily_series: Vec<DayBucket> = window
        .days()
        .map(|day| {
            let day_commerce = shop_daily.get(&day).cloned().unwrap_or_default();
            let day_spend = ads_daily.get(&day).copied().unwrap_or_default();
            let day_shipping = ship_daily.get(&day).copied().unwrap_or_default();
            let day_net = day_commerce.revenue - day_commerce.cogs - day_spend - day_shipping;
            DayBucket {
                date: day.to_string(),
                revenue: round2(to_f64(day_commerce.revenue)),
                orders: day_commerce.orders,
                cogs: round2(to_f64(day_commerce.cogs)),
                ad_spend: round2(to_f64(day_spend)),
                shipping_cost: round2(to_f64(day_shipping)),
                net_profit: round2(to_f64(day_net)),
            }
        })
        .collect();

    let (best, least) = commerce::rank_products(&shop_summary.products, RANKING_SIZE);
    let to_stat = |p: &commerce::ProductSales| ProductStat {
        id: p.id.clone(),
        name: p.title.clone(),
        units_sold: p.quantity,
        revenue: round2(to_f64(p.revenue)),
        cogs: round2(to_f64(commerce::product_cogs(&p.id, p.quantity, costs))),
    };
    let product_rankings = ProductRankings {
        best: best.iter().map(to_stat).collect(),
        least: least.iter().map(to_stat).collect(),
    };

    let summary = vec![
        MetricCard::amount("Revenue", m.revenue),
        MetricCard::count("Orders", shop_summary.orders_count),
        MetricCard::amount("Ads Spend", m.ad_spend),
        MetricCard::amount("Shipping Spend", m.shipping_cost),
        MetricCard::amount("COGS", m.cogs),
        MetricCard::amount("Gross Profit", m.gross_profit),
        MetricCard::amount("Net Profit", m.net_profit),
        MetricCard::percent("Gross Margin", m.gross_margin_pct),
        MetricCard::percent("Net Margin", m.net_margin_pct),
        MetricCard::amount("AOV", m.aov),
        MetricCard::ratio("ROAS", m.roas),
        MetricCard::percent("POAS", m.poas_pct),
    ];

    let marketing = vec![
        MetricCard::count("Purchases", ads_totals.purchase_count as u64),
        MetricCard::amount("Amount Spend", m.ad_spend),
        MetricCard::amount("CPP", m.cpp),
        MetricCard::ratio("ROAS", m.roas),
        MetricCard::count("Link Clicks", ads_totals.clicks),
        MetricCard::amount("CPC", m.cpc),
        MetricCard::percent("CTR", m.ctr_pct),
        MetricCard::count("Impressions", ads_totals.impressions),
        MetricCard::amount("CPM", m.cpm),
        MetricCard::count("Reach", ads_totals.reach),
    ];

    let website = vec![
        MetricCard::amount("Total Sales", m.revenue),
        MetricCard::count("Total Orders", shop_summary.orders_count),
        MetricCard::count("Total Customers", shop_summary.customers_count),
        MetricCard::count("New Customers", shop_summary.new_customers),
        MetricCard::count("Returning Customers", shop_summary.returning_customers),
        MetricCard::amount("AOV", m.aov),
        MetricCard::percent("Returning Rate", shop_summary.returning_rate_pct()),
        MetricCard::unavailable("Website Visitors"),
        MetricCard::unavailable("Conversion Rate"),
    ];

    let shipping_cards = vec![
        MetricCard::count("Total Shipments", ship_summary.total_shipments),
        MetricCard::count("Pickup Pending", ship_summary.pickup_pending),
        MetricCard::count("In-Transit", ship_summary.in_transit),
        MetricCard::count("Delivered", ship_summary.delivered),
        MetricCard::count("NDR Pending", ship_summary.ndr_pending),
        MetricCard::count("RTO", ship_summary.rto),
        MetricCard::count("Cancelled", ship_summary.cancelled),
        MetricCard::count("Total COD", ship_summary.cod_orders),
        MetricCard::count("Prepaid Orders", ship_summary.prepaid_orders),
        MetricCard::count("COD Pending", ship_summary.cod_pending),
        MetricCard::amount("Last COD Remitted", to_f64(ship_summary.cod_remitted)),
    ];

    // Campaign ROAS allocates store revenue by each campaign's spend share,
    // since the campaign rows carry no purchase attribution of their own.
    let campaign_breakdowns: Vec<CampaignBreakdown> = campaigns
        .iter()
        .map(|c| {
            let spend = to_f64(c.spend);
            let revenue_share = m.revenue * ratio(spend, m.ad_spend);
            CampaignBreakdown {
                id: c.id.clone(),
                name: c.name.clone(),
                spend: round2(spend),
                impressions: c.impressions,
                clicks: c.clicks,
                reach: c.reach,
                cpm: round2(ratio(spend, c.impressions as f64) * 1000.0),
                cpc: round2(ratio(spend, c.clicks as f64)),
                ctr: round2(pct(c.clicks as f64, c.impressions as f64)),
                roas: round2(ratio(revenue_share, spend)),
            }
        })
        .collect();

    let shipment_status = vec![
        StatusCount {
            name: "Delivered".into(),
            value: ship_summary.delivered,
        },
        StatusCount {
            name: "RTO".into(),
            value: ship_summary.rto,
        },
        StatusCount {
            name: "In-Transit".into(),
            value: ship_summary.in_transit,
        },
        StatusCount {
            name: "Pickup Pending".into(),
            value: ship_summary.pickup_pending,
        },
        StatusCount {
            name: "NDR Pending".into(),
            value: ship_summary.ndr_pending,
        },
        StatusCount {
            name: "Cancelled".into(),
            value: ship_summary.cancelled,
        },
        StatusCount {
            name: "Undelivered".into(),
            value: ship_summary.undelivered,
        },
    ];

    let payment_mode = vec![
        StatusCount {
            name: "Prepaid".into(),
            value: ship_summary.prepaid_orders,
        },
        StatusCount {
            name: "COD".into(),
            value: ship_summary.cod_orders,
        },
    ];

    let cod = CodBreakdown {
        cod_orders: ship_summary.cod_orders,
        prepaid_orders: ship_summary.prepaid_orders,
        cod_pending: ship_summary.cod_pending,
        cod_remitted: round2(to_f64(ship_summary.cod_remitted)),
    };

    let monthly = monthly_trends(months, &shop_monthly, &ads_monthly, &ship_monthly);

    AggregatedReport {
        window: ReportWindow {
            start: window.start.to_string(),
            end: window.end.to_string(),
        },
        summary,
        marketing,
        website,
        shipping: shipping_cards,
        daily_series,
        product_rankings,
        breakdowns: Breakdowns {
            campaigns: campaign_breakdowns,
            shipment_status,
            payment_mode,
            cod,
            monthly,
        },
        source_errors: SourceErrors {
            shopify: shopify.error,
            meta_ads: meta.error,
            shiprocket: shiprocket.error,
        },
    }
}

fn monthly_trends(
    months: &[MonthKey],
    shop_monthly: &[commerce::CommerceMonth],
    ads_monthly: &[ads::AdsMonth],
    ship_monthly: &[Decimal],
) -> MonthlyTrends {
    let mut trends = MonthlyTrends::default();

    for (i, month) in months.iter().enumerate() {
        let label = month.label();
        let shop = &shop_monthly[i];
        let ad = &ads_monthly[i];
        let ship_cost = ship_monthly[i];

        trends.sales.push(MonthPoint {
            name: label.clone(),
            value: round2(to_f64(shop.sales)),
        });
        trends.orders.push(MonthPoint {
            name: label.clone(),
            value: shop.orders as f64,
        });
        trends.customer_mix.push(MonthCustomerMix {
            name: label.clone(),
            new_customers: shop.new_customers,
            returning_customers: shop.returning_customers,
        });
        trends.roas.push(MonthPoint {
            name: label.clone(),
            value: round2(ratio(to_f64(ad.purchase_value), to_f64(ad.spend))),
        });
        trends.cpp.push(MonthPoint {
            name: label.clone(),
            value: round2(ratio(to_f64(ad.spend), ad.purchase_count)),
        });
        trends.shipping_cost.push(MonthPoint {
            name: label.clone(),
            value: round2(to_f64(ship_cost)),
        });

        let net = shop.sales - shop.cogs - ad.spend - ship_cost;
        trends.profit_loss.push(ProfitLossRow {
            month: label,
            year: month.year,
            sales: round2(to_f64(shop.sales)),
            cogs: round2(to_f64(shop.cogs)),
            ads_spend: round2(to_f64(ad.spend)),
            shipping: round2(to_f64(ship_cost)),
            net_profit: round2(to_f64(net)),
        });
    }

    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        )
        .unwrap()
    }

    fn shopify_fetch() -> ShopifyFetch {
        let orders = serde_json::from_value(serde_json::json!([
            {"id": 1, "created_at": "2025-06-01T10:00:00+05:30", "total_price": "500.00",
             "line_items": [{"product_id": 7, "title": "Tote Bag", "quantity": 2, "price": "250.00"}]},
            {"id": 2, "created_at": "2025-06-01T12:00:00+05:30", "total_price": "300.00",
             "line_items": [{"product_id": 8, "title": "Mug", "quantity": 1, "price": "300.00"}]}
        ]))
        .unwrap();
        ShopifyFetch {
            orders,
            customers: Vec::new(),
            trend_orders: Vec::new(),
            trend_customers: Vec::new(),
        }
    }

    fn ok<T>(data: T) -> SourceOutcome<T> {
        SourceOutcome { data, error: None }
    }

    fn failed<T: Default>() -> SourceOutcome<T> {
        SourceOutcome {
            data: T::default(),
            error: Some("HTTP 500".to_string()),
        }
    }

    fn assemble_report(
        shopify: SourceOutcome<ShopifyFetch>,
        meta: SourceOutcome<MetaFetch>,
        shiprocket: SourceOutcome<ShiprocketFetch>,
    ) -> AggregatedReport {
        let w = window();
        let months = trailing_months(w.end, TREND_MONTHS);
        assemble(&w, &months, shopify, meta, shiprocket, &CostOverrides::new())
    }

    fn card(report: &AggregatedReport, section: &str, title: &str) -> f64 {
        let cards = match section {
            "summary" => &report.summary,
            "marketing" => &report.marketing,
            "website" => &report.website,
            _ => &report.shipping,
        };
        cards
            .iter()
            .find(|c| c.title == title)
            .and_then(|c| c.value)
            .unwrap_or_else(|| panic!("no card '{}' in {}", title, section))
    }

    #[test]
    fn daily_series_is_dense_and_sums_to_totals() {
        let report = assemble_report(
            ok(shopify_fetch()),
            ok(MetaFetch::default()),
            ok(ShiprocketFetch::default()),
        );

        assert_eq!(report.daily_series.len(), 3);
        assert_eq!(report.daily_series[0].revenue, 800.0);
        assert_eq!(report.daily_series[0].orders, 2);
        assert_eq!(report.daily_series[1].revenue, 0.0);
        assert_eq!(report.daily_series[2].revenue, 0.0);

        let daily_total: f64 = report.daily_series.iter().map(|d| d.revenue).sum();
        assert_eq!(daily_total, card(&report, "summary", "Revenue"));
        assert_eq!(card(&report, "summary", "AOV"), 400.0);
    }

    #[test]
    fn failed_source_degrades_to_zero_section_with_marker() {
        let report = assemble_report(
            ok(shopify_fetch()),
            ok(MetaFetch::default()),
            failed::<ShiprocketFetch>(),
        );

        assert_eq!(card(&report, "summary", "Revenue"), 800.0);
        assert_eq!(card(&report, "shipping", "Total Shipments"), 0.0);
        assert_eq!(card(&report, "summary", "Shipping Spend"), 0.0);
        assert_eq!(report.source_errors.shiprocket.as_deref(), Some("HTTP 500"));
        assert!(report.source_errors.shopify.is_none());
    }

    #[test]
    fn all_sources_empty_still_produces_finite_cards() {
        let report = assemble_report(
            ok(ShopifyFetch::default()),
            ok(MetaFetch::default()),
            ok(ShiprocketFetch::default()),
        );
        for section in [
            &report.summary,
            &report.marketing,
            &report.website,
            &report.shipping,
        ] {
            for c in section.iter() {
                if let Some(v) = c.value {
                    assert!(v.is_finite(), "card {} is not finite", c.title);
                }
            }
        }
        assert_eq!(card(&report, "summary", "ROAS"), 0.0);
    }

    #[test]
    fn monthly_trends_align_with_trailing_months() {
        let report = assemble_report(
            ok(shopify_fetch()),
            ok(MetaFetch::default()),
            ok(ShiprocketFetch::default()),
        );
        let monthly = &report.breakdowns.monthly;
        assert_eq!(monthly.sales.len(), TREND_MONTHS);
        assert_eq!(monthly.profit_loss.len(), TREND_MONTHS);
        assert_eq!(monthly.sales.last().unwrap().name, "JUN");
    }
}
