use statrs::statistics::Statistics;
use crate::model::{CategoryTotals, InventoryStats, Item};
use std::collections::HashMap;

pub fn build_stats<'a>(items: impl IntoIterator<Item = &'a Item>) -> InventoryStats {
    let mut stats = InventoryStats::default();
    let mut percents = Vec::new();

    for item in items {
        stats.total_items += 1;
        stats.total_profit += item.profit;
        stats.total_investment += item.buying_price;
        stats.total_market_value += item.market_price;
        if item.profit > 0.0 {
            stats.profitable_items += 1;
        }
        if item.profit < 0.0 {
            stats.loss_items += 1;
        }
        percents.push(item.profit_percent);
    }

    // statrs returns NaN for an empty sample
    stats.avg_profit_percent = if percents.is_empty() { 0.0 } else { percents.mean() };
    stats
}

pub fn category_breakdown<'a>(items: impl IntoIterator<Item = &'a Item>) -> HashMap<String, CategoryTotals> {
    let mut map: HashMap<String, CategoryTotals> = HashMap::new();

    for item in items {
        let group = map.entry(item.category.clone()).or_default();
        group.count += 1;
        group.total_profit += item.profit;
    }

    map
}

/// Breakdown sorted by total profit, highest first. Equal totals fall back to
/// the category name so the order is stable between frames.
pub fn rank_categories(map: HashMap<String, CategoryTotals>) -> Vec<(String, CategoryTotals)> {
    let mut rows: Vec<_> = map.into_iter().collect();
    rows.sort_by(|a, b| {
        b.1.total_profit
            .total_cmp(&a.1.total_profit)
            .then_with(|| a.0.cmp(&b.0))
    });
    rows
}
