use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::model::{InventoryItem, Order};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateScope {
    #[default]
    All,
    Today,
    /// Since the start of the most recent Sunday.
    ThisWeek,
}

/// Search + date filter used by the list screens.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub query: String,
    pub scope: DateScope,
}

impl OrderFilter {
    pub fn new(query: impl Into<String>, scope: DateScope) -> Self {
        Self {
            query: query.into(),
            scope,
        }
    }

    /// Orders matching both the query and the date scope, in input order.
    pub fn apply<'a>(&self, orders: &'a [Order], now: NaiveDateTime) -> Vec<&'a Order> {
        let cutoff = scope_start(self.scope, now);
        let query = self.query.to_lowercase();

        orders
            .iter()
            .filter(|o| matches_query(o, &query))
            .filter(|o| match cutoff {
                None => true,
                Some(start) => created_at(o).is_some_and(|t| t >= start),
            })
            .collect()
    }
}

fn matches_query(o: &Order, lower_query: &str) -> bool {
    if lower_query.is_empty() {
        return true;
    }
    let hit = |field: &Option<String>| {
        field
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(lower_query)
    };
    hit(&o.customer_name) || hit(&o.customer_phone)
}

fn scope_start(scope: DateScope, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    let start_of = |d: NaiveDate| d.and_hms_opt(0, 0, 0);
    match scope {
        DateScope::All => None,
        DateScope::Today => start_of(today),
        DateScope::ThisWeek => {
            let back = today.weekday().num_days_from_sunday() as i64;
            start_of(today - Duration::days(back))
        }
    }
}

/// Backend timestamps are MySQL `DATETIME` strings; a bare date or an
/// RFC 3339 value is accepted as well.
pub fn created_at(o: &Order) -> Option<NaiveDateTime> {
    let raw = o.created_at.as_deref()?.trim();

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|d| d.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn total_amount<'a, I>(orders: I) -> f64
where
    I: IntoIterator<Item = &'a Order>,
{
    orders.into_iter().map(Order::total).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderGroup {
    pub trader_name: String,
    pub orders: Vec<Order>,
}

/// Rider view: pending orders grouped per trader.
pub fn group_by_trader(orders: &[Order]) -> BTreeMap<String, TraderGroup> {
    let mut groups: BTreeMap<String, TraderGroup> = BTreeMap::new();

    for o in orders {
        let key = o.trader_id.clone().unwrap_or_default();
        groups
            .entry(key.clone())
            .or_insert_with(|| TraderGroup {
                trader_name: o
                    .trader_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("Trader #{key}")),
                orders: Vec::new(),
            })
            .orders
            .push(o.clone());
    }

    groups
}

/// Place-order view: catalogue grouped by category.
pub fn group_inventory(items: &[InventoryItem]) -> BTreeMap<String, Vec<InventoryItem>> {
    let mut groups: BTreeMap<String, Vec<InventoryItem>> = BTreeMap::new();
    for item in items {
        let cat = item
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Uncategorized".to_string());
        groups.entry(cat).or_default().push(item.clone());
    }
    groups
}
