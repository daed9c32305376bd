use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de;

pub const PAYMENT_PAID: &str = "Paid";
pub const PAYMENT_PARTIAL: &str = "Part Payment";

/// A walk-in or rider order as returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Either a JSON array or a JSON-encoded string of one.
    #[serde(default)]
    pub items: Value,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub total_amount: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub amount_paid: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub balance_due: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trader_id: Option<String>,
    #[serde(default)]
    pub trader_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::flex_f64")]
    pub price: f64,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

fn amount(v: &Option<String>) -> f64 {
    v.as_deref().and_then(de::parse_amount).unwrap_or(0.0)
}

impl Order {
    pub fn customer_label(&self) -> &str {
        self.customer_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Anonymous")
    }

    pub fn total(&self) -> f64 {
        amount(&self.total_amount)
    }

    pub fn paid(&self) -> f64 {
        amount(&self.amount_paid)
    }

    /// Reported `balance_due`, or total minus paid when the backend left it
    /// out.
    pub fn balance(&self) -> f64 {
        match self.balance_due.as_deref().and_then(de::parse_amount) {
            Some(b) => b,
            None => self.total() - self.paid(),
        }
    }

    pub fn is_fully_paid(&self) -> bool {
        self.balance() <= 0.0 || self.payment_status.as_deref() == Some(PAYMENT_PAID)
    }

    /// Decoded line items; malformed item data yields an empty list.
    pub fn line_items(&self) -> Vec<LineItem> {
        let decoded = match &self.items {
            Value::String(s) => serde_json::from_str::<Vec<LineItem>>(s).ok(),
            v @ Value::Array(_) => serde_json::from_value::<Vec<LineItem>>(v.clone()).ok(),
            _ => None,
        };
        decoded.unwrap_or_default()
    }
}

/// Catalogue entry from `get_inventory.php`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InventoryItem {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "de::flex_f64")]
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Earnings {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub total_earned: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub total_paid: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub total_unpaid: Option<String>,
}
