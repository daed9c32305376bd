use serde_json::json;

use super::model::{InventoryItem, LineItem, PAYMENT_PAID, PAYMENT_PARTIAL};

const DEFAULT_CUSTOMER: &str = "Walk-in";

/// A walk-in order being assembled on the place-order screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    items: Vec<LineItem>,
}

impl OrderDraft {
    pub fn new(customer_name: impl Into<String>, customer_phone: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            items: Vec::new(),
        }
    }

    /// Adding an item already in the basket bumps its quantity.
    pub fn add(&mut self, item: &InventoryItem) {
        match self
            .items
            .iter_mut()
            .find(|i| i.id.as_deref() == Some(item.id.as_str()))
        {
            Some(existing) => existing.quantity += 1,
            None => self.items.push(LineItem {
                id: Some(item.id.clone()),
                name: Some(item.name.clone()),
                price: item.price,
                quantity: 1,
            }),
        }
    }

    /// Drop one unit; the line disappears once its quantity hits zero.
    pub fn remove(&mut self, item_id: &str) {
        if let Some(pos) = self
            .items
            .iter()
            .position(|i| i.id.as_deref() == Some(item_id))
        {
            let line = &mut self.items[pos];
            if line.quantity > 1 {
                line.quantity -= 1;
            } else {
                self.items.remove(pos);
            }
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price * f64::from(i.quantity))
            .sum()
    }

    pub fn balance(&self, amount_paid: f64) -> f64 {
        self.total() - amount_paid
    }

    pub fn payment_status(&self, amount_paid: f64) -> &'static str {
        if self.balance(amount_paid) <= 0.0 {
            PAYMENT_PAID
        } else {
            PAYMENT_PARTIAL
        }
    }

    /// Form body for `submit_walkin_order.php`.
    pub fn form_fields(&self, amount_paid: f64) -> Vec<(String, String)> {
        let name = match self.customer_name.trim() {
            "" => DEFAULT_CUSTOMER,
            n => n,
        };
        let items = json!(self.items).to_string();

        vec![
            ("customer_name".into(), name.to_string()),
            ("phone".into(), self.customer_phone.trim().to_string()),
            ("items".into(), items),
            ("total_price".into(), self.total().to_string()),
            (
                "payment_status".into(),
                self.payment_status(amount_paid).to_string(),
            ),
            (
                "balance_due".into(),
                self.balance(amount_paid).max(0.0).to_string(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64) -> InventoryItem {
        InventoryItem {
            id: id.into(),
            name: format!("item-{id}"),
            price,
            category: None,
        }
    }

    fn field<'a>(fields: &'a [(String, String)], key: &str) -> &'a str {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn adding_twice_increments_quantity() {
        let mut d = OrderDraft::default();
        d.add(&item("1", 500.0));
        d.add(&item("1", 500.0));
        d.add(&item("2", 300.0));

        assert_eq!(d.items().len(), 2);
        assert_eq!(d.items()[0].quantity, 2);
        assert_eq!(d.total(), 1300.0);
    }

    #[test]
    fn remove_decrements_then_drops() {
        let mut d = OrderDraft::default();
        d.add(&item("1", 500.0));
        d.add(&item("1", 500.0));

        d.remove("1");
        assert_eq!(d.items()[0].quantity, 1);
        d.remove("1");
        assert!(d.is_empty());
        d.remove("missing");
        assert!(d.is_empty());
    }

    #[test]
    fn payment_status_follows_balance() {
        let mut d = OrderDraft::default();
        d.add(&item("1", 1000.0));

        assert_eq!(d.payment_status(1000.0), PAYMENT_PAID);
        assert_eq!(d.payment_status(1200.0), PAYMENT_PAID);
        assert_eq!(d.payment_status(400.0), PAYMENT_PARTIAL);
        assert_eq!(d.balance(400.0), 600.0);
    }

    #[test]
    fn form_fields_default_customer_name() {
        let mut d = OrderDraft::new("  ", "0803 000 0000");
        d.add(&item("1", 250.0));

        let f = d.form_fields(100.0);
        assert_eq!(field(&f, "customer_name"), "Walk-in");
        assert_eq!(field(&f, "phone"), "0803 000 0000");
        assert_eq!(field(&f, "total_price"), "250");
        assert_eq!(field(&f, "payment_status"), "Part Payment");
        assert_eq!(field(&f, "balance_due"), "150");

        let items: Vec<LineItem> = serde_json::from_str(field(&f, "items")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 250.0);
    }

    #[test]
    fn overpayment_reports_zero_balance() {
        let mut d = OrderDraft::new("Ada", "");
        d.add(&item("1", 100.0));
        let f = d.form_fields(150.0);
        assert_eq!(field(&f, "balance_due"), "0");
        assert_eq!(field(&f, "payment_status"), "Paid");
    }
}
