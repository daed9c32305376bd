use serde_json::json;
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::ClientError;

use super::draft::OrderDraft;
use super::model::{Earnings, InventoryItem, Order};

/// Which server-side list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderList {
    /// Trader: walk-ins collected, waiting to go to the workshop.
    Collected,
    Workshop,
    PickupReady,
    History,
    /// Rider: orders waiting for pickup.
    Pending,
    RiderHistory,
}

impl OrderList {
    fn path(self) -> &'static str {
        match self {
            Self::Collected => "get_collected_walkins.php",
            Self::Workshop => "get_workshop_orders.php",
            Self::PickupReady => "get_ready_walkins.php",
            Self::History => "get_order_history.php",
            Self::Pending => "get_rider_orders.php",
            Self::RiderHistory => "get_rider_history.php",
        }
    }

    pub fn is_rider_list(self) -> bool {
        matches!(self, Self::Pending | Self::RiderHistory)
    }
}

/// Order, inventory and earnings endpoints. Every call goes through
/// [`ApiClient`], so a rejected credential anywhere logs the user out.
#[derive(Clone)]
pub struct OrdersService {
    api: ApiClient,
}

impl OrdersService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self), target = "orders")]
    pub async fn list(&self, list: OrderList) -> Result<Vec<Order>, ClientError> {
        let env = self
            .api
            .get(list.path())
            .await?
            .into_result("Failed to fetch orders")?;

        let orders: Option<Vec<Order>> = env.field("orders")?;
        Ok(orders.unwrap_or_default())
    }

    #[instrument(skip(self), target = "orders")]
    pub async fn update_status(&self, order_id: &str, status: &str) -> Result<(), ClientError> {
        self.api
            .post_json(
                "update_order_status.php",
                json!({ "order_id": order_id, "status": status }),
            )
            .await?
            .into_result("Failed to update order")?;

        info!(order_id, status, "order status updated");
        Ok(())
    }

    /// Correct the customer details on an existing order. Same endpoint as
    /// status updates, but form-encoded.
    #[instrument(skip(self, name, phone), target = "orders")]
    pub async fn edit_customer(
        &self,
        order_id: &str,
        name: &str,
        phone: &str,
    ) -> Result<(), ClientError> {
        self.api
            .post_form(
                "update_order_status.php",
                vec![
                    ("order_id".into(), order_id.to_string()),
                    ("customer_name".into(), name.trim().to_string()),
                    ("customer_phone".into(), phone.trim().to_string()),
                ],
            )
            .await?
            .into_result("Failed to update")?;

        info!(order_id, "customer details updated");
        Ok(())
    }

    #[instrument(skip(self), target = "orders")]
    pub async fn confirm_pickup(&self, order_id: &str) -> Result<(), ClientError> {
        self.api
            .post_json("confirm_rider_pickup.php", json!({ "order_id": order_id }))
            .await?
            .into_result("Failed to confirm pickup")?;

        info!(order_id, "pickup confirmed");
        Ok(())
    }

    pub async fn inventory(&self) -> Result<Vec<InventoryItem>, ClientError> {
        let env = self
            .api
            .get("get_inventory.php")
            .await?
            .into_result("Failed to fetch inventory")?;

        let items: Option<Vec<InventoryItem>> = env.field("items")?;
        Ok(items.unwrap_or_default())
    }

    #[instrument(skip(self, draft), fields(items = draft.items().len()), target = "orders")]
    pub async fn submit_walkin(
        &self,
        draft: &OrderDraft,
        amount_paid: f64,
    ) -> Result<(), ClientError> {
        if draft.is_empty() {
            return Err(ClientError::Rejected(
                "Add at least one item to the order".into(),
            ));
        }

        self.api
            .post_form("submit_walkin_order.php", draft.form_fields(amount_paid))
            .await?
            .into_result("Failed to submit order")?;

        info!(total = draft.total(), "walk-in order submitted");
        Ok(())
    }

    /// The earnings endpoint reads the token from the form body rather than
    /// the header; both are sent.
    pub async fn earnings(&self) -> Result<Earnings, ClientError> {
        let token = self
            .api
            .session()
            .token()
            .ok_or(ClientError::NotLoggedIn)?;

        let env = self
            .api
            .post_form("get_trader_earnings.php", vec![("token".into(), token)])
            .await?
            .into_result("Failed to fetch earnings")?;

        let earnings: Option<Earnings> = env.field("earnings")?;
        Ok(earnings.unwrap_or_default())
    }
}
