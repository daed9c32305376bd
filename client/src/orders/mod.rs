mod draft;
mod filter;
mod model;
mod service;

pub use draft::OrderDraft;
pub use filter::{
    DateScope, OrderFilter, TraderGroup, created_at, group_by_trader, group_inventory,
    total_amount,
};
pub use model::{Earnings, InventoryItem, LineItem, Order, PAYMENT_PAID, PAYMENT_PARTIAL};
pub use service::{OrderList, OrdersService};
