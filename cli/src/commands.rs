use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Local;
use tracing::{Instrument, info, warn};

use client::orders::{
    DateScope, Order, OrderDraft, OrderFilter, group_by_trader, group_inventory, total_amount,
};
use client::{AuthService, ClientError, OrdersService};
use common::logger::{annotate_span, child_span};
use session::{NavigationGate, SessionManager, Workspace};

use crate::cli::{Command, ListCli};

pub struct App {
    pub auth: AuthService,
    pub orders: OrdersService,
    pub session: Arc<SessionManager>,
    pub gate: NavigationGate,
}

impl App {
    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        if let Some(s) = self.session.session() {
            annotate_span(s.role.as_str(), Some(&s.user_id));
        }

        if let Some(screen) = command.screen() {
            if self.gate.render() == Workspace::Unauthenticated {
                bail!("not logged in; run `stainbursters login` first");
            }
            self.gate.navigate(screen)?;
        }

        let result = self.dispatch(command).await;

        if let Err(e) = &result {
            if let Some(ClientError::SessionExpired) = e.downcast_ref::<ClientError>() {
                warn!(workspace = ?self.gate.render(), "session ended by backend");
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Login { phone, code } => {
                let s = self.auth.login_with_code(&phone, &code).await?;
                println!("Logged in as {} (user {})", s.role, s.user_id);
                self.print_workspace();
            }

            Command::Logout => {
                if self.auth.logout().await {
                    println!("Logged out");
                } else {
                    println!("No active session");
                }
            }

            Command::Status => match self.session.session() {
                Some(s) => {
                    let name = s.user.get("name").and_then(|v| v.as_str()).unwrap_or("-");
                    println!("{name} | role {} | user {}", s.role, s.user_id);
                    self.print_workspace();
                }
                None => println!("Not logged in"),
            },

            Command::SwitchRole { role, code } => {
                let s = self.auth.switch_role(&role, &code).await?;
                println!("Role switched to {}", s.role);
                self.print_workspace();
            }

            Command::Profile => {
                let profile = self.auth.profile().await?;
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }

            Command::Orders {
                list,
                search,
                scope,
            } => self.list_orders(list, search, scope.into()).await?,

            Command::SetStatus { order, status } => {
                self.orders.update_status(&order, &status).await?;
                println!("Order {order} moved to {status}");
            }

            Command::SetCustomer { order, name, phone } => {
                self.orders.edit_customer(&order, &name, &phone).await?;
                println!("Order {order} now belongs to {name}");
            }

            Command::ConfirmPickup { order } => {
                self.orders.confirm_pickup(&order).await?;
                println!("Pickup confirmed for order {order}");
            }

            Command::PlaceOrder {
                customer,
                phone,
                items,
                paid,
            } => {
                let catalogue = self
                    .orders
                    .inventory()
                    .instrument(child_span("fetch_inventory"))
                    .await?;
                let mut draft = OrderDraft::new(customer, phone);
                for id in &items {
                    let item = catalogue
                        .iter()
                        .find(|i| &i.id == id)
                        .with_context(|| format!("no inventory item with id {id}"))?;
                    draft.add(item);
                }

                self.orders.submit_walkin(&draft, paid).await?;
                println!(
                    "Order placed: {:.2} total, {} ({:.2} due)",
                    draft.total(),
                    draft.payment_status(paid),
                    draft.balance(paid).max(0.0)
                );
            }

            Command::Earnings => {
                let e = self.orders.earnings().await?;
                let show = |v: Option<String>| v.unwrap_or_else(|| "0".to_string());
                println!("Earned:   {}", show(e.total_earned));
                println!("Paid:     {}", show(e.total_paid));
                println!("Unpaid:   {}", show(e.total_unpaid));
            }

            Command::Inventory => {
                let items = self.orders.inventory().await?;
                for (category, items) in group_inventory(&items) {
                    println!("{category}");
                    for i in items {
                        println!("  [{}] {} {:.2}", i.id, i.name, i.price);
                    }
                }
            }
        }

        Ok(())
    }

    async fn list_orders(
        &self,
        list: ListCli,
        search: String,
        scope: DateScope,
    ) -> anyhow::Result<()> {
        let orders = self
            .orders
            .list(list.list())
            .instrument(child_span("fetch_orders"))
            .await?;
        let filter = OrderFilter::new(search, scope);
        let shown = filter.apply(&orders, Local::now().naive_local());

        info!(fetched = orders.len(), shown = shown.len(), "orders listed");

        if list.list().is_rider_list() {
            let owned: Vec<Order> = shown.iter().map(|o| (*o).clone()).collect();
            for group in group_by_trader(&owned).values() {
                println!("{} ({} orders)", group.trader_name, group.orders.len());
                for o in &group.orders {
                    print_order(o);
                }
            }
        } else {
            for o in &shown {
                print_order(o);
            }
        }

        println!(
            "{} orders, total {:.2}",
            shown.len(),
            total_amount(shown.iter().copied())
        );
        Ok(())
    }

    fn print_workspace(&self) {
        let workspace = self.gate.render();
        let screens: Vec<String> = workspace.screens().iter().map(|s| s.to_string()).collect();
        println!("Workspace: {workspace:?} [{}]", screens.join(", "));
    }
}

fn print_order(o: &Order) {
    let paid = if o.is_fully_paid() { "paid" } else { "due" };
    println!(
        "  #{:<6} {:<20} {:<14} {:>10.2} {:>10.2} {paid:<4} {:<14} {}",
        o.id,
        o.customer_label(),
        o.customer_phone.as_deref().unwrap_or("-"),
        o.total(),
        o.balance().max(0.0),
        o.status.as_deref().unwrap_or("-"),
        o.created_at.as_deref().unwrap_or("-"),
    );
}
