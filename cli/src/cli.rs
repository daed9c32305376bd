use clap::{Parser, Subcommand, ValueEnum};

use client::orders::{DateScope, OrderList};
use session::Screen;

#[derive(Debug, Parser)]
#[clap(name = "stainbursters", version, about = "StainBursters trader and rider client")]
pub struct Cli {
    /// Override the backend base URL
    #[clap(long, global = true)]
    pub api_url: Option<String>,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with phone number and access code
    Login {
        #[clap(long)]
        phone: String,
        #[clap(long)]
        code: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in and which workspace is active
    Status,

    /// Switch the current user to another role
    SwitchRole {
        #[clap(long)]
        role: String,
        #[clap(long)]
        code: String,
    },

    /// Show the profile of the logged-in user
    Profile,

    /// List orders
    Orders {
        #[clap(value_enum)]
        list: ListCli,

        /// Case-insensitive match on customer name or phone
        #[clap(long, default_value = "")]
        search: String,

        #[clap(long, value_enum, default_value_t = ScopeCli::All)]
        scope: ScopeCli,
    },

    /// Move an order to another status
    SetStatus {
        #[clap(long)]
        order: String,
        #[clap(long)]
        status: String,
    },

    /// Correct the customer name and phone on an order
    SetCustomer {
        #[clap(long)]
        order: String,
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "")]
        phone: String,
    },

    /// Rider: confirm pickup of an order
    ConfirmPickup {
        #[clap(long)]
        order: String,
    },

    /// Record a walk-in order
    PlaceOrder {
        #[clap(long, default_value = "")]
        customer: String,
        #[clap(long, default_value = "")]
        phone: String,

        /// Inventory item ids; repeat an id to add more than one
        #[clap(long = "item", required = true)]
        items: Vec<String>,

        #[clap(long, default_value = "0")]
        paid: f64,
    },

    /// Trader earnings summary
    Earnings,

    /// Show the inventory catalogue by category
    Inventory,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListCli {
    Collected,
    Workshop,
    Ready,
    History,
    Pending,
    RiderHistory,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeCli {
    All,
    Today,
    Week,
}

impl ListCli {
    pub(crate) fn list(self) -> OrderList {
        match self {
            ListCli::Collected => OrderList::Collected,
            ListCli::Workshop => OrderList::Workshop,
            ListCli::Ready => OrderList::PickupReady,
            ListCli::History => OrderList::History,
            ListCli::Pending => OrderList::Pending,
            ListCli::RiderHistory => OrderList::RiderHistory,
        }
    }

    pub(crate) fn screen(self) -> Screen {
        match self {
            ListCli::Collected => Screen::Collected,
            ListCli::Workshop => Screen::Workshop,
            ListCli::Ready => Screen::PickupReady,
            ListCli::History => Screen::OrderHistory,
            ListCli::Pending => Screen::Pending,
            ListCli::RiderHistory => Screen::RiderHistory,
        }
    }
}

impl From<ScopeCli> for DateScope {
    fn from(s: ScopeCli) -> Self {
        match s {
            ScopeCli::All => DateScope::All,
            ScopeCli::Today => DateScope::Today,
            ScopeCli::Week => DateScope::ThisWeek,
        }
    }
}

impl Command {
    /// Screen that must be reachable before the command runs.
    pub(crate) fn screen(&self) -> Option<Screen> {
        match self {
            Command::Login { .. } | Command::Logout | Command::Status => None,
            Command::SwitchRole { .. } | Command::Profile => Some(Screen::Profile),
            Command::Orders { list, .. } => Some(list.screen()),
            Command::SetStatus { .. } => Some(Screen::Workshop),
            Command::SetCustomer { .. } => Some(Screen::Collected),
            Command::ConfirmPickup { .. } => Some(Screen::Pending),
            Command::PlaceOrder { .. } | Command::Inventory => Some(Screen::PlaceOrder),
            Command::Earnings => Some(Screen::Earnings),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Status => "status",
            Command::SwitchRole { .. } => "switch_role",
            Command::Profile => "profile",
            Command::Orders { .. } => "orders",
            Command::SetStatus { .. } => "set_status",
            Command::SetCustomer { .. } => "set_customer",
            Command::ConfirmPickup { .. } => "confirm_pickup",
            Command::PlaceOrder { .. } => "place_order",
            Command::Earnings => "earnings",
            Command::Inventory => "inventory",
        }
    }
}
