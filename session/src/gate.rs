//! Navigation gate: decides which top-level screen set is visible.
//!
//! The gate is re-evaluated on every session change for the lifetime of the
//! process. Whenever the resolved workspace changes, the history stack is
//! reset to the new workspace's home screen so back-navigation cannot reach
//! screens of a workspace the user no longer has.
use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::model::{AuthState, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    /// Restore has not completed; nothing real is shown.
    Splash,
    Unauthenticated,
    TraderWorkspace,
    RiderWorkspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,

    // Trader tabs
    PlaceOrder,
    Collected,
    Workshop,
    PickupReady,
    OrderHistory,
    Receipt,
    Earnings,

    // Rider tabs
    Pending,
    RiderHistory,

    // Shared
    Profile,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const TRADER_SCREENS: &[Screen] = &[
    Screen::PlaceOrder,
    Screen::Collected,
    Screen::Workshop,
    Screen::PickupReady,
    Screen::OrderHistory,
    Screen::Profile,
    Screen::Receipt,
    Screen::Earnings,
];

const RIDER_SCREENS: &[Screen] = &[Screen::Pending, Screen::RiderHistory, Screen::Profile];

impl Workspace {
    /// Map session state to a workspace. A signed-in user whose role has no
    /// workspace falls back to the login screen.
    pub fn resolve(state: &AuthState) -> Self {
        match state {
            AuthState::Restoring => Workspace::Splash,
            AuthState::SignedOut => Workspace::Unauthenticated,
            AuthState::SignedIn(s) => match s.role {
                Role::Trader => Workspace::TraderWorkspace,
                Role::Rider => Workspace::RiderWorkspace,
                Role::Staff | Role::Other(_) => Workspace::Unauthenticated,
            },
        }
    }

    pub fn screens(&self) -> &'static [Screen] {
        match self {
            Workspace::Splash => &[],
            Workspace::Unauthenticated => &[Screen::Login],
            Workspace::TraderWorkspace => TRADER_SCREENS,
            Workspace::RiderWorkspace => RIDER_SCREENS,
        }
    }

    pub fn home(&self) -> Option<Screen> {
        self.screens().first().copied()
    }

    pub fn allows(&self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("screen {screen} is not available in {workspace:?}")]
    NotAvailable { screen: Screen, workspace: Workspace },
}

struct Nav {
    workspace: Workspace,
    history: Vec<Screen>,
}

impl Nav {
    fn reset(&mut self, workspace: Workspace) {
        self.workspace = workspace;
        self.history.clear();
        self.history.extend(workspace.home());
    }
}

pub struct NavigationGate {
    rx: watch::Receiver<AuthState>,
    nav: Mutex<Nav>,
}

impl NavigationGate {
    pub fn new(rx: watch::Receiver<AuthState>) -> Self {
        let workspace = Workspace::resolve(&rx.borrow());
        let mut nav = Nav {
            workspace,
            history: Vec::new(),
        };
        nav.reset(workspace);

        Self {
            rx,
            nav: Mutex::new(nav),
        }
    }

    /// Re-evaluate against the latest session state.
    pub fn render(&self) -> Workspace {
        let next = Workspace::resolve(&self.rx.borrow());
        let mut nav = self.nav.lock();

        if nav.workspace != next {
            info!(from = ?nav.workspace, to = ?next, "workspace changed; history reset");
            nav.reset(next);
        }

        next
    }

    /// Screen on top of the history stack.
    pub fn current(&self) -> Option<Screen> {
        self.render();
        self.nav.lock().history.last().copied()
    }

    pub fn history(&self) -> Vec<Screen> {
        self.render();
        self.nav.lock().history.clone()
    }

    pub fn navigate(&self, screen: Screen) -> Result<(), NavigationError> {
        let workspace = self.render();
        if !workspace.allows(screen) {
            return Err(NavigationError::NotAvailable { screen, workspace });
        }

        let mut nav = self.nav.lock();
        if nav.history.last() != Some(&screen) {
            nav.history.push(screen);
        }
        debug!(%screen, depth = nav.history.len(), "navigated");
        Ok(())
    }

    /// Pop one screen. The workspace home is never popped; returns the screen
    /// now on top, or `None` if there was nothing to go back to.
    pub fn back(&self) -> Option<Screen> {
        self.render();
        let mut nav = self.nav.lock();
        if nav.history.len() <= 1 {
            return None;
        }
        nav.history.pop();
        nav.history.last().copied()
    }

    /// Wait for the next session change and re-render. Returns `None` once the
    /// session holder has been dropped.
    pub async fn changed(&mut self) -> Option<Workspace> {
        self.rx.changed().await.ok()?;
        Some(self.render())
    }
}
