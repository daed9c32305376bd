mod cli;
mod commands;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::Instrument;

use client::{ApiClient, AppConfig, AuthService, HttpTransport, OrdersService};
use common::logger::{TraceId, init_logger, root_span};
use session::{NavigationGate, SQLiteKeyValueStore, SessionManager, SessionStore};

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    init_logger("stainbursters", config.json_logs || cli.json_logs);

    let kv = SQLiteKeyValueStore::new(&config.session_db_url)
        .await
        .with_context(|| format!("opening session store at {}", config.session_db_url))?;
    let store = Arc::new(SessionStore::new(Arc::new(kv)));

    // Restore completes before any command looks at the gate.
    let session = SessionManager::start(store).await;
    let gate = NavigationGate::new(session.subscribe());

    let transport = HttpTransport::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )?;
    let api = ApiClient::new(Arc::new(transport), session.clone());

    let app = App {
        auth: AuthService::new(api.clone(), config.validate_token),
        orders: OrdersService::new(api),
        session,
        gate,
    };

    let span = root_span(cli.command.name(), &TraceId::default());
    app.run(cli.command).instrument(span).await
}
