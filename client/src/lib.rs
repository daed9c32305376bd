pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod orders;

mod de;

pub use api::ApiClient;
pub use auth::AuthService;
pub use config::AppConfig;
pub use error::ClientError;
pub use http::{HttpTransport, Transport};
pub use orders::OrdersService;
