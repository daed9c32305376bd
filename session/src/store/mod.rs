use std::collections::HashMap;

pub mod session_store;
pub mod sqlite_store;

pub use session_store::SessionStore;
pub use sqlite_store::SQLiteKeyValueStore;

/// Durable string key-value namespace the session is persisted into.
///
/// `set_many` and `remove_many` are batches: an implementation must apply all
/// entries or none of them.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns only the keys that exist.
    async fn get_many(&self, keys: &[&str]) -> anyhow::Result<HashMap<String, String>>;
    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()>;
    async fn remove_many(&self, keys: &[&str]) -> anyhow::Result<()>;
}
