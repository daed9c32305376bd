pub mod error;
pub mod gate;
pub mod manager;
pub mod model;
pub mod store;

pub use error::SessionError;
pub use gate::{NavigationError, NavigationGate, Screen, Workspace};
pub use manager::SessionManager;
pub use model::{AuthState, Role, Session};
pub use store::{KeyValueStore, SQLiteKeyValueStore, SessionStore};
