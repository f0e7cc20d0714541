pub mod models;
pub mod queries;
pub mod sqlite;
pub mod stores;

pub use sqlite::Database;
pub use stores::{GrantStore, PreferenceStore, SqliteGrantStore, SqlitePreferenceStore};
