//! `SQLite` local store.
//!
//! ## Module Structure
//!
//! - [`connection`]: lock acquisition, pragmas and error mapping
//! - [`rows`]: schema and row conversion for the three record families
//! - [`local_store`]: [`SqliteLocalStore`], the [`LocalStore`](crate::storage::LocalStore) backend

mod connection;
mod local_store;
mod rows;

pub use connection::{acquire_lock, configure_connection};
pub use local_store::{EXTERNAL_COMMIT_POLL_INTERVAL, SqliteLocalStore};
pub use rows::SCHEMA_VERSION;
