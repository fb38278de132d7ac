//! Storage layer.
//!
//! - [`cache`]: process-lifetime response cache in front of the remote catalog
//! - [`traits`] and [`sqlite`]: the durable local store for favorites and filters
//! - [`records`]: records owned by the local store

// Dropping the connection guard a few statements early buys nothing.
#![allow(clippy::significant_drop_tightening)]

pub mod cache;
pub mod records;
pub mod sqlite;
pub mod traits;

pub use cache::{InMemoryCache, ResponseCache};
pub use records::{FavoriteFilmRecord, FavoritePersonRecord, SelectedFilterRecord};
pub use sqlite::{EXTERNAL_COMMIT_POLL_INTERVAL, SqliteLocalStore};
pub use traits::LocalStore;
