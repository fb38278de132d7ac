//! Storage traits.

mod local_store;

pub use local_store::LocalStore;
