//! SQLite-backed fact store.

pub mod sqlite;

pub use sqlite::{StoreStats, Warehouse};
