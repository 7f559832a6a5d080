// ============================
// backend-lib/src/users/mod.rs
// ============================
//! User accounts: records and the document store that holds them.

pub mod store;

pub use store::{FlatFileUserStore, UserRecord, UserStore};
