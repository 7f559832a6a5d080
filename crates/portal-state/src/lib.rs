// ============================
// portal-state/src/lib.rs
// ============================
//! Client-side state core for the boathouse media portal.
//!
//! Two managers with an explicit init/teardown lifecycle: the
//! [`session::SessionManager`] owns the authenticated identity and its
//! durable persistence, and the [`menu::MenuState`] owns the filter
//! selection and the fetched asset list, gated on the session.

pub mod error;
pub mod http;
pub mod menu;
pub mod session;

pub use error::StateError;
pub use http::{HttpAuthClient, HttpCatalogClient};
pub use menu::{CatalogClient, CatalogMenu, FilterField, FilterOption, FilterSelection, MenuState};
pub use session::{
    AuthClient, FileSessionStore, SessionManager, SessionStore, StoredSession, SESSION_TTL_SECS,
};
