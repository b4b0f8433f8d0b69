//! Route protection at two layers.
//!
//! ARCHITECTURE
//! ============
//! - [`edge`] runs as axum middleware before any dashboard asset is served.
//!   It sees only the `isAuthenticated` flag cookie, so it is fast and
//!   optimistic.
//! - [`client`] runs against the verified [`crate::session::AuthState`] and
//!   enforces role allow-lists.
//!
//! Both layers classify paths through the same [`routes::RouteTable`].

pub mod client;
pub mod edge;
pub mod routes;

pub use client::{ClientGuard, GuardDecision};
pub use edge::{EdgeDecision, EdgeGuard, edge_guard};
pub use routes::{RouteClass, RouteTable};
