//! Session, route-guard, settings and theming core of the charity admin
//! dashboard, plus the axum server that hosts the built dashboard.

pub mod api;
pub mod config;
pub mod guard;
pub mod nav;
pub mod routes;
pub mod session;
pub mod settings;
pub mod state;
pub mod theme;
