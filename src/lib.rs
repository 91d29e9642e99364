//! Library exports for langproxy, shared between the binary and tests.

pub mod body;
pub mod client;
pub mod config;
pub mod guard;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod utils;
