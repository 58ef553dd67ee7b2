//! P.League FC team registration client.
//!
//! Drives the registration pages against the league backend: the registration gate,
//! order creation, the payment provider hand-off, verification, and the thank-you and
//! teams views.

pub mod config;
pub mod controller;
pub mod dir;
pub mod logger;
pub mod services;
pub mod terminal;
pub mod views;

#[cfg(test)]
pub mod testutils;

pub use plfc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
