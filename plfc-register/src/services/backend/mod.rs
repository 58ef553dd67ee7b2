pub mod api;
pub mod client;

pub use api::*;
pub use client::{Backend, HttpBackend};
