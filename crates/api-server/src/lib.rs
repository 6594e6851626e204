#![warn(clippy::unwrap_used)]

pub mod config_rest;
pub mod context_rest;
pub mod event_rest;
pub mod rest;
pub mod server;
pub mod swagger;

pub use rest::AppState;
pub use server::{router, ApiServer};
pub use swagger::ApiDoc;
