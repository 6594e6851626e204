#![warn(clippy::unwrap_used)]

//! Dialog Analytics client and the background tracker that feeds it.

pub mod client;
pub mod context;
pub mod sink;
pub mod tracker;

pub use client::{DialogClient, SharedCredentials};
pub use context::AttachedContext;
pub use sink::{AnalyticsSink, CaptureSink};
pub use tracker::Tracker;
