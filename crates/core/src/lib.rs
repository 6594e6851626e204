#![warn(clippy::unwrap_used)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use credentials::CredentialStore;
pub use error::{DialogError, DialogResult};
pub use types::{
    AnalyticsRecord, Credentials, CustomEvent, Direction, Event, EventType, MessageKind, Payload,
    Platform, UserProfile,
};
