#![warn(clippy::unwrap_used)]

//! Middleware registrations for the bot framework's event pipeline.
//!
//! Every handler in a [`MiddlewareChain`] runs for every event of its
//! direction, in ascending `order`. Handlers report an [`Outcome`] but can
//! never stop the chain: tracking problems stay inside the middleware.
//! Handlers may modify the event for the ones that run after them.

pub mod attach;
pub mod tracking;

use dialog_analytics::{AttachedContext, SharedCredentials, Tracker};
use dialog_core::config::NormalizerConfig;
use dialog_core::{Direction, Event};
use dialog_normalizer::Normalizer;
use serde::Serialize;
use std::sync::Arc;

pub use attach::AttachMiddleware;
pub use tracking::TrackingMiddleware;

pub const MODULE_NAME: &str = "botpress-dialog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: &'static str,
    pub module: &'static str,
    pub direction: Direction,
    pub order: i32,
    pub description: &'static str,
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A record was queued for delivery.
    Tracked,
    /// The event type has no enabled mapping.
    Skipped,
    /// The platform is not tracked.
    Ignored,
    /// The raw payload lacked a field its mapping needs.
    Unsupported,
    /// The tracker queue was full.
    Dropped,
    /// Attached context was copied onto the event.
    Attached,
}

pub trait Middleware: Send + Sync {
    fn registration(&self) -> Registration;
    fn handle(&self, event: &mut Event) -> Outcome;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChainReport {
    pub outcomes: Vec<(&'static str, Outcome)>,
}

impl ChainReport {
    pub fn tracked(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| *o == Outcome::Tracked)
    }
}

#[derive(Default)]
pub struct MiddlewareChain {
    incoming: Vec<Arc<dyn Middleware>>,
    outgoing: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain with the outgoing attach middleware and the incoming and
    /// outgoing tracking middlewares registered.
    pub fn dialog(
        config: &NormalizerConfig,
        tracker: Tracker,
        credentials: SharedCredentials,
        context: AttachedContext,
    ) -> Self {
        let normalizer = Arc::new(Normalizer::from_config(config));
        let mut chain = Self::new();
        chain.register(Arc::new(AttachMiddleware::new(context)));
        for direction in [Direction::Incoming, Direction::Outgoing] {
            chain.register(Arc::new(TrackingMiddleware::new(
                direction,
                normalizer.clone(),
                tracker.clone(),
                credentials.clone(),
                config.platforms.iter().cloned(),
            )));
        }
        chain
    }

    /// Add a handler, keeping each direction sorted by order. Handlers with
    /// equal order run in registration order.
    pub fn register(&mut self, middleware: Arc<dyn Middleware>) {
        let registration = middleware.registration();
        let list = match registration.direction {
            Direction::Incoming => &mut self.incoming,
            Direction::Outgoing => &mut self.outgoing,
        };
        let position = list.partition_point(|m| m.registration().order <= registration.order);
        list.insert(position, middleware);
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.incoming
            .iter()
            .chain(self.outgoing.iter())
            .map(|m| m.registration())
            .collect()
    }

    pub fn run(&self, direction: Direction, event: &mut Event) -> ChainReport {
        let list = match direction {
            Direction::Incoming => &self.incoming,
            Direction::Outgoing => &self.outgoing,
        };
        ChainReport {
            outcomes: list
                .iter()
                .map(|m| (m.registration().name, m.handle(event)))
                .collect(),
        }
    }
}
