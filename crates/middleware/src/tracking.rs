//! Tracking middleware: normalizes qualifying events and hands the records to
//! the tracker.

use crate::{Middleware, Outcome, Registration, MODULE_NAME};
use dialog_analytics::{SharedCredentials, Tracker};
use dialog_core::{Direction, Event};
use dialog_normalizer::{NormalizeContext, Normalizer};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TrackingMiddleware {
    direction: Direction,
    normalizer: Arc<Normalizer>,
    tracker: Tracker,
    credentials: SharedCredentials,
    platforms: HashSet<String>,
}

impl TrackingMiddleware {
    pub fn new(
        direction: Direction,
        normalizer: Arc<Normalizer>,
        tracker: Tracker,
        credentials: SharedCredentials,
        platforms: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            direction,
            normalizer,
            tracker,
            credentials,
            platforms: platforms.into_iter().collect(),
        }
    }
}

impl Middleware for TrackingMiddleware {
    fn registration(&self) -> Registration {
        match self.direction {
            Direction::Incoming => Registration {
                name: "dialog.incoming",
                module: MODULE_NAME,
                direction: Direction::Incoming,
                order: 0,
                description: "Tracks incoming messages with Dialog Analytics",
            },
            // Runs last so context attached earlier in the chain is reported.
            Direction::Outgoing => Registration {
                name: "dialog.outgoing",
                module: MODULE_NAME,
                direction: Direction::Outgoing,
                order: 99,
                description: "Tracks outgoing messages with Dialog Analytics",
            },
        }
    }

    fn handle(&self, event: &mut Event) -> Outcome {
        if !self.platforms.contains(event.platform.as_str()) {
            return Outcome::Ignored;
        }

        let bot_id = self.credentials.bot_id();
        let ctx = NormalizeContext::new(&bot_id);

        match self.normalizer.normalize(event, self.direction, &ctx) {
            Ok(Some(record)) => {
                if self.tracker.track(record) {
                    debug!(
                        direction = %self.direction,
                        event_id = %event.correlation_id,
                        "Message queued for tracking"
                    );
                    Outcome::Tracked
                } else {
                    Outcome::Dropped
                }
            }
            Ok(None) => Outcome::Skipped,
            Err(e) => {
                metrics::counter!("dialog.records.unsupported").increment(1);
                warn!(
                    direction = %self.direction,
                    event_id = %event.correlation_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Event not tracked"
                );
                Outcome::Unsupported
            }
        }
    }
}
