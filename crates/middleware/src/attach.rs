//! Outgoing attach middleware: copies the attached context onto each outgoing
//! event so the tracking middleware reports it with the message.

use crate::{Middleware, Outcome, Registration, MODULE_NAME};
use dialog_analytics::AttachedContext;
use dialog_core::{Direction, Event};
use tracing::trace;

pub struct AttachMiddleware {
    context: AttachedContext,
}

impl AttachMiddleware {
    pub fn new(context: AttachedContext) -> Self {
        Self { context }
    }
}

impl Middleware for AttachMiddleware {
    fn registration(&self) -> Registration {
        Registration {
            name: "dialog.outgoing.attach",
            module: MODULE_NAME,
            direction: Direction::Outgoing,
            order: 0,
            description: "Modifies the outgoing payload of Dialog Analytics",
        }
    }

    fn handle(&self, event: &mut Event) -> Outcome {
        let attached = self.context.snapshot();
        if attached.is_empty() {
            return Outcome::Skipped;
        }

        trace!(event_id = %event.correlation_id, keys = attached.len(), "Attaching context");
        // Context posted with the event itself takes precedence.
        for (key, value) in attached {
            event.context.entry(key).or_insert(value);
        }
        Outcome::Attached
    }
}
