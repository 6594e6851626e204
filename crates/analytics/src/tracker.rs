//! Fire-and-forget tracker with a background sender.
//!
//! Submissions go through a bounded channel to a task that delivers them one
//! by one. Failures are logged at debug level and dropped: nothing is
//! retried and nothing reaches the caller.

use crate::sink::AnalyticsSink;
use dialog_core::{AnalyticsRecord, CustomEvent, DialogError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum Submission {
    Track(AnalyticsRecord),
    Event(CustomEvent),
}

impl Submission {
    fn label(&self) -> &'static str {
        match self {
            Submission::Track(_) => "track",
            Submission::Event(_) => "event",
        }
    }
}

#[derive(Clone)]
pub struct Tracker {
    sender: mpsc::Sender<Submission>,
}

impl Tracker {
    /// Create a tracker and spawn its background sender on the current runtime.
    pub fn spawn(sink: Arc<dyn AnalyticsSink>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Submission>(capacity.max(1));

        tokio::spawn(async move {
            run(sink, receiver).await;
        });

        info!(capacity, "Analytics tracker started");

        Self { sender }
    }

    /// Queue a record. Returns `false` when it had to be dropped.
    pub fn track(&self, record: AnalyticsRecord) -> bool {
        self.submit(Submission::Track(record))
    }

    /// Queue a custom event. Returns `false` when it had to be dropped.
    pub fn event(&self, event: CustomEvent) -> bool {
        self.submit(Submission::Event(event))
    }

    fn submit(&self, submission: Submission) -> bool {
        let label = submission.label();
        if let Err(e) = self.sender.try_send(submission) {
            metrics::counter!("dialog.tracker.dropped", "kind" => label).increment(1);
            warn!(kind = label, "Analytics submission dropped: {}", e);
            false
        } else {
            metrics::counter!("dialog.tracker.queued", "kind" => label).increment(1);
            true
        }
    }
}

async fn run(sink: Arc<dyn AnalyticsSink>, mut receiver: mpsc::Receiver<Submission>) {
    while let Some(submission) = receiver.recv().await {
        deliver(sink.as_ref(), submission).await;
    }
    debug!("Analytics tracker channel closed");
}

async fn deliver(sink: &dyn AnalyticsSink, submission: Submission) {
    let label = submission.label();
    let result = match &submission {
        Submission::Track(record) => sink.track(record).await,
        Submission::Event(event) => sink.event(event).await,
    };

    match result {
        Ok(_) => {
            metrics::counter!("dialog.tracker.delivered", "kind" => label).increment(1);
            debug!(kind = label, "Analytics submission delivered");
        }
        Err(DialogError::Api { code, error }) => {
            metrics::counter!("dialog.tracker.errors", "kind" => label).increment(1);
            debug!(kind = label, code = %code, error = %error, "Analytics API rejected submission");
        }
        Err(e) => {
            metrics::counter!("dialog.tracker.errors", "kind" => label).increment(1);
            debug!(kind = label, error = %e, "Analytics submission failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::DialogClient;
    use crate::sink::CaptureSink;
    use async_trait::async_trait;
    use dialog_core::config::AnalyticsConfig;
    use dialog_core::types::{ConversationRecord, CreatorRecord, MessageRecord};
    use dialog_core::{Credentials, DialogResult};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Delivers through a real client and counts what came back.
    struct CountingSink {
        client: DialogClient,
        attempts: AtomicUsize,
        transport_errors: AtomicUsize,
    }

    impl CountingSink {
        fn observe(&self, result: DialogResult<Value>) -> DialogResult<Value> {
            if matches!(result, Err(DialogError::Transport(_))) {
                self.transport_errors.fetch_add(1, Ordering::SeqCst);
            }
            self.attempts.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    #[async_trait]
    impl AnalyticsSink for CountingSink {
        async fn track(&self, record: &AnalyticsRecord) -> DialogResult<Value> {
            let result = self.client.track(record).await;
            self.observe(result)
        }

        async fn event(&self, event: &CustomEvent) -> DialogResult<Value> {
            let result = self.client.event(event).await;
            self.observe(result)
        }
    }

    fn record(id: &str) -> AnalyticsRecord {
        AnalyticsRecord {
            message: MessageRecord {
                distinct_id: id.to_string(),
                platform: "messenger".into(),
                provider: "botpress".into(),
                mtype: Some("text".into()),
                sent_at: 1.0,
                properties: Default::default(),
            },
            conversation: ConversationRecord {
                distinct_id: "u-bot".into(),
            },
            creator: CreatorRecord::bot("bot"),
        }
    }

    async fn wait_for(sink: &CaptureSink, count: usize) {
        for _ in 0..100 {
            if sink.count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sink saw {} submissions, expected {}", sink.count(), count);
    }

    #[tokio::test]
    async fn test_records_and_events_are_delivered() {
        let sink = Arc::new(CaptureSink::new());
        let tracker = Tracker::spawn(sink.clone(), 16);

        assert!(tracker.track(record("m-1")));
        assert!(tracker.event(CustomEvent {
            name: "checkout".into(),
            distinct_id: Some("u-1".into()),
            properties: Default::default(),
        }));

        wait_for(&sink, 2).await;
        assert_eq!(sink.records()[0].message.distinct_id, "m-1");
        assert_eq!(sink.events()[0].name, "checkout");
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let sink = Arc::new(CaptureSink::failing());
        let tracker = Tracker::spawn(sink.clone(), 16);

        assert!(tracker.track(record("m-1")));
        assert!(tracker.track(record("m-2")));

        // The worker keeps going after an error.
        wait_for(&sink, 2).await;
        assert_eq!(sink.records().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_api_does_not_stop_worker() {
        let config = AnalyticsConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_ms: 2_000,
            ..AnalyticsConfig::default()
        };
        let sink = Arc::new(CountingSink {
            client: DialogClient::new(&config, Credentials::new("tok", "bot")).unwrap(),
            attempts: AtomicUsize::new(0),
            transport_errors: AtomicUsize::new(0),
        });
        let tracker = Tracker::spawn(sink.clone(), 16);

        assert!(tracker.track(record("m-1")));
        assert!(tracker.track(record("m-2")));
        let settled = async {
            while sink.attempts.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), settled).await.unwrap();

        // A later submission is still picked up.
        assert!(tracker.event(CustomEvent {
            name: "checkout".into(),
            distinct_id: None,
            properties: Default::default(),
        }));
        let settled = async {
            while sink.attempts.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), settled).await.unwrap();

        assert_eq!(sink.transport_errors.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_submission() {
        let sink = Arc::new(CaptureSink::new());
        let tracker = Tracker::spawn(sink.clone(), 1);

        // The worker has not run yet on a current-thread runtime, so the
        // second submission finds the queue full.
        assert!(tracker.track(record("m-1")));
        assert!(!tracker.track(record("m-2")));

        wait_for(&sink, 1).await;
        assert_eq!(sink.records()[0].message.distinct_id, "m-1");
    }
}
