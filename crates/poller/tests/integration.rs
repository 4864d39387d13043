//! End-to-end poll loop scenarios against scripted fetch results and a
//! recording message sink. No network required; run with:
//!
//! ```bash
//! cargo test -p reviewbot-poller --test integration
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use reviewbot_client::StatusSource;
use reviewbot_common::error::{ApiError, DeliveryError};
use reviewbot_notifier::MessageSink;
use reviewbot_poller::watcher::{TickOutcome, Watcher};

// ============================================================
// Shared helpers
// ============================================================

struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, _from_date: i64) -> Result<Value, ApiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<VecDeque<DeliveryError>>>,
}

impl RecordingSink {
    fn fail_next(&self, err: DeliveryError) {
        self.failures.lock().unwrap().push_back(err);
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn snapshot(status: &str, current_date: i64) -> Value {
    json!({
        "homeworks": [{"name": "final-project", "status": status}],
        "current_date": current_date
    })
}

fn quiet_snapshot(current_date: i64) -> Value {
    json!({ "homeworks": [], "current_date": current_date })
}

fn watcher_with(
    responses: Vec<Result<Value, ApiError>>,
) -> (Watcher<ScriptedSource, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::default();
    let watcher = Watcher::new(
        ScriptedSource::new(responses),
        sink.clone(),
        Duration::from_secs(0),
    )
    .with_cursor(100);
    (watcher, sink)
}

// ============================================================
// Full review lifecycle
// ============================================================

#[tokio::test]
async fn test_review_lifecycle_reviewing_to_approved() {
    let (mut watcher, sink) = watcher_with(vec![
        Ok(snapshot("reviewing", 200)),
        Ok(quiet_snapshot(300)),
        Ok(snapshot("reviewing", 400)),
        Ok(snapshot("approved", 500)),
    ]);

    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Notified);
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Quiet);
    // Same verdict reappearing after a quiet period is still a duplicate
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Unchanged);
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Notified);

    assert_eq!(
        sink.sent(),
        vec![
            "Changed review status for \"final-project\". submission taken up for review."
                .to_string(),
            "Changed review status for \"final-project\". review complete: reviewer has no complaints."
                .to_string(),
        ]
    );
    assert_eq!(watcher.cursor(), 500);
}

#[tokio::test]
async fn test_fault_recovery_resumes_notifications() {
    let endpoint = "https://example.test/statuses/".to_string();
    let (mut watcher, sink) = watcher_with(vec![
        Err(ApiError::Status {
            endpoint: endpoint.clone(),
            status: 503,
        }),
        Err(ApiError::Status {
            endpoint,
            status: 503,
        }),
        Ok(snapshot("rejected", 900)),
    ]);

    // Outage: one fault notification, cursor pinned
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Fault);
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Fault);
    assert_eq!(sink.sent().len(), 1);
    assert_eq!(watcher.cursor(), 100);

    // Recovery: the real status goes out and the cursor catches up
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Notified);
    assert_eq!(watcher.cursor(), 900);
    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("reviewer left comments"));
}

#[tokio::test]
async fn test_deferred_delivery_sends_on_next_iteration() {
    let (mut watcher, sink) = watcher_with(vec![
        Ok(snapshot("approved", 200)),
        Ok(snapshot("approved", 300)),
        Ok(snapshot("approved", 400)),
    ]);
    sink.fail_next(DeliveryError::RateLimited { retry_after: 5 });

    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::SendDeferred);
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Notified);
    // Delivered exactly once despite three identical polls
    assert_eq!(watcher.tick().await.unwrap(), TickOutcome::Unchanged);
    assert_eq!(sink.sent().len(), 1);
    assert_eq!(watcher.cursor(), 400);
}

#[tokio::test]
async fn test_revoked_credential_stops_the_loop() {
    let (mut watcher, sink) = watcher_with(vec![Ok(snapshot("approved", 200))]);
    sink.fail_next(DeliveryError::Unauthorized {
        detail: "bot was blocked by the user".to_string(),
    });

    let err = watcher.tick().await.unwrap_err();
    assert!(err.to_string().contains("credential"));
}
