//! The poll-check-notify loop.
//!
//! One iteration fetches a snapshot since the cursor, validates its shape,
//! formats the newest record, and delivers the message if it differs from the
//! last one sent. Every enumerated fault is caught at this boundary and the
//! loop keeps running; anything outside the taxonomy propagates and crashes
//! loudly. Only a fatal delivery failure (revoked bot credential) exits.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use reviewbot_client::StatusSource;
use reviewbot_client::snapshot;
use reviewbot_common::error::{ApiError, DeliveryError, FormatError, ShapeError};
use reviewbot_notifier::MessageSink;

use crate::format;

/// Retryable faults caught at the loop boundary.
#[derive(Debug, Error)]
enum Fault {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Mutable loop state: the poll cursor plus de-duplication memory.
///
/// Lives for the process lifetime, owned exclusively by the watcher, and
/// resets on restart. Never persisted.
#[derive(Debug)]
struct LoopState {
    cursor: i64,
    last_message: Option<String>,
    last_error: Option<String>,
}

/// What one iteration of the loop did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new status message was delivered.
    Notified,
    /// Status unchanged since the last delivered message; nothing sent.
    Unchanged,
    /// The API returned no records for the cursor window.
    Quiet,
    /// A retryable fault occurred; the loop keeps running.
    Fault,
    /// Delivery failed with a retryable error; the message stays unsent and
    /// is retried on the next iteration that produces it.
    SendDeferred,
}

/// Review status watcher that polls continuously until the task is cancelled
/// or a fatal delivery failure occurs.
pub struct Watcher<S, N> {
    source: S,
    sink: N,
    interval: Duration,
    state: LoopState,
}

impl<S: StatusSource, N: MessageSink> Watcher<S, N> {
    pub fn new(source: S, sink: N, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
            state: LoopState {
                cursor: Utc::now().timestamp(),
                last_message: None,
                last_error: None,
            },
        }
    }

    /// Start polling from the given timestamp instead of the current time.
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.state.cursor = cursor;
        self
    }

    /// Timestamp the next fetch will use as its `from_date`.
    pub fn cursor(&self) -> i64 {
        self.state.cursor
    }

    /// Run the poll loop indefinitely.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            cursor = self.state.cursor,
            "review watcher started"
        );

        loop {
            let outcome = self.tick().await?;
            tracing::debug!(?outcome, cursor = self.state.cursor, "iteration complete");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Execute one poll iteration.
    ///
    /// Returns `Err` only for fatal delivery failures; every retryable fault
    /// is handled here and reported through the outcome.
    pub async fn tick(&mut self) -> anyhow::Result<TickOutcome> {
        match self.poll_once().await {
            Ok(Some(message)) => self.deliver(message).await,
            Ok(None) => {
                tracing::debug!(cursor = self.state.cursor, "no homework updates");
                Ok(TickOutcome::Quiet)
            }
            Err(fault) => self.report_fault(fault).await,
        }
    }

    /// Fetch, advance the cursor, validate, and format the newest record.
    ///
    /// The cursor advances on every successful fetch, even when a later
    /// stage faults — the server already reported up to `current_date`.
    async fn poll_once(&mut self) -> Result<Option<String>, Fault> {
        let snapshot = self.source.fetch(self.state.cursor).await?;

        match snapshot::next_cursor(&snapshot) {
            Some(next) => self.state.cursor = next,
            None => tracing::debug!("snapshot carries no current_date, cursor unchanged"),
        }

        let Some(record) = snapshot::extract_latest(&snapshot)? else {
            return Ok(None);
        };

        Ok(Some(format::status_message(&record)?))
    }

    /// Send a status message unless it duplicates the last delivered one.
    async fn deliver(&mut self, message: String) -> anyhow::Result<TickOutcome> {
        if self.state.last_message.as_deref() == Some(message.as_str()) {
            tracing::debug!("status unchanged, suppressing duplicate notification");
            return Ok(TickOutcome::Unchanged);
        }

        match self.sink.send(&message).await {
            Ok(()) => {
                self.state.last_message = Some(message);
                Ok(TickOutcome::Notified)
            }
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, "fatal delivery failure, terminating");
                Err(err.into())
            }
            Err(DeliveryError::RateLimited { retry_after }) => {
                tracing::warn!(retry_after, "delivery rate limited, message kept for retry");
                Ok(TickOutcome::SendDeferred)
            }
            Err(err) => {
                tracing::error!(error = %err, "delivery failed, message kept for retry");
                Ok(TickOutcome::SendDeferred)
            }
        }
    }

    /// Log a retryable fault and send one de-duplicated notification about it.
    ///
    /// A failed fault notification is only logged — except a fatal delivery
    /// failure, which terminates from this path too.
    async fn report_fault(&mut self, fault: Fault) -> anyhow::Result<TickOutcome> {
        tracing::error!(error = %fault, "poll iteration failed");

        let text = format!("Review watcher fault: {fault}");
        if self.state.last_error.as_deref() == Some(text.as_str()) {
            tracing::debug!("identical fault already reported, suppressing");
            return Ok(TickOutcome::Fault);
        }

        match self.sink.send(&text).await {
            Ok(()) => self.state.last_error = Some(text),
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, "fatal delivery failure, terminating");
                return Err(err.into());
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not deliver fault notification");
            }
        }

        Ok(TickOutcome::Fault)
    }
}
