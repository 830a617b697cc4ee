//! Delivery outcome tracking for asynchronous publishes.
//!
//! The producer fires publishes without waiting for the broker; each one
//! eventually reports a [`Delivery`] through a [`DeliveryHandle`] into the
//! tracker's channel. The production loop drains that channel without
//! blocking once per iteration, and shutdown drains it blockingly under a
//! bounded timeout so no publish exits the process with an unknown outcome.

use crate::error::ProducerError;
use rdkafka::error::KafkaError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Outcome of one asynchronous publish.
#[derive(Debug)]
pub enum Delivery {
    /// The broker acknowledged the record
    Delivered {
        topic: String,
        partition: i32,
        offset: i64,
    },
    /// The record was not delivered
    Failed { error: KafkaError },
}

/// Completion-side handle, safe to move into whatever task or callback
/// context reports the outcome.
#[derive(Clone)]
pub struct DeliveryHandle {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl DeliveryHandle {
    /// Report one outcome. A report after the tracker is gone is dropped.
    pub fn report(&self, outcome: Delivery) {
        let _ = self.tx.send(outcome);
    }
}

/// Records the outcome of every issued publish.
///
/// Pure outcome sink: outcomes are not correlated back to their originating
/// events. Owned by the production loop; only the cloneable [`DeliveryHandle`]
/// crosses task boundaries.
pub struct DeliveryTracker {
    // Kept so `recv` never observes a closed channel while draining
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
    issued: u64,
    delivered: u64,
    failed: u64,
}

impl Default for DeliveryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryTracker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            issued: 0,
            delivered: 0,
            failed: 0,
        }
    }

    /// Handle for the completion side of one or more publishes.
    pub fn handle(&self) -> DeliveryHandle {
        DeliveryHandle {
            tx: self.tx.clone(),
        }
    }

    /// Note that a publish was issued and an outcome is now owed.
    pub fn record_issued(&mut self) {
        self.issued += 1;
    }

    /// Note a publish that was rejected before it ever reached the broker
    /// queue; no notification will arrive for it.
    pub fn record_send_failure(&mut self) {
        self.issued += 1;
        self.failed += 1;
    }

    /// Consume every already-available outcome without blocking.
    ///
    /// Returns the number of outcomes processed; zero pending outcomes is
    /// not an error.
    pub fn poll_completions(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            self.observe(outcome);
            drained += 1;
        }
        drained
    }

    /// Block until every issued publish has a recorded outcome.
    ///
    /// Exceeding `timeout` is a shutdown error carrying the number of
    /// publishes still unacknowledged.
    pub async fn drain(&mut self, timeout: Duration) -> Result<(), ProducerError> {
        let deadline = Instant::now() + timeout;
        while self.outstanding() > 0 {
            let received = tokio::time::timeout_at(deadline, self.rx.recv()).await;
            match received {
                Ok(Some(outcome)) => self.observe(outcome),
                // Unreachable while we hold a sender, but not worth a panic
                Ok(None) => break,
                Err(_) => {
                    return Err(ProducerError::DrainTimeout {
                        outstanding: self.outstanding(),
                    })
                }
            }
        }
        Ok(())
    }

    fn observe(&mut self, outcome: Delivery) {
        match outcome {
            Delivery::Delivered {
                topic,
                partition,
                offset,
            } => {
                self.delivered += 1;
                debug!("delivered to {topic} [{partition}] at offset {offset}");
            }
            Delivery::Failed { error } => {
                self.failed += 1;
                warn!("message delivery failed: {error}");
            }
        }
    }

    /// Publishes issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Outcomes recorded as delivered.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Outcomes recorded as failed, including rejected sends.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Publishes still owed an outcome.
    pub fn outstanding(&self) -> u64 {
        self.issued - self.delivered - self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdkafka::types::RDKafkaErrorCode;

    fn delivered(offset: i64) -> Delivery {
        Delivery::Delivered {
            topic: "orders".to_string(),
            partition: 0,
            offset,
        }
    }

    fn failed() -> Delivery {
        Delivery::Failed {
            error: KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut),
        }
    }

    #[tokio::test]
    async fn test_poll_consumes_available_outcomes() {
        let mut tracker = DeliveryTracker::new();
        let handle = tracker.handle();

        tracker.record_issued();
        tracker.record_issued();
        handle.report(delivered(0));
        handle.report(failed());

        assert_eq!(tracker.poll_completions(), 2);
        assert_eq!(tracker.delivered(), 1);
        assert_eq!(tracker.failed(), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_poll_with_nothing_pending_returns_zero() {
        let mut tracker = DeliveryTracker::new();
        tracker.record_issued();

        assert_eq!(tracker.poll_completions(), 0);
        assert_eq!(tracker.outstanding(), 1);
    }

    #[tokio::test]
    async fn test_rejected_send_needs_no_notification() {
        let mut tracker = DeliveryTracker::new();
        tracker.record_send_failure();

        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.failed(), 1);
        tracker.drain(Duration::from_millis(10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_drain_waits_for_late_outcomes() {
        let mut tracker = DeliveryTracker::new();
        let handle = tracker.handle();

        tracker.record_issued();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.report(delivered(5));
        });

        tracker.drain(Duration::from_secs(5)).await.unwrap();
        assert_eq!(tracker.delivered(), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_drain_times_out_on_missing_outcome() {
        let mut tracker = DeliveryTracker::new();
        tracker.record_issued();

        let err = tracker.drain(Duration::from_millis(20)).await.unwrap_err();
        match err {
            ProducerError::DrainTimeout { outstanding } => assert_eq!(outstanding, 1),
            other => panic!("expected drain timeout, got {other}"),
        }
    }
}
