//! The production loop: event assembly, publish issuance, pacing, shutdown.

use crate::delivery::{Delivery, DeliveryHandle, DeliveryTracker};
use crate::encoder::EventEncoder;
use crate::error::ProducerError;
use crate::event::{EventBuilder, OrderEvent};
use crate::topic::TopicProvisioner;
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Fixed inter-iteration delay of the reference deployment.
pub const DEFAULT_PRODUCE_INTERVAL: Duration = Duration::from_millis(300);

/// Bound on the shutdown flush.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Destination for order events.
///
/// `publish` is fire-and-forget: it returns once the record is handed off,
/// and the eventual outcome arrives through the given [`DeliveryHandle`].
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Make the destination ready for production; failure is fatal to startup.
    async fn prepare(&self) -> Result<(), ProducerError>;

    /// Issue one publish. An `Err` means the record never reached the
    /// outgoing queue and no delivery notification will follow.
    async fn publish(
        &self,
        event: &OrderEvent,
        completions: DeliveryHandle,
    ) -> Result<(), ProducerError>;
}

/// Kafka-backed sink: registry-framed Avro records published through a
/// [`FutureProducer`], with per-publish watcher tasks forwarding delivery
/// outcomes into the tracker channel.
pub struct KafkaEventSink {
    producer: FutureProducer,
    encoder: EventEncoder,
    provisioner: TopicProvisioner,
    topic: String,
}

impl KafkaEventSink {
    pub fn new(
        broker: &str,
        registry_url: &str,
        topic: &str,
        provisioner: TopicProvisioner,
    ) -> Result<Self, ProducerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            encoder: EventEncoder::new(registry_url, topic),
            provisioner,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl EventSink for KafkaEventSink {
    async fn prepare(&self) -> Result<(), ProducerError> {
        self.provisioner.ensure(&self.topic).await?;
        self.encoder.register_schemas().await
    }

    async fn publish(
        &self,
        event: &OrderEvent,
        completions: DeliveryHandle,
    ) -> Result<(), ProducerError> {
        let key = self.encoder.encode_key(&event.key).await?;
        let payload = self.encoder.encode_value(event).await?;

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        let delivery = match self.producer.send_result(record) {
            Ok(delivery) => delivery,
            Err((e, _record)) => return Err(e.into()),
        };

        let topic = self.topic.clone();
        tokio::spawn(async move {
            let outcome = match delivery.await {
                Ok(Ok(rdkafka::producer::future_producer::Delivery {
                    partition,
                    offset,
                    ..
                })) => Delivery::Delivered {
                    topic,
                    partition,
                    offset,
                },
                Ok(Err((error, _message))) => Delivery::Failed { error },
                Err(_canceled) => Delivery::Failed {
                    error: rdkafka::error::KafkaError::Canceled,
                },
            };
            completions.report(outcome);
        });

        Ok(())
    }
}

/// Production loop states. There is no failed state: unrecovered errors
/// propagate out of [`ProductionLoop::run`] and terminate the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Running,
    Draining,
    Stopped,
}

/// Final accounting for one producer run.
#[derive(Debug, Clone, Default)]
pub struct ProducerMetrics {
    /// Publishes issued, including rejected sends
    pub produced: u64,
    /// Deliveries acknowledged by the broker
    pub delivered: u64,
    /// Failed deliveries and rejected sends
    pub failed: u64,
    /// Wall-clock time from startup through drain
    pub total_duration: Duration,
}

impl ProducerMetrics {
    /// Events issued per second over the whole run.
    pub fn events_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.produced as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Top-level driver: provisions the destination once, then produces one
/// event per tick until cancelled, and drains outstanding deliveries on the
/// way out.
pub struct ProductionLoop<S> {
    sink: S,
    builder: EventBuilder,
    tracker: DeliveryTracker,
    interval: Duration,
    drain_timeout: Duration,
    state: LoopState,
    next_order_id: i32,
    sequence: u64,
}

impl<S: EventSink> ProductionLoop<S> {
    pub fn new(sink: S, builder: EventBuilder) -> Self {
        Self {
            sink,
            builder,
            tracker: DeliveryTracker::new(),
            interval: DEFAULT_PRODUCE_INTERVAL,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            state: LoopState::Starting,
            next_order_id: 1,
            sequence: 1,
        }
    }

    /// Set the fixed inter-iteration delay.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the bound on the shutdown flush.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    /// Run until the shutdown signal fires, then drain.
    ///
    /// Per iteration: check the cancellation token, build one event, issue
    /// its publish, consume any completed delivery notifications without
    /// blocking, log the production record, pace, advance the identifier.
    /// The pacing delay is a deliberate throughput cap, applied regardless
    /// of queue depth.
    pub async fn run(
        &mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<ProducerMetrics, ProducerError> {
        let start = Instant::now();

        self.state = LoopState::Starting;
        self.sink.prepare().await?;

        self.state = LoopState::Running;
        info!("production loop running");

        loop {
            match shutdown.try_recv() {
                Err(broadcast::error::TryRecvError::Empty) => {}
                // Signal received, or the signal task is gone
                _ => break,
            }

            let event = self.builder.build(self.next_order_id);

            match self.sink.publish(&event, self.tracker.handle()).await {
                Ok(()) => self.tracker.record_issued(),
                Err(e) => {
                    warn!("publish of order {} rejected: {e}", event.key.order_id);
                    self.tracker.record_send_failure();
                }
            }

            self.tracker.poll_completions();

            info!(
                "produced event {}: key={:?} value={:?}",
                self.sequence, event.key, event.value
            );

            tokio::time::sleep(self.interval).await;

            self.next_order_id += 1;
            self.sequence += 1;
        }

        self.state = LoopState::Draining;
        info!(
            "draining {} outstanding deliveries",
            self.tracker.outstanding()
        );
        let drained = self.tracker.drain(self.drain_timeout).await;
        self.state = LoopState::Stopped;
        drained?;

        Ok(ProducerMetrics {
            produced: self.tracker.issued(),
            delivered: self.tracker.delivered(),
            failed: self.tracker.failed(),
            total_duration: start.elapsed(),
        })
    }
}
