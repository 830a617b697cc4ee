//! Synthetic order event producer for Kafka streaming pipelines.
//!
//! This crate continuously fabricates bounded-random order records and
//! publishes them, keyed by a monotonically increasing `order_id`, to a
//! Kafka topic, provisioning the topic on first use. Records are Avro
//! encoded through the Confluent schema registry.
//!
//! # Architecture
//!
//! ```text
//!        field bounds (YAML)
//!               │
//!               ▼
//!       ┌────────────────┐
//!       │ FieldGenerator │  orderstream-generator
//!       └───────┬────────┘
//!               │ GeneratedFields
//!               ▼
//!       ┌────────────────┐   order_id
//!       │  EventBuilder  │◄──────────────┐
//!       └───────┬────────┘               │
//!               │ OrderEvent             │
//!               ▼                        │
//!       ┌────────────────┐      ┌────────┴───────┐
//!       │ KafkaEventSink │◄─────│ ProductionLoop │──► TopicProvisioner
//!       └───────┬────────┘      └────────┬───────┘     (once, at startup)
//!               │ delivery outcomes      │
//!               ▼                        ▼
//!       ┌────────────────────────────────────────┐
//!       │             DeliveryTracker            │
//!       └────────────────────────────────────────┘
//! ```
//!
//! The loop runs `Starting → Running → Draining → Stopped`: provisioning and
//! schema registration happen once in `Starting`; each `Running` tick builds
//! one event, fires its publish, consumes completed delivery notifications
//! without blocking, logs the production record, and paces itself; `Draining`
//! blocks until every outstanding publish has a recorded outcome or the drain
//! timeout escalates.
//!
//! # Example
//!
//! ```rust,no_run
//! use orderstream::{EventBuilder, KafkaEventSink, ProductionLoop, TopicProvisioner};
//! use orderstream_generator::FieldGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bounds = serde_yaml::from_str("quantity: { min: 1, max: 5 }")?;
//!     let builder = EventBuilder::new(FieldGenerator::from_config(&bounds));
//!
//!     let provisioner = TopicProvisioner::new("localhost:9092", 3, 1)?;
//!     let sink = KafkaEventSink::new(
//!         "localhost:9092",
//!         "http://localhost:8081",
//!         "orders",
//!         provisioner,
//!     )?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
//!     let metrics = ProductionLoop::new(sink, builder).run(shutdown_rx).await?;
//!     println!("produced {} events", metrics.produced);
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod delivery;
pub mod encoder;
pub mod error;
pub mod event;
pub mod producer;
pub mod topic;

pub use args::ProducerArgs;
pub use delivery::{Delivery, DeliveryHandle, DeliveryTracker};
pub use encoder::{EventEncoder, KEY_SCHEMA, VALUE_SCHEMA};
pub use error::ProducerError;
pub use event::{EventBuilder, OrderEvent, OrderKey};
pub use producer::{
    EventSink, KafkaEventSink, LoopState, ProducerMetrics, ProductionLoop,
    DEFAULT_DRAIN_TIMEOUT, DEFAULT_PRODUCE_INTERVAL,
};
pub use topic::TopicProvisioner;
