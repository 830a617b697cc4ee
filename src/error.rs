//! Error types for the orderstream producer.

use thiserror::Error;

/// Errors that can occur while producing order events.
///
/// Variants surfaced out of startup (`Kafka`, `SchemaRegistry`,
/// `TopicCreation`, `FieldConfig`, `Io`, `Yaml`) terminate the process;
/// `DrainTimeout` is the one shutdown-path failure.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Schema registry error: {0}")]
    SchemaRegistry(#[from] schema_registry_converter::error::SRCError),

    #[error("Topic creation error: {0}")]
    TopicCreation(String),

    #[error("Field configuration error: {0}")]
    FieldConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("shutdown drain timed out with {outstanding} deliveries unacknowledged")]
    DrainTimeout { outstanding: u64 },
}
