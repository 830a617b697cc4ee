//! CLI argument definitions for the orderstream producer.

use crate::error::ProducerError;
use clap::Parser;
use std::path::PathBuf;

/// Field bounds of the reference deployment, used when no `--fields` file
/// is given.
pub const DEFAULT_FIELD_BOUNDS: &str = r#"
customer_id: { min: 1, max: 1000 }
seller_id: { min: 1, max: 1000 }
billing_id: { min: 1, max: 5 }
shipping_address_id: { min: 1, max: 10 }
product_id: { min: 1, max: 10000 }
quantity: { min: 1, max: 5 }
price_in_cents: { min: 100, max: 10000 }
"#;

/// Producer arguments. Broker, registry, and topic are mandatory; a missing
/// value (flag and environment both absent) fails startup.
#[derive(Parser, Clone, Debug)]
#[command(name = "orderstream", about = "Synthetic order event producer for Kafka")]
pub struct ProducerArgs {
    /// Kafka bootstrap servers (comma-separated, e.g. "localhost:9092")
    #[arg(long, env = "BROKER")]
    pub broker: String,

    /// Confluent schema registry URL
    #[arg(long, env = "SCHEMA_REGISTRY_URL")]
    pub schema_registry_url: String,

    /// Destination topic
    #[arg(long, env = "TOPIC_NAME")]
    pub topic: String,

    /// Fixed delay between produced events, in milliseconds
    #[arg(long, default_value = "300")]
    pub interval_ms: u64,

    /// Partitions for a newly created topic
    #[arg(long, default_value = "3")]
    pub partitions: i32,

    /// Replication factor for a newly created topic
    #[arg(long, default_value = "1")]
    pub replication: i32,

    /// Bound on the shutdown flush, in seconds
    #[arg(long, default_value = "30")]
    pub drain_timeout_secs: u64,

    /// Path to a YAML field-bounds file (field -> {min, max})
    #[arg(long)]
    pub fields: Option<PathBuf>,

    /// Random seed for reproducible generation (entropy-seeded when absent)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ProducerArgs {
    /// Load the field-bounds mapping from `--fields`, or the built-in
    /// reference bounds.
    ///
    /// Only the top-level shape is checked here; per-entry validation (and
    /// skipping) belongs to the field generator.
    pub fn load_field_bounds(&self) -> Result<serde_yaml::Mapping, ProducerError> {
        let raw = match &self.fields {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_FIELD_BOUNDS.to_string(),
        };

        let value: serde_yaml::Value = serde_yaml::from_str(&raw)?;
        value.as_mapping().cloned().ok_or_else(|| {
            ProducerError::FieldConfig("field bounds must be a top-level mapping".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderstream_generator::validate_fields;

    #[test]
    fn test_default_bounds_all_validate() {
        let config: serde_yaml::Mapping = serde_yaml::from_str(DEFAULT_FIELD_BOUNDS).unwrap();
        let (specs, errors) = validate_fields(&config);

        assert!(errors.is_empty());
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "customer_id",
                "seller_id",
                "billing_id",
                "shipping_address_id",
                "product_id",
                "quantity",
                "price_in_cents",
            ]
        );
    }

    #[test]
    fn test_mandatory_args_fail_fast_when_absent() {
        // No flags and no environment: parsing must error, not default
        let result = ProducerArgs::try_parse_from(["orderstream"]);
        if std::env::var("BROKER").is_err()
            && std::env::var("SCHEMA_REGISTRY_URL").is_err()
            && std::env::var("TOPIC_NAME").is_err()
        {
            assert!(result.is_err());
        }
    }
}
