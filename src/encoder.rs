//! Avro encoding through the Confluent schema registry.
//!
//! Key and value schemas are registered under the topic's `-key` / `-value`
//! subjects at startup; a registry that cannot be reached then is a fatal
//! startup error. Per-event encoding uses the converter's cached schema ids,
//! producing Confluent wire format (magic byte, big-endian schema id, Avro
//! datum).

use crate::error::ProducerError;
use crate::event::{OrderEvent, OrderKey};
use schema_registry_converter::async_impl::avro::AvroEncoder;
use schema_registry_converter::async_impl::schema_registry::{post_schema, SrSettings};
use schema_registry_converter::schema_registry_common::{
    SchemaType, SubjectNameStrategy, SuppliedSchema,
};
use tracing::info;

/// Avro schema for the event key.
pub const KEY_SCHEMA: &str = r#"
{
    "namespace": "orders",
    "name": "key",
    "type": "record",
    "fields": [
        {"name": "order_id", "type": "int", "doc": "order id"}
    ]
}
"#;

/// Avro schema for the event value.
///
/// `order_id` is repeated here because downstream consumers that cannot
/// decode the Avro-encoded key still need the identifier.
pub const VALUE_SCHEMA: &str = r#"
{
    "namespace": "orders",
    "name": "value",
    "type": "record",
    "fields": [
        {"name": "order_id", "type": "int", "doc": "order id"},
        {"name": "customer_id", "type": "int", "doc": "customer id"},
        {"name": "seller_id", "type": "int", "doc": "seller id"},
        {"name": "billing_id", "type": "int", "doc": "id of the billing method for the customer"},
        {"name": "shipping_address_id", "type": "int", "doc": "id of the shipping address for the customer"},
        {"name": "product_id", "type": "int", "doc": "product id"},
        {"name": "quantity", "type": "int", "doc": "how much of the product the customer wants"},
        {"name": "price_in_cents", "type": "int", "doc": "price in cents. US currency"}
    ]
}
"#;

/// Encodes event keys and values as registry-framed Avro.
pub struct EventEncoder {
    sr_settings: SrSettings,
    avro: AvroEncoder<'static>,
    topic: String,
    key_strategy: SubjectNameStrategy,
    value_strategy: SubjectNameStrategy,
}

impl EventEncoder {
    pub fn new(registry_url: &str, topic: &str) -> Self {
        let sr_settings = SrSettings::new(registry_url.to_string());
        let avro = AvroEncoder::new(sr_settings.clone());
        let key_strategy = SubjectNameStrategy::TopicNameStrategyWithSchema(
            topic.to_string(),
            true,
            key_schema(),
        );
        let value_strategy = SubjectNameStrategy::TopicNameStrategyWithSchema(
            topic.to_string(),
            false,
            value_schema(),
        );
        Self {
            sr_settings,
            avro,
            topic: topic.to_string(),
            key_strategy,
            value_strategy,
        }
    }

    /// Register both schemas with the registry.
    ///
    /// Run once before production starts so an unreachable registry fails
    /// startup instead of the first event. Re-registration of an identical
    /// schema returns the existing id.
    pub async fn register_schemas(&self) -> Result<(), ProducerError> {
        let key = post_schema(
            &self.sr_settings,
            format!("{}-key", self.topic),
            key_schema(),
        )
        .await?;
        info!("registered key schema for '{}' (id {})", self.topic, key.id);

        let value = post_schema(
            &self.sr_settings,
            format!("{}-value", self.topic),
            value_schema(),
        )
        .await?;
        info!(
            "registered value schema for '{}' (id {})",
            self.topic, value.id
        );

        Ok(())
    }

    /// Encode the key record.
    pub async fn encode_key(&self, key: &OrderKey) -> Result<Vec<u8>, ProducerError> {
        Ok(self.avro.encode_struct(key, &self.key_strategy).await?)
    }

    /// Encode the value record.
    ///
    /// Fails if a generated field required by the value schema was skipped
    /// by validation; the caller treats that as an event-level failure.
    pub async fn encode_value(&self, event: &OrderEvent) -> Result<Vec<u8>, ProducerError> {
        Ok(self
            .avro
            .encode_struct(&event.value, &self.value_strategy)
            .await?)
    }
}

fn key_schema() -> SuppliedSchema {
    SuppliedSchema {
        name: Some("orders.key".to_string()),
        schema_type: SchemaType::Avro,
        schema: KEY_SCHEMA.to_string(),
        references: vec![],
        properties: None,
        tags: None,
    }
}

fn value_schema() -> SuppliedSchema {
    SuppliedSchema {
        name: Some("orders.value".to_string()),
        schema_type: SchemaType::Avro,
        schema: VALUE_SCHEMA.to_string(),
        references: vec![],
        properties: None,
        tags: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::Schema;

    #[test]
    fn test_schemas_are_valid_avro() {
        Schema::parse_str(KEY_SCHEMA).unwrap();
        Schema::parse_str(VALUE_SCHEMA).unwrap();
    }

    #[test]
    fn test_value_schema_covers_the_reference_fields() {
        let schema = Schema::parse_str(VALUE_SCHEMA).unwrap();
        let Schema::Record(record) = schema else {
            panic!("value schema is not a record");
        };

        let names: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "order_id",
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
    fn test_key_and_value_agree_on_the_identifier_field() {
        let key = Schema::parse_str(KEY_SCHEMA).unwrap();
        let Schema::Record(record) = key else {
            panic!("key schema is not a record");
        };
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields[0].name, "order_id");
    }
}
