//! Order event assembly.

use orderstream_generator::{FieldGenerator, GeneratedFields};
use serde::Serialize;

/// Key record for one order event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderKey {
    pub order_id: i32,
}

/// One key/value record submitted for publication.
///
/// Constructed immediately before publish and immutable thereafter. The
/// delivery outcome is tracked separately, never on the event itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub key: OrderKey,
    pub value: GeneratedFields,
}

/// Assembles events from a sequential identifier and generated fields.
pub struct EventBuilder {
    generator: FieldGenerator,
}

impl EventBuilder {
    pub fn new(generator: FieldGenerator) -> Self {
        Self { generator }
    }

    /// Build one event for the given identifier.
    ///
    /// Calls the field generator exactly once and overlays `order_id` into
    /// the value, overwriting any same-named generated field. A field the
    /// generator skipped is simply absent from the value.
    pub fn build(&mut self, order_id: i32) -> OrderEvent {
        let mut value = self.generator.generate();
        value.insert("order_id".to_string(), order_id);
        OrderEvent {
            key: OrderKey { order_id },
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(yaml: &str) -> EventBuilder {
        let config = serde_yaml::from_str(yaml).unwrap();
        EventBuilder::new(FieldGenerator::seeded(&config, 42))
    }

    #[test]
    fn test_value_carries_the_key_identifier() {
        let mut builder = builder("quantity: { min: 1, max: 5 }");

        for order_id in 1..=10 {
            let event = builder.build(order_id);
            assert_eq!(event.key.order_id, order_id);
            assert_eq!(event.value["order_id"], order_id);
        }
    }

    #[test]
    fn test_order_id_overlay_wins() {
        // A generated field named order_id is overwritten by the identifier
        let mut builder = builder("order_id: { min: 900, max: 900 }");

        let event = builder.build(7);
        assert_eq!(event.value["order_id"], 7);
    }

    #[test]
    fn test_skipped_field_is_absent_from_value() {
        let mut builder = builder(
            r#"
quantity: { min: 2, max: 2 }
bad: { min: "1", max: 5 }
"#,
        );

        let event = builder.build(1);
        assert_eq!(event.value.len(), 2);
        assert_eq!(event.value["quantity"], 2);
        assert_eq!(event.value["order_id"], 1);
        assert!(!event.value.contains_key("bad"));
    }
}
