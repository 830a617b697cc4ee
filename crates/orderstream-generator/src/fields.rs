//! Field-bounds specifications and per-entry validation.

use serde_yaml::{Mapping, Value};

/// Validation failure for a single configuration entry.
///
/// Each rejected entry produces exactly one error naming the offending field
/// and the specific reason. Rejection is local: other entries in the same
/// configuration are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldSpecError {
    /// The mapping key is not a string
    #[error("field key {0} is not a string")]
    NonStringName(String),

    /// The entry value is not a `{min, max}` mapping
    #[error("field '{0}' is not a min/max mapping")]
    NotAMapping(String),

    /// The entry is missing a required bound
    #[error("field '{field}' is missing bound '{bound}'")]
    MissingBound { field: String, bound: &'static str },

    /// A bound is not a 32-bit integer
    #[error("field '{field}' bound '{bound}' is not a 32-bit integer")]
    NonIntegerBound { field: String, bound: &'static str },

    /// Both bounds are well-typed but describe an empty range
    #[error("field '{field}' has min {min} greater than max {max}")]
    EmptyRange { field: String, min: i32, max: i32 },
}

/// Declarative inclusive bound for one generated attribute.
///
/// Invariant: `min <= max`. Constructed only through validation, so a held
/// `FieldSpec` is always drawable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within a configuration
    pub name: String,
    /// Inclusive lower bound
    pub min: i32,
    /// Inclusive upper bound
    pub max: i32,
}

impl FieldSpec {
    /// Validate one configuration entry into a spec.
    fn from_entry(key: &Value, value: &Value) -> Result<Self, FieldSpecError> {
        let name = key
            .as_str()
            .ok_or_else(|| FieldSpecError::NonStringName(render_key(key)))?
            .to_string();

        let bounds = value
            .as_mapping()
            .ok_or_else(|| FieldSpecError::NotAMapping(name.clone()))?;

        let min = bound(bounds, &name, "min")?;
        let max = bound(bounds, &name, "max")?;

        if min > max {
            return Err(FieldSpecError::EmptyRange { field: name, min, max });
        }

        Ok(FieldSpec { name, min, max })
    }
}

/// Extract one integer bound from a `{min, max}` mapping.
fn bound(bounds: &Mapping, field: &str, which: &'static str) -> Result<i32, FieldSpecError> {
    let raw = bounds
        .get(which)
        .ok_or_else(|| FieldSpecError::MissingBound {
            field: field.to_string(),
            bound: which,
        })?;

    raw.as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| FieldSpecError::NonIntegerBound {
            field: field.to_string(),
            bound: which,
        })
}

/// Render a non-string mapping key for diagnostics.
fn render_key(key: &Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{key:?}"))
}

/// Validate a field-bounds mapping entry by entry.
///
/// Returns the specs that passed validation (in configuration order) together
/// with one error per rejected entry. A single bad field never rejects the
/// whole configuration.
pub fn validate_fields(config: &Mapping) -> (Vec<FieldSpec>, Vec<FieldSpecError>) {
    let mut specs = Vec::with_capacity(config.len());
    let mut errors = Vec::new();

    for (key, value) in config {
        match FieldSpec::from_entry(key, value) {
            Ok(spec) => specs.push(spec),
            Err(err) => errors.push(err),
        }
    }

    (specs, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_entries() {
        let config = mapping("quantity: { min: 1, max: 5 }\nbilling_id: { min: 1, max: 5 }");
        let (specs, errors) = validate_fields(&config);

        assert!(errors.is_empty());
        assert_eq!(
            specs,
            vec![
                FieldSpec {
                    name: "quantity".into(),
                    min: 1,
                    max: 5
                },
                FieldSpec {
                    name: "billing_id".into(),
                    min: 1,
                    max: 5
                },
            ]
        );
    }

    #[test]
    fn test_non_string_key_is_rejected() {
        let config = mapping("7: { min: 1, max: 5 }");
        let (specs, errors) = validate_fields(&config);

        assert!(specs.is_empty());
        assert_eq!(errors, vec![FieldSpecError::NonStringName("7".into())]);
    }

    #[test]
    fn test_non_mapping_value_is_rejected() {
        let config = mapping("quantity: 5");
        let (specs, errors) = validate_fields(&config);

        assert!(specs.is_empty());
        assert_eq!(errors, vec![FieldSpecError::NotAMapping("quantity".into())]);
    }

    #[test]
    fn test_missing_bounds_are_rejected() {
        let (_, errors) = validate_fields(&mapping("quantity: { max: 5 }"));
        assert_eq!(
            errors,
            vec![FieldSpecError::MissingBound {
                field: "quantity".into(),
                bound: "min"
            }]
        );

        let (_, errors) = validate_fields(&mapping("quantity: { min: 1 }"));
        assert_eq!(
            errors,
            vec![FieldSpecError::MissingBound {
                field: "quantity".into(),
                bound: "max"
            }]
        );
    }

    #[test]
    fn test_non_integer_bound_is_rejected() {
        let config = mapping(r#"bad: { min: "1", max: 5 }"#);
        let (specs, errors) = validate_fields(&config);

        assert!(specs.is_empty());
        assert_eq!(
            errors,
            vec![FieldSpecError::NonIntegerBound {
                field: "bad".into(),
                bound: "min"
            }]
        );
    }

    #[test]
    fn test_float_bound_is_rejected() {
        let config = mapping("bad: { min: 1.5, max: 5 }");
        let (_, errors) = validate_fields(&config);

        assert_eq!(
            errors,
            vec![FieldSpecError::NonIntegerBound {
                field: "bad".into(),
                bound: "min"
            }]
        );
    }

    #[test]
    fn test_bound_outside_i32_is_rejected() {
        let config = mapping("bad: { min: 1, max: 4294967296 }");
        let (_, errors) = validate_fields(&config);

        assert_eq!(
            errors,
            vec![FieldSpecError::NonIntegerBound {
                field: "bad".into(),
                bound: "max"
            }]
        );
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let config = mapping("bad: { min: 10, max: 2 }");
        let (specs, errors) = validate_fields(&config);

        assert!(specs.is_empty());
        assert_eq!(
            errors,
            vec![FieldSpecError::EmptyRange {
                field: "bad".into(),
                min: 10,
                max: 2
            }]
        );
    }

    #[test]
    fn test_bad_entry_does_not_reject_the_rest() {
        let config = mapping(
            r#"
quantity: { min: 1, max: 5 }
bad: { min: "1", max: 5 }
price_in_cents: { min: 100, max: 10000 }
"#,
        );
        let (specs, errors) = validate_fields(&config);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "quantity");
        assert_eq!(specs[1].name, "price_in_cents");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("bad"));
    }
}
