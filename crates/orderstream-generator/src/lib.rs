//! Bounded-random field generator for the orderstream producer.
//!
//! This crate validates a declarative field-bounds configuration and produces
//! one random integer per field per call. Validation is per entry: a malformed
//! entry is skipped with a diagnostic and never aborts generation of the
//! remaining fields.
//!
//! # Architecture
//!
//! ```text
//! YAML mapping (field -> {min, max})
//!        │
//!        ▼ validate_fields()
//! Vec<FieldSpec> + Vec<FieldSpecError>
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  FieldGenerator  │
//! │                  │
//! │  - specs         │
//! │  - rng (StdRng)  │
//! └────────┬─────────┘
//!          │ generate()
//!          ▼
//!   GeneratedFields { name -> value, min <= value <= max }
//! ```
//!
//! # Example
//!
//! ```rust
//! use orderstream_generator::FieldGenerator;
//!
//! let config = serde_yaml::from_str(r#"
//! quantity: { min: 1, max: 5 }
//! price_in_cents: { min: 100, max: 10000 }
//! "#).unwrap();
//!
//! let mut generator = FieldGenerator::seeded(&config, 42);
//! let fields = generator.generate();
//! assert!((1..=5).contains(&fields["quantity"]));
//! ```

pub mod fields;
pub mod generator;

pub use fields::{validate_fields, FieldSpec, FieldSpecError};
pub use generator::{FieldGenerator, GeneratedFields};
