//! Random field generation over validated bounds.

use crate::fields::{validate_fields, FieldSpec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use tracing::warn;

/// One freshly generated set of field values, keyed by field name.
///
/// Ordered by name so diagnostics and production records enumerate stably.
pub type GeneratedFields = BTreeMap<String, i32>;

/// Generates one bounded random integer per configured field per call.
///
/// Malformed configuration entries are skipped at construction with one
/// warning each; the generator then draws only from the entries that passed
/// validation. No generated data is retained across calls.
pub struct FieldGenerator {
    specs: Vec<FieldSpec>,
    rng: StdRng,
}

impl FieldGenerator {
    /// Create a generator from a field-bounds mapping, seeding from entropy.
    pub fn from_config(config: &Mapping) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a generator with a fixed seed (same seed = same draws).
    pub fn seeded(config: &Mapping, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Mapping, rng: StdRng) -> Self {
        let (specs, errors) = validate_fields(config);
        for err in &errors {
            warn!("skipping field: {err}");
        }
        Self { specs, rng }
    }

    /// The specs that survived validation, in configuration order.
    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Draw one value per valid field, uniformly within `min..=max`.
    pub fn generate(&mut self) -> GeneratedFields {
        let rng = &mut self.rng;
        self.specs
            .iter()
            .map(|spec| (spec.name.clone(), rng.gen_range(spec.min..=spec.max)))
            .collect()
    }
}
