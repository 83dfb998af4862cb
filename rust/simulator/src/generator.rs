//! Stateful data generator.
//!
//! [`DataGenerator`] owns the current parameters, its RNG and the most recent
//! result. `fit` (re)generates data, optionally after a parameter update;
//! `export` flattens the current result into a [`TidyTable`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use wiscs_types::{flatten, merge, FlatParams, NestedParams, ParameterSchema, ParameterSet};

use crate::design::{self, DesignedRun};
use crate::engine::{self, Hypothesis, SimulationOutput};
use crate::error::{SimError, SimResult};
use crate::rng::SimRng;
use crate::tidy::{designed_to_table, to_table, TidyTable};

/// Parameter update passed to [`DataGenerator::fit`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamUpdate {
    /// Dotted keys merged into the current parameters.
    Flat(FlatParams),
    /// Nested categories; merged, or swapped in wholesale under `overwrite`.
    Nested(NestedParams),
}

impl From<FlatParams> for ParamUpdate {
    fn from(flat: FlatParams) -> Self {
        Self::Flat(flat)
    }
}

impl From<NestedParams> for ParamUpdate {
    fn from(nested: NestedParams) -> Self {
        Self::Nested(nested)
    }
}

/// Output of one `fit`.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationResult {
    /// All factors within-subjects.
    Single(SimulationOutput),
    /// At least one between-subjects factor.
    Designed(DesignedRun),
}

impl SimulationResult {
    #[must_use]
    pub fn hypothesis(&self) -> Hypothesis {
        match self {
            Self::Single(output) => output.hypothesis,
            Self::Designed(run) => run.hypothesis,
        }
    }

    #[must_use]
    pub fn to_table(&self) -> TidyTable {
        match self {
            Self::Single(output) => to_table(output),
            Self::Designed(run) => designed_to_table(run),
        }
    }
}

/// Lifecycle of a [`DataGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorState {
    /// Parameters accepted, no data yet.
    Parameterized,
    /// A result is available for export.
    Generated,
}

/// Generate one result, splitting by design when any factor is between.
///
/// # Errors
///
/// Propagates engine and design errors.
pub fn simulate(params: &ParameterSet, rng: &mut SimRng) -> SimResult<SimulationResult> {
    if params.design.is_split() {
        design::run(params, rng).map(SimulationResult::Designed)
    } else {
        engine::generate(params, rng).map(SimulationResult::Single)
    }
}

/// Orchestrates validation, generation and export.
#[derive(Debug, Clone)]
pub struct DataGenerator {
    params: NestedParams,
    resolved: ParameterSet,
    schema: ParameterSchema,
    rng: SimRng,
    result: Option<SimulationResult>,
}

impl DataGenerator {
    /// Validate and adopt a nested parameter mapping.
    ///
    /// The RNG is seeded from OS entropy; use [`Self::with_seed`] for
    /// reproducible output.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Param`] if the mapping fails validation or
    /// resolution.
    pub fn new(params: &NestedParams) -> SimResult<Self> {
        Self::with_schema(params, ParameterSchema::standard())
    }

    /// Like [`Self::new`] with a caller-supplied schema.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Param`] if the mapping fails validation or
    /// resolution.
    pub fn with_schema(params: &NestedParams, schema: ParameterSchema) -> SimResult<Self> {
        let resolved = Self::admit(&schema, params)?;
        Ok(Self {
            params: params.clone(),
            resolved,
            schema,
            rng: SimRng::from_entropy(),
            result: None,
        })
    }

    /// Build from dotted keys.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Param`] for malformed keys or invalid values.
    pub fn from_flat(flat: &FlatParams) -> SimResult<Self> {
        let schema = ParameterSchema::standard();
        schema.validate(flat)?;
        Self::with_schema(&wiscs_types::parse(flat)?, schema)
    }

    /// Replace the RNG with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SimRng::new(seed);
        self
    }

    #[must_use]
    pub fn params(&self) -> &NestedParams {
        &self.params
    }

    #[must_use]
    pub fn parameter_set(&self) -> &ParameterSet {
        &self.resolved
    }

    #[must_use]
    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> GeneratorState {
        if self.result.is_some() {
            GeneratorState::Generated
        } else {
            GeneratorState::Parameterized
        }
    }

    /// Generate data, optionally after updating parameters.
    ///
    /// - `None`: regenerate with the current parameters and fresh draws.
    /// - `Nested` with `overwrite` and the same number of categories as the
    ///   current mapping: replace the parameters wholesale.
    /// - Anything else: merge the update into the current parameters.
    ///
    /// Nothing is committed unless generation succeeds: on error the
    /// parameters, RNG state and previous result are unchanged.
    ///
    /// # Errors
    ///
    /// - [`SimError::Configuration`] for `fit(None, true)`
    /// - [`SimError::Param`] if the updated parameters are invalid
    /// - engine and design errors from generation
    pub fn fit(&mut self, update: Option<ParamUpdate>, overwrite: bool) -> SimResult<()> {
        let candidate = match update {
            None if overwrite => {
                return Err(SimError::Configuration(
                    "overwrite requested without new parameters".into(),
                ))
            }
            None => None,
            Some(ParamUpdate::Nested(nested))
                if overwrite && nested.len() == self.params.len() =>
            {
                debug!(categories = nested.len(), "replacing parameters");
                Some(nested)
            }
            Some(ParamUpdate::Nested(nested)) => Some(merge(&self.params, &flatten(&nested))?),
            Some(ParamUpdate::Flat(flat)) => {
                self.schema.validate(&flat)?;
                Some(merge(&self.params, &flat)?)
            }
        };

        let resolved = match &candidate {
            Some(params) => Self::admit(&self.schema, params)?,
            None => self.resolved.clone(),
        };

        let mut rng = self.rng.clone();
        let result = simulate(&resolved, &mut rng)?;
        debug!(hypothesis = ?result.hypothesis(), "fit complete");

        if let Some(params) = candidate {
            self.params = params;
        }
        self.resolved = resolved;
        self.rng = rng;
        self.result = Some(result);
        Ok(())
    }

    /// Flatten the current result into a tidy table.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IllegalState`] before the first successful `fit`.
    pub fn export(&self) -> SimResult<TidyTable> {
        self.result
            .as_ref()
            .map(SimulationResult::to_table)
            .ok_or_else(|| SimError::IllegalState("export called before fit".into()))
    }

    fn admit(schema: &ParameterSchema, params: &NestedParams) -> SimResult<ParameterSet> {
        schema.validate(&flatten(params))?;
        Ok(ParameterSet::from_nested(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiscs_types::{parse, ParamError, ParamValue};

    fn base() -> FlatParams {
        FlatParams::new()
            .set("word.concept", 500.0)
            .set("image.concept", 520.0)
            .set("var.image", 0.0)
            .set("var.word", 0.0)
            .set("var.question", 0.0)
            .set("var.participant", 0.0)
            .set("n.participant", 2)
            .set("n.question", 2)
            .set("n.trial", 1)
    }

    fn generator() -> DataGenerator {
        DataGenerator::from_flat(&base()).expect("valid").with_seed(3)
    }

    #[test]
    fn export_before_fit_is_illegal() {
        let dg = generator();
        assert_eq!(dg.state(), GeneratorState::Parameterized);
        assert!(matches!(dg.export(), Err(SimError::IllegalState(_))));
    }

    #[test]
    fn overwrite_without_params_is_rejected() {
        let mut dg = generator();
        assert!(matches!(
            dg.fit(None, true),
            Err(SimError::Configuration(_))
        ));
        assert_eq!(dg.state(), GeneratorState::Parameterized);
    }

    #[test]
    fn flat_update_merges_and_regenerates() {
        let mut dg = generator();
        dg.fit(None, false).expect("fit");
        dg.fit(Some(FlatParams::new().set("word.concept", 600).into()), false)
            .expect("refit");
        assert_eq!(dg.params()["word"]["concept"], ParamValue::Int(600));
        assert_eq!(dg.params()["image"]["concept"], ParamValue::Float(520.0));
        let table = dg.export().expect("export");
        assert!(table
            .rows_for(wiscs_types::Modality::Word)
            .iter()
            .all(|r| r.rt == 600.0));
    }

    #[test]
    fn failed_fit_leaves_generator_untouched() {
        let mut dg = generator();
        dg.fit(None, false).expect("fit");
        let before = dg.export().expect("export");
        let params = dg.params().clone();

        let bad = FlatParams::new().set("word.task", vec![0.0, 1.0, 2.0]);
        assert!(matches!(
            dg.fit(Some(bad.into()), false),
            Err(SimError::DimensionMismatch { .. })
        ));
        assert_eq!(dg.params(), &params);
        assert_eq!(dg.export().expect("export"), before);
    }

    #[test]
    fn invalid_update_is_a_param_error() {
        let mut dg = generator();
        let err = dg
            .fit(Some(FlatParams::new().set("var.word", -1.0).into()), false)
            .expect_err("negative variance");
        assert!(matches!(err, SimError::Param(ParamError::OutOfRange { .. })));
    }

    #[test]
    fn nested_overwrite_replaces_wholesale() {
        let mut dg = generator();
        let mut replacement = parse(&base()).expect("parse");
        replacement
            .get_mut("word")
            .expect("word")
            .insert("concept".into(), ParamValue::Float(450.0));
        dg.fit(Some(replacement.clone().into()), true).expect("fit");
        assert_eq!(dg.params(), &replacement);
        assert_eq!(dg.parameter_set().word.concept, 450.0);
    }

    fn word_concept_update(concept: f64) -> NestedParams {
        let mut update = NestedParams::new();
        update
            .entry("word".into())
            .or_default()
            .insert("concept".into(), ParamValue::Float(concept));
        update
    }

    fn assert_untouched(dg: &DataGenerator, before: &NestedParams) {
        for cat in ["image", "var", "n"] {
            assert_eq!(dg.params()[cat], before[cat], "category {cat} changed");
        }
    }

    #[test]
    fn nested_update_without_overwrite_merges() {
        let mut dg = generator();
        let before = dg.params().clone();
        dg.fit(Some(word_concept_update(610.0).into()), false)
            .expect("fit");
        assert_eq!(dg.params()["word"]["concept"], ParamValue::Float(610.0));
        assert_eq!(dg.params().len(), before.len());
        assert_untouched(&dg, &before);
        assert_eq!(dg.parameter_set().word.concept, 610.0);
    }

    #[test]
    fn nested_overwrite_with_fewer_categories_merges() {
        let mut dg = generator();
        let before = dg.params().clone();
        let update = word_concept_update(620.0);
        assert_ne!(update.len(), before.len());
        dg.fit(Some(update.into()), true).expect("fit");
        assert_eq!(dg.params()["word"]["concept"], ParamValue::Float(620.0));
        assert_eq!(dg.params().len(), before.len());
        assert_untouched(&dg, &before);
        assert_eq!(dg.parameter_set().image.concept, 520.0);
    }

    #[test]
    fn design_split_yields_designed_result() {
        let flat = base().set("design.items", "between");
        let mut dg = DataGenerator::from_flat(&flat).expect("valid").with_seed(1);
        dg.fit(None, false).expect("fit");
        assert!(matches!(dg.result(), Some(SimulationResult::Designed(_))));
        assert_eq!(dg.export().expect("export").groups().len(), 2);
    }
}
