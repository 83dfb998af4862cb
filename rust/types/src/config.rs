//! Typed experiment configuration.
//!
//! [`ParameterSet`] is the resolved form of a validated nested mapping. The
//! simulator works on this type only; string keys stop at this boundary.

use std::collections::BTreeMap;
use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{ParamError, ParamResult};
use crate::parse::{join_key, NestedParams};
use crate::value::{ParamValue, TaskGenerator};

/// Category names used in nested parameter mappings.
pub mod category {
    pub const WORD: &str = "word";
    pub const IMAGE: &str = "image";
    pub const VAR: &str = "var";
    pub const N: &str = "n";
    pub const DESIGN: &str = "design";
}

/// Attribute holding the conceptual component of a modality.
pub const CONCEPT: &str = "concept";
/// Attribute holding the per-question task effect of a modality.
pub const TASK: &str = "task";

/// Stimulus modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Word,
    Image,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Word, Modality::Image];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => category::WORD,
            Self::Image => category::IMAGE,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a design factor varies within or between participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    #[default]
    Within,
    Between,
}

/// Whether word and image item noise come from one draw or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemNoisePolicy {
    /// Separate draws for word and image item noise.
    #[default]
    Independent,
    /// The image item-noise draw is reused for words.
    Shared,
}

/// Experimental design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Design {
    pub items: Factor,
    pub questions: Factor,
    pub item_noise: ItemNoisePolicy,
}

impl Design {
    /// True if any factor is between-subjects.
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.items == Factor::Between || self.questions == Factor::Between
    }
}

/// Per-question task effect of one modality.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskSpec {
    /// Same effect for every question.
    Constant(f64),
    /// One effect per question.
    Sequence(Vec<f64>),
    /// Effects produced at generation time.
    Generator(TaskGenerator),
}

impl Default for TaskSpec {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl TaskSpec {
    /// Zero effect for `n` questions.
    #[must_use]
    pub fn zeros(n: usize) -> Self {
        Self::Sequence(vec![0.0; n])
    }

    /// Produce the effect vector for `n` questions.
    ///
    /// Explicit sequences are returned as-is; the caller checks the length.
    pub fn materialize(&self, n: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        match self {
            Self::Constant(x) => vec![*x; n],
            Self::Sequence(xs) => xs.clone(),
            Self::Generator(generator) => generator.generate(n, rng),
        }
    }
}

/// Cognitive components and task effect of one modality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModalityParams {
    pub concept: f64,
    /// Extra named components, summed with `concept`.
    pub components: BTreeMap<String, f64>,
    pub task: TaskSpec,
}

impl ModalityParams {
    #[must_use]
    pub fn new(concept: f64) -> Self {
        Self {
            concept,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_component(mut self, name: impl Into<String>, value: f64) -> Self {
        self.components.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.task = task;
        self
    }

    /// A modality the participant never sees: no components, zero task.
    #[must_use]
    pub fn unseen(n_questions: usize) -> Self {
        Self {
            concept: 0.0,
            components: BTreeMap::new(),
            task: TaskSpec::zeros(n_questions),
        }
    }

    /// `concept` plus every extra component.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.concept + self.components.values().sum::<f64>()
    }
}

/// Scale of each zero-mean noise source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseParams {
    pub image: f64,
    pub word: f64,
    pub question: f64,
    pub participant: f64,
}

impl NoiseParams {
    /// All sources silent.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Sizes of the nested experimental units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub participant: usize,
    pub question: usize,
    pub trial: usize,
}

impl Counts {
    #[must_use]
    pub fn new(participant: usize, question: usize, trial: usize) -> Self {
        Self {
            participant,
            question,
            trial,
        }
    }

    /// Tensor shape `(participant, question, trial)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.participant, self.question, self.trial)
    }
}

/// Fully resolved simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub word: ModalityParams,
    pub image: ModalityParams,
    pub noise: NoiseParams,
    pub counts: Counts,
    pub design: Design,
}

impl ParameterSet {
    /// Resolve a nested mapping into typed parameters.
    ///
    /// Kinds and ranges are expected to have passed
    /// [`crate::ParameterSchema::validate`]; they are re-checked here only as
    /// far as the conversion needs.
    ///
    /// # Errors
    ///
    /// - [`ParamError::MissingParameter`] for an absent concept, variance or count
    /// - [`ParamError::TypeMismatch`] / [`ParamError::OutOfRange`] for values
    ///   that cannot be converted
    /// - [`ParamError::InvalidValue`] for unknown design spellings
    pub fn from_nested(nested: &NestedParams) -> ParamResult<Self> {
        Ok(Self {
            word: resolve_modality(nested, category::WORD)?,
            image: resolve_modality(nested, category::IMAGE)?,
            noise: NoiseParams {
                image: variance(nested, "image")?,
                word: variance(nested, "word")?,
                question: variance(nested, "question")?,
                participant: variance(nested, "participant")?,
            },
            counts: Counts {
                participant: count(nested, "participant")?,
                question: count(nested, "question")?,
                trial: count(nested, "trial")?,
            },
            design: resolve_design(nested)?,
        })
    }

    #[must_use]
    pub fn modality(&self, modality: Modality) -> &ModalityParams {
        match modality {
            Modality::Word => &self.word,
            Modality::Image => &self.image,
        }
    }
}

fn lookup<'a>(nested: &'a NestedParams, cat: &str, attr: &str) -> Option<&'a ParamValue> {
    nested.get(cat).and_then(|attrs| attrs.get(attr))
}

fn require<'a>(nested: &'a NestedParams, cat: &str, attr: &str) -> ParamResult<&'a ParamValue> {
    lookup(nested, cat, attr).ok_or_else(|| ParamError::MissingParameter {
        key: join_key(cat, attr),
    })
}

fn number(key: String, value: &ParamValue) -> ParamResult<f64> {
    value.as_f64().ok_or(ParamError::TypeMismatch {
        key,
        expected: "a number".into(),
        actual: value.kind_name(),
    })
}

fn resolve_modality(nested: &NestedParams, cat: &str) -> ParamResult<ModalityParams> {
    let concept = number(join_key(cat, CONCEPT), require(nested, cat, CONCEPT)?)?;

    let task = match lookup(nested, cat, TASK) {
        None => TaskSpec::default(),
        Some(ParamValue::Int(x)) => TaskSpec::Constant(*x as f64),
        Some(ParamValue::Float(x)) => TaskSpec::Constant(*x),
        Some(ParamValue::Sequence(xs)) => TaskSpec::Sequence(xs.clone()),
        Some(ParamValue::Generator(g)) => TaskSpec::Generator(g.clone()),
        Some(other) => {
            return Err(ParamError::TypeMismatch {
                key: join_key(cat, TASK),
                expected: "one of a number | a sequence | a generator".into(),
                actual: other.kind_name(),
            })
        }
    };

    let mut components = BTreeMap::new();
    if let Some(attrs) = nested.get(cat) {
        for (name, value) in attrs {
            if name == CONCEPT || name == TASK {
                continue;
            }
            components.insert(name.clone(), number(join_key(cat, name), value)?);
        }
    }

    Ok(ModalityParams {
        concept,
        components,
        task,
    })
}

fn variance(nested: &NestedParams, source: &str) -> ParamResult<f64> {
    let key = join_key(category::VAR, source);
    let value = require(nested, category::VAR, source)?;
    let x = number(key.clone(), value)?;
    if x.is_finite() && x >= 0.0 {
        Ok(x)
    } else {
        Err(ParamError::OutOfRange {
            key,
            value: value.to_string(),
            expected: "a finite number >= 0",
        })
    }
}

fn count(nested: &NestedParams, unit: &str) -> ParamResult<usize> {
    let key = join_key(category::N, unit);
    let value = require(nested, category::N, unit)?;
    match value {
        ParamValue::Int(n) => match usize::try_from(*n) {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ParamError::OutOfRange {
                key,
                value: value.to_string(),
                expected: "a number > 0",
            }),
        },
        other => Err(ParamError::TypeMismatch {
            key,
            expected: "an integer".into(),
            actual: other.kind_name(),
        }),
    }
}

fn resolve_design(nested: &NestedParams) -> ParamResult<Design> {
    let mut design = Design::default();
    if let Some(value) = lookup(nested, category::DESIGN, "items") {
        design.items = factor("items", value)?;
    }
    if let Some(value) = lookup(nested, category::DESIGN, "questions") {
        design.questions = factor("questions", value)?;
    }
    if let Some(value) = lookup(nested, category::DESIGN, "item_noise") {
        design.item_noise = match value {
            ParamValue::Text(s) if s.eq_ignore_ascii_case("independent") => {
                ItemNoisePolicy::Independent
            }
            ParamValue::Text(s) if s.eq_ignore_ascii_case("shared") => ItemNoisePolicy::Shared,
            other => {
                return Err(ParamError::InvalidValue {
                    key: join_key(category::DESIGN, "item_noise"),
                    reason: format!("expected \"independent\" or \"shared\", got {other}"),
                })
            }
        };
    }
    Ok(design)
}

/// `true` means within-subjects, matching the boolean design flags.
fn factor(attr: &str, value: &ParamValue) -> ParamResult<Factor> {
    match value {
        ParamValue::Bool(true) => Ok(Factor::Within),
        ParamValue::Bool(false) => Ok(Factor::Between),
        ParamValue::Text(s) if s.eq_ignore_ascii_case("within") => Ok(Factor::Within),
        ParamValue::Text(s) if s.eq_ignore_ascii_case("between") => Ok(Factor::Between),
        other => Err(ParamError::InvalidValue {
            key: join_key(category::DESIGN, attr),
            reason: format!("expected true/false or \"within\"/\"between\", got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, FlatParams};

    fn flat() -> FlatParams {
        FlatParams::new()
            .set("word.concept", 500.0)
            .set("word.perceptual", 20.0)
            .set("word.task", vec![0.0, 5.0])
            .set("image.concept", 520)
            .set("var.image", 1.0)
            .set("var.word", 2.0)
            .set("var.question", 3.0)
            .set("var.participant", 4.0)
            .set("n.participant", 6)
            .set("n.question", 2)
            .set("n.trial", 3)
    }

    #[test]
    fn resolves_components_task_and_counts() {
        let set = ParameterSet::from_nested(&parse(&flat()).expect("parse")).expect("resolve");
        assert_eq!(set.word.concept, 500.0);
        assert_eq!(set.word.components["perceptual"], 20.0);
        assert_eq!(set.word.baseline(), 520.0);
        assert_eq!(set.word.task, TaskSpec::Sequence(vec![0.0, 5.0]));
        assert_eq!(set.image.task, TaskSpec::Constant(0.0));
        assert_eq!(set.image.baseline(), 520.0);
        assert_eq!(set.counts.shape(), (6, 2, 3));
        assert_eq!(set.noise.participant, 4.0);
        assert_eq!(set.design, Design::default());
    }

    #[test]
    fn missing_count_is_reported_by_key() {
        let mut nested = parse(&flat()).expect("parse");
        nested.get_mut("n").expect("n").remove("trial");
        assert_eq!(
            ParameterSet::from_nested(&nested),
            Err(ParamError::MissingParameter {
                key: "n.trial".into()
            })
        );
    }

    #[test]
    fn design_accepts_booleans_and_words() {
        let nested = parse(
            &flat()
                .set("design.items", "between")
                .set("design.questions", false)
                .set("design.item_noise", "shared"),
        )
        .expect("parse");
        let set = ParameterSet::from_nested(&nested).expect("resolve");
        assert_eq!(set.design.items, Factor::Between);
        assert_eq!(set.design.questions, Factor::Between);
        assert_eq!(set.design.item_noise, ItemNoisePolicy::Shared);
        assert!(set.design.is_split());
    }

    #[test]
    fn unknown_design_spelling_is_invalid() {
        let nested = parse(&flat().set("design.items", "sometimes")).expect("parse");
        assert!(matches!(
            ParameterSet::from_nested(&nested),
            Err(ParamError::InvalidValue { .. })
        ));
    }
}
