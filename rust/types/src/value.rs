//! Parameter values.
//!
//! Every attribute in a parameter mapping is one of a closed set of variants.
//! Validation pattern-matches on the variant instead of inspecting values at
//! runtime, so a task effect is either a scalar, an explicit per-question
//! sequence, or a generator that produces one.

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Signature of a user-supplied task generator: `(n_questions, rng) -> effects`.
pub type TaskFn = dyn Fn(usize, &mut dyn RngCore) -> Vec<f64> + Send + Sync;

/// A named closure producing per-question task effects.
#[derive(Clone)]
pub struct CustomGenerator {
    name: String,
    func: Arc<TaskFn>,
}

impl CustomGenerator {
    /// Wrap a closure under a display name.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(usize, &mut dyn RngCore) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Display name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, n: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        (self.func)(n, rng)
    }
}

impl fmt::Debug for CustomGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomGenerator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// Closures have no structural equality; two generators are equal only when
// they share the same closure allocation.
impl PartialEq for CustomGenerator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Function producing a task-effect sequence of a requested length.
///
/// TOML/JSON form:
///
/// ```toml
/// task = { generator = "permuted_linspace", low = 0, high = 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "generator", rename_all = "snake_case")]
pub enum TaskGenerator {
    /// `n` evenly spaced values in `[low, high]`, rounded to whole numbers
    /// and randomly permuted.
    PermutedLinspace { low: f64, high: f64 },
    /// Arbitrary closure. Not serializable.
    #[serde(skip)]
    Custom(CustomGenerator),
}

impl TaskGenerator {
    /// Build a custom generator from a closure.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(usize, &mut dyn RngCore) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::Custom(CustomGenerator::new(name, func))
    }

    /// Produce `n` task effects.
    ///
    /// Custom generators may return a different length; callers check it.
    pub fn generate(&self, n: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        match self {
            Self::PermutedLinspace { low, high } => {
                let mut values = linspace(*low, *high, n)
                    .into_iter()
                    .map(f64::round_ties_even)
                    .collect::<Vec<_>>();
                values.shuffle(rng);
                values
            }
            Self::Custom(custom) => custom.call(n, rng),
        }
    }
}

fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// One attribute value in a flat or nested parameter mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<f64>),
    Generator(TaskGenerator),
}

impl ParamValue {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Generator(_) => "generator",
        }
    }

    /// Numeric view of `Int` and `Float`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Sequence(v) => write!(f, "{v:?}"),
            Self::Generator(TaskGenerator::PermutedLinspace { low, high }) => {
                write!(f, "permuted_linspace({low}, {high})")
            }
            Self::Generator(TaskGenerator::Custom(c)) => write!(f, "<generator {}>", c.name()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Sequence(v)
    }
}

impl From<&[f64]> for ParamValue {
    fn from(v: &[f64]) -> Self {
        Self::Sequence(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for ParamValue {
    fn from(v: [f64; N]) -> Self {
        Self::Sequence(v.to_vec())
    }
}

impl From<TaskGenerator> for ParamValue {
    fn from(v: TaskGenerator) -> Self {
        Self::Generator(v)
    }
}
