//! Parameter schema and validation.
//!
//! The schema is a registry from flat keys to the value kinds they accept.
//! Exact keys take precedence; a key that is not registered falls back to its
//! category's wildcard entry (`word.*`), which is how open-ended cognitive
//! component names are admitted.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ParamError, ParamResult};
use crate::parse::{split_key, FlatParams};
use crate::value::ParamValue;

/// Primitive value kinds a schema entry can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Whole number only.
    Integer,
    /// Integer or float.
    Number,
    Boolean,
    Text,
    /// Ordered list of numbers.
    Sequence,
    /// Function producing a sequence.
    Generator,
}

impl ValueKind {
    /// Whether `value` is of this kind. An integer is also a number.
    #[must_use]
    pub fn accepts(self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (Self::Integer, ParamValue::Int(_))
                | (Self::Number, ParamValue::Int(_) | ParamValue::Float(_))
                | (Self::Boolean, ParamValue::Bool(_))
                | (Self::Text, ParamValue::Text(_))
                | (Self::Sequence, ParamValue::Sequence(_))
                | (Self::Generator, ParamValue::Generator(_))
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Text => "text",
            Self::Sequence => "a sequence",
            Self::Generator => "a generator",
        };
        f.write_str(name)
    }
}

/// Expected kind for a key: a single kind or a union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Kind(ValueKind),
    OneOf(Vec<ValueKind>),
}

impl Expected {
    #[must_use]
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match self {
            Self::Kind(kind) => kind.accepts(value),
            Self::OneOf(kinds) => kinds.iter().any(|k| k.accepts(value)),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "{kind}"),
            Self::OneOf(kinds) => {
                let parts = kinds.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "one of {}", parts.join(" | "))
            }
        }
    }
}

/// Value range rule checked after the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Range {
    /// Any finite value.
    #[default]
    Finite,
    /// Finite and `>= 0`.
    NonNegative,
    /// Strictly `> 0`.
    Positive,
}

impl Range {
    fn describe(self) -> &'static str {
        match self {
            Self::Finite => "a finite number",
            Self::NonNegative => "a finite number >= 0",
            Self::Positive => "a number > 0",
        }
    }

    fn admits(self, x: f64) -> bool {
        match self {
            Self::Finite => x.is_finite(),
            Self::NonNegative => x.is_finite() && x >= 0.0,
            Self::Positive => x.is_finite() && x > 0.0,
        }
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub expected: Expected,
    pub range: Range,
}

impl SchemaEntry {
    #[must_use]
    pub fn new(expected: Expected, range: Range) -> Self {
        Self { expected, range }
    }
}

/// Registry of accepted parameter keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSchema {
    exact: BTreeMap<String, SchemaEntry>,
    wildcards: BTreeMap<String, SchemaEntry>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl ParameterSchema {
    /// A schema with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            exact: BTreeMap::new(),
            wildcards: BTreeMap::new(),
        }
    }

    /// The word/image experiment schema.
    #[must_use]
    pub fn standard() -> Self {
        let number = || Expected::Kind(ValueKind::Number);
        let task = || {
            Expected::OneOf(vec![
                ValueKind::Number,
                ValueKind::Sequence,
                ValueKind::Generator,
            ])
        };
        let factor = || Expected::OneOf(vec![ValueKind::Boolean, ValueKind::Text]);

        let mut schema = Self::empty();
        for modality in ["word", "image"] {
            schema
                .register(format!("{modality}.concept"), number(), Range::Finite)
                .register(format!("{modality}.task"), task(), Range::Finite)
                .register_wildcard(modality, number(), Range::Finite);
        }
        for source in ["image", "word", "question", "participant"] {
            schema.register(format!("var.{source}"), number(), Range::NonNegative);
        }
        for count in ["participant", "question", "trial"] {
            schema.register(
                format!("n.{count}"),
                Expected::Kind(ValueKind::Integer),
                Range::Positive,
            );
        }
        schema
            .register("design.items", factor(), Range::Finite)
            .register("design.questions", factor(), Range::Finite)
            .register(
                "design.item_noise",
                Expected::Kind(ValueKind::Text),
                Range::Finite,
            );
        schema
    }

    /// Register an exact key.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        expected: Expected,
        range: Range,
    ) -> &mut Self {
        self.exact
            .insert(key.into(), SchemaEntry::new(expected, range));
        self
    }

    /// Register a `category.*` wildcard.
    pub fn register_wildcard(
        &mut self,
        category: impl Into<String>,
        expected: Expected,
        range: Range,
    ) -> &mut Self {
        self.wildcards
            .insert(category.into(), SchemaEntry::new(expected, range));
        self
    }

    /// Look up the entry governing `key`, exact first, then wildcard.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&SchemaEntry> {
        self.exact.get(key).or_else(|| {
            split_key(key)
                .ok()
                .and_then(|(category, _)| self.wildcards.get(category))
        })
    }

    /// Validate every key of a flat mapping.
    ///
    /// Either the whole mapping is accepted or the first offending key is
    /// reported.
    ///
    /// # Errors
    ///
    /// - [`ParamError::UnknownParameter`] for unregistered keys
    /// - [`ParamError::TypeMismatch`] for values of the wrong kind
    /// - [`ParamError::OutOfRange`] for values violating the entry's range
    pub fn validate(&self, flat: &FlatParams) -> ParamResult<()> {
        for (key, value) in flat.iter() {
            let entry = self
                .lookup(key)
                .ok_or_else(|| ParamError::UnknownParameter { key: key.clone() })?;

            if !entry.expected.accepts(value) {
                return Err(ParamError::TypeMismatch {
                    key: key.clone(),
                    expected: entry.expected.to_string(),
                    actual: value.kind_name(),
                });
            }

            check_range(key, value, entry.range)?;
        }
        Ok(())
    }
}

fn check_range(key: &str, value: &ParamValue, range: Range) -> ParamResult<()> {
    let out_of_range = || ParamError::OutOfRange {
        key: key.to_string(),
        value: value.to_string(),
        expected: range.describe(),
    };
    match value {
        ParamValue::Int(_) | ParamValue::Float(_) => {
            let x = value.as_f64().unwrap_or(f64::NAN);
            if range.admits(x) {
                Ok(())
            } else {
                Err(out_of_range())
            }
        }
        ParamValue::Sequence(xs) => {
            if xs.iter().all(|x| x.is_finite()) {
                Ok(())
            } else {
                Err(ParamError::OutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "finite elements",
                })
            }
        }
        ParamValue::Bool(_) | ParamValue::Text(_) | ParamValue::Generator(_) => Ok(()),
    }
}
