//! Flat and nested parameter mappings.
//!
//! Parameters are written flat with dotted keys (`"word.concept"`,
//! `"n.participant"`) and stored nested as category → attribute → value.
//! Only the first `.` separates the category; the rest of the key is the
//! attribute name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, ParamResult};
use crate::value::ParamValue;

/// Separator between category and attribute in a flat key.
pub const SEPARATOR: char = '.';

/// Nested parameter mapping: category → attribute → value.
pub type NestedParams = BTreeMap<String, BTreeMap<String, ParamValue>>;

/// Flat parameter mapping keyed by `category.attribute`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatParams(BTreeMap<String, ParamValue>);

impl FlatParams {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for FlatParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FlatParams {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Split a flat key into `(category, attribute)` at the first separator.
///
/// # Errors
///
/// Returns [`ParamError::MalformedKey`] when the key has no separator or
/// either side is empty.
pub fn split_key(key: &str) -> ParamResult<(&str, &str)> {
    match key.split_once(SEPARATOR) {
        Some((category, attribute)) if !category.is_empty() && !attribute.is_empty() => {
            Ok((category, attribute))
        }
        _ => Err(ParamError::MalformedKey {
            key: key.to_string(),
        }),
    }
}

/// Join a category and attribute into a flat key.
#[must_use]
pub fn join_key(category: &str, attribute: &str) -> String {
    format!("{category}{SEPARATOR}{attribute}")
}

/// Convert a flat mapping into its nested form.
///
/// # Errors
///
/// Returns [`ParamError::MalformedKey`] for the first key that cannot be split.
pub fn parse(flat: &FlatParams) -> ParamResult<NestedParams> {
    let mut nested = NestedParams::new();
    for (key, value) in flat.iter() {
        let (category, attribute) = split_key(key)?;
        nested
            .entry(category.to_string())
            .or_default()
            .insert(attribute.to_string(), value.clone());
    }
    Ok(nested)
}

/// Convert a nested mapping back to flat dotted keys.
#[must_use]
pub fn flatten(nested: &NestedParams) -> FlatParams {
    nested
        .iter()
        .flat_map(|(category, attrs)| {
            attrs
                .iter()
                .map(move |(attribute, value)| (join_key(category, attribute), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_separator_only() {
        let flat = FlatParams::new().set("word.visual.early", 3.0);
        let nested = parse(&flat).expect("parse");
        assert_eq!(
            nested["word"]["visual.early"],
            ParamValue::Float(3.0),
            "attribute keeps the remaining dots"
        );
    }

    #[test]
    fn parse_rejects_key_without_separator() {
        let flat = FlatParams::new().set("participants", 10);
        assert_eq!(
            parse(&flat),
            Err(ParamError::MalformedKey {
                key: "participants".into()
            })
        );
    }

    #[test]
    fn parse_rejects_empty_sides() {
        for key in [".concept", "word.", "."] {
            let flat = FlatParams::new().set(key, 1.0);
            assert!(matches!(parse(&flat), Err(ParamError::MalformedKey { .. })));
        }
    }

    #[test]
    fn flatten_produces_dotted_keys() {
        let flat = FlatParams::new()
            .set("n.trial", 2)
            .set("var.word", 0.5)
            .set("word.concept", 500.0);
        let nested = parse(&flat).expect("parse");
        assert_eq!(flatten(&nested), flat);
    }
}
