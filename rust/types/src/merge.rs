//! Parameter merging for partial updates.
//!
//! # Merge Semantics
//!
//! `merge(existing, updates)` parses the flat `updates` and folds them into a
//! copy of `existing`, one category at a time:
//!
//! 1. category present in both: attributes are merged one by one, the update
//!    wins on conflict and untouched attributes are kept
//! 2. category only in the update: inserted as a whole
//! 3. category only in `existing`: kept unchanged
//!
//! The input mapping is never mutated.

use crate::error::ParamResult;
use crate::parse::{parse, FlatParams, NestedParams};

/// Merge flat updates into a nested parameter mapping.
///
/// # Examples
///
/// ```
/// use wiscs_types::{merge, parse, FlatParams, ParamValue};
///
/// let base = parse(&FlatParams::new().set("word.concept", 500.0).set("n.trial", 4)).unwrap();
/// let merged = merge(&base, &FlatParams::new().set("word.concept", 600.0)).unwrap();
/// assert_eq!(merged["word"]["concept"], ParamValue::Float(600.0));
/// assert_eq!(merged["n"], base["n"]);
/// ```
///
/// # Errors
///
/// Returns [`crate::ParamError::MalformedKey`] if an update key cannot be split.
pub fn merge(existing: &NestedParams, updates: &FlatParams) -> ParamResult<NestedParams> {
    let parsed = parse(updates)?;
    let mut merged = existing.clone();

    for (category, attrs) in parsed {
        match merged.get_mut(&category) {
            Some(current) => current.extend(attrs),
            None => {
                merged.insert(category, attrs);
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;
    use crate::value::ParamValue;

    fn base() -> NestedParams {
        parse(
            &FlatParams::new()
                .set("word.concept", 500.0)
                .set("word.perceptual", 20.0)
                .set("image.concept", 520.0)
                .set("n.participant", 4),
        )
        .expect("parse base")
    }

    #[test]
    fn update_overrides_only_named_attribute() {
        let existing = base();
        let merged = merge(&existing, &FlatParams::new().set("word.concept", 600.0)).expect("merge");

        assert_eq!(merged["word"]["concept"], ParamValue::Float(600.0));
        assert_eq!(merged["word"]["perceptual"], ParamValue::Float(20.0));
        assert_eq!(merged["image"], existing["image"]);
        assert_eq!(merged["n"], existing["n"]);
    }

    #[test]
    fn new_category_is_inserted_whole() {
        let merged = merge(&base(), &FlatParams::new().set("design.items", "between"))
            .expect("merge");
        assert_eq!(
            merged["design"]["items"],
            ParamValue::Text("between".into())
        );
    }

    #[test]
    fn existing_is_left_untouched() {
        let existing = base();
        let snapshot = existing.clone();
        let _ = merge(&existing, &FlatParams::new().set("word.concept", 1.0)).expect("merge");
        assert_eq!(existing, snapshot);
    }

    #[test]
    fn malformed_update_key_fails() {
        let result = merge(&base(), &FlatParams::new().set("concept", 1.0));
        assert!(matches!(result, Err(ParamError::MalformedKey { .. })));
    }
}
