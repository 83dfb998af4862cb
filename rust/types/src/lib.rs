//! Parameter model for the word/image reaction-time simulator.
//!
//! Parameters arrive as flat dotted keys (`"word.concept"`, `"n.trial"`),
//! are checked against a [`ParameterSchema`], nested by category, merged with
//! partial updates, and finally resolved into a typed [`ParameterSet`].
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | Validate | [`ParameterSchema::validate`] |
//! | Nest / flatten | [`parse`], [`flatten`] |
//! | Partial update | [`merge`] |
//! | Resolve | [`ParameterSet::from_nested`] |
//!
//! # Example
//!
//! ```
//! use wiscs_types::{parse, FlatParams, ParameterSchema, ParameterSet};
//!
//! let flat = FlatParams::new()
//!     .set("word.concept", 500.0)
//!     .set("image.concept", 520.0)
//!     .set("var.image", 0.0)
//!     .set("var.word", 0.0)
//!     .set("var.question", 0.0)
//!     .set("var.participant", 0.0)
//!     .set("n.participant", 2)
//!     .set("n.question", 2)
//!     .set("n.trial", 1);
//!
//! ParameterSchema::standard().validate(&flat).unwrap();
//! let set = ParameterSet::from_nested(&parse(&flat).unwrap()).unwrap();
//! assert_eq!(set.counts.shape(), (2, 2, 1));
//! ```

mod config;
mod error;
mod merge;
mod parse;
mod schema;
mod value;

pub use config::{
    category, Counts, Design, Factor, ItemNoisePolicy, Modality, ModalityParams, NoiseParams,
    ParameterSet, TaskSpec, CONCEPT, TASK,
};
pub use error::{ParamError, ParamResult};
pub use merge::merge;
pub use parse::{flatten, join_key, parse, split_key, FlatParams, NestedParams, SEPARATOR};
pub use schema::{Expected, ParameterSchema, Range, SchemaEntry, ValueKind};
pub use value::{CustomGenerator, ParamValue, TaskFn, TaskGenerator};
