//! Word/image reaction-time data simulator.
//!
//! Synthesizes reaction times for a two-modality experiment organized by
//! participant, question and trial, with within- or between-subject designs
//! and an additive noise decomposition.
//!
//! # Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`types`] | Parameter schema, validation, flat/nested parsing, merging, typed `ParameterSet` |
//! | [`simulator`] | Seeded RNG, RT engine, design splitting, `DataGenerator`, tidy export, analysis, TOML scenarios |
//!
//! # Example
//!
//! ```
//! use wiscs::prelude::*;
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
//! let mut generator = DataGenerator::from_flat(&flat)?.with_seed(7);
//! generator.fit(None, false)?;
//! let table = generator.export()?;
//! assert_eq!(table.len(), 8);
//! assert!(table.rows_for(Modality::Word).iter().all(|r| r.rt == 500.0));
//! # Ok::<(), wiscs::simulator::SimError>(())
//! ```

pub use wiscs_simulator as simulator;
pub use wiscs_types as types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use wiscs_simulator::{
        DataGenerator, Dimension, Hypothesis, ParamUpdate, Scenario, SimError, SimRng,
        SimulationResult, TidyRow, TidyTable,
    };
    pub use wiscs_types::{
        FlatParams, Modality, NestedParams, ParamError, ParamValue, ParameterSchema,
        ParameterSet, TaskGenerator,
    };
}
