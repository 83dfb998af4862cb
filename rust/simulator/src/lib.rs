//! Reaction-time data generation for word/image experiments.
//!
//! Takes a resolved [`wiscs_types::ParameterSet`], draws additive noise with
//! a seeded [`SimRng`], and produces `(participant, question, trial)` RT
//! tensors for both modalities. Between-subject designs are split into
//! subgroups by [`design`]; [`DataGenerator`] ties validation, generation and
//! tidy export together.

// RT tensors are indexed with usize and averaged as f64.
#![allow(clippy::cast_precision_loss)]

pub mod analysis;
pub mod design;
pub mod engine;
pub mod error;
pub mod generator;
pub mod presets;
pub mod rng;
pub mod scenario;
pub mod tidy;

pub use analysis::{deltas, pairwise_deltas, question_deltas, Dimension, QuestionDelta};
pub use design::{DesignedRun, ItemArm, QuestionLabel, QuestionWindow, Subgroup, SubgroupRun};
pub use engine::{Hypothesis, RtTensor, SimulationOutput};
pub use error::{SimError, SimResult};
pub use generator::{simulate, DataGenerator, GeneratorState, ParamUpdate, SimulationResult};
pub use rng::SimRng;
pub use scenario::Scenario;
pub use tidy::{designed_to_table, to_table, TidyRow, TidyTable};
