//! Reaction-time generation for one group of participants.
//!
//! Each modality's RT tensor is the additive sum
//!
//! ```text
//! RT[p, q, t] = baseline + task[q] + item[p, q, t] + participant[p, q, t] + question[p, q, t]
//! ```
//!
//! where `baseline` is `concept` plus every extra component, `item` is the
//! modality's own noise draw and the participant and question draws are shared
//! by both modalities. Sharing those two sources is what correlates word and
//! image RTs.

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wiscs_types::{ItemNoisePolicy, Modality, ModalityParams, ParameterSet};

use crate::error::{SimError, SimResult};
use crate::rng::SimRng;

/// RT tensor indexed `(participant, question, trial)`.
pub type RtTensor = Array3<f64>;

/// Whether the two modalities share task effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hypothesis {
    /// Identical task effects for word and image.
    Null,
    /// Task effects differ for at least one question.
    Alternative,
}

/// Generated tensors for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub image: RtTensor,
    pub word: RtTensor,
    pub hypothesis: Hypothesis,
}

impl SimulationOutput {
    #[must_use]
    pub fn tensor(&self, modality: Modality) -> &RtTensor {
        match modality {
            Modality::Word => &self.word,
            Modality::Image => &self.image,
        }
    }

    /// `(participant, question, trial)` shape shared by both tensors.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.image.dim()
    }
}

/// Materialize a modality's task effects and check their length.
///
/// # Errors
///
/// Returns [`SimError::DimensionMismatch`] when the vector does not have
/// `n_questions` entries.
pub fn task_vector(
    modality: Modality,
    params: &ModalityParams,
    n_questions: usize,
    rng: &mut SimRng,
) -> SimResult<Vec<f64>> {
    let task = params.task.materialize(n_questions, rng);
    if task.len() != n_questions {
        return Err(SimError::DimensionMismatch {
            modality,
            expected: n_questions,
            actual: task.len(),
        });
    }
    Ok(task)
}

/// Compare task vectors and emit the alternative-hypothesis advisory.
#[must_use]
pub fn detect_hypothesis(task_image: &[f64], task_word: &[f64]) -> Hypothesis {
    if task_image == task_word {
        Hypothesis::Null
    } else {
        warn!(
            image = ?task_image,
            word = ?task_word,
            "image and word task effects differ; generating under the alternative hypothesis"
        );
        Hypothesis::Alternative
    }
}

/// Generate image and word RT tensors.
///
/// Both task vectors are materialized and length-checked before any tensor is
/// allocated. Noise is drawn in a fixed order (image item, word item,
/// question, participant) so a seed reproduces the same data.
///
/// # Errors
///
/// - [`SimError::DimensionMismatch`] if a task vector length differs from `n.question`
/// - [`SimError::Configuration`] if a noise scale is not a valid standard deviation
pub fn generate(params: &ParameterSet, rng: &mut SimRng) -> SimResult<SimulationOutput> {
    let n_questions = params.counts.question;

    let task_image = task_vector(Modality::Image, &params.image, n_questions, rng)?;
    let task_word = task_vector(Modality::Word, &params.word, n_questions, rng)?;
    let hypothesis = detect_hypothesis(&task_image, &task_word);
    render(params, &task_image, &task_word, hypothesis, rng)
}

/// Draw noise and compose tensors from already materialized task vectors.
///
/// `hypothesis` is carried through unchanged; callers that slice tasks per
/// subgroup pass the hypothesis of the full vectors.
///
/// # Errors
///
/// - [`SimError::DimensionMismatch`] if a task slice length differs from `n.question`
/// - [`SimError::Configuration`] if a noise scale is not a valid standard deviation
pub fn render(
    params: &ParameterSet,
    task_image: &[f64],
    task_word: &[f64],
    hypothesis: Hypothesis,
    rng: &mut SimRng,
) -> SimResult<SimulationOutput> {
    let shape = params.counts.shape();
    for (modality, task) in [(Modality::Image, task_image), (Modality::Word, task_word)] {
        if task.len() != shape.1 {
            return Err(SimError::DimensionMismatch {
                modality,
                expected: shape.1,
                actual: task.len(),
            });
        }
    }
    let noise = &params.noise;
    let image_item = rng.normal_tensor(noise.image, shape)?;
    let word_item = match params.design.item_noise {
        ItemNoisePolicy::Independent => rng.normal_tensor(noise.word, shape)?,
        ItemNoisePolicy::Shared => image_item.clone(),
    };
    let question_noise = rng.normal_tensor(noise.question, shape)?;
    let participant_noise = rng.normal_tensor(noise.participant, shape)?;

    let shared = question_noise + &participant_noise;
    let image = compose(params.image.baseline(), task_image, shape) + &image_item + &shared;
    let word = compose(params.word.baseline(), task_word, shape) + &word_item + &shared;

    debug!(
        participants = shape.0,
        questions = shape.1,
        trials = shape.2,
        ?hypothesis,
        "generated reaction-time tensors"
    );

    Ok(SimulationOutput {
        image,
        word,
        hypothesis,
    })
}

/// Baseline plus task effect broadcast over participants and trials.
fn compose(baseline: f64, task: &[f64], shape: (usize, usize, usize)) -> RtTensor {
    Array3::from_shape_fn(shape, |(_, q, _)| baseline + task[q])
}
