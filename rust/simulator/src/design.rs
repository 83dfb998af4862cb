//! Between-subject design splitting.
//!
//! A between-subjects item factor splits participants into a word-only and an
//! image-only arm; a between-subjects question factor splits the question
//! range into two contiguous windows. The subgroups are the Cartesian product
//! of the two splits, item-major:
//!
//! | items \ questions | within | between |
//! |-------------------|--------|---------|
//! | within  | `both__allQ` | `both__Q1`, `both__Q2` |
//! | between | `word_only__allQ`, `image_only__allQ` | `word_only__Q1`, `word_only__Q2`, `image_only__Q1`, `image_only__Q2` |
//!
//! Odd splits give the remainder to the first subgroup. Each subgroup is
//! simulated separately with its own participants, so participant ids keep
//! increasing across subgroups.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wiscs_types::{Counts, Design, Factor, Modality, ModalityParams, ParameterSet, TaskSpec};

use crate::engine::{self, detect_hypothesis, task_vector, Hypothesis, SimulationOutput};
use crate::error::SimResult;
use crate::rng::SimRng;

/// Which modalities a subgroup's participants see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemArm {
    Both,
    WordOnly,
    ImageOnly,
}

impl ItemArm {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::WordOnly => "word_only",
            Self::ImageOnly => "image_only",
        }
    }

    #[must_use]
    pub fn sees(self, modality: Modality) -> bool {
        match (self, modality) {
            (Self::Both, _) => true,
            (Self::WordOnly, Modality::Word) | (Self::ImageOnly, Modality::Image) => true,
            (Self::WordOnly, Modality::Image) | (Self::ImageOnly, Modality::Word) => false,
        }
    }
}

/// Which part of the question range a subgroup answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionLabel {
    #[serde(rename = "allQ")]
    AllQ,
    Q1,
    Q2,
}

impl QuestionLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllQ => "allQ",
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
        }
    }
}

/// Contiguous window of question indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionWindow {
    pub label: QuestionLabel,
    pub offset: usize,
    pub len: usize,
}

impl QuestionWindow {
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// One cell of the between-subject design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
    pub arm: ItemArm,
    pub participants: usize,
    pub questions: QuestionWindow,
}

impl Subgroup {
    /// `"{arm}__{window}"`, e.g. `"word_only__Q1"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}__{}", self.arm.label(), self.questions.label.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants == 0 || self.questions.len == 0
    }
}

/// Split `n` into `(half + remainder, half)`.
#[must_use]
pub fn split_half(n: usize) -> (usize, usize) {
    let half = n / 2;
    (half + n % 2, half)
}

/// Participant arms for the item factor.
#[must_use]
pub fn item_arms(items: Factor, n_participants: usize) -> Vec<(ItemArm, usize)> {
    match items {
        Factor::Within => vec![(ItemArm::Both, n_participants)],
        Factor::Between => {
            let (first, second) = split_half(n_participants);
            vec![(ItemArm::WordOnly, first), (ItemArm::ImageOnly, second)]
        }
    }
}

/// Question windows for the question factor.
#[must_use]
pub fn question_windows(questions: Factor, n_questions: usize) -> Vec<QuestionWindow> {
    match questions {
        Factor::Within => vec![QuestionWindow {
            label: QuestionLabel::AllQ,
            offset: 0,
            len: n_questions,
        }],
        Factor::Between => {
            let (first, second) = split_half(n_questions);
            vec![
                QuestionWindow {
                    label: QuestionLabel::Q1,
                    offset: 0,
                    len: first,
                },
                QuestionWindow {
                    label: QuestionLabel::Q2,
                    offset: first,
                    len: second,
                },
            ]
        }
    }
}

/// Plan the subgroups for a design.
#[must_use]
pub fn plan(design: &Design, n_participants: usize, n_questions: usize) -> Vec<Subgroup> {
    let windows = question_windows(design.questions, n_questions);
    item_arms(design.items, n_participants)
        .into_iter()
        .flat_map(|(arm, participants)| {
            windows.iter().map(move |&questions| Subgroup {
                arm,
                participants,
                questions,
            })
        })
        .collect()
}

/// Output of one subgroup.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgroupRun {
    pub subgroup: Subgroup,
    /// Global id of the subgroup's first participant.
    pub participant_offset: usize,
    pub output: SimulationOutput,
}

/// Output of a full designed simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignedRun {
    /// Decided on the full-length task vectors.
    pub hypothesis: Hypothesis,
    pub groups: Vec<SubgroupRun>,
}

impl DesignedRun {
    /// Total participants across all subgroups.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.groups.iter().map(|g| g.subgroup.participants).sum()
    }
}

/// Subgroup-local parameters and task slice for one modality.
///
/// A modality the subgroup never sees keeps only the noise: no concept, no
/// components, zero task.
fn subgroup_modality(
    params: &ModalityParams,
    full_task: &[f64],
    subgroup: &Subgroup,
    modality: Modality,
) -> (ModalityParams, Vec<f64>) {
    let n = subgroup.questions.len;
    if subgroup.arm.sees(modality) {
        let task = full_task[subgroup.questions.range()].to_vec();
        let local = ModalityParams {
            concept: params.concept,
            components: params.components.clone(),
            task: TaskSpec::Sequence(task.clone()),
        };
        (local, task)
    } else {
        (ModalityParams::unseen(n), vec![0.0; n])
    }
}

/// Simulate every subgroup of the design.
///
/// Task vectors are materialized once for the full question range, so both
/// windows slice the same draw of a generated task, and the hypothesis is
/// decided on the full vectors. Each subgroup runs on a child of `rng`.
///
/// # Errors
///
/// Propagates [`crate::SimError::DimensionMismatch`] for full-length task
/// vectors and any engine error.
pub fn run(params: &ParameterSet, rng: &mut SimRng) -> SimResult<DesignedRun> {
    let counts = params.counts;
    let task_image = task_vector(Modality::Image, &params.image, counts.question, rng)?;
    let task_word = task_vector(Modality::Word, &params.word, counts.question, rng)?;
    let hypothesis = detect_hypothesis(&task_image, &task_word);

    let mut groups = Vec::new();
    let mut participant_offset = 0;

    for subgroup in plan(&params.design, counts.participant, counts.question) {
        if subgroup.is_empty() {
            debug!(group = %subgroup.label(), "skipping empty subgroup");
            continue;
        }

        let (word, local_word) =
            subgroup_modality(&params.word, &task_word, &subgroup, Modality::Word);
        let (image, local_image) =
            subgroup_modality(&params.image, &task_image, &subgroup, Modality::Image);
        let local = ParameterSet {
            word,
            image,
            noise: params.noise,
            counts: Counts::new(subgroup.participants, subgroup.questions.len, counts.trial),
            design: params.design,
        };

        let mut child = rng.fork();
        let output = engine::render(&local, &local_image, &local_word, hypothesis, &mut child)?;
        debug!(
            group = %subgroup.label(),
            participant_offset,
            participants = subgroup.participants,
            questions = subgroup.questions.len,
            "simulated subgroup"
        );

        let participants = subgroup.participants;
        groups.push(SubgroupRun {
            subgroup,
            participant_offset,
            output,
        });
        participant_offset += participants;
    }

    Ok(DesignedRun { hypothesis, groups })
}
