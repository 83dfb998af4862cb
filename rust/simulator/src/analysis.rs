//! Word/image differences over the experimental units.
//!
//! Tensor-level deltas average out the other two axes; table-level deltas
//! work on exported rows and so see global question ids.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;
use wiscs_types::Modality;

use crate::engine::{RtTensor, SimulationOutput};
use crate::tidy::TidyTable;

/// Axis of the `(participant, question, trial)` tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Participant,
    Question,
    Trial,
}

impl Dimension {
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Self::Participant => Axis(0),
            Self::Question => Axis(1),
            Self::Trial => Axis(2),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Participant => "participant",
            Self::Question => "question",
            Self::Trial => "trial",
        })
    }
}

/// Mean RT for each index along `dim`.
#[must_use]
pub fn means(tensor: &RtTensor, dim: Dimension) -> Array1<f64> {
    let axis = dim.axis();
    (0..tensor.len_of(axis))
        .map(|i| tensor.index_axis(axis, i).mean().unwrap_or(f64::NAN))
        .collect()
}

/// `|mean(image) - mean(word)|` for each index along `dim`.
#[must_use]
pub fn deltas(output: &SimulationOutput, dim: Dimension) -> Array1<f64> {
    let image = means(&output.image, dim);
    let word = means(&output.word, dim);
    (image - word).mapv(f64::abs)
}

/// Grid of `|image_mean[i] - word_mean[j]|` along `dim`.
#[must_use]
pub fn pairwise_deltas(output: &SimulationOutput, dim: Dimension) -> Array2<f64> {
    let image = means(&output.image, dim);
    let word = means(&output.word, dim);
    Array2::from_shape_fn((image.len(), word.len()), |(i, j)| (image[i] - word[j]).abs())
}

/// Per-question word and image means from a tidy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDelta {
    pub question: usize,
    pub word_mean: f64,
    pub image_mean: f64,
    /// `word_mean - image_mean`.
    pub delta: f64,
}

#[derive(Default)]
struct Accum {
    word: (f64, usize),
    image: (f64, usize),
}

impl Accum {
    fn push(&mut self, modality: Modality, rt: f64) {
        let slot = match modality {
            Modality::Word => &mut self.word,
            Modality::Image => &mut self.image,
        };
        slot.0 += rt;
        slot.1 += 1;
    }
}

fn mean((sum, n): (f64, usize)) -> f64 {
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Word minus image mean RT per global question id, collapsing participants
/// and trials. Questions appear in ascending order; a question one modality
/// never saw gets a NaN mean for it.
#[must_use]
pub fn question_deltas(table: &TidyTable) -> Vec<QuestionDelta> {
    let mut by_question: BTreeMap<usize, Accum> = BTreeMap::new();
    for row in table {
        by_question
            .entry(row.question)
            .or_default()
            .push(row.modality, row.rt);
    }

    by_question
        .into_iter()
        .map(|(question, acc)| {
            let word_mean = mean(acc.word);
            let image_mean = mean(acc.image);
            let delta = word_mean - image_mean;
            info!(question, delta = format_args!("{:.2}", delta.abs()), "|word - image|");
            QuestionDelta {
                question,
                word_mean,
                image_mean,
                delta,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Hypothesis;
    use crate::tidy::to_table;
    use ndarray::Array3;

    fn output() -> SimulationOutput {
        // image rises with the question index, word is flat
        SimulationOutput {
            image: Array3::from_shape_fn((2, 3, 4), |(_, q, _)| 500.0 + 10.0 * q as f64),
            word: Array3::from_elem((2, 3, 4), 505.0),
            hypothesis: Hypothesis::Alternative,
        }
    }

    #[test]
    fn question_axis_deltas() {
        let d = deltas(&output(), Dimension::Question);
        assert_eq!(d.to_vec(), vec![5.0, 5.0, 15.0]);
    }

    #[test]
    fn trial_axis_uses_trial_count() {
        let d = deltas(&output(), Dimension::Trial);
        assert_eq!(d.len(), 4);
        assert!(d.iter().all(|&x| (x - 5.0).abs() < 1e-12));
    }

    #[test]
    fn pairwise_grid_shape_and_values() {
        let grid = pairwise_deltas(&output(), Dimension::Question);
        assert_eq!(grid.dim(), (3, 3));
        assert_eq!(grid[[2, 0]], 15.0);
        assert_eq!(grid[[0, 2]], 5.0);
    }

    #[test]
    fn table_deltas_are_signed_word_minus_image() {
        let rows = question_deltas(&to_table(&output()));
        let signed: Vec<_> = rows.iter().map(|r| r.delta).collect();
        assert_eq!(signed, vec![5.0, -5.0, -15.0]);
        assert_eq!(rows[1].image_mean, 510.0);
    }
}
