//! Long-form export of generated tensors.
//!
//! One [`TidyRow`] per observation: image block first, then word block, each
//! participant-major, then question, then trial.

use serde::{Deserialize, Serialize};
use wiscs_types::Modality;

use crate::design::DesignedRun;
use crate::engine::SimulationOutput;

/// A single observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub participant: usize,
    /// Global question index.
    pub question: usize,
    pub trial: usize,
    pub rt: f64,
    pub modality: Modality,
    /// Subgroup label, set for designed runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Collected rows from one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TidyTable {
    pub rows: Vec<TidyRow>,
}

impl TidyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TidyRow> {
        self.rows.iter()
    }

    /// Rows for one modality, in table order.
    #[must_use]
    pub fn rows_for(&self, modality: Modality) -> Vec<&TidyRow> {
        self.rows.iter().filter(|r| r.modality == modality).collect()
    }

    /// Distinct subgroup labels in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for label in self.rows.iter().filter_map(|r| r.group.as_deref()) {
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    }

    fn extend_from(&mut self, output: &SimulationOutput, offsets: Offsets, group: Option<&str>) {
        for modality in [Modality::Image, Modality::Word] {
            emit(self, output, modality, offsets, group);
        }
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRow;
    type IntoIter = std::slice::Iter<'a, TidyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Offsets {
    participant: usize,
    question: usize,
}

/// Flatten a single run.
#[must_use]
pub fn to_table(output: &SimulationOutput) -> TidyTable {
    let mut table = TidyTable::new();
    table.extend_from(output, Offsets::default(), None);
    table
}

/// Flatten a designed run, subgroup by subgroup in plan order.
#[must_use]
pub fn designed_to_table(run: &DesignedRun) -> TidyTable {
    let mut table = TidyTable::new();
    for group in &run.groups {
        let offsets = Offsets {
            participant: group.participant_offset,
            question: group.subgroup.questions.offset,
        };
        let label = group.subgroup.label();
        table.extend_from(&group.output, offsets, Some(&label));
    }
    table
}

/// `[0, 0, .., 1, 1, ..]`: each index repeated `times` times.
fn repeat(n: usize, times: usize) -> impl Iterator<Item = usize> {
    (0..n).flat_map(move |i| std::iter::repeat(i).take(times))
}

/// `[0, 1, .., n-1, 0, 1, ..]`: the whole range tiled `times` times.
fn tile(n: usize, times: usize) -> impl Iterator<Item = usize> {
    (0..times).flat_map(move |_| 0..n)
}

fn emit(
    table: &mut TidyTable,
    output: &SimulationOutput,
    modality: Modality,
    offsets: Offsets,
    group: Option<&str>,
) {
    let tensor = output.tensor(modality);
    let (np, nq, nt) = tensor.dim();

    let participants: Vec<usize> = repeat(np, nq * nt).collect();
    let questions: Vec<usize> = tile(nq, np).flat_map(|q| std::iter::repeat(q).take(nt)).collect();
    let trials: Vec<usize> = tile(nt, np * nq).collect();
    // Logical iteration order is row-major.
    let rts: Vec<f64> = tensor.iter().copied().collect();

    assert_eq!(participants.len(), rts.len(), "participant column length");
    assert_eq!(questions.len(), rts.len(), "question column length");
    assert_eq!(trials.len(), rts.len(), "trial column length");

    table.rows.reserve(rts.len());
    for (((p, q), t), rt) in participants.into_iter().zip(questions).zip(trials).zip(rts) {
        table.rows.push(TidyRow {
            participant: p + offsets.participant,
            question: q + offsets.question,
            trial: t,
            rt,
            modality,
            group: group.map(str::to_owned),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Hypothesis;
    use ndarray::Array3;

    fn output() -> SimulationOutput {
        // rt encodes its own index: 100p + 10q + t
        let shape = (2, 3, 2);
        let encode = |(p, q, t): (usize, usize, usize)| (100 * p + 10 * q + t) as f64;
        SimulationOutput {
            image: Array3::from_shape_fn(shape, encode),
            word: Array3::from_shape_fn(shape, |i| encode(i) + 1000.0),
            hypothesis: Hypothesis::Null,
        }
    }

    #[test]
    fn index_columns_line_up_with_values() {
        let table = to_table(&output());
        assert_eq!(table.len(), 2 * 2 * 3 * 2);
        for row in &table {
            let base = (100 * row.participant + 10 * row.question + row.trial) as f64;
            let expected = match row.modality {
                Modality::Image => base,
                Modality::Word => base + 1000.0,
            };
            assert_eq!(row.rt, expected);
            assert_eq!(row.group, None);
        }
    }

    #[test]
    fn image_block_precedes_word_block() {
        let table = to_table(&output());
        let half = table.len() / 2;
        assert!(table.rows[..half].iter().all(|r| r.modality == Modality::Image));
        assert!(table.rows[half..].iter().all(|r| r.modality == Modality::Word));
    }

    #[test]
    fn rows_are_participant_major() {
        let table = to_table(&output());
        let keys: Vec<_> = table
            .rows_for(Modality::Image)
            .iter()
            .map(|r| (r.participant, r.question, r.trial))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], (0, 0, 0));
        assert_eq!(keys[1], (0, 0, 1));
        assert_eq!(keys[2], (0, 1, 0));
    }

    #[test]
    fn group_is_omitted_from_json_when_absent() {
        let row = TidyRow {
            participant: 0,
            question: 1,
            trial: 0,
            rt: 500.0,
            modality: Modality::Word,
            group: None,
        };
        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(
            json,
            r#"{"participant":0,"question":1,"trial":0,"rt":500.0,"modality":"word"}"#
        );
    }
}
