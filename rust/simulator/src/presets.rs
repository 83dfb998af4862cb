//! Scenario presets for integration tests and the CLI.

use wiscs_types::{category, Counts, Factor, NestedParams, NoiseParams, ParamValue, CONCEPT, TASK};

use crate::scenario::Scenario;

fn set(params: &mut NestedParams, cat: &str, attr: &str, value: impl Into<ParamValue>) {
    params
        .entry(cat.to_string())
        .or_default()
        .insert(attr.to_string(), value.into());
}

fn set_noise(params: &mut NestedParams, noise: NoiseParams) {
    set(params, category::VAR, "image", noise.image);
    set(params, category::VAR, "word", noise.word);
    set(params, category::VAR, "question", noise.question);
    set(params, category::VAR, "participant", noise.participant);
}

fn set_counts(params: &mut NestedParams, counts: Counts) {
    set(params, category::N, "participant", counts.participant);
    set(params, category::N, "question", counts.question);
    set(params, category::N, "trial", counts.trial);
}

/// Zero-noise scenario with constant concepts and no task effects.
///
/// Every generated word RT equals `word` and every image RT equals `image`.
#[must_use]
pub fn deterministic_baseline(
    name: impl Into<String>,
    word: f64,
    image: f64,
    counts: Counts,
) -> Scenario {
    let mut params = NestedParams::new();
    set(&mut params, category::WORD, CONCEPT, word);
    set(&mut params, category::IMAGE, CONCEPT, image);
    set_noise(&mut params, NoiseParams::zero());
    set_counts(&mut params, counts);
    Scenario {
        name: name.into(),
        seed: Some(0),
        params,
    }
}

/// Both modalities share `tasks`; differences come from concepts and noise.
#[must_use]
pub fn null_hypothesis(
    name: impl Into<String>,
    word: f64,
    image: f64,
    tasks: &[f64],
    noise: NoiseParams,
    trials: usize,
    participants: usize,
) -> Scenario {
    alternative_hypothesis(name, (word, tasks), (image, tasks), noise, trials, participants)
}

/// Each modality gets its own concept and task effects.
///
/// The question count is taken from the word task length.
#[must_use]
pub fn alternative_hypothesis(
    name: impl Into<String>,
    (word, word_tasks): (f64, &[f64]),
    (image, image_tasks): (f64, &[f64]),
    noise: NoiseParams,
    trials: usize,
    participants: usize,
) -> Scenario {
    let mut params = NestedParams::new();
    set(&mut params, category::WORD, CONCEPT, word);
    set(&mut params, category::WORD, TASK, word_tasks);
    set(&mut params, category::IMAGE, CONCEPT, image);
    set(&mut params, category::IMAGE, TASK, image_tasks);
    set_noise(&mut params, noise);
    set_counts(
        &mut params,
        Counts::new(participants, word_tasks.len(), trials),
    );
    Scenario {
        name: name.into(),
        seed: Some(0),
        params,
    }
}

/// Add design factors to a scenario.
#[must_use]
pub fn with_design(mut scenario: Scenario, items: Factor, questions: Factor) -> Scenario {
    let spelling = |f: Factor| match f {
        Factor::Within => "within",
        Factor::Between => "between",
    };
    set(&mut scenario.params, category::DESIGN, "items", spelling(items));
    set(&mut scenario.params, category::DESIGN, "questions", spelling(questions));
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiscs_types::{Modality, TaskSpec};

    #[test]
    fn test_baseline_resolves() {
        let scenario = deterministic_baseline("base", 500.0, 520.0, Counts::new(2, 2, 1));
        let generator = scenario.generator(None).expect("valid");
        assert_eq!(generator.parameter_set().counts, Counts::new(2, 2, 1));
        assert_eq!(generator.parameter_set().noise, NoiseParams::zero());
    }

    #[test]
    fn test_null_hypothesis_shares_tasks() {
        let scenario = null_hypothesis(
            "null",
            500.0,
            500.0,
            &[0.0, 10.0, 20.0],
            NoiseParams::zero(),
            2,
            4,
        );
        let generator = scenario.generator(None).expect("valid");
        let set = generator.parameter_set();
        assert_eq!(set.counts.question, 3);
        assert_eq!(
            set.modality(Modality::Word).task,
            set.modality(Modality::Image).task
        );
        assert_eq!(set.word.task, TaskSpec::Sequence(vec![0.0, 10.0, 20.0]));
    }

    #[test]
    fn test_with_design_sets_factors() {
        let scenario = with_design(
            deterministic_baseline("split", 1.0, 2.0, Counts::new(4, 4, 1)),
            Factor::Between,
            Factor::Within,
        );
        let generator = scenario.generator(None).expect("valid");
        assert_eq!(generator.parameter_set().design.items, Factor::Between);
        assert_eq!(generator.parameter_set().design.questions, Factor::Within);
    }
}
