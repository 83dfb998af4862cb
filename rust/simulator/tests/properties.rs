//! Property tests for generation shapes, exact composition and design splits.

use proptest::prelude::*;

use wiscs_simulator::design::{self, plan};
use wiscs_simulator::engine::generate;
use wiscs_simulator::SimRng;
use wiscs_types::{
    Counts, Design, Factor, ItemNoisePolicy, ModalityParams, NoiseParams, ParameterSet, TaskSpec,
};

fn params(counts: Counts, noise: NoiseParams) -> ParameterSet {
    ParameterSet {
        word: ModalityParams::new(400.0),
        image: ModalityParams::new(450.0),
        noise,
        counts,
        design: Design::default(),
    }
}

fn factor() -> impl Strategy<Value = Factor> {
    prop_oneof![Just(Factor::Within), Just(Factor::Between)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. both tensors always have the requested shape
    #[test]
    fn tensors_have_requested_shape(
        np in 1usize..6, nq in 1usize..6, nt in 1usize..6, seed in any::<u64>(),
    ) {
        let noise = NoiseParams { image: 1.0, word: 2.0, question: 3.0, participant: 4.0 };
        let out = generate(&params(Counts::new(np, nq, nt), noise), &mut SimRng::new(seed))
            .expect("generate");
        prop_assert_eq!(out.image.dim(), (np, nq, nt));
        prop_assert_eq!(out.word.dim(), (np, nq, nt));
    }

    // 2. zero variance gives concept + extras + task exactly
    #[test]
    fn zero_variance_is_exact(
        tasks in prop::collection::vec(-50.0f64..50.0, 1..6),
        extra in 0.0f64..100.0,
        np in 1usize..4,
        nt in 1usize..4,
    ) {
        let mut p = params(Counts::new(np, tasks.len(), nt), NoiseParams::zero());
        p.word = p.word.with_component("motor", extra).with_task(TaskSpec::Sequence(tasks.clone()));
        let out = generate(&p, &mut SimRng::new(0)).expect("generate");
        for ((_, q, _), &rt) in out.word.indexed_iter() {
            prop_assert_eq!(rt, 400.0 + extra + tasks[q]);
        }
        prop_assert!(out.image.iter().all(|&rt| rt == 450.0));
    }

    // 3. item arms cover every participant exactly once, in contiguous ranges
    #[test]
    fn item_split_partitions_participants(
        np in 1usize..40, nq in 1usize..10, items in factor(), questions in factor(),
    ) {
        let design = Design { items, questions, item_noise: ItemNoisePolicy::Independent };
        let groups = plan(&design, np, nq);
        let per_arm: Vec<usize> = design::item_arms(items, np).iter().map(|&(_, n)| n).collect();
        prop_assert_eq!(per_arm.iter().sum::<usize>(), np);

        let windows = design::question_windows(questions, nq);
        prop_assert_eq!(windows.iter().map(|w| w.len).sum::<usize>(), nq);
        prop_assert_eq!(groups.len(), per_arm.len() * windows.len());
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].offset + pair[0].len, pair[1].offset);
        }
    }

    // 4. designed runs assign each subgroup a disjoint contiguous id range
    #[test]
    fn designed_participant_ids_are_contiguous(
        np in 2usize..12, nq in 2usize..6, seed in any::<u64>(),
    ) {
        let mut p = params(Counts::new(np, nq, 1), NoiseParams::zero());
        p.design.items = Factor::Between;
        p.design.questions = Factor::Between;
        let run = design::run(&p, &mut SimRng::new(seed)).expect("run");

        let mut next = 0;
        for group in &run.groups {
            prop_assert_eq!(group.participant_offset, next);
            prop_assert_eq!(group.output.shape().0, group.subgroup.participants);
            prop_assert_eq!(group.output.shape().1, group.subgroup.questions.len);
            next += group.subgroup.participants;
        }
        prop_assert_eq!(run.participant_count(), next);
    }
}

#[test]
fn single_participant_split_skips_empty_group() {
    let mut p = params(Counts::new(1, 2, 1), NoiseParams::zero());
    p.design.items = Factor::Between;
    let run = design::run(&p, &mut SimRng::new(0)).expect("run");
    assert_eq!(run.groups.len(), 1);
    assert_eq!(run.groups[0].subgroup.label(), "word_only__allQ");
}
