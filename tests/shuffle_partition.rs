use rand::{SeedableRng, rngs::StdRng};
use rollcall::{
    InternalError,
    util::{format_score, partition, shuffle},
};

#[test]
fn shuffle_is_a_permutation() {
    for len in 0..40 {
        for seed in 0..8 {
            let original: Vec<usize> = (0..len).collect();
            let mut shuffled = original.clone();
            shuffle(&mut shuffled, &mut StdRng::seed_from_u64(seed));

            let mut sorted = shuffled.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, original, "len {len}, seed {seed}");
        }
    }
}

#[test]
fn shuffle_leaves_short_inputs_alone() {
    let mut rng = StdRng::seed_from_u64(7);

    let mut empty: Vec<&str> = vec![];
    shuffle(&mut empty, &mut rng);
    assert!(empty.is_empty());

    let mut single = vec!["Ada"];
    shuffle(&mut single, &mut rng);
    assert_eq!(single, vec!["Ada"]);
}

#[test]
fn shuffle_is_reproducible_with_a_seed() {
    let mut a: Vec<u32> = (0..20).collect();
    let mut b = a.clone();
    shuffle(&mut a, &mut StdRng::seed_from_u64(42));
    shuffle(&mut b, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn shuffle_reaches_every_arrangement_of_three() {
    let mut seen = std::collections::HashSet::new();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..500 {
        let mut items = [1, 2, 3];
        shuffle(&mut items, &mut rng);
        seen.insert(items);
    }
    assert_eq!(seen.len(), 6);
}

#[test]
fn partition_chunks_have_expected_shape() {
    for len in 0..30usize {
        let items: Vec<usize> = (0..len).collect();
        for size in 1..8usize {
            let chunks = partition(size, &items).expect("size is positive");

            assert_eq!(chunks.len(), len.div_ceil(size), "len {len}, size {size}");
            if let Some((last, full)) = chunks.split_last() {
                assert!(full.iter().all(|chunk| chunk.len() == size));
                assert!((1..=size).contains(&last.len()));
            }
            assert_eq!(chunks.concat(), items);
        }
    }
}

#[test]
fn partition_of_empty_input_has_no_chunks() {
    let chunks = partition::<String>(3, &[]).expect("size is positive");
    assert!(chunks.is_empty());
}

#[test]
fn partition_rejects_zero_size() {
    let err = partition(0, &[1, 2, 3]).expect_err("size 0 must fail");
    assert!(matches!(err, InternalError::InvalidArgument(_)));
}

#[test]
fn scores_render_as_rounded_percentages() {
    assert_eq!(format_score(0.734), "73%");
    assert_eq!(format_score(0.125), "13%");
    assert_eq!(format_score(1.0), "100%");
    assert_eq!(format_score(0.0), "0%");
}
