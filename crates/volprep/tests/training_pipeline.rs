use ndarray::{s, Array3, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use volprep::prelude::*;
use volprep::transform::NormMode;
use volprep_test_utils::{assert_all_close, random_intensities, random_labels};

const SHAPE: (usize, usize, usize) = (6, 10, 10);

fn labelled_sample(seed: u64) -> (Array3<u32>, Sample) {
    let labels = random_labels(SHAPE, 4, seed);
    let mut sample = Sample::new();
    sample.insert(
        "input".to_string(),
        random_intensities(SHAPE, seed + 1).insert_axis(Axis(0)),
    );
    sample.insert(
        "label".to_string(),
        labels.mapv(|l| l as f32).insert_axis(Axis(0)),
    );
    (labels, sample)
}

#[test]
fn augmented_targets_map_back_to_direct_targets() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let offset = Offset::new(2, -1, -1);

    for seed in 0..8 {
        let (labels, sample) = labelled_sample(seed);
        let direct = affinity3(labels.view(), offset).unwrap();

        let augmentor = FlipAugmentor::random(&mut rng, Some(offset));
        let augmented = augment_sample(&sample, augmentor.rule());
        let spec = TransformSpec::Affinity3 { offset };
        let target = registry()
            .apply(&spec, augmented["label"].view())
            .unwrap();

        let restored = augmentor.revert(target.view()).unwrap();
        assert_eq!(restored, direct, "rule {}", augmentor.rule());
    }
}

#[test]
fn every_rule_round_trips_a_sample() {
    let (_, sample) = labelled_sample(21);
    for rule in FlipRule::all() {
        let augmented = augment_sample(&sample, rule);
        for (key, tensor) in &augmented {
            let back = revert(tensor.view(), rule, None).unwrap();
            assert_eq!(back, sample[key], "{key} under {rule}");
        }
    }
}

#[test]
fn preprocessing_then_targets_then_weights() {
    let (labels, sample) = labelled_sample(3);

    let input = registry()
        .apply(
            &TransformSpec::Standardize {
                mode: NormMode::Slice,
            },
            sample["input"].view(),
        )
        .unwrap();
    for plane in input.index_axis(Axis(0), 0).outer_iter() {
        assert!((plane.sum() / plane.len() as f32).abs() < 1e-4);
    }

    let target = registry()
        .apply_named("affinity3", sample["label"].view())
        .unwrap();
    let weights = registry()
        .apply_named("rebalance_binary", target.view())
        .unwrap();
    assert_eq!(weights.shape(), target.shape());

    // Both classes of every channel carry the same total weight.
    for (t, w) in target.outer_iter().zip(weights.outer_iter()) {
        let fg: f32 = t
            .iter()
            .zip(w.iter())
            .filter(|(t, _)| **t > 0.0)
            .map(|(_, w)| *w)
            .sum();
        let bg: f32 = t
            .iter()
            .zip(w.iter())
            .filter(|(t, _)| **t == 0.0)
            .map(|(_, w)| *w)
            .sum();
        assert!(fg > 0.0 && bg > 0.0);
        assert!((fg - bg).abs() <= 1e-3 * fg);
    }

    // No affinity leaves background.
    let mask = affinity_mask3(foreground_mask(labels.view()).view(), Offset::UNIT).unwrap();
    assert!(target
        .iter()
        .zip(mask.iter())
        .all(|(&t, &m)| t <= m));
}

#[test]
fn single_channel_affinity_matches_three_channel_slices() {
    let (labels, _) = labelled_sample(11);
    let full = affinity3(labels.view(), Offset::UNIT).unwrap();
    let x_only = affinity1(labels.view(), Offset::new(0, 0, 1)).unwrap();
    assert_eq!(x_only.index_axis(Axis(0), 0), full.index_axis(Axis(0), 0));
    let z_only = affinity1(labels.view(), Offset::new(1, 0, 0)).unwrap();
    assert_eq!(z_only.index_axis(Axis(0), 0), full.index_axis(Axis(0), 2));
}

#[test]
fn multiclass_weights_inside_a_mask() {
    let labels = random_labels(SHAPE, 3, 5);
    let mut mask = Array3::from_elem(labels.raw_dim(), false);
    mask.slice_mut(s![.., 2..8, 2..8]).fill(true);

    let weights = rebalance_multiclass(labels.view(), Some(mask.view())).unwrap();
    let counts = volprep::rebalance::class_counts(labels.view(), Some(mask.view())).unwrap();
    let per_class: Vec<(f32, usize)> = counts
        .iter()
        .map(|(label, n)| {
            let pos = labels.iter().position(|l| l == label).unwrap();
            (weights.as_slice().unwrap()[pos], n)
        })
        .collect();
    let sum: f32 = per_class.iter().map(|&(w, _)| w).sum();
    assert!((sum - 1.0).abs() < 1e-4);
    let first = per_class[0].0 * per_class[0].1 as f32;
    for &(w, n) in &per_class {
        assert!((w * n as f32 - first).abs() <= 1e-4 * first);
    }
}

#[test]
fn degenerate_inputs_are_reported() {
    let flat = Array3::<u32>::ones((2, 2, 2));
    assert!(matches!(
        affinity3(flat.view(), Offset::new(2, 1, 1)),
        Err(VolumeError::Offset { .. })
    ));
    let nothing = Array3::from_elem((2, 2, 2), false);
    assert_eq!(
        rebalance_multiclass(flat.view(), Some(nothing.view())).unwrap_err(),
        VolumeError::EmptyVolume
    );
    assert!(matches!(
        "no_such_op".parse::<OpKind>(),
        Err(VolumeError::UnknownOperation { .. })
    ));
    let weights = BinaryRebalance::new()
        .with_base_weight(0.75)
        .weights(flat.view(), None)
        .unwrap();
    assert_all_close(&weights, &Array3::from_elem((2, 2, 2), 0.75f32), 0.0);
}
