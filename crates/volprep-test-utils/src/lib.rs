//! Test utilities for volprep development.
//!
//! Deterministic volume fixtures (seeded with [`ChaCha8Rng`]), proptest
//! strategies for label volumes and offsets, and float comparison helpers.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use ndarray::{Array3, ArrayBase, Data, Dimension};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use volprep_core::{FlipRule, Offset};

/// Labels drawn uniformly from `0..=max_label` (0 is background).
pub fn random_labels(shape: (usize, usize, usize), max_label: u32, seed: u64) -> Array3<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || rng.gen_range(0..=max_label))
}

/// Intensities drawn uniformly from `[0, 1)`.
pub fn random_intensities(shape: (usize, usize, usize), seed: u64) -> Array3<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || rng.gen::<f32>())
}

/// Cube of side `n` filled with label 1 except a background plane at `z`.
pub fn plane_labels(n: usize, z: usize) -> Array3<u32> {
    Array3::from_shape_fn((n, n, n), |(zz, _, _)| if zz == z { 0 } else { 1 })
}

/// Volume whose value at `(z, y, x)` is its flat index; every voxel distinct.
pub fn index_volume(shape: (usize, usize, usize)) -> Array3<u32> {
    let (_, ny, nx) = shape;
    Array3::from_shape_fn(shape, |(z, y, x)| (z * ny * nx + y * nx + x) as u32)
}

/// Assert elementwise `|a - b| <= tol` with matching shapes.
pub fn assert_all_close<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>, tol: f32)
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
    D: Dimension,
{
    assert_eq!(a.shape(), b.shape(), "shape mismatch");
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            (x - y).abs() <= tol,
            "element {i}: {x} vs {y} differs by more than {tol}"
        );
    }
}

// ── Proptest strategies ─────────────────────────────────────────

/// Label volume with every side in `2..=max_side` and labels in `0..=max_label`.
pub fn arb_labels(max_side: usize, max_label: u8) -> impl Strategy<Value = Array3<u8>> {
    (2..=max_side, 2..=max_side, 2..=max_side).prop_flat_map(move |(z, y, x)| {
        proptest::collection::vec(0..=max_label, z * y * x).prop_map(move |data| {
            Array3::from_shape_vec((z, y, x), data).expect("length matches shape")
        })
    })
}

/// Any of the 16 flip rules.
pub fn arb_rule() -> impl Strategy<Value = FlipRule> {
    (0u8..FlipRule::COUNT).prop_map(FlipRule::from_bits)
}

/// Offset with every component nonzero and strictly inside `shape`.
pub fn arb_strict_offset(shape: [usize; 3]) -> impl Strategy<Value = Offset> {
    let comp = |n: usize| {
        let m = n as isize - 1;
        prop_oneof![1..=m, -m..=-1]
    };
    (comp(shape[0]), comp(shape[1]), comp(shape[2]))
        .prop_map(|(dz, dy, dx)| Offset::new(dz, dy, dx))
}

/// Offset with components in `(-n, n)`, zero allowed.
pub fn arb_offset(shape: [usize; 3]) -> impl Strategy<Value = Offset> {
    let comp = |n: usize| {
        let m = n as isize - 1;
        -m..=m
    };
    (comp(shape[0]), comp(shape[1]), comp(shape[2]))
        .prop_map(|(dz, dy, dx)| Offset::new(dz, dy, dx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_labels_are_seeded() {
        let a = random_labels((3, 4, 5), 4, 11);
        let b = random_labels((3, 4, 5), 4, 11);
        assert_eq!(a, b);
        assert!(a.iter().all(|&l| l <= 4));
    }

    #[test]
    fn plane_labels_zero_plane() {
        let v = plane_labels(4, 0);
        assert_eq!(v.iter().filter(|&&l| l == 0).count(), 16);
        assert_eq!(v[[1, 2, 3]], 1);
    }

    #[test]
    fn index_volume_is_distinct() {
        let v = index_volume((2, 3, 4));
        assert_eq!(v[[1, 2, 3]], 23);
    }
}
