//! Benchmark profiles for volprep.
//!
//! - [`reference_labels`]: a training-sized label volume of
//!   [`REFERENCE_SHAPE`] with blocky segments
//! - [`reference_intensities`]: a matching intensity volume

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ndarray::Array3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use volprep_core::Volume;

/// Spatial shape of one training sample, (z, y, x).
pub const REFERENCE_SHAPE: (usize, usize, usize) = (18, 158, 158);

/// Side of the cubic blocks that share a segment id.
const BLOCK: usize = 8;

/// Label volume of [`REFERENCE_SHAPE`] tiled with `BLOCK`-sized segments.
///
/// Roughly one block in five is background, so both affinity classes and
/// both rebalancing classes are populated.
pub fn reference_labels(seed: u64) -> Volume<u32> {
    let (nz, ny, nx) = REFERENCE_SHAPE;
    let (bz, by, bx) = (nz.div_ceil(BLOCK), ny.div_ceil(BLOCK), nx.div_ceil(BLOCK));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ids = Array3::from_shape_simple_fn((bz, by, bx), || {
        if rng.gen_bool(0.2) {
            0
        } else {
            rng.gen_range(1..=1000u32)
        }
    });
    Array3::from_shape_fn(REFERENCE_SHAPE, |(z, y, x)| {
        ids[[z / BLOCK, y / BLOCK, x / BLOCK]]
    })
}

/// Intensity volume of [`REFERENCE_SHAPE`] in `[0, 255)`.
pub fn reference_intensities(seed: u64) -> Volume<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(REFERENCE_SHAPE, || rng.gen_range(0.0..255.0f32))
}
