//! Per-volume label and intensity helpers.
//!
//! Every helper takes one [`ArrayView3`] and returns an owned `f32` array;
//! [`Registry`](crate::Registry) lifts them to multi-channel tensors.

use ndarray::{Array3, Array4, ArrayView3, ArrayViewMut, Dimension, Zip};
use tracing::warn;
use volprep_core::{spatial_shape, Foreground, Label, Result, Tensor, Volume, VolumeError};

// ── Label transforms ────────────────────────────────────────────

/// `1.0` where the voxel is foreground (`> 0`), `0.0` elsewhere.
pub fn binarize<T: Foreground>(volume: ArrayView3<'_, T>) -> Volume<f32> {
    volume.mapv(|v| if v.is_foreground() { 1.0 } else { 0.0 })
}

/// One-hot expansion over `ids`.
///
/// Returns `(one_hot, mask)`: channel `i` of `one_hot` is `1.0` where the
/// voxel equals `ids[i]`; `mask` is `1.0` wherever the voxel matches any id,
/// repeated on every channel.
///
/// # Errors
///
/// [`VolumeError::InvalidArgument`] if `ids` is empty.
pub fn multiclass_expansion<L: Label>(
    volume: ArrayView3<'_, L>,
    ids: &[L],
) -> Result<(Tensor<f32>, Tensor<f32>)> {
    if ids.is_empty() {
        return Err(VolumeError::InvalidArgument {
            reason: "multiclass expansion needs at least one class id".to_string(),
        });
    }
    let [nz, ny, nx] = spatial_shape(&volume);
    let mut one_hot = Array4::<f32>::zeros((ids.len(), nz, ny, nx));
    let mut matched = Array3::<f32>::zeros((nz, ny, nx));
    for (mut channel, id) in one_hot.outer_iter_mut().zip(ids) {
        Zip::from(&mut channel)
            .and(&mut matched)
            .and(&volume)
            .for_each(|c, m, v| {
                if v == id {
                    *c = 1.0;
                    *m = 1.0;
                }
            });
    }
    let mask = Array4::from_shape_fn((ids.len(), nz, ny, nx), |(_, z, y, x)| matched[[z, y, x]]);
    Ok((one_hot, mask))
}

/// Two-channel one-hot of the foreground split: channel 0 is background,
/// channel 1 foreground.
pub fn binary_class<T: Foreground>(volume: ArrayView3<'_, T>) -> Tensor<f32> {
    let [nz, ny, nx] = spatial_shape(&volume);
    Array4::from_shape_fn((2, nz, ny, nx), |(c, z, y, x)| {
        if volume[[z, y, x]].is_foreground() == (c == 1) {
            1.0
        } else {
            0.0
        }
    })
}

// ── Intensity transforms ────────────────────────────────────────

/// Region over which [`standardize`] computes its statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NormMode {
    /// Each Z slice independently.
    #[default]
    Slice,
    /// The whole volume at once.
    Volume,
}

fn standardize_region<D: Dimension>(mut region: ArrayViewMut<'_, f32, D>) {
    let n = region.len() as f64;
    if n == 0.0 {
        return;
    }
    let mean = region.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = region
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        warn!(mean, voxels = region.len(), "constant region, standardized to zero");
        region.fill(0.0);
        return;
    }
    region.mapv_inplace(|v| ((v as f64 - mean) / std) as f32);
}

/// Zero mean, unit (population) standard deviation.
///
/// A region with zero variance becomes all zeros.
pub fn standardize(volume: ArrayView3<'_, f32>, mode: NormMode) -> Volume<f32> {
    let mut out = volume.to_owned();
    match mode {
        NormMode::Slice => {
            for slice in out.outer_iter_mut() {
                standardize_region(slice);
            }
        }
        NormMode::Volume => standardize_region(out.view_mut()),
    }
    out
}

/// Linear map of the value range `[min(v), max(v)]` onto `[min, max]`.
///
/// A constant volume maps to `min`.
///
/// # Errors
///
/// [`VolumeError::InvalidArgument`] unless `min < max`, both finite.
pub fn rescale(volume: ArrayView3<'_, f32>, min: f32, max: f32) -> Result<Volume<f32>> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(VolumeError::InvalidArgument {
            reason: format!("rescale range must satisfy min < max, got [{min}, {max}]"),
        });
    }
    let (lo, hi) = volume
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;
    if volume.is_empty() || span == 0.0 {
        warn!(value = lo, "constant volume, rescaled to range minimum");
        return Ok(Array3::from_elem(volume.raw_dim(), min));
    }
    let scale = (max - min) / span;
    Ok(volume.mapv(|v| (v - lo) * scale + min))
}

/// Default divisor of [`divide_by`], the 8-bit intensity ceiling.
pub const DEFAULT_DIVISOR: f32 = 255.0;

/// Divide every voxel by `divisor`.
///
/// # Errors
///
/// [`VolumeError::InvalidArgument`] for a zero or non-finite divisor.
pub fn divide_by(volume: ArrayView3<'_, f32>, divisor: f32) -> Result<Volume<f32>> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(VolumeError::InvalidArgument {
            reason: format!("divisor must be finite and nonzero, got {divisor}"),
        });
    }
    Ok(volume.mapv(|v| v / divisor))
}

/// Reflect-pad so a sliding field of view `fov` can be centred on every
/// original voxel.
///
/// Each axis gains `fov / 2` voxels before and `fov - fov / 2 - 1` after,
/// mirrored about the edge voxel (which is not repeated).
///
/// # Errors
///
/// [`VolumeError::InvalidArgument`] for a zero `fov` component, or padding
/// wider than `extent - 1` on any axis.
pub fn mirror_border<T: Clone>(volume: ArrayView3<'_, T>, fov: [usize; 3]) -> Result<Volume<T>> {
    let shape = spatial_shape(&volume);
    let mut before = [0usize; 3];
    let mut out_shape = [0usize; 3];
    for axis in 0..3 {
        if fov[axis] == 0 {
            return Err(VolumeError::InvalidArgument {
                reason: format!("field of view {fov:?} has a zero component"),
            });
        }
        let top = fov[axis] / 2;
        let bottom = fov[axis] - top - 1;
        if top.max(bottom) >= shape[axis].max(1) {
            return Err(VolumeError::InvalidArgument {
                reason: format!(
                    "padding {top}+{bottom} exceeds reflectable extent of axis {axis} (size {})",
                    shape[axis]
                ),
            });
        }
        before[axis] = top;
        out_shape[axis] = shape[axis] + top + bottom;
    }

    let reflect = |i: usize, axis: usize| -> usize {
        let n = shape[axis] as isize;
        let mut j = i as isize - before[axis] as isize;
        if j < 0 {
            j = -j;
        } else if j >= n {
            j = 2 * (n - 1) - j;
        }
        j as usize
    };
    Ok(Array3::from_shape_fn(
        (out_shape[0], out_shape[1], out_shape[2]),
        |(z, y, x)| volume[[reflect(z, 0), reflect(y, 1), reflect(x, 2)]].clone(),
    ))
}
