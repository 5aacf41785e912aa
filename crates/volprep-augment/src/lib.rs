//! Invertible flip/transpose augmentation.
//!
//! [`apply`] reflects a tensor along Z, Y and X and then transposes Y/X, as
//! selected by a [`FlipRule`]. [`revert`] undoes it. Plain tensors are
//! restored exactly; affinity tensors need more care.
//!
//! # Affinity correction
//!
//! An affinity value at voxel `v` describes the pair `(v, v - d)`. After a
//! reflection the same physical pair is stored at the *other* end of the
//! pair, so reflecting an affinity map predicted on augmented data does not
//! yield an affinity map of the original data. When [`revert`] is given the
//! affinity offset it moves each reflected channel by `|d|` voxels back onto
//! the position `volprep_affinity::affinity3` would have used, and
//! zero-fills the vacated slab. Undoing a transpose also swaps the x and y channels.
//!
//! With this correction, for any label volume `V`, rule `r` and offset `o`
//! (with `o.dy == o.dx` whenever `r` transposes):
//!
//! ```text
//! revert(affinity3(apply_volume(V, r), o), r, Some(o)) == affinity3(V, o)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use ndarray::{s, ArrayView3, ArrayView4, ArrayViewMut3, Axis, Slice, Zip};
use rand::Rng;
use tracing::debug;
use volprep_core::{
    ensure_channels, tensor_spatial_shape, FlipRule, Offset, Result, SpatialAxis, Tensor, Volume,
};

/// Channel count of an affinity tensor accepted by [`revert`] with an offset.
pub const AFFINITY_CHANNELS: usize = 3;

/// Reflect and transpose `tensor` according to `rule`.
///
/// Order is fixed: Z, Y, X reflections, then the Y/X transpose. Channels
/// are untouched. The result is a fresh standard-layout array.
pub fn apply<T: Clone>(tensor: ArrayView4<'_, T>, rule: FlipRule) -> Tensor<T> {
    let mut view = tensor;
    for axis in SpatialAxis::ALL {
        if flips(rule, axis) {
            view.invert_axis(Axis(axis.tensor_axis()));
        }
    }
    if rule.transpose_xy {
        view.swap_axes(2, 3);
    }
    view.as_standard_layout().into_owned()
}

/// Exact inverse of [`apply`] for the same `rule`.
///
/// Only needs `T: Clone`; use it for element types without a `Default`.
pub fn revert_tensor<T: Clone>(tensor: ArrayView4<'_, T>, rule: FlipRule) -> Tensor<T> {
    invert_geometry(tensor, rule)
}

/// Undo [`apply`] for the same `rule`.
///
/// `T: Default` supplies the fill value for the slab an offset shift
/// vacates, and is required even when `offset` is `None`; element types
/// without a `Default` go through [`revert_tensor`].
///
/// Without `offset` this is the exact inverse of [`apply`]. With `offset`
/// the tensor is treated as a 3-channel (x, y, z) affinity tensor derived at
/// that offset and each reflected channel is shifted back (see the crate
/// docs).
///
/// # Errors
///
/// With an offset:
/// - [`VolumeError::ChannelCount`](volprep_core::VolumeError::ChannelCount)
///   unless the tensor has 3 channels;
/// - [`VolumeError::Offset`](volprep_core::VolumeError::Offset) if any
///   component is zero or not strictly inside the restored volume.
pub fn revert<T: Clone + Default>(
    tensor: ArrayView4<'_, T>,
    rule: FlipRule,
    offset: Option<Offset>,
) -> Result<Tensor<T>> {
    let Some(offset) = offset else {
        return Ok(revert_tensor(tensor, rule));
    };

    ensure_channels(&tensor, AFFINITY_CHANNELS)?;
    let [z, y, x] = tensor_spatial_shape(&tensor);
    let restored = if rule.transpose_xy { [z, x, y] } else { [z, y, x] };
    offset.validate_strict(restored)?;
    debug!(%rule, %offset, shape = ?restored, "reverting affinity augmentation");

    let mut out = invert_geometry(tensor, rule);
    if rule.transpose_xy {
        let (mut ch_x, mut ch_y) = out.multi_slice_mut((s![0, .., .., ..], s![1, .., .., ..]));
        Zip::from(&mut ch_x)
            .and(&mut ch_y)
            .for_each(|a, b| std::mem::swap(a, b));
    }
    for axis in [SpatialAxis::X, SpatialAxis::Y, SpatialAxis::Z] {
        if flips(rule, axis) {
            let channel = out.index_axis_mut(Axis(0), axis.affinity_channel());
            shift_channel(channel, axis, offset.component(axis));
        }
    }
    Ok(out)
}

/// [`apply`] for a single volume.
pub fn apply_volume<T: Clone>(volume: ArrayView3<'_, T>, rule: FlipRule) -> Volume<T> {
    apply(volume.insert_axis(Axis(0)), rule).index_axis_move(Axis(0), 0)
}

/// Exact inverse of [`apply_volume`].
pub fn revert_volume<T: Clone>(volume: ArrayView3<'_, T>, rule: FlipRule) -> Volume<T> {
    invert_geometry(volume.insert_axis(Axis(0)), rule).index_axis_move(Axis(0), 0)
}

fn flips(rule: FlipRule, axis: SpatialAxis) -> bool {
    match axis {
        SpatialAxis::Z => rule.flip_z,
        SpatialAxis::Y => rule.flip_y,
        SpatialAxis::X => rule.flip_x,
    }
}

fn invert_geometry<T: Clone>(tensor: ArrayView4<'_, T>, rule: FlipRule) -> Tensor<T> {
    let mut view = tensor;
    if rule.transpose_xy {
        view.swap_axes(2, 3);
    }
    for axis in [SpatialAxis::X, SpatialAxis::Y, SpatialAxis::Z] {
        if flips(rule, axis) {
            view.invert_axis(Axis(axis.tensor_axis()));
        }
    }
    view.as_standard_layout().into_owned()
}

/// Move a reflected affinity channel `|d|` voxels along `axis` and clear
/// the slab left behind.
fn shift_channel<T: Clone + Default>(
    mut channel: ArrayViewMut3<'_, T>,
    axis: SpatialAxis,
    d: isize,
) {
    let ax = Axis(axis.volume_axis());
    let n = channel.len_of(ax);
    let k = d.unsigned_abs();
    let (src, dst, vacated) = if d > 0 {
        (0..n - k, k..n, 0..k)
    } else {
        (k..n, 0..n - k, n - k..n)
    };
    let moved = channel.slice_axis(ax, Slice::from(src)).to_owned();
    channel.slice_axis_mut(ax, Slice::from(dst)).assign(&moved);
    channel
        .slice_axis_mut(ax, Slice::from(vacated))
        .fill(T::default());
}

/// One augmentation, kept so it can be applied to every tensor of a sample
/// and later reverted on predictions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlipAugmentor {
    rule: FlipRule,
    offset: Option<Offset>,
}

impl FlipAugmentor {
    /// Augmentor for plain tensors.
    pub fn new(rule: FlipRule) -> Self {
        Self { rule, offset: None }
    }

    /// Augmentor whose [`revert`](Self::revert) applies the affinity
    /// correction for `offset`.
    pub fn for_affinity(rule: FlipRule, offset: Offset) -> Self {
        Self {
            rule,
            offset: Some(offset),
        }
    }

    /// Augmentor with a uniformly random rule.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, offset: Option<Offset>) -> Self {
        Self {
            rule: FlipRule::random(rng),
            offset,
        }
    }

    /// The flip rule.
    pub fn rule(&self) -> FlipRule {
        self.rule
    }

    /// Affinity offset used on revert, if any.
    pub fn offset(&self) -> Option<Offset> {
        self.offset
    }

    /// See [`apply`].
    pub fn apply<T: Clone>(&self, tensor: ArrayView4<'_, T>) -> Tensor<T> {
        apply(tensor, self.rule)
    }

    /// See [`apply_volume`].
    pub fn apply_volume<T: Clone>(&self, volume: ArrayView3<'_, T>) -> Volume<T> {
        apply_volume(volume, self.rule)
    }

    /// See [`revert`].
    ///
    /// # Errors
    ///
    /// As [`revert`] with this augmentor's offset.
    pub fn revert<T: Clone + Default>(&self, tensor: ArrayView4<'_, T>) -> Result<Tensor<T>> {
        revert(tensor, self.rule, self.offset)
    }
}
