//! Affinity graphs derived from segmentation volumes.
//!
//! An affinity voxel is `1.0` when the voxel and its neighbour at a fixed
//! offset belong to the same non-background segment, `0.0` otherwise.
//! Positions whose neighbour falls outside the volume are `0.0`.
//!
//! - [`affinity3`]: three channels (x, y, z) each using one offset component.
//! - [`affinity1`]: one channel using the whole offset at once.
//! - [`affinity_mask3`] / [`affinity_mask1`]: the same geometry over a
//!   binary mask, marking pairs where *either* voxel is foreground. Used to
//!   carry a loss mask into affinity space.
//!
//! All four share the [`ShiftWindow`] geometry from `volprep-core`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use ndarray::{Array3, Array4, ArrayView3, ArrayViewMut3, Axis, Zip};
use tracing::debug;
use volprep_core::{
    lift, spatial_shape, window_view, window_view_mut, Foreground, Label, Offset, Result,
    ShiftWindow, SpatialAxis, Tensor,
};

/// Number of channels produced by [`affinity3`] and [`affinity_mask3`].
pub const AFFINITY_CHANNELS: usize = 3;

/// Pairwise test applied to `(shifted, anchor)` voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffinityKind {
    /// Same label, and that label is foreground.
    Segment,
    /// Either voxel is foreground.
    Mask,
}

impl AffinityKind {
    fn name(self) -> &'static str {
        match self {
            Self::Segment => "affinity",
            Self::Mask => "affinity_mask",
        }
    }
}

#[inline]
fn same_segment<L: Label>(shifted: L, anchor: L) -> bool {
    shifted == anchor && shifted.is_foreground()
}

#[inline]
fn either_foreground<M: Foreground>(shifted: M, anchor: M) -> bool {
    shifted.is_foreground() || anchor.is_foreground()
}

/// Write `pred(shifted, anchor)` as 0/1 into the target box of `out`.
fn compare_into<T, F>(
    volume: ArrayView3<'_, T>,
    window: &ShiftWindow,
    out: ArrayViewMut3<'_, f32>,
    pred: F,
) where
    T: Copy,
    F: Fn(T, T) -> bool,
{
    let shifted = window_view(volume.view(), &window.shifted);
    let anchor = window_view(volume, &window.anchor);
    let target = window_view_mut(out, &window.target);
    Zip::from(target)
        .and(shifted)
        .and(anchor)
        .for_each(|t, &s, &a| *t = if pred(s, a) { 1.0 } else { 0.0 });
}

fn build3<T, F>(
    volume: ArrayView3<'_, T>,
    offset: Offset,
    kind: AffinityKind,
    pred: F,
) -> Result<Tensor<f32>>
where
    T: Copy,
    F: Fn(T, T) -> bool,
{
    let shape = spatial_shape(&volume);
    offset.validate_strict(shape)?;
    debug!(
        op = kind.name(),
        ?shape,
        %offset,
        channels = AFFINITY_CHANNELS,
        "deriving affinity"
    );

    let mut out = Array4::<f32>::zeros((AFFINITY_CHANNELS, shape[0], shape[1], shape[2]));
    for axis in SpatialAxis::ALL {
        let window = ShiftWindow::new(offset.along(axis), shape)?;
        let channel = out.index_axis_mut(Axis(0), axis.affinity_channel());
        compare_into(volume.view(), &window, channel, &pred);
    }
    Ok(out)
}

fn build1<T, F>(
    volume: ArrayView3<'_, T>,
    offset: Offset,
    kind: AffinityKind,
    pred: F,
) -> Result<Tensor<f32>>
where
    T: Copy,
    F: Fn(T, T) -> bool,
{
    let shape = spatial_shape(&volume);
    let window = ShiftWindow::new(offset, shape)?;
    debug!(op = kind.name(), ?shape, %offset, channels = 1, "deriving affinity");

    let mut out = Array3::<f32>::zeros((shape[0], shape[1], shape[2]));
    compare_into(volume, &window, out.view_mut(), pred);
    Ok(lift(out))
}

/// Three-channel affinity graph of a label volume.
///
/// Channel 0 holds x-affinity at `offset.dx`, channel 1 y-affinity at
/// `offset.dy`, channel 2 z-affinity at `offset.dz`. For a positive
/// component `d` the value at index `i >= d` compares voxels `i` and
/// `i - d`; for a negative one the value at `i < n - |d|` compares `i + |d|`
/// and `i`. Background pairs never count, even though `0 == 0`.
///
/// Values are always `0.0` or `1.0` as `f32`; map the result with `mapv`
/// for another element type.
///
/// # Errors
///
/// [`VolumeError::Offset`](volprep_core::VolumeError::Offset) if any
/// component is zero or not strictly inside the volume.
pub fn affinity3<L: Label>(labels: ArrayView3<'_, L>, offset: Offset) -> Result<Tensor<f32>> {
    build3(labels, offset, AffinityKind::Segment, same_segment::<L>)
}

/// Single-channel affinity graph of a label volume at a joint offset.
///
/// Every nonzero component shifts its axis at the same time; zero
/// components leave their axis unshifted. Only the overlap region can be
/// nonzero.
///
/// # Errors
///
/// [`VolumeError::Offset`](volprep_core::VolumeError::Offset) if any
/// component's magnitude reaches its axis extent.
pub fn affinity1<L: Label>(labels: ArrayView3<'_, L>, offset: Offset) -> Result<Tensor<f32>> {
    build1(labels, offset, AffinityKind::Segment, same_segment::<L>)
}

/// Three-channel affinity mask: `1.0` where either voxel of the pair is
/// foreground.
///
/// # Errors
///
/// Same offset requirements as [`affinity3`].
pub fn affinity_mask3<M: Foreground>(
    mask: ArrayView3<'_, M>,
    offset: Offset,
) -> Result<Tensor<f32>> {
    build3(mask, offset, AffinityKind::Mask, either_foreground::<M>)
}

/// Single-channel affinity mask at a joint offset.
///
/// # Errors
///
/// Same offset requirements as [`affinity1`].
pub fn affinity_mask1<M: Foreground>(
    mask: ArrayView3<'_, M>,
    offset: Offset,
) -> Result<Tensor<f32>> {
    build1(mask, offset, AffinityKind::Mask, either_foreground::<M>)
}
