//! Core types for volprep.
//!
//! This is the leaf crate of the workspace. It defines the data model shared
//! by affinity derivation, flip augmentation and class rebalancing:
//!
//! - [`Volume`] / [`Tensor`]: dense `ndarray` arrays in (Z, Y, X) and
//!   (Channel, Z, Y, X) order, checked by the [`guard`] functions.
//! - [`Offset`] and [`SpatialAxis`]: signed voxel displacements.
//! - [`ShiftWindow`]: the aligned sub-boxes used to compare each voxel with
//!   its neighbour at an offset.
//! - [`FlipRule`]: a 4-bit geometric augmentation.
//! - [`VolumeError`]: the single error type of the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod element;
pub mod error;
pub mod guard;
pub mod offset;
pub mod rule;
pub mod window;

pub use element::{foreground_mask, Foreground, Label};
pub use error::{Result, ShapeVec, VolumeError};
pub use guard::{
    as_tensor, as_volume, ensure_channels, ensure_same_shape, into_tensor, into_volume, lift,
    spatial_shape, tensor_spatial_shape, Tensor, Volume,
};
pub use offset::{Offset, SpatialAxis};
pub use rule::FlipRule;
pub use window::{window_view, window_view_mut, AxisSpan, ShiftWindow};
