//! Volprep: training-data preparation for voxel-wise predictors.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! volprep sub-crates. For most users, adding `volprep` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use volprep::ndarray::Array3;
//! use volprep::prelude::*;
//!
//! // Two segments split along z.
//! let labels = Array3::from_shape_fn((4, 6, 6), |(z, _, _)| if z < 2 { 1u32 } else { 2 });
//!
//! // Training target and loss weights.
//! let target = affinity3(labels.view(), Offset::UNIT).unwrap();
//! let weights = rebalance_binary(labels.view(), None, 0.0).unwrap();
//! assert_eq!(target.shape(), &[3, 4, 6, 6]);
//! assert_eq!(weights.shape(), &[4, 6, 6]);
//!
//! // Augment the label volume, derive the target there, then map it back.
//! let rule = FlipRule::new(true, false, true, true);
//! let flipped = apply_volume(labels.view(), rule);
//! let augmented = affinity3(flipped.view(), Offset::UNIT).unwrap();
//! let restored = revert(augmented.view(), rule, Some(Offset::UNIT)).unwrap();
//! assert_eq!(restored, target);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `volprep-core` | Volumes, offsets, flip rules, errors |
//! | [`affinity`] | `volprep-affinity` | Affinity graphs and masks |
//! | [`augment`] | `volprep-augment` | Flip/transpose augmentation and its inverse |
//! | [`rebalance`] | `volprep-rebalance` | Class-rebalancing weights |
//! | [`transform`] | `volprep-transform` | Helpers and the channel dispatcher |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The array crate every volume and tensor is built on.
pub use ndarray;

/// Core data model and errors (`volprep-core`).
///
/// Volumes and tensors are plain `ndarray` arrays; [`types::Offset`],
/// [`types::FlipRule`] and [`types::VolumeError`] are the shared vocabulary.
pub use volprep_core as types;

/// Affinity graphs (`volprep-affinity`).
pub use volprep_affinity as affinity;

/// Flip augmentation (`volprep-augment`).
///
/// [`augment::revert`] with an offset undoes the augmentation of an
/// affinity tensor, including the boundary shift.
pub use volprep_augment as augment;

/// Class rebalancing (`volprep-rebalance`).
pub use volprep_rebalance as rebalance;

/// Per-volume helpers and the channel dispatcher (`volprep-transform`).
pub use volprep_transform as transform;

/// Common imports for typical volprep usage.
///
/// ```rust
/// use volprep::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use volprep_core::{
        foreground_mask, Foreground, FlipRule, Label, Offset, SpatialAxis, Tensor, Volume,
    };

    // Errors
    pub use volprep_core::{Result, VolumeError};

    // Affinity
    pub use volprep_affinity::{affinity1, affinity3, affinity_mask1, affinity_mask3};

    // Augmentation
    pub use volprep_augment::{apply, apply_volume, revert, revert_tensor, revert_volume, FlipAugmentor};

    // Rebalancing
    pub use volprep_rebalance::{rebalance_binary, rebalance_multiclass, BinaryRebalance};

    // Dispatch
    pub use volprep_transform::{
        augment_sample, registry, transform_sample, OpKind, Registry, Sample, TransformSpec,
    };
}
