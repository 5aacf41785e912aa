//! Per-voxel loss weights that counteract class imbalance.
//!
//! - [`rebalance_multiclass`]: inverse-frequency weights over every distinct
//!   label, normalized so each class contributes equally.
//! - [`rebalance_binary`]: the same for the foreground/background split,
//!   with a flat fallback weight when one side is empty.
//!
//! Masks are boolean volumes; [`volprep_core::foreground_mask`] converts a
//! label or intensity mask.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use indexmap::IndexMap;
use ndarray::{Array3, ArrayView3, Zip};
use tracing::warn;
use volprep_core::{
    ensure_same_shape, spatial_shape, Foreground, Label, Result, Volume, VolumeError,
};

/// Weight given to every voxel when only one distinct label is present.
///
/// Kept for numeric parity with earlier training setups; it does not follow
/// from the inverse-frequency formula.
pub const SINGLE_CLASS_WEIGHT: f32 = 0.5;

/// Voxel count per distinct label, in first-seen order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassCounts<L: Label> {
    counts: IndexMap<L, usize>,
}

impl<L: Label> ClassCounts<L> {
    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no voxel was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count for `label`, if present.
    pub fn get(&self, label: &L) -> Option<usize> {
        self.counts.get(label).copied()
    }

    /// Total number of counted voxels.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(label, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, usize)> + '_ {
        self.counts.iter().map(|(l, &n)| (l, n))
    }

    /// Normalized inverse-frequency weight per label:
    /// `(1 / n_c) / sum_k (1 / n_k)`.
    pub fn inverse_frequency(&self) -> IndexMap<L, f32> {
        let norm: f64 = self.counts.values().map(|&n| 1.0 / n as f64).sum();
        self.counts
            .iter()
            .map(|(&l, &n)| (l, ((1.0 / n as f64) / norm) as f32))
            .collect()
    }
}

fn check_mask<L>(labels: &ArrayView3<'_, L>, mask: Option<&ArrayView3<'_, bool>>) -> Result<()> {
    match mask {
        Some(m) => ensure_same_shape(labels, m),
        None => Ok(()),
    }
}

/// Count voxels per distinct label, restricted to `mask` when given.
///
/// # Errors
///
/// [`VolumeError::ShapeMismatch`] if the mask shape differs.
pub fn class_counts<L: Label>(
    labels: ArrayView3<'_, L>,
    mask: Option<ArrayView3<'_, bool>>,
) -> Result<ClassCounts<L>> {
    check_mask(&labels, mask.as_ref())?;
    let mut counts = IndexMap::new();
    match mask {
        Some(mask) => Zip::from(&labels).and(&mask).for_each(|&l, &m| {
            if m {
                *counts.entry(l).or_insert(0) += 1;
            }
        }),
        None => {
            for &l in labels.iter() {
                *counts.entry(l).or_insert(0) += 1;
            }
        }
    }
    Ok(ClassCounts { counts })
}

/// Inverse-frequency weights over all distinct labels.
///
/// Classes are counted over the voxels inside `mask` (all voxels without
/// one). Every voxel carrying a counted label receives that class's
/// weight, inside the mask or not; labels never seen inside the mask get
/// `0.0`. The per-class weights sum to one, and `weight_c * n_c` is the
/// same for every counted class `c`.
///
/// With exactly one distinct label every voxel is
/// [`SINGLE_CLASS_WEIGHT`].
///
/// # Errors
///
/// - [`VolumeError::EmptyVolume`] if the masked region is empty.
/// - [`VolumeError::ShapeMismatch`] if the mask shape differs.
pub fn rebalance_multiclass<L: Label>(
    labels: ArrayView3<'_, L>,
    mask: Option<ArrayView3<'_, bool>>,
) -> Result<Volume<f32>> {
    let counts = class_counts(labels.view(), mask)?;
    match counts.len() {
        0 => Err(VolumeError::EmptyVolume),
        1 => {
            warn!(
                total = counts.total(),
                weight = SINGLE_CLASS_WEIGHT,
                "single class present, using flat weight"
            );
            Ok(Array3::from_elem(labels.raw_dim(), SINGLE_CLASS_WEIGHT))
        }
        _ => {
            let weights = counts.inverse_frequency();
            Ok(labels.mapv(|l| weights.get(&l).copied().unwrap_or(0.0)))
        }
    }
}

/// Options for [`rebalance_binary`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinaryRebalance {
    /// Weight for both classes when either is absent from the region.
    pub base_weight: f32,
}

impl BinaryRebalance {
    /// Default fallback weight.
    pub const DEFAULT_BASE_WEIGHT: f32 = 0.0;

    /// Options with the default fallback weight.
    pub fn new() -> Self {
        Self {
            base_weight: Self::DEFAULT_BASE_WEIGHT,
        }
    }

    /// Set the fallback weight.
    pub fn with_base_weight(mut self, base_weight: f32) -> Self {
        self.base_weight = base_weight;
        self
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// [`VolumeError::InvalidArgument`] unless `base_weight` is finite and
    /// nonnegative.
    pub fn validate(&self) -> Result<()> {
        if !self.base_weight.is_finite() || self.base_weight < 0.0 {
            return Err(VolumeError::InvalidArgument {
                reason: format!(
                    "base_weight must be finite and >= 0, got {}",
                    self.base_weight
                ),
            });
        }
        Ok(())
    }

    /// Run [`rebalance_binary`] with these options.
    ///
    /// # Errors
    ///
    /// As [`rebalance_binary`].
    pub fn weights<L: Foreground>(
        &self,
        labels: ArrayView3<'_, L>,
        mask: Option<ArrayView3<'_, bool>>,
    ) -> Result<Volume<f32>> {
        rebalance_binary(labels, mask, self.base_weight)
    }
}

impl Default for BinaryRebalance {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreground/background weights.
///
/// Over the voxels inside `mask` (all voxels without one), foreground
/// (`> 0`) voxels get `1 / n_fg` and background voxels `1 / n_bg`, jointly
/// normalized to sum to one. If either count is zero both classes get
/// `base_weight` instead. Voxels outside the mask get `0.0`.
///
/// # Errors
///
/// - [`VolumeError::InvalidArgument`] for a negative or non-finite
///   `base_weight`.
/// - [`VolumeError::ShapeMismatch`] if the mask shape differs.
pub fn rebalance_binary<L: Foreground>(
    labels: ArrayView3<'_, L>,
    mask: Option<ArrayView3<'_, bool>>,
    base_weight: f32,
) -> Result<Volume<f32>> {
    BinaryRebalance { base_weight }.validate()?;
    check_mask(&labels, mask.as_ref())?;

    let (foreground, total) = match &mask {
        Some(mask) => {
            let mut fg = 0usize;
            let mut total = 0usize;
            Zip::from(&labels).and(mask).for_each(|l, &m| {
                if m {
                    total += 1;
                    fg += usize::from(l.is_foreground());
                }
            });
            (fg, total)
        }
        None => (
            labels.iter().filter(|l| l.is_foreground()).count(),
            labels.len(),
        ),
    };
    let background = total - foreground;

    let (w_fg, w_bg) = if foreground > 0 && background > 0 {
        let fg = 1.0 / foreground as f64;
        let bg = 1.0 / background as f64;
        let norm = fg + bg;
        ((fg / norm) as f32, (bg / norm) as f32)
    } else {
        warn!(
            foreground,
            background,
            base_weight,
            shape = ?spatial_shape(&labels),
            "one class absent, using base weight"
        );
        (base_weight, base_weight)
    };

    let weight = |l: &L| if l.is_foreground() { w_fg } else { w_bg };
    Ok(match mask {
        Some(mask) => {
            let mut out = Array3::<f32>::zeros(labels.raw_dim());
            Zip::from(&mut out)
                .and(&labels)
                .and(&mask)
                .for_each(|o, l, &m| {
                    if m {
                        *o = weight(l);
                    }
                });
            out
        }
        None => labels.map(weight),
    })
}
