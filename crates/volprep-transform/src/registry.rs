//! Enum-keyed dispatch of per-volume operations over tensor channels.
//!
//! [`OpKind`] names every operation that can run channel by channel;
//! [`TransformSpec`] carries its parameters. A [`Registry`] maps each kind to
//! a plain function pointer, and [`registry`] exposes the process-wide
//! standard table, built on first use and read-only afterwards.
//!
//! Label-consuming operations read `f32` channels as integral labels
//! (`value as i64`).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;
use ndarray::{concatenate, Array3, ArrayView, ArrayView3, Axis, Dimension};
use tracing::debug;
use volprep_affinity::{affinity1, affinity3, affinity_mask1, affinity_mask3};
use volprep_core::{as_tensor, lift, Offset, Result, Tensor, VolumeError};
use volprep_rebalance::{rebalance_binary, rebalance_multiclass, BinaryRebalance};

use crate::ops::{
    binarize, binary_class, divide_by, mirror_border, multiclass_expansion, rescale,
    standardize, NormMode, DEFAULT_DIVISOR,
};

/// Identifier of a dispatchable per-volume operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// [`binarize`](crate::binarize).
    Binarize,
    /// One-hot half of [`multiclass_expansion`](crate::multiclass_expansion).
    MulticlassExpansion,
    /// [`binary_class`](crate::binary_class).
    BinaryClass,
    /// [`standardize`](crate::standardize).
    Standardize,
    /// [`rescale`](crate::rescale).
    Rescale,
    /// [`divide_by`](crate::divide_by).
    DivideBy,
    /// [`mirror_border`](crate::mirror_border).
    MirrorBorder,
    /// Three-channel segment affinity.
    Affinity3,
    /// Single-channel segment affinity.
    Affinity1,
    /// Three-channel mask affinity.
    AffinityMask3,
    /// Single-channel mask affinity.
    AffinityMask1,
    /// Inverse-frequency weights over every label.
    RebalanceMulticlass,
    /// Foreground/background weights.
    RebalanceBinary,
}

impl OpKind {
    /// Every kind, in registration order.
    pub const ALL: [OpKind; 13] = [
        Self::Binarize,
        Self::MulticlassExpansion,
        Self::BinaryClass,
        Self::Standardize,
        Self::Rescale,
        Self::DivideBy,
        Self::MirrorBorder,
        Self::Affinity3,
        Self::Affinity1,
        Self::AffinityMask3,
        Self::AffinityMask1,
        Self::RebalanceMulticlass,
        Self::RebalanceBinary,
    ];

    /// Symbolic name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Binarize => "binarize",
            Self::MulticlassExpansion => "multiclass_expansion",
            Self::BinaryClass => "binary_class",
            Self::Standardize => "standardize",
            Self::Rescale => "rescale",
            Self::DivideBy => "divide_by",
            Self::MirrorBorder => "mirror_border",
            Self::Affinity3 => "affinity3",
            Self::Affinity1 => "affinity1",
            Self::AffinityMask3 => "affinity_mask3",
            Self::AffinityMask1 => "affinity_mask1",
            Self::RebalanceMulticlass => "rebalance_multiclass",
            Self::RebalanceBinary => "rebalance_binary",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpKind {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| VolumeError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

/// An operation together with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformSpec {
    /// Foreground indicator.
    Binarize,
    /// One-hot channels for `ids`.
    MulticlassExpansion {
        /// Class ids, one output channel each.
        ids: Vec<i64>,
    },
    /// Background/foreground one-hot pair.
    BinaryClass,
    /// Zero mean, unit variance.
    Standardize {
        /// Statistics region.
        mode: NormMode,
    },
    /// Linear range map.
    Rescale {
        /// Output minimum.
        min: f32,
        /// Output maximum.
        max: f32,
    },
    /// Constant division.
    DivideBy {
        /// Nonzero divisor.
        divisor: f32,
    },
    /// Reflect padding for a field of view.
    MirrorBorder {
        /// Field of view in (z, y, x).
        fov: [usize; 3],
    },
    /// Three-channel segment affinity.
    Affinity3 {
        /// Neighbour displacement.
        offset: Offset,
    },
    /// Single-channel segment affinity.
    Affinity1 {
        /// Neighbour displacement.
        offset: Offset,
    },
    /// Three-channel mask affinity.
    AffinityMask3 {
        /// Neighbour displacement.
        offset: Offset,
    },
    /// Single-channel mask affinity.
    AffinityMask1 {
        /// Neighbour displacement.
        offset: Offset,
    },
    /// Inverse-frequency weights over every label.
    RebalanceMulticlass,
    /// Foreground/background weights.
    RebalanceBinary {
        /// Weight used when one class is absent.
        base_weight: f32,
    },
}

impl TransformSpec {
    /// Kind this spec dispatches to.
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Binarize => OpKind::Binarize,
            Self::MulticlassExpansion { .. } => OpKind::MulticlassExpansion,
            Self::BinaryClass => OpKind::BinaryClass,
            Self::Standardize { .. } => OpKind::Standardize,
            Self::Rescale { .. } => OpKind::Rescale,
            Self::DivideBy { .. } => OpKind::DivideBy,
            Self::MirrorBorder { .. } => OpKind::MirrorBorder,
            Self::Affinity3 { .. } => OpKind::Affinity3,
            Self::Affinity1 { .. } => OpKind::Affinity1,
            Self::AffinityMask3 { .. } => OpKind::AffinityMask3,
            Self::AffinityMask1 { .. } => OpKind::AffinityMask1,
            Self::RebalanceMulticlass => OpKind::RebalanceMulticlass,
            Self::RebalanceBinary { .. } => OpKind::RebalanceBinary,
        }
    }

    /// Spec for `kind` with default parameters.
    ///
    /// | kind | defaults |
    /// |------|----------|
    /// | `MulticlassExpansion` | ids `[0, 1]` |
    /// | `Standardize` | [`NormMode::Slice`] |
    /// | `Rescale` | `[0, 1]` |
    /// | `DivideBy` | `255` |
    /// | `MirrorBorder` | fov `[1, 1, 1]` (no padding) |
    /// | affinity kinds | [`Offset::UNIT`] |
    /// | `RebalanceBinary` | [`BinaryRebalance::DEFAULT_BASE_WEIGHT`] |
    pub fn defaults(kind: OpKind) -> Self {
        match kind {
            OpKind::Binarize => Self::Binarize,
            OpKind::MulticlassExpansion => Self::MulticlassExpansion { ids: vec![0, 1] },
            OpKind::BinaryClass => Self::BinaryClass,
            OpKind::Standardize => Self::Standardize {
                mode: NormMode::default(),
            },
            OpKind::Rescale => Self::Rescale { min: 0.0, max: 1.0 },
            OpKind::DivideBy => Self::DivideBy {
                divisor: DEFAULT_DIVISOR,
            },
            OpKind::MirrorBorder => Self::MirrorBorder { fov: [1, 1, 1] },
            OpKind::Affinity3 => Self::Affinity3 {
                offset: Offset::default(),
            },
            OpKind::Affinity1 => Self::Affinity1 {
                offset: Offset::default(),
            },
            OpKind::AffinityMask3 => Self::AffinityMask3 {
                offset: Offset::default(),
            },
            OpKind::AffinityMask1 => Self::AffinityMask1 {
                offset: Offset::default(),
            },
            OpKind::RebalanceMulticlass => Self::RebalanceMulticlass,
            OpKind::RebalanceBinary => Self::RebalanceBinary {
                base_weight: BinaryRebalance::DEFAULT_BASE_WEIGHT,
            },
        }
    }
}

impl From<OpKind> for TransformSpec {
    fn from(kind: OpKind) -> Self {
        Self::defaults(kind)
    }
}

/// A per-volume operation: one channel in, one or more channels out.
pub type VolumeOp = fn(ArrayView3<'_, f32>, &TransformSpec) -> Result<Tensor<f32>>;

/// Table of [`VolumeOp`]s keyed by [`OpKind`].
#[derive(Clone, Debug, Default)]
pub struct Registry {
    ops: IndexMap<OpKind, VolumeOp>,
}

impl Registry {
    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every [`OpKind`] bound to its built-in operation.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in OpKind::ALL {
            registry.register(kind, builtin(kind));
        }
        registry
    }

    /// Bind `kind` to `op`, returning the previous binding.
    pub fn register(&mut self, kind: OpKind, op: VolumeOp) -> Option<VolumeOp> {
        self.ops.insert(kind, op)
    }

    /// Operation bound to `kind`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::UnknownOperation`] if nothing is bound.
    pub fn get(&self, kind: OpKind) -> Result<VolumeOp> {
        self.ops
            .get(&kind)
            .copied()
            .ok_or_else(|| VolumeError::UnknownOperation {
                name: kind.name().to_string(),
            })
    }

    /// Whether `kind` is bound.
    pub fn contains(&self, kind: OpKind) -> bool {
        self.ops.contains_key(&kind)
    }

    /// Bound kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.ops.keys().copied()
    }

    /// Number of bound kinds.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run `spec` on every channel of `tensor` and concatenate the results
    /// along the channel axis.
    ///
    /// # Errors
    ///
    /// - [`VolumeError::Shape`] unless `tensor` is 4-D.
    /// - [`VolumeError::InvalidArgument`] for a tensor with no channels.
    /// - [`VolumeError::UnknownOperation`] if the kind is not bound.
    /// - Any error of the operation itself.
    pub fn apply<D: Dimension>(
        &self,
        spec: &TransformSpec,
        tensor: ArrayView<'_, f32, D>,
    ) -> Result<Tensor<f32>> {
        let tensor = as_tensor(tensor.into_dyn())?;
        let kind = spec.kind();
        let op = self.get(kind)?;
        debug!(op = %kind, shape = ?tensor.shape(), "dispatching over channels");

        let parts = tensor
            .outer_iter()
            .map(|channel| op(channel, spec))
            .collect::<Result<Vec<_>>>()?;
        match parts.as_slice() {
            [] => Err(VolumeError::InvalidArgument {
                reason: "tensor has no channels".to_string(),
            }),
            [single] => Ok(single.clone()),
            _ => {
                let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
                concatenate(Axis(0), &views).map_err(|e| VolumeError::InvalidArgument {
                    reason: format!("channel results disagree in shape: {e}"),
                })
            }
        }
    }

    /// [`apply`](Self::apply) the operation named `name` with default
    /// parameters.
    ///
    /// # Errors
    ///
    /// [`VolumeError::UnknownOperation`] for an unrecognised name, otherwise
    /// as [`apply`](Self::apply).
    pub fn apply_named<D: Dimension>(
        &self,
        name: &str,
        tensor: ArrayView<'_, f32, D>,
    ) -> Result<Tensor<f32>> {
        let kind: OpKind = name.parse()?;
        self.apply(&TransformSpec::defaults(kind), tensor)
    }
}

/// Process-wide standard registry, built on first call.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}

// ── Built-in bindings ───────────────────────────────────────────

fn builtin(kind: OpKind) -> VolumeOp {
    match kind {
        OpKind::Binarize => run_binarize,
        OpKind::MulticlassExpansion => run_multiclass_expansion,
        OpKind::BinaryClass => run_binary_class,
        OpKind::Standardize => run_standardize,
        OpKind::Rescale => run_rescale,
        OpKind::DivideBy => run_divide_by,
        OpKind::MirrorBorder => run_mirror_border,
        OpKind::Affinity3 => run_affinity3,
        OpKind::Affinity1 => run_affinity1,
        OpKind::AffinityMask3 => run_affinity_mask3,
        OpKind::AffinityMask1 => run_affinity_mask1,
        OpKind::RebalanceMulticlass => run_rebalance_multiclass,
        OpKind::RebalanceBinary => run_rebalance_binary,
    }
}

fn mismatch(expected: OpKind, spec: &TransformSpec) -> VolumeError {
    VolumeError::InvalidArgument {
        reason: format!("{expected} cannot run with {} parameters", spec.kind()),
    }
}

fn as_labels(volume: ArrayView3<'_, f32>) -> Array3<i64> {
    volume.mapv(|v| v as i64)
}

fn run_binarize(volume: ArrayView3<'_, f32>, _: &TransformSpec) -> Result<Tensor<f32>> {
    Ok(lift(binarize(volume)))
}

fn run_multiclass_expansion(
    volume: ArrayView3<'_, f32>,
    spec: &TransformSpec,
) -> Result<Tensor<f32>> {
    let TransformSpec::MulticlassExpansion { ids } = spec else {
        return Err(mismatch(OpKind::MulticlassExpansion, spec));
    };
    let (one_hot, _) = multiclass_expansion(as_labels(volume).view(), ids)?;
    Ok(one_hot)
}

fn run_binary_class(volume: ArrayView3<'_, f32>, _: &TransformSpec) -> Result<Tensor<f32>> {
    Ok(binary_class(volume))
}

fn run_standardize(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::Standardize { mode } = spec else {
        return Err(mismatch(OpKind::Standardize, spec));
    };
    Ok(lift(standardize(volume, *mode)))
}

fn run_rescale(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::Rescale { min, max } = spec else {
        return Err(mismatch(OpKind::Rescale, spec));
    };
    rescale(volume, *min, *max).map(lift)
}

fn run_divide_by(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::DivideBy { divisor } = spec else {
        return Err(mismatch(OpKind::DivideBy, spec));
    };
    divide_by(volume, *divisor).map(lift)
}

fn run_mirror_border(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::MirrorBorder { fov } = spec else {
        return Err(mismatch(OpKind::MirrorBorder, spec));
    };
    mirror_border(volume, *fov).map(lift)
}

fn run_affinity3(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::Affinity3 { offset } = spec else {
        return Err(mismatch(OpKind::Affinity3, spec));
    };
    affinity3(as_labels(volume).view(), *offset)
}

fn run_affinity1(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::Affinity1 { offset } = spec else {
        return Err(mismatch(OpKind::Affinity1, spec));
    };
    affinity1(as_labels(volume).view(), *offset)
}

fn run_affinity_mask3(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::AffinityMask3 { offset } = spec else {
        return Err(mismatch(OpKind::AffinityMask3, spec));
    };
    affinity_mask3(volume, *offset)
}

fn run_affinity_mask1(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::AffinityMask1 { offset } = spec else {
        return Err(mismatch(OpKind::AffinityMask1, spec));
    };
    affinity_mask1(volume, *offset)
}

fn run_rebalance_multiclass(
    volume: ArrayView3<'_, f32>,
    _: &TransformSpec,
) -> Result<Tensor<f32>> {
    rebalance_multiclass(as_labels(volume).view(), None).map(lift)
}

fn run_rebalance_binary(volume: ArrayView3<'_, f32>, spec: &TransformSpec) -> Result<Tensor<f32>> {
    let TransformSpec::RebalanceBinary { base_weight } = spec else {
        return Err(mismatch(OpKind::RebalanceBinary, spec));
    };
    rebalance_binary(volume, None, *base_weight).map(lift)
}
