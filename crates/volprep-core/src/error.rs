//! Error types for volume preparation.
//!
//! Every failure is a deterministic function-call failure: nothing is
//! retried and no partial output is returned.

use crate::offset::SpatialAxis;
use smallvec::SmallVec;
use std::error::Error;
use std::fmt;

/// Observed array shape, reported by [`VolumeError::Shape`].
pub type ShapeVec = SmallVec<[usize; 4]>;

/// Errors raised by guards, affinity derivation, augmentation,
/// rebalancing and channel dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VolumeError {
    /// The input does not have the required number of dimensions.
    Shape {
        /// Required dimensionality (3 for a volume, 4 for a tensor).
        expected: usize,
        /// Shape that was actually supplied.
        found: ShapeVec,
    },
    /// An offset component is zero where a shift is required, or its
    /// magnitude is not strictly less than the axis extent.
    Offset {
        /// Axis the offending component belongs to.
        axis: SpatialAxis,
        /// The offending component.
        offset: isize,
        /// Extent of the volume along `axis`.
        extent: usize,
    },
    /// A rebalancing call found no labelled voxels in the (masked) region.
    EmptyVolume,
    /// Two arrays that must share spatial dimensions do not.
    ShapeMismatch {
        /// Spatial shape of the reference volume.
        expected: [usize; 3],
        /// Spatial shape of the other operand.
        found: [usize; 3],
    },
    /// A tensor has the wrong number of channels for the operation.
    ChannelCount {
        /// Required channel count.
        expected: usize,
        /// Channel count that was supplied.
        found: usize,
    },
    /// No operation is registered under the requested name or kind.
    UnknownOperation {
        /// The name that failed to resolve.
        name: String,
    },
    /// A helper parameter is out of its valid range.
    InvalidArgument {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { expected, found } => {
                write!(
                    f,
                    "expected a {expected}-dimensional array, got shape {:?}",
                    found.as_slice()
                )
            }
            Self::Offset {
                axis,
                offset,
                extent,
            } => {
                if *offset == 0 {
                    write!(f, "{axis} offset must be nonzero")
                } else {
                    write!(
                        f,
                        "{axis} offset {offset} out of range for extent {extent}"
                    )
                }
            }
            Self::EmptyVolume => write!(f, "no labelled voxels in the masked region"),
            Self::ShapeMismatch { expected, found } => {
                write!(f, "spatial shape {found:?} does not match {expected:?}")
            }
            Self::ChannelCount { expected, found } => {
                write!(f, "expected {expected} channels, got {found}")
            }
            Self::UnknownOperation { name } => write!(f, "unknown operation '{name}'"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl Error for VolumeError {}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VolumeError>;
