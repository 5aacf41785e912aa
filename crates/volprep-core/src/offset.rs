//! Spatial axes and signed voxel offsets.

use crate::error::{Result, VolumeError};
use std::fmt;
use std::ops::Neg;

/// One of the three spatial axes of a volume, in storage order (Z, Y, X).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpatialAxis {
    /// Slowest-varying axis (slices).
    Z,
    /// Rows within a slice.
    Y,
    /// Columns within a slice.
    X,
}

impl SpatialAxis {
    /// All axes in storage order.
    pub const ALL: [SpatialAxis; 3] = [SpatialAxis::Z, SpatialAxis::Y, SpatialAxis::X];

    /// Axis index within a 3-D volume.
    pub fn volume_axis(self) -> usize {
        match self {
            Self::Z => 0,
            Self::Y => 1,
            Self::X => 2,
        }
    }

    /// Axis index within a 4-D tensor (behind the channel axis).
    pub fn tensor_axis(self) -> usize {
        self.volume_axis() + 1
    }

    /// Channel of a 3-channel affinity tensor that measures this axis.
    ///
    /// Channels are stored x, y, z; the convention is fixed.
    pub fn affinity_channel(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl fmt::Display for SpatialAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Z => "z",
            Self::Y => "y",
            Self::X => "x",
        };
        f.write_str(s)
    }
}

/// Signed voxel displacement `(dz, dy, dx)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Displacement along Z.
    pub dz: isize,
    /// Displacement along Y.
    pub dy: isize,
    /// Displacement along X.
    pub dx: isize,
}

impl Offset {
    /// Nearest-neighbour offset, the default affinity distance.
    pub const UNIT: Offset = Offset::new(1, 1, 1);

    /// Create an offset from its three components.
    pub const fn new(dz: isize, dy: isize, dx: isize) -> Self {
        Self { dz, dy, dx }
    }

    /// Same displacement `d` along every axis.
    pub const fn uniform(d: isize) -> Self {
        Self::new(d, d, d)
    }

    /// Component along `axis`.
    pub fn component(&self, axis: SpatialAxis) -> isize {
        match axis {
            SpatialAxis::Z => self.dz,
            SpatialAxis::Y => self.dy,
            SpatialAxis::X => self.dx,
        }
    }

    /// Offset with every component negated.
    pub fn negated(&self) -> Self {
        Self::new(-self.dz, -self.dy, -self.dx)
    }

    /// Offset with only the `axis` component kept, others zeroed.
    pub fn along(&self, axis: SpatialAxis) -> Self {
        let mut out = Self::new(0, 0, 0);
        match axis {
            SpatialAxis::Z => out.dz = self.dz,
            SpatialAxis::Y => out.dy = self.dy,
            SpatialAxis::X => out.dx = self.dx,
        }
        out
    }

    /// Components as an array in storage order.
    pub fn to_array(&self) -> [isize; 3] {
        [self.dz, self.dy, self.dx]
    }

    /// Check that every component is nonzero and strictly inside `shape`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::Offset`] for the first offending axis.
    pub fn validate_strict(&self, shape: [usize; 3]) -> Result<()> {
        for axis in SpatialAxis::ALL {
            let d = self.component(axis);
            let extent = shape[axis.volume_axis()];
            if d == 0 || d.unsigned_abs() >= extent {
                return Err(VolumeError::Offset {
                    axis,
                    offset: d,
                    extent,
                });
            }
        }
        Ok(())
    }

    /// Check that every component's magnitude is strictly inside `shape`.
    /// Zero components are allowed.
    ///
    /// # Errors
    ///
    /// [`VolumeError::Offset`] for the first offending axis.
    pub fn validate_within(&self, shape: [usize; 3]) -> Result<()> {
        for axis in SpatialAxis::ALL {
            let d = self.component(axis);
            let extent = shape[axis.volume_axis()];
            if d.unsigned_abs() >= extent {
                return Err(VolumeError::Offset {
                    axis,
                    offset: d,
                    extent,
                });
            }
        }
        Ok(())
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        self.negated()
    }
}

impl From<(isize, isize, isize)> for Offset {
    fn from((dz, dy, dx): (isize, isize, isize)) -> Self {
        Self::new(dz, dy, dx)
    }
}

impl From<[isize; 3]> for Offset {
    fn from([dz, dy, dx]: [isize; 3]) -> Self {
        Self::new(dz, dy, dx)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.dz, self.dy, self.dx)
    }
}
