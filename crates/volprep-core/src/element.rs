//! Element traits for label and mask volumes.

use ndarray::{Array3, ArrayView3};
use std::fmt::Debug;
use std::hash::Hash;

/// Element types that can be read as foreground (`> 0`) or background.
pub trait Foreground: Copy {
    /// Whether the voxel counts as foreground.
    fn is_foreground(&self) -> bool;
}

/// Segment-label element types: foreground test plus exact equality and
/// hashing so distinct labels can be counted.
pub trait Label: Foreground + Eq + Hash + Debug {}

macro_rules! impl_integer_label {
    ($($t:ty),* $(,)?) => {
        $(
            impl Foreground for $t {
                #[inline]
                fn is_foreground(&self) -> bool {
                    *self > 0
                }
            }

            impl Label for $t {}
        )*
    };
}

impl_integer_label!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Foreground for f32 {
    #[inline]
    fn is_foreground(&self) -> bool {
        *self > 0.0
    }
}

impl Foreground for f64 {
    #[inline]
    fn is_foreground(&self) -> bool {
        *self > 0.0
    }
}

impl Foreground for bool {
    #[inline]
    fn is_foreground(&self) -> bool {
        *self
    }
}

/// Binary mask of the foreground voxels of `volume`.
pub fn foreground_mask<M: Foreground>(volume: ArrayView3<'_, M>) -> Array3<bool> {
    volume.mapv(|v| v.is_foreground())
}
