//! Shape guards.
//!
//! Every component checks its inputs through these functions before doing
//! any work. They never copy: a guard hands back the same data with a
//! statically known dimensionality.

use crate::error::{Result, VolumeError};
use ndarray::{
    Array3, Array4, ArrayBase, ArrayD, ArrayView3, ArrayView4, ArrayViewD, Axis, Data, Ix3, Ix4,
};

/// Dense 3-D array, axes (Z, Y, X).
pub type Volume<T> = Array3<T>;

/// Dense 4-D array, axes (Channel, Z, Y, X).
pub type Tensor<T> = Array4<T>;

fn shape_error(expected: usize, shape: &[usize]) -> VolumeError {
    VolumeError::Shape {
        expected,
        found: shape.iter().copied().collect(),
    }
}

/// Accept `x` only if it has exactly three dimensions.
///
/// # Errors
///
/// [`VolumeError::Shape`] otherwise.
pub fn as_volume<T>(x: ArrayViewD<'_, T>) -> Result<ArrayView3<'_, T>> {
    let found = shape_error(3, x.shape());
    x.into_dimensionality::<Ix3>().map_err(|_| found)
}

/// Accept `x` only if it has exactly four dimensions.
///
/// # Errors
///
/// [`VolumeError::Shape`] otherwise.
pub fn as_tensor<T>(x: ArrayViewD<'_, T>) -> Result<ArrayView4<'_, T>> {
    let found = shape_error(4, x.shape());
    x.into_dimensionality::<Ix4>().map_err(|_| found)
}

/// Owned counterpart of [`as_volume`].
///
/// # Errors
///
/// [`VolumeError::Shape`] unless `x` is 3-D.
pub fn into_volume<T>(x: ArrayD<T>) -> Result<Volume<T>> {
    let found = shape_error(3, x.shape());
    x.into_dimensionality::<Ix3>().map_err(|_| found)
}

/// Owned counterpart of [`as_tensor`].
///
/// # Errors
///
/// [`VolumeError::Shape`] unless `x` is 4-D.
pub fn into_tensor<T>(x: ArrayD<T>) -> Result<Tensor<T>> {
    let found = shape_error(4, x.shape());
    x.into_dimensionality::<Ix4>().map_err(|_| found)
}

/// Wrap a volume as a single-channel tensor.
pub fn lift<T>(volume: Volume<T>) -> Tensor<T> {
    volume.insert_axis(Axis(0))
}

/// Spatial `(Z, Y, X)` shape of a volume.
pub fn spatial_shape<S: Data>(volume: &ArrayBase<S, Ix3>) -> [usize; 3] {
    let (z, y, x) = volume.dim();
    [z, y, x]
}

/// Spatial `(Z, Y, X)` shape of a tensor, ignoring channels.
pub fn tensor_spatial_shape<S: Data>(tensor: &ArrayBase<S, Ix4>) -> [usize; 3] {
    let (_, z, y, x) = tensor.dim();
    [z, y, x]
}

/// Require `other` to have the same spatial shape as `reference`.
///
/// # Errors
///
/// [`VolumeError::ShapeMismatch`] on disagreement.
pub fn ensure_same_shape<A, B>(reference: &ArrayView3<'_, A>, other: &ArrayView3<'_, B>) -> Result<()> {
    let expected = spatial_shape(reference);
    let found = spatial_shape(other);
    if expected != found {
        return Err(VolumeError::ShapeMismatch { expected, found });
    }
    Ok(())
}

/// Require `tensor` to have exactly `expected` channels.
///
/// # Errors
///
/// [`VolumeError::ChannelCount`] on disagreement.
pub fn ensure_channels<S: Data>(tensor: &ArrayBase<S, Ix4>, expected: usize) -> Result<()> {
    let found = tensor.len_of(Axis(0));
    if found != expected {
        return Err(VolumeError::ChannelCount { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use smallvec::smallvec;

    #[test]
    fn volume_accepts_3d() {
        let a = ArrayD::<u32>::zeros(IxDyn(&[2, 3, 4]));
        let v = as_volume(a.view()).unwrap();
        assert_eq!(v.dim(), (2, 3, 4));
    }

    #[test]
    fn volume_rejects_4d() {
        let a = ArrayD::<u32>::zeros(IxDyn(&[1, 2, 3, 4]));
        assert_eq!(
            as_volume(a.view()).unwrap_err(),
            VolumeError::Shape {
                expected: 3,
                found: smallvec![1, 2, 3, 4]
            }
        );
    }

    #[test]
    fn tensor_accepts_4d_rejects_2d() {
        let a = ArrayD::<f32>::zeros(IxDyn(&[3, 2, 2, 2]));
        assert_eq!(as_tensor(a.view()).unwrap().dim(), (3, 2, 2, 2));
        let b = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        assert!(matches!(
            as_tensor(b.view()),
            Err(VolumeError::Shape { expected: 4, .. })
        ));
    }

    #[test]
    fn owned_guards_keep_data() {
        let a = ArrayD::from_shape_vec(IxDyn(&[1, 1, 2]), vec![5u8, 6]).unwrap();
        let v = into_volume(a).unwrap();
        assert_eq!(v[[0, 0, 1]], 6);
        let t = lift(v);
        assert_eq!(t.dim(), (1, 1, 1, 2));
        assert!(into_tensor(ArrayD::<u8>::zeros(IxDyn(&[2, 2, 2]))).is_err());
    }

    #[test]
    fn same_shape_and_channels() {
        let a = Array3::<u8>::zeros((2, 3, 4));
        let b = Array3::<bool>::from_elem((2, 3, 4), true);
        let c = Array3::<bool>::from_elem((2, 4, 3), true);
        assert!(ensure_same_shape(&a.view(), &b.view()).is_ok());
        assert_eq!(
            ensure_same_shape(&a.view(), &c.view()).unwrap_err(),
            VolumeError::ShapeMismatch {
                expected: [2, 3, 4],
                found: [2, 4, 3]
            }
        );

        let t = Array4::<f32>::zeros((2, 1, 1, 1));
        assert!(ensure_channels(&t, 2).is_ok());
        assert!(matches!(
            ensure_channels(&t, 3),
            Err(VolumeError::ChannelCount {
                expected: 3,
                found: 2
            })
        ));
    }
}
