//! Spatial crop of a multi-channel tensor.

use ndarray::{s, ArrayView4};
use volprep_core::{tensor_spatial_shape, Result, Tensor, VolumeError};

/// Copy the box starting at `origin` with spatial extent `size` out of every
/// channel of `tensor`.
///
/// `size = None` keeps everything from `origin` to the far corner.
///
/// # Errors
///
/// [`VolumeError::InvalidArgument`] if the box leaves the tensor.
pub fn crop<T: Clone>(
    tensor: ArrayView4<'_, T>,
    origin: [usize; 3],
    size: Option<[usize; 3]>,
) -> Result<Tensor<T>> {
    let shape = tensor_spatial_shape(&tensor);
    let out_of_bounds = || VolumeError::InvalidArgument {
        reason: format!(
            "crop box at {origin:?} with size {size:?} exceeds spatial shape {shape:?}"
        ),
    };

    let mut end = [0usize; 3];
    for axis in 0..3 {
        let extent = match size {
            Some(size) => size[axis],
            None => shape[axis].checked_sub(origin[axis]).ok_or_else(out_of_bounds)?,
        };
        end[axis] = origin[axis]
            .checked_add(extent)
            .filter(|&e| e <= shape[axis])
            .ok_or_else(out_of_bounds)?;
    }
    Ok(tensor
        .slice(s![
            ..,
            origin[0]..end[0],
            origin[1]..end[1],
            origin[2]..end[2]
        ])
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::mirror_border;
    use ndarray::{s, Array3, Array4};
    use proptest::prelude::*;
    use volprep_core::lift;
    use volprep_test_utils::{index_volume, random_intensities};

    #[test]
    fn crop_to_far_corner() {
        let v = lift(random_intensities((4, 4, 4), 5));
        let a = crop(v.view(), [0, 0, 0], Some([3, 3, 3])).unwrap();
        assert_eq!(a, v.slice(s![.., ..3, ..3, ..3]));
        let b = crop(v.view(), [1, 1, 1], None).unwrap();
        assert_eq!(b, v.slice(s![.., 1.., 1.., 1..]));
    }

    #[test]
    fn crop_keeps_every_channel() {
        let t = Array4::from_shape_fn((2, 3, 3, 3), |(c, z, y, x)| (c * 100 + z * 9 + y * 3 + x) as u32);
        let out = crop(t.view(), [1, 0, 2], Some([2, 3, 1])).unwrap();
        assert_eq!(out.shape(), &[2, 2, 3, 1]);
        assert_eq!(out[[1, 0, 0, 0]], 100 + 9 + 2);
    }

    #[test]
    fn crop_rejects_out_of_bounds() {
        let t = lift(index_volume((2, 3, 4)));
        assert!(crop(t.view(), [0, 0, 1], Some([2, 3, 4])).is_err());
        assert!(crop(t.view(), [3, 0, 0], None).is_err());
        assert!(matches!(
            crop(t.view(), [0, 0, 0], Some([usize::MAX, 1, 1])),
            Err(VolumeError::InvalidArgument { .. })
        ));
    }

    // ── Properties ────────────────────────────────────────────

    fn arb_volume() -> impl Strategy<Value = Array3<i32>> {
        (2usize..=6, 2usize..=6, 2usize..=6).prop_flat_map(|(z, y, x)| {
            proptest::collection::vec(any::<i32>(), z * y * x)
                .prop_map(move |data| Array3::from_shape_vec((z, y, x), data).unwrap())
        })
    }

    proptest! {
        #[test]
        fn crop_copies_the_requested_box(
            v in arb_volume(),
            seed in any::<[usize; 6]>(),
        ) {
            let shape = [v.dim().0, v.dim().1, v.dim().2];
            let origin = [0, 1, 2].map(|a| seed[a] % shape[a]);
            let size = [0, 1, 2].map(|a| seed[a + 3] % (shape[a] - origin[a]) + 1);
            let out = crop(lift(v.clone()).view(), origin, Some(size)).unwrap();
            prop_assert_eq!(out.shape(), &[1, size[0], size[1], size[2]]);
            for ((_, z, y, x), &value) in out.indexed_iter() {
                prop_assert_eq!(value, v[[origin[0] + z, origin[1] + y, origin[2] + x]]);
            }
            let past = [0, 1, 2].map(|a| shape[a] - origin[a] + 1);
            prop_assert!(crop(lift(v).view(), origin, Some(past)).is_err());
        }

        #[test]
        fn crop_inverts_mirror_border(v in arb_volume(), fov in any::<[usize; 3]>()) {
            let shape = [v.dim().0, v.dim().1, v.dim().2];
            // Largest fov whose padding stays reflectable is 2 * (n - 1) + 1.
            let fov = [0, 1, 2].map(|a| fov[a] % (2 * shape[a] - 1) + 1);
            let padded = mirror_border(v.view(), fov).unwrap();
            for a in 0..3 {
                prop_assert_eq!(padded.shape()[a], shape[a] + fov[a] - 1);
            }
            let origin = fov.map(|f| f / 2);
            let inner = crop(lift(padded).view(), origin, Some(shape)).unwrap();
            prop_assert_eq!(inner.index_axis_move(ndarray::Axis(0), 0), v);
        }
    }
}
