//! Shift windows: the three aligned sub-boxes used to compare every voxel
//! with its neighbour at a fixed offset.
//!
//! For an axis of length `n` and offset component `d`:
//!
//! | `d`     | `target`      | `shifted`     | `anchor`      |
//! |---------|---------------|---------------|---------------|
//! | `0`     | `[0, n)`      | `[0, n)`      | `[0, n)`      |
//! | `> 0`   | `[d, n)`      | `[d, n)`      | `[0, n-d)`    |
//! | `< 0`   | `[0, n-|d|)`  | `[|d|, n)`    | `[0, n-|d|)`  |
//!
//! `shifted` and `anchor` always have the same length, and element `i` of
//! one is `|d|` voxels away from element `i` of the other. Results are
//! written into `target`.

use crate::error::Result;
use crate::offset::{Offset, SpatialAxis};
use ndarray::{s, ArrayView3, ArrayViewMut3};

/// Half-open index range `[start, end)` along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisSpan {
    /// First index (inclusive).
    pub start: usize,
    /// Last index (exclusive).
    pub end: usize,
}

impl AxisSpan {
    /// Span covering `[start, end)`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering a whole axis of length `n`.
    pub const fn full(n: usize) -> Self {
        Self::new(0, n)
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Per-axis spans for one offset over one volume shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftWindow {
    /// Where comparison results are written.
    pub target: [AxisSpan; 3],
    /// Voxels on the shifted side of each pair.
    pub shifted: [AxisSpan; 3],
    /// Their partners on the anchor side.
    pub anchor: [AxisSpan; 3],
}

impl ShiftWindow {
    /// Compute the window for `offset` over a volume of `shape`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::Offset`](crate::VolumeError::Offset) if any
    /// component's magnitude reaches its axis extent.
    pub fn new(offset: Offset, shape: [usize; 3]) -> Result<Self> {
        offset.validate_within(shape)?;
        let mut target = [AxisSpan::full(0); 3];
        let mut shifted = target;
        let mut anchor = target;
        for axis in SpatialAxis::ALL {
            let i = axis.volume_axis();
            let (t, s, a) = axis_spans(offset.component(axis), shape[i]);
            target[i] = t;
            shifted[i] = s;
            anchor[i] = a;
        }
        Ok(Self {
            target,
            shifted,
            anchor,
        })
    }

    /// Number of voxel pairs compared.
    pub fn pair_count(&self) -> usize {
        self.target.iter().map(AxisSpan::len).product()
    }
}

fn axis_spans(d: isize, n: usize) -> (AxisSpan, AxisSpan, AxisSpan) {
    let k = d.unsigned_abs();
    match d {
        0 => (AxisSpan::full(n), AxisSpan::full(n), AxisSpan::full(n)),
        d if d > 0 => (
            AxisSpan::new(k, n),
            AxisSpan::new(k, n),
            AxisSpan::new(0, n - k),
        ),
        _ => (
            AxisSpan::new(0, n - k),
            AxisSpan::new(k, n),
            AxisSpan::new(0, n - k),
        ),
    }
}

/// View of the sub-box `spans` of `volume`.
pub fn window_view<'a, T>(volume: ArrayView3<'a, T>, spans: &[AxisSpan; 3]) -> ArrayView3<'a, T> {
    let [z, y, x] = *spans;
    volume.slice_move(s![z.start..z.end, y.start..y.end, x.start..x.end])
}

/// Mutable view of the sub-box `spans` of `volume`.
pub fn window_view_mut<'a, T>(
    volume: ArrayViewMut3<'a, T>,
    spans: &[AxisSpan; 3],
) -> ArrayViewMut3<'a, T> {
    let [z, y, x] = *spans;
    volume.slice_move(s![z.start..z.end, y.start..y.end, x.start..x.end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use proptest::prelude::*;

    #[test]
    fn positive_offset_spans() {
        let w = ShiftWindow::new(Offset::new(1, 2, 3), [4, 5, 6]).unwrap();
        assert_eq!(w.target[0], AxisSpan::new(1, 4));
        assert_eq!(w.shifted[1], AxisSpan::new(2, 5));
        assert_eq!(w.anchor[2], AxisSpan::new(0, 3));
    }

    #[test]
    fn negative_offset_spans() {
        let w = ShiftWindow::new(Offset::new(-1, -2, -3), [4, 5, 6]).unwrap();
        assert_eq!(w.target[0], AxisSpan::new(0, 3));
        assert_eq!(w.shifted[0], AxisSpan::new(1, 4));
        assert_eq!(w.anchor[0], AxisSpan::new(0, 3));
        assert_eq!(w.target[2], AxisSpan::new(0, 3));
    }

    #[test]
    fn zero_component_is_full_axis() {
        let w = ShiftWindow::new(Offset::new(0, 1, 0), [4, 5, 6]).unwrap();
        assert_eq!(w.target[0], AxisSpan::full(4));
        assert_eq!(w.anchor[2], AxisSpan::full(6));
        assert_eq!(w.pair_count(), 4 * 4 * 6);
    }

    #[test]
    fn shifted_and_anchor_are_same_length() {
        for d in -3isize..=3 {
            let w = ShiftWindow::new(Offset::new(d, d, d), [4, 4, 4]).unwrap();
            for i in 0..3 {
                assert_eq!(w.shifted[i].len(), w.anchor[i].len());
                assert_eq!(w.shifted[i].len(), w.target[i].len());
            }
        }
    }

    #[test]
    fn oversized_offset_rejected() {
        assert!(ShiftWindow::new(Offset::new(0, 0, 6), [4, 5, 6]).is_err());
    }

    #[test]
    fn views_select_sub_box() {
        let vol = Array3::from_shape_fn((3, 3, 3), |(z, y, x)| z * 9 + y * 3 + x);
        let w = ShiftWindow::new(Offset::new(1, 0, -1), [3, 3, 3]).unwrap();
        let shifted = window_view(vol.view(), &w.shifted);
        assert_eq!(shifted.dim(), (2, 3, 2));
        assert_eq!(shifted[[0, 0, 0]], 9 + 1);

        let mut out = Array3::<u8>::zeros((3, 3, 3));
        window_view_mut(out.view_mut(), &w.target).fill(1);
        assert_eq!(out.sum(), 2 * 3 * 2);
        assert_eq!(out[[0, 0, 0]], 0);
        assert_eq!(out[[1, 0, 0]], 1);
    }

    fn arb_shape_and_offset() -> impl Strategy<Value = ([usize; 3], Offset)> {
        (1usize..=6, 1usize..=6, 1usize..=6).prop_flat_map(|(z, y, x)| {
            let comp = |n: usize| {
                let m = n as isize - 1;
                -m..=m
            };
            (comp(z), comp(y), comp(x))
                .prop_map(move |(dz, dy, dx)| ([z, y, x], Offset::new(dz, dy, dx)))
        })
    }

    proptest! {
        #[test]
        fn spans_stay_inside_and_pair_up((shape, offset) in arb_shape_and_offset()) {
            let w = ShiftWindow::new(offset, shape).unwrap();
            for axis in SpatialAxis::ALL {
                let i = axis.volume_axis();
                let k = offset.component(axis).unsigned_abs();
                for span in [w.target[i], w.shifted[i], w.anchor[i]] {
                    prop_assert!(span.start <= span.end && span.end <= shape[i]);
                    prop_assert_eq!(span.len(), shape[i] - k);
                }
                prop_assert_eq!(w.shifted[i].start - w.anchor[i].start, k);
            }
            let expected: usize = SpatialAxis::ALL
                .iter()
                .map(|&a| shape[a.volume_axis()] - offset.component(a).unsigned_abs())
                .product();
            prop_assert_eq!(w.pair_count(), expected);
        }
    }
}
