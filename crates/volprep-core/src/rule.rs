//! Flip rules: the 4-bit description of a geometric augmentation.

use rand::Rng;
use std::fmt;

/// Reflections along Z, Y, X followed by an optional Y/X transpose.
///
/// Forward application is always z, y, x, transpose; reversal runs the
/// same steps backwards. Every step is self-inverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlipRule {
    /// Reverse voxel order along Z.
    pub flip_z: bool,
    /// Reverse voxel order along Y.
    pub flip_y: bool,
    /// Reverse voxel order along X.
    pub flip_x: bool,
    /// Exchange the Y and X axes.
    pub transpose_xy: bool,
}

impl FlipRule {
    /// The rule that leaves data untouched.
    pub const IDENTITY: FlipRule = FlipRule::new(false, false, false, false);

    /// Number of distinct rules.
    pub const COUNT: u8 = 16;

    /// Create a rule from its four flags, in application order.
    pub const fn new(flip_z: bool, flip_y: bool, flip_x: bool, transpose_xy: bool) -> Self {
        Self {
            flip_z,
            flip_y,
            flip_x,
            transpose_xy,
        }
    }

    /// Unpack from the low four bits: bit 0 = z, 1 = y, 2 = x, 3 = transpose.
    /// Higher bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self::new(
            bits & 0b0001 != 0,
            bits & 0b0010 != 0,
            bits & 0b0100 != 0,
            bits & 0b1000 != 0,
        )
    }

    /// Pack into four bits (inverse of [`FlipRule::from_bits`]).
    pub const fn bits(&self) -> u8 {
        (self.flip_z as u8)
            | (self.flip_y as u8) << 1
            | (self.flip_x as u8) << 2
            | (self.transpose_xy as u8) << 3
    }

    /// Flags as an array `[z, y, x, transpose]`.
    pub fn to_array(&self) -> [bool; 4] {
        [self.flip_z, self.flip_y, self.flip_x, self.transpose_xy]
    }

    /// Whether the rule changes nothing.
    pub fn is_identity(&self) -> bool {
        self.bits() == 0
    }

    /// Iterate over all 16 rules in bit order.
    pub fn all() -> impl Iterator<Item = FlipRule> {
        (0..Self::COUNT).map(Self::from_bits)
    }

    /// Draw a uniformly random rule.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_bits(rng.gen_range(0..Self::COUNT))
    }
}

impl From<[bool; 4]> for FlipRule {
    fn from([z, y, x, t]: [bool; 4]) -> Self {
        Self::new(z, y, x, t)
    }
}

impl fmt::Display for FlipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            flag(self.flip_z, 'z'),
            flag(self.flip_y, 'y'),
            flag(self.flip_x, 'x'),
            flag(self.transpose_xy, 't'),
        )
    }
}
