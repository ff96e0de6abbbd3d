use strum::{Display, VariantArray};

use crate::coordinates::{Coord, Coordinates};

/// One of the three axes of the tiling.
///
/// An axis names both a component of [`Coordinates`] and a family of parallel lattice lines:
/// the lines on which that component is a multiple of 3.
#[derive(Copy, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum Axis {
    /// Lines of constant x.
    X,
    /// Lines of constant y.
    Y,
    /// Lines of constant z.
    Z,
}

impl Axis {
    /// Every axis, in index order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Position of this axis in `[X, Y, Z]` order, as used by per-axis arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The axis after this one in `X -> Y -> Z -> X` order.
    /// Tiles of an aisle on `self` are sorted along `self.next()`.
    pub const fn next(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::Z,
            Self::Z => Self::X,
        }
    }

    /// The two axes other than `self`.
    pub const fn others(self) -> [Self; 2] {
        [self.next(), self.next().next()]
    }
}

/// The two canonical triangle shapes of the tiling.
///
/// An `Up` centre has every component congruent to 1 (mod 3), a `Down` centre every component congruent to 2.
#[derive(Copy, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum Orientation {
    /// Centre ≡ 1 (mod 3).
    Up,
    /// Centre ≡ 2 (mod 3).
    Down,
}

// offsets from a centre to its vertices, indexed by the axis the vertex juts out along
const UP_OFFSETS: [Coordinates; 3] = [Coordinates::new(2, -1), Coordinates::new(-1, 2), Coordinates::new(-1, -1)];
const DOWN_OFFSETS: [Coordinates; 3] = [Coordinates::new(-2, 1), Coordinates::new(1, -2), Coordinates::new(1, 1)];

impl Orientation {
    /// The orientation of a tile centred on `centre`, or [`None`] if `centre` is not a tile centre at all.
    pub fn of(centre: Coordinates) -> Option<Self> {
        match (centre.x().rem_euclid(3), centre.y().rem_euclid(3)) {
            (1, 1) => Some(Self::Up),
            (2, 2) => Some(Self::Down),
            _ => None,
        }
    }

    /// Offsets from the centre to each vertex, indexed by [`Axis::index`].
    ///
    /// The vertex at index `a` lies opposite the tile's edge with normal axis `a`.
    pub const fn vertex_offsets(self) -> [Coordinates; 3] {
        match self {
            Self::Up => UP_OFFSETS,
            Self::Down => DOWN_OFFSETS,
        }
    }

    /// The other orientation; neighbours across any edge always differ.
    pub const fn invert(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// One turn in units of 60 degrees; a simple closed channel turns this many units in total.
pub const FULL_REVOLUTION: i32 = 6;

/// The turning contribution at `b` when walking `a -> b -> c` through adjacent centres.
///
/// Consecutive steps through the tiling always turn by 60 degrees: `+1` is counter-clockwise, `-1` clockwise.
/// Returns 0 only when the three points are collinear, which no walk between adjacent tiles produces.
pub fn turn(a: Coordinates, b: Coordinates, c: Coordinates) -> i32 {
    let d1 = b - a;
    let d2 = c - b;
    let det: Coord = d1.x() * d2.y() - d1.y() * d2.x();
    det.signum()
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::*;

    #[test]
    fn orientation_from_residue() {
        assert_eq!(Orientation::of(Coordinates::new(1, 1)), Some(Orientation::Up));
        assert_eq!(Orientation::of(Coordinates::new(-1, -1)), Some(Orientation::Down));
        assert_eq!(Orientation::of(Coordinates::new(-8, 1)), Some(Orientation::Up));
        assert_eq!(Orientation::of(Coordinates::new(0, 0)), None);
        assert_eq!(Orientation::of(Coordinates::new(1, 2)), None);
    }

    #[test]
    fn offsets_sum_to_zero() {
        for orientation in Orientation::VARIANTS {
            let sum = orientation.vertex_offsets().into_iter().fold(Coordinates::ORIGIN, |acc, o| acc + o);
            assert_eq!(sum, Coordinates::ORIGIN);
        }
    }

    #[test]
    fn axis_cycle() {
        assert_eq!(Axis::Z.next(), Axis::X);
        assert_eq!(Axis::Y.others(), [Axis::Z, Axis::X]);
        assert!(Axis::VARIANTS.iter().enumerate().all(|(i, axis)| axis.index() == i));
    }

    #[test]
    fn walking_around_a_vertex_turns_one_way() {
        // the six tiles around the origin, counter-clockwise
        let ring = [
            Coordinates::new(2, -1),
            Coordinates::new(1, 1),
            Coordinates::new(-1, 2),
            Coordinates::new(-2, 1),
            Coordinates::new(-1, -1),
            Coordinates::new(1, -2),
        ];
        let total: i32 = (0..ring.len())
            .map(|i| turn(ring[i], ring[(i + 1) % ring.len()], ring[(i + 2) % ring.len()]))
            .sum();
        assert_eq!(total, FULL_REVOLUTION);
    }
}
