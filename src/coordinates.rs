use std::fmt::{Display, Formatter};
use std::ops::{Add, Neg, Sub};

use unordered_pair::UnorderedPair;

use crate::error::BuildError;
use crate::shape::Axis;

pub(crate) type Coord = i32;

/// Cube coordinates `(x, y, z)` with `x + y + z = 0` on the triangle lattice, scaled by 3 so that tile centres are integral.
///
/// Only `x` and `y` are stored; `z` is derived, so equality and hashing ignore it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Coordinates {
    x: Coord,
    y: Coord,
}

/// Key of an [`Edge`](crate::edge::Edge): the unordered pair of its end vertices.
pub type EdgeKey = UnorderedPair<Coordinates>;

impl Coordinates {
    /// The lattice vertex at the centre of the grid.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// From `x` and `y`; `z` follows.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Build from a full triple, rejecting triples that are off the `x + y + z = 0` plane.
    pub fn try_new(x: Coord, y: Coord, z: Coord) -> Result<Self, BuildError> {
        if x + y + z != 0 {
            return Err(BuildError::MalformedCoordinates { x, y, z });
        }

        Ok(Self { x, y })
    }

    /// Scaled x coordinate.
    pub const fn x(&self) -> Coord {
        self.x
    }

    /// Scaled y coordinate.
    pub const fn y(&self) -> Coord {
        self.y
    }

    /// Derived as `-x - y`.
    pub const fn z(&self) -> Coord {
        -self.x - self.y
    }

    /// The component along `axis`.
    pub const fn get(&self, axis: Axis) -> Coord {
        match axis {
            Axis::X => self.x(),
            Axis::Y => self.y(),
            Axis::Z => self.z(),
        }
    }

    /// Largest absolute component, i.e. the hexagonal distance from the origin.
    pub fn magnitude(&self) -> Coord {
        self.x.abs().max(self.y.abs()).max(self.z().abs())
    }
}

/// Build the canonical key for the edge between two vertices; the lower coordinate is stored first.
pub fn edge_key(a: Coordinates, b: Coordinates) -> EdgeKey {
    if a <= b {
        UnorderedPair(a, b)
    } else {
        UnorderedPair(b, a)
    }
}

impl Add for Coordinates {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coordinates {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coordinates {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(Coord, Coord)> for Coordinates {
    fn from(value: (Coord, Coord)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_is_derived() {
        let c = Coordinates::new(4, -5);
        assert_eq!(c.z(), 1);
        assert_eq!(c.get(Axis::Z), 1);
        assert_eq!(c.magnitude(), 5);
    }

    #[test]
    fn rejects_off_plane_triples() {
        assert_eq!(Coordinates::try_new(1, 1, -2), Ok(Coordinates::new(1, 1)));
        assert_eq!(
            Coordinates::try_new(1, 1, 1),
            Err(BuildError::MalformedCoordinates { x: 1, y: 1, z: 1 })
        );
    }

    #[test]
    fn edge_keys_ignore_vertex_order() {
        let a = Coordinates::new(6, -9);
        let b = Coordinates::new(9, -9);
        assert_eq!(edge_key(a, b), edge_key(b, a));
        assert_eq!(edge_key(b, a).0, a);
    }
}
