use itertools::Itertools;
use strum::VariantArray;

use crate::coordinates::{edge_key, Coord, Coordinates, EdgeKey};
use crate::error::BuildError;
use crate::shape::{Axis, Orientation};

/// Smallest supported hexagon side.
pub const MIN_SIZE: usize = 1;
/// Largest supported hexagon side.
pub const MAX_SIZE: usize = 8;

/// Descriptor of a hexagonal grid of side `size`, folded into `6 * size^2` triangular tiles.
///
/// All of the geometry is arithmetic on [`Coordinates`]; the grid owns no tiles itself.
/// Vertices lie within `|x|, |y|, |z| <= 3 * size` and tile centres strictly inside that bound.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Grid {
    size: usize,
}

impl Grid {
    /// # Errors
    /// [`BuildError::SizeOutOfRange`] unless `size` is within [`MIN_SIZE`]..=[`MAX_SIZE`].
    pub fn new(size: usize) -> Result<Self, BuildError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BuildError::SizeOutOfRange { size, min: MIN_SIZE, max: MAX_SIZE });
        }

        Ok(Self { size })
    }

    /// Hexagon side, in tiles.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The bound on any vertex component; border edges lie on the lines where one component equals `±extent`.
    #[inline]
    pub fn extent(&self) -> Coord {
        3 * self.size as Coord
    }

    /// `6n²` for size `n`.
    pub fn tile_count(&self) -> usize {
        6 * self.size * self.size
    }

    /// Number of distinct tile edges, border included.
    pub fn edge_count(&self) -> usize {
        9 * self.size * self.size + 3 * self.size
    }

    /// `6n` for size `n`.
    pub fn border_edge_count(&self) -> usize {
        6 * self.size
    }

    /// `2n` for size `n`.
    pub fn aisle_count_per_axis(&self) -> usize {
        2 * self.size
    }

    /// Length of the flat hint array: one count per aisle on every axis.
    pub fn count_array_len(&self) -> usize {
        Axis::VARIANTS.len() * self.aisle_count_per_axis()
    }

    /// Number of tiles in aisle `index` of any axis.
    pub fn aisle_tile_count(&self, index: usize) -> usize {
        // aisles widen by two tiles per step towards the middle, starting from 2n+1 at the margins
        let from_margin = index.min(self.aisle_count_per_axis() - 1 - index);
        2 * self.size + 1 + 2 * from_margin
    }

    /// Whether `centre` names a tile of this grid.
    pub fn contains_tile(&self, centre: Coordinates) -> bool {
        Orientation::of(centre).is_some() && centre.magnitude() < self.extent()
    }

    /// Whether `vertex` is a lattice point on or inside the hexagon.
    pub fn contains_vertex(&self, vertex: Coordinates) -> bool {
        Axis::VARIANTS.iter().all(|axis| vertex.get(*axis).rem_euclid(3) == 0) && vertex.magnitude() <= self.extent()
    }

    /// Every tile centre of the grid, ordered by `x` then `y`.
    pub fn tile_centres(&self) -> impl Iterator<Item=Coordinates> + '_ {
        let range = (1 - self.extent())..self.extent();
        range.clone()
            .cartesian_product(range)
            .map(Coordinates::from)
            .filter(|c| self.contains_tile(*c))
    }

    /// The three vertices of the tile centred on `centre`, indexed by the axis they jut out along.
    ///
    /// Returns [`None`] if `centre` is not a tile centre of any grid.
    pub fn vertices_of(centre: Coordinates) -> Option<[Coordinates; 3]> {
        let orientation = Orientation::of(centre)?;
        Some(orientation.vertex_offsets().map(|offset| centre + offset))
    }

    /// The centre of the tile across the edge of `centre` with normal `axis`.
    /// The result may lie outside the grid, in which case the edge is on the border.
    pub fn neighbor_across(centre: Coordinates, axis: Axis) -> Option<Coordinates> {
        let orientation = Orientation::of(centre)?;
        Some(centre - orientation.vertex_offsets()[axis.index()])
    }

    /// The key of the edge of `centre` with normal `axis`: the two vertices other than the one jutting out along `axis`.
    pub fn edge_of(centre: Coordinates, axis: Axis) -> Option<EdgeKey> {
        let vertices = Self::vertices_of(centre)?;
        let [a, b] = axis.others().map(|other| vertices[other.index()]);
        Some(edge_key(a, b))
    }

    /// Index of the aisle on `axis` containing the tile centred on `centre`, counted from the low side of the axis.
    pub fn aisle_index(&self, centre: Coordinates, axis: Axis) -> usize {
        (centre.get(axis).div_euclid(3) + self.size as Coord) as usize
    }

    /// The tile centre with the given three vertices, in any order, if they form a tile.
    pub fn tile_centre_of(&self, vertices: [Coordinates; 3]) -> Option<Coordinates> {
        let sum = vertices.iter().fold(Coordinates::ORIGIN, |acc, v| acc + *v);
        if sum.x() % 3 != 0 || sum.y() % 3 != 0 {
            return None;
        }

        let centre = Coordinates::new(sum.x() / 3, sum.y() / 3);
        let expected = Self::vertices_of(centre)?;
        let all_present = vertices.iter().all(|v| expected.contains(v));

        (all_present && self.contains_tile(centre)).then_some(centre)
    }

    /// Whether the segment between two vertices lies on the outer boundary of this grid.
    pub fn is_border(&self, a: Coordinates, b: Coordinates) -> bool {
        Axis::VARIANTS.iter()
            .any(|axis| a.get(*axis) == b.get(*axis) && a.get(*axis).abs() == self.extent())
    }

    /// The flat hint array (X aisles low to high, then Y, then Z) produced by treating `tiles` as the channel.
    ///
    /// Centres outside the grid are ignored.
    pub fn counts_for_tiles(&self, tiles: &[Coordinates]) -> Vec<usize> {
        let per_axis = self.aisle_count_per_axis();
        let mut counts = vec![0; self.count_array_len()];

        for centre in tiles.iter().filter(|c| self.contains_tile(**c)) {
            for axis in Axis::VARIANTS {
                counts[axis.index() * per_axis + self.aisle_index(*centre, *axis)] += 1;
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_bounded() {
        assert!(Grid::new(0).is_err());
        assert!(Grid::new(MAX_SIZE + 1).is_err());
        assert_eq!(Grid::new(3).map(|g| g.extent()), Ok(9));
    }

    #[test]
    fn tile_totals() {
        for size in MIN_SIZE..=4 {
            let grid = Grid::new(size).unwrap();
            assert_eq!(grid.tile_centres().count(), grid.tile_count());
            assert_eq!(
                (0..grid.aisle_count_per_axis()).map(|i| grid.aisle_tile_count(i)).sum::<usize>(),
                grid.tile_count()
            );
        }
    }

    #[test]
    fn size_one_hexagon() {
        let grid = Grid::new(1).unwrap();
        let centres = grid.tile_centres().collect_vec();
        assert_eq!(centres.len(), 6);
        assert!(centres.contains(&Coordinates::new(1, 1)));
        assert!(centres.contains(&Coordinates::new(-1, 2)));
        assert_eq!(grid.aisle_index(Coordinates::new(1, 1), Axis::Z), 0);
        assert_eq!(grid.aisle_index(Coordinates::new(-1, 2), Axis::X), 0);
    }

    #[test]
    fn neighbors_are_mutual() {
        let grid = Grid::new(2).unwrap();
        for centre in grid.tile_centres() {
            for axis in Axis::VARIANTS {
                let neighbor = Grid::neighbor_across(centre, *axis).unwrap();
                assert_eq!(Grid::neighbor_across(neighbor, *axis), Some(centre));
                assert_eq!(Grid::edge_of(neighbor, *axis), Grid::edge_of(centre, *axis));
            }
        }
    }

    #[test]
    fn border_edges_face_outside() {
        let grid = Grid::new(3).unwrap();
        let mut borders = 0;
        for centre in grid.tile_centres() {
            for axis in Axis::VARIANTS {
                let key = Grid::edge_of(centre, *axis).unwrap();
                let (a, b) = (key.0, key.1);
                let outside = !grid.contains_tile(Grid::neighbor_across(centre, *axis).unwrap());
                assert_eq!(grid.is_border(a, b), outside);
                borders += outside as usize;
            }
        }
        assert_eq!(borders, grid.border_edge_count());
    }

    #[test]
    fn centres_recovered_from_vertices() {
        let grid = Grid::new(2).unwrap();
        for centre in grid.tile_centres() {
            let mut vertices = Grid::vertices_of(centre).unwrap();
            vertices.reverse();
            assert!(vertices.iter().all(|v| grid.contains_vertex(*v)));
            assert_eq!(grid.tile_centre_of(vertices), Some(centre));
        }
        assert_eq!(grid.tile_centre_of([Coordinates::ORIGIN; 3]), None);
    }

    #[test]
    fn counts_of_a_known_channel() {
        let grid = Grid::new(1).unwrap();
        let counts = grid.counts_for_tiles(&[Coordinates::new(1, 1), Coordinates::new(-1, 2)]);
        assert_eq!(counts, vec![1, 1, 0, 2, 2, 0]);
    }
}
