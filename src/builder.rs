use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::aisle::{Aisle, AisleId};
use crate::coordinates::{Coordinates, EdgeKey};
use crate::edge::Edge;
use crate::error::BuildError;
use crate::grid::Grid;
use crate::shape::{Axis, Orientation};
use crate::tableau::Tableau;
use crate::tile::Tile;

/// Builds a [`Tableau`] from a grid size and the flat array of aisle hints.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Nothing is checked until [`Self::build`], so setters may be chained in any order.
#[derive(Clone, Debug)]
pub struct TableauBuilder {
    size: usize,
    counts: Option<Vec<usize>>,
}

impl Default for TableauBuilder {
    fn default() -> Self {
        Self::new(3)
    }
}

// an edge while its adjacent tiles are still being discovered
#[derive(Default)]
struct PendingEdge {
    normal: Option<Axis>,
    minus: Option<Coordinates>,
    plus: Option<Coordinates>,
    outside: Option<Coordinates>,
}

impl TableauBuilder {
    /// Start building a grid with hexagon side `size`.
    pub fn new(size: usize) -> Self {
        Self { size, counts: None }
    }

    /// Replace the size given at construction.
    pub fn with_size(&mut self, size: usize) -> &mut Self {
        self.size = size;
        self
    }

    /// Set the aisle hints: every X aisle from low to high, then every Y aisle, then every Z aisle.
    pub fn with_counts(&mut self, counts: &[usize]) -> &mut Self {
        self.counts = Some(counts.to_vec());
        self
    }

    /// The hexagon side this builder will use.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check the size and the hints against each other, returning the grid they describe.
    pub fn check(&self) -> Result<Grid, BuildError> {
        let grid = Grid::new(self.size)?;
        let counts = self.counts.as_deref().ok_or(BuildError::MissingCounts)?;

        if counts.len() != grid.count_array_len() {
            return Err(BuildError::CountLength { expected: grid.count_array_len(), actual: counts.len() });
        }

        let per_axis = grid.aisle_count_per_axis();
        let sums = counts.chunks(per_axis).map(|chunk| chunk.iter().sum::<usize>()).collect_vec();
        if !sums.iter().all_equal() {
            return Err(BuildError::AxisSumMismatch { x: sums[0], y: sums[1], z: sums[2] });
        }

        for (axis, chunk) in Axis::ALL.into_iter().zip(counts.chunks(per_axis)) {
            for (index, count) in chunk.iter().copied().enumerate() {
                let tile_count = grid.aisle_tile_count(index);
                if count > tile_count {
                    return Err(BuildError::CountOutOfRange { axis, index, count, tile_count });
                }
            }
        }

        Ok(grid)
    }

    /// Whether [`Self::build`] would succeed.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Lay out every tile, edge, and aisle of the grid and freeze them into a [`Tableau`].
    pub fn build(&self) -> Result<Tableau, BuildError> {
        let grid = self.check()?;
        let counts = self.counts.clone().ok_or(BuildError::MissingCounts)?;
        let per_axis = grid.aisle_count_per_axis();

        let mut pending: HashMap<EdgeKey, PendingEdge> = HashMap::with_capacity(grid.edge_count());
        let mut members: [Vec<Vec<Coordinates>>; 3] = std::array::from_fn(|_| vec![vec![]; per_axis]);
        let mut tiles = BTreeMap::new();

        for centre in grid.tile_centres() {
            let (Some(orientation), Some(vertices)) = (Orientation::of(centre), Grid::vertices_of(centre)) else {
                unreachable!("grid produced {centre}, which is not a tile centre")
            };

            let edges = Axis::ALL.map(|axis| {
                let (Some(key), Some(neighbor)) = (Grid::edge_of(centre, axis), Grid::neighbor_across(centre, axis)) else {
                    unreachable!("tile {centre} has no edge on {axis}")
                };

                let edge = pending.entry(key).or_default();
                edge.normal = Some(axis);
                if neighbor.get(axis) < centre.get(axis) {
                    edge.plus = Some(centre);
                } else {
                    edge.minus = Some(centre);
                }
                if !grid.contains_tile(neighbor) {
                    edge.outside = Some(neighbor);
                }

                key
            });

            let aisles = Axis::ALL.map(|axis| AisleId::new(axis, grid.aisle_index(centre, axis)));
            for aisle in aisles {
                members[aisle.axis.index()][aisle.index].push(centre);
            }

            tiles.insert(centre, Tile::new(centre, orientation, vertices, edges, aisles));
        }

        let edges: HashMap<EdgeKey, Edge> = pending.into_iter()
            .map(|(key, edge)| {
                let normal = edge.normal.unwrap_or_else(|| unreachable!("edge {key:?} was never attached to a tile"));
                (key, Edge::new(key, normal, edge.minus, edge.plus, edge.outside))
            })
            .collect();

        let aisles = Axis::ALL.map(|axis| {
            members[axis.index()].iter()
                .enumerate()
                .map(|(index, centres)| {
                    let sorted = centres.iter().copied().sorted_by_key(|c| c.get(axis.next())).collect_vec();
                    let margin = index == 0 || index + 1 == per_axis;
                    Aisle::new(AisleId::new(axis, index), sorted, counts[axis.index() * per_axis + index], margin)
                })
                .collect_vec()
        });

        Ok(Tableau::new(grid, tiles, edges, aisles, counts))
    }
}
