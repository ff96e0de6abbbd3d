use crate::aisle::AisleId;
use crate::coordinates::{Coordinates, EdgeKey};
use crate::resolution::{Resolution, Resolvable};
use crate::shape::{Axis, Orientation};

/// One triangle of the tiling.
///
/// Arrays here are indexed by [`Axis::index`]: `vertices[a]` juts out along `a`, `edges[a]` has normal `a`, and
/// `aisles[a]` is the aisle on axis `a` holding this tile.
#[derive(Clone, Debug)]
pub struct Tile {
    centre: Coordinates,
    orientation: Orientation,
    vertices: [Coordinates; 3],
    edges: [EdgeKey; 3],
    aisles: [AisleId; 3],
    resolution: Resolution,
}

impl Tile {
    pub(crate) fn new(
        centre: Coordinates,
        orientation: Orientation,
        vertices: [Coordinates; 3],
        edges: [EdgeKey; 3],
        aisles: [AisleId; 3],
    ) -> Self {
        Self { centre, orientation, vertices, edges, aisles, resolution: Resolution::Unknown }
    }

    /// Centre coordinates, which identify the tile.
    pub fn centre(&self) -> Coordinates {
        self.centre
    }

    /// Up or Down, from the centre's residue.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Corner vertices in the orientation's template order.
    pub fn vertices(&self) -> [Coordinates; 3] {
        self.vertices
    }

    /// The three edges, one per axis.
    pub fn edges(&self) -> [EdgeKey; 3] {
        self.edges
    }

    /// The edge of this tile whose normal is `axis`.
    pub fn edge_on(&self, axis: Axis) -> EdgeKey {
        self.edges[axis.index()]
    }

    /// The three aisles holding this tile, one per axis.
    pub fn aisles(&self) -> [AisleId; 3] {
        self.aisles
    }

    /// The aisle on `axis` holding this tile.
    pub fn aisle_on(&self, axis: Axis) -> AisleId {
        self.aisles[axis.index()]
    }
}

impl Resolvable for Tile {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn resolution_mut(&mut self) -> &mut Resolution {
        &mut self.resolution
    }
}
