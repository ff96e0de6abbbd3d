use crate::coordinates::{Coordinates, EdgeKey};
use crate::resolution::{Resolution, Resolvable};
use crate::shape::Axis;

/// The side shared by two tiles, or a side of one tile on the outer boundary.
///
/// `minus` and `plus` are the adjacent tile centres ordered by their coordinate on the normal axis, `minus` being lower.
/// A border edge has exactly one of them; `outside` then holds the centre the missing tile would have.
#[derive(Clone, Debug)]
pub struct Edge {
    key: EdgeKey,
    normal: Axis,
    minus: Option<Coordinates>,
    plus: Option<Coordinates>,
    outside: Option<Coordinates>,
    resolution: Resolution,
}

impl Edge {
    pub(crate) fn new(key: EdgeKey, normal: Axis, minus: Option<Coordinates>, plus: Option<Coordinates>, outside: Option<Coordinates>) -> Self {
        Self { key, normal, minus, plus, outside, resolution: Resolution::Unknown }
    }

    /// The unordered pair of end vertices.
    pub fn key(&self) -> EdgeKey {
        self.key
    }

    /// The axis along which the two adjacent centres differ.
    pub fn normal(&self) -> Axis {
        self.normal
    }

    /// The adjacent centre lower on the normal axis.
    pub fn minus(&self) -> Option<Coordinates> {
        self.minus
    }

    /// The adjacent centre higher on the normal axis.
    pub fn plus(&self) -> Option<Coordinates> {
        self.plus
    }

    /// Whether this edge lies on the outer boundary of the grid.
    pub fn is_border(&self) -> bool {
        self.minus.is_none() || self.plus.is_none()
    }

    /// Adjacent tile centres, `minus` first.
    pub fn tiles(&self) -> impl Iterator<Item=Coordinates> {
        self.minus.into_iter().chain(self.plus)
    }

    /// The single adjacent tile of a border edge.
    pub fn inside(&self) -> Option<Coordinates> {
        if self.is_border() { self.minus.or(self.plus) } else { None }
    }

    /// For a border edge, the centre of the tile that would lie across it outside the grid.
    pub fn outside(&self) -> Option<Coordinates> {
        self.outside
    }

    /// The tile across this edge from `centre`, if `centre` is adjacent and the edge is interior.
    pub fn other_tile(&self, centre: Coordinates) -> Option<Coordinates> {
        match (self.minus, self.plus) {
            (Some(minus), Some(plus)) if minus == centre => Some(plus),
            (Some(minus), Some(plus)) if plus == centre => Some(minus),
            _ => None,
        }
    }

    /// Whether the channel leaves the grid here: [`None`] while a border edge is unresolved, `Some(false)` for any interior edge.
    pub fn is_exit(&self) -> Option<bool> {
        if !self.is_border() {
            return Some(false);
        }

        match self.resolution {
            Resolution::Unknown => None,
            Resolution::Channel => Some(true),
            Resolution::Empty => Some(false),
        }
    }
}

impl Resolvable for Edge {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn resolution_mut(&mut self) -> &mut Resolution {
        &mut self.resolution
    }
}
