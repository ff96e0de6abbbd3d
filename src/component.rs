use std::fmt;

use strum::{Display, VariantArray};

use crate::aisle::AisleId;
use crate::coordinates::{Coordinates, EdgeKey};

/// The kinds of component a rule may be triggered by.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum ComponentKind {
    /// The whole tableau.
    Tableau,
    /// The connectivity of the channel.
    Thalweg,
    /// An aisle.
    Aisle,
    /// A tile.
    Tile,
    /// An edge.
    Edge,
}

/// A handle on one component of a [`Tableau`](crate::tableau::Tableau), or on the tableau or thalweg as a whole.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComponentId {
    /// The whole tableau.
    Tableau,
    /// The thalweg.
    Thalweg,
    /// An aisle, by its id.
    Aisle(AisleId),
    /// A tile, by its centre.
    Tile(Coordinates),
    /// An edge, by its end vertices.
    Edge(EdgeKey),
}

impl ComponentId {
    /// The kind rules register against.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Tableau => ComponentKind::Tableau,
            Self::Thalweg => ComponentKind::Thalweg,
            Self::Aisle(_) => ComponentKind::Aisle,
            Self::Tile(_) => ComponentKind::Tile,
            Self::Edge(_) => ComponentKind::Edge,
        }
    }
}

impl From<AisleId> for ComponentId {
    fn from(value: AisleId) -> Self {
        Self::Aisle(value)
    }
}

impl From<Coordinates> for ComponentId {
    fn from(value: Coordinates) -> Self {
        Self::Tile(value)
    }
}

impl From<EdgeKey> for ComponentId {
    fn from(value: EdgeKey) -> Self {
        Self::Edge(value)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tableau => write!(f, "tableau"),
            Self::Thalweg => write!(f, "thalweg"),
            Self::Aisle(id) => write!(f, "aisle {id}"),
            Self::Tile(centre) => write!(f, "tile {centre}"),
            Self::Edge(key) => write!(f, "edge {}-{}", key.0, key.1),
        }
    }
}
