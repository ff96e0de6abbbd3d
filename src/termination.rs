use crate::coordinates::{Coordinates, EdgeKey};

/// One end of the channel, just outside the grid beyond the border edge it leaves through.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Termination {
    coordinates: Coordinates,
    edge: EdgeKey,
}

impl Termination {
    pub(crate) fn new(coordinates: Coordinates, edge: EdgeKey) -> Self {
        Self { coordinates, edge }
    }

    /// The centre a tile across the exit edge would have.
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// The border edge the channel leaves through.
    pub fn edge(&self) -> EdgeKey {
        self.edge
    }
}
