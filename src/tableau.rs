use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::aisle::{Aisle, AisleId};
use crate::component::ComponentId;
use crate::coordinates::{Coordinates, EdgeKey};
use crate::edge::Edge;
use crate::grid::Grid;
use crate::resolution::{Resolution, Resolvable};
use crate::solver::{SolveOutcome, SolverConfig, SolverState};
use crate::thalweg::{LinkOutcome, Thalweg};
use crate::tile::Tile;

/// Resolutions of the three edges of one tile.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeTally {
    /// Edges resolved Channel.
    pub channel: usize,
    /// Edges resolved Empty.
    pub empty: usize,
    /// Edges still Unknown.
    pub unknown: usize,
}

/// The whole puzzle: frozen topology plus every resolution made so far.
///
/// A tableau is produced by [`TableauBuilder`](crate::builder::TableauBuilder); after that its tiles, edges, and aisles never change shape.
/// Only their resolutions, the running counters, and the [`Thalweg`] move, and only through
/// [`SolverState`](crate::solver::SolverState).
#[derive(Clone, Debug)]
pub struct Tableau {
    grid: Grid,
    tiles: BTreeMap<Coordinates, Tile>,
    edges: HashMap<EdgeKey, Edge>,
    // sorted, for deterministic iteration over edges
    edge_keys: Vec<EdgeKey>,
    aisles: [Vec<Aisle>; 3],
    counts: Vec<usize>,
    thalweg: Thalweg,
    resolved_channel_tile_count: usize,
    resolved_empty_tile_count: usize,
    unresolved_tile_count: usize,
}

impl Tableau {
    pub(crate) fn new(
        grid: Grid,
        tiles: BTreeMap<Coordinates, Tile>,
        edges: HashMap<EdgeKey, Edge>,
        aisles: [Vec<Aisle>; 3],
        counts: Vec<usize>,
    ) -> Self {
        let edge_keys = edges.keys().copied().sorted_by_key(|key| (key.0, key.1)).collect_vec();
        let channel_total = counts[..grid.aisle_count_per_axis()].iter().sum();

        Self {
            grid,
            unresolved_tile_count: tiles.len(),
            tiles,
            edges,
            edge_keys,
            aisles,
            counts,
            thalweg: Thalweg::new(channel_total),
            resolved_channel_tile_count: 0,
            resolved_empty_tile_count: 0,
        }
    }

    /// The underlying geometry.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The hints this tableau was built from.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of channel tiles in the solution.
    pub fn channel_total(&self) -> usize {
        self.thalweg.channel_total()
    }

    /// Channel connectivity so far.
    pub fn thalweg(&self) -> &Thalweg {
        &self.thalweg
    }

    /// The tile centred on `centre`, if it is in the grid.
    pub fn tile(&self, centre: Coordinates) -> Option<&Tile> {
        self.tiles.get(&centre)
    }

    /// Every tile, ordered by centre.
    pub fn tiles(&self) -> impl Iterator<Item=&Tile> {
        self.tiles.values()
    }

    /// The edge `key`, if it is in the grid.
    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(&key)
    }

    /// Every edge, ordered by key.
    pub fn edges(&self) -> impl Iterator<Item=&Edge> {
        self.edge_keys.iter().filter_map(|key| self.edges.get(key))
    }

    /// Edges on the outer boundary, in key order.
    pub fn border_edges(&self) -> impl Iterator<Item=&Edge> {
        self.edges().filter(|edge| edge.is_border())
    }

    /// The aisle `id`, if it is in the grid.
    pub fn aisle(&self, id: AisleId) -> Option<&Aisle> {
        self.aisles[id.axis.index()].get(id.index)
    }

    /// Every aisle: X aisles low to high, then Y, then Z.
    pub fn aisles(&self) -> impl Iterator<Item=&Aisle> {
        self.aisles.iter().flatten()
    }

    /// Every aisle id: X aisles low to high, then Y, then Z.
    pub fn aisle_ids(&self) -> impl Iterator<Item=AisleId> + '_ {
        self.aisles().map(Aisle::id)
    }

    /// Tiles resolved Channel so far.
    pub fn resolved_channel_tile_count(&self) -> usize {
        self.resolved_channel_tile_count
    }

    /// Tiles resolved Empty so far.
    pub fn resolved_empty_tile_count(&self) -> usize {
        self.resolved_empty_tile_count
    }

    /// Tiles still Unknown.
    pub fn unresolved_tile_count(&self) -> usize {
        self.unresolved_tile_count
    }

    /// The thalweg is complete and every aisle holds exactly its hinted number of channel tiles.
    pub fn is_solved(&self) -> bool {
        self.thalweg.is_solved()
            && self.aisles().all(|aisle| aisle.resolved_channel_tile_count() == aisle.channel_tile_count())
    }

    /// Solve with the default [`SolverConfig`], consuming this tableau and yielding it back as far as it could be solved.
    pub fn solve(self) -> (Self, SolveOutcome) {
        let mut state = SolverState::new(self, SolverConfig::default());
        let outcome = state.run();
        (state.into_tableau(), outcome)
    }

    /// The resolution of a tile, edge, or aisle; [`None`] for anything else or anything not in this tableau.
    pub fn resolution_of(&self, component: ComponentId) -> Option<Resolution> {
        match component {
            ComponentId::Tile(centre) => self.tile(centre).map(Tile::resolution),
            ComponentId::Edge(key) => self.edge(key).map(Edge::resolution),
            ComponentId::Aisle(id) => self.aisle(id).map(Aisle::resolution),
            ComponentId::Tableau | ComponentId::Thalweg => None,
        }
    }

    /// Shorthand for a tile's resolution, treating tiles outside the grid as Empty.
    pub fn tile_resolution(&self, centre: Coordinates) -> Resolution {
        self.tile(centre).map_or(Resolution::Empty, Tile::resolution)
    }

    /// The edge shared by two adjacent tiles.
    pub fn edge_between(&self, a: Coordinates, b: Coordinates) -> Option<EdgeKey> {
        self.tile(a)?.edges().into_iter()
            .find(|key| self.edge(*key).and_then(|edge| edge.other_tile(a)) == Some(b))
    }

    /// The tile across `key` from `centre`.
    pub fn neighbor(&self, centre: Coordinates, key: EdgeKey) -> Option<Coordinates> {
        self.edge(key)?.other_tile(centre)
    }

    /// How the edges of `centre` are resolved so far.
    pub fn edge_tally(&self, centre: Coordinates) -> EdgeTally {
        let mut tally = EdgeTally::default();
        let Some(tile) = self.tile(centre) else {
            return tally;
        };

        for key in tile.edges() {
            match self.edge(key).map_or(Resolution::Unknown, Edge::resolution) {
                Resolution::Unknown => tally.unknown += 1,
                Resolution::Channel => tally.channel += 1,
                Resolution::Empty => tally.empty += 1,
            }
        }

        tally
    }

    /// Recompute the flat hint array from the tiles currently resolved Channel.
    pub fn channel_counts(&self) -> Vec<usize> {
        let channel = self.tiles()
            .filter(|tile| tile.resolution().is_channel())
            .map(Tile::centre)
            .collect_vec();
        self.grid.counts_for_tiles(&channel)
    }

    /// Write-once resolution of a single tile, edge, or aisle, without any notification.
    pub(crate) fn resolve(&mut self, component: ComponentId, target: Resolution) -> bool {
        match component {
            ComponentId::Tile(centre) => self.tiles.get_mut(&centre).is_some_and(|tile| tile.try_resolve(target)),
            ComponentId::Edge(key) => self.edges.get_mut(&key).is_some_and(|edge| edge.try_resolve(target)),
            ComponentId::Aisle(id) => self.aisles[id.axis.index()].get_mut(id.index).is_some_and(|aisle| aisle.try_resolve(target)),
            ComponentId::Tableau | ComponentId::Thalweg => false,
        }
    }

    /// Update counters after `component` resolved.
    /// Returns the aisles which that resolution completed.
    pub(crate) fn notify_resolution(&mut self, component: ComponentId, resolution: Resolution) -> Vec<AisleId> {
        let ComponentId::Tile(centre) = component else {
            return vec![];
        };
        let Some(tile) = self.tiles.get(&centre) else {
            return vec![];
        };

        match resolution {
            Resolution::Unknown => unreachable!("tile {centre} resolved to Unknown"),
            Resolution::Channel => self.resolved_channel_tile_count += 1,
            Resolution::Empty => self.resolved_empty_tile_count += 1,
        }
        self.unresolved_tile_count -= 1;

        tile.aisles().into_iter()
            .filter(|id| self.aisles[id.axis.index()][id.index].notify_tile_resolution(resolution))
            .collect()
    }

    /// Link a Channel edge into the thalweg.
    pub(crate) fn link(&mut self, key: EdgeKey) -> Option<LinkOutcome> {
        let edge = self.edges.get(&key)?;
        Some(self.thalweg.try_link(edge))
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TableauBuilder;
    use crate::coordinates::edge_key;
    use crate::solver::{Reason, SolverState};

    use super::*;

    fn hexagon() -> Tableau {
        TableauBuilder::new(1).with_counts(&[1, 1, 0, 2, 2, 0]).build().unwrap()
    }

    #[test]
    fn counters_start_unresolved() {
        let tableau = hexagon();
        assert_eq!(tableau.unresolved_tile_count(), 6);
        assert_eq!(tableau.channel_total(), 2);
        assert_eq!(tableau.tiles().count(), 6);
        assert!(tableau.aisles().all(|aisle| aisle.tile_count() == 3));
        assert_eq!(tableau.channel_counts(), vec![0; 6]);
    }

    #[test]
    fn notification_updates_aisles() {
        let mut tableau = hexagon();
        let centre = Coordinates::new(1, 1);
        assert!(tableau.resolve(ComponentId::Tile(centre), Resolution::Channel));
        assert!(!tableau.resolve(ComponentId::Tile(centre), Resolution::Empty));
        assert!(tableau.notify_resolution(ComponentId::Tile(centre), Resolution::Channel).is_empty());

        assert_eq!(tableau.resolved_channel_tile_count(), 1);
        let aisle = tableau.aisle(tableau.tile(centre).unwrap().aisle_on(crate::shape::Axis::Z)).unwrap();
        assert_eq!(aisle.unresolved_channel_count(), 1);
        assert_eq!(aisle.unresolved_tile_count(), 2);
    }

    #[test]
    fn a_complete_thalweg_must_match_the_hints() {
        let config = SolverConfig::default().with_rules([]);
        let mut state = SolverState::new(hexagon(), config);
        let wrong_turn = state.tableau().edge_between(Coordinates::new(2, -1), Coordinates::new(1, 1)).unwrap();
        let edges = [
            wrong_turn,
            edge_key((3, -3).into(), (3, 0).into()),
            edge_key((0, 3).into(), (3, 0).into()),
        ];
        for key in edges {
            assert!(state.try_resolve(ComponentId::Edge(key), Resolution::Channel, Reason::Seed));
        }

        let tableau = state.tableau();
        assert!(tableau.thalweg().is_solved());
        assert!(!tableau.is_solved());
        assert_ne!(tableau.channel_counts(), tableau.counts());
    }

    #[test]
    fn adjacent_tiles_share_an_edge() {
        let tableau = hexagon();
        let (a, b) = (Coordinates::new(1, 1), Coordinates::new(-1, 2));
        let key = tableau.edge_between(a, b).unwrap();
        assert_eq!(tableau.neighbor(a, key), Some(b));
        assert_eq!(tableau.edge_between(a, Coordinates::new(-1, -1)), None);
        assert_eq!(tableau.edge_tally(a), EdgeTally { channel: 0, empty: 0, unknown: 3 });
        assert_eq!(tableau.tile_resolution(Coordinates::new(2, 2)), Resolution::Empty);
    }
}
