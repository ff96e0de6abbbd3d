use tracing::warn;

use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::{Resolution, Resolvable};
use crate::rules::{tiles_in_scope, unknown_edges_of, withhold_extra_exits, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::{EdgeTally, Tableau};

/// Relates a tile to its three edges: a channel tile has exactly two channel edges, any other tile has none.
pub struct TileEdgeRule;

impl TileEdgeRule {
    fn deduce(tableau: &Tableau, centre: Coordinates) -> Vec<Decision> {
        let Some(tile) = tableau.tile(centre) else {
            return vec![];
        };
        let tile_id = ComponentId::Tile(centre);
        let tally = tableau.edge_tally(centre);

        if tile.resolution().is_channel() && tally.empty >= 2 {
            warn!(tile = %centre, ?tally, "channel tile cannot reach two channel edges");
            return vec![];
        }

        match tally {
            // entered and left; the last edge is unused
            EdgeTally { channel: 2, empty: 0, unknown: 1 } => {
                let mut decisions = unknown_edges_of(tableau, centre, Resolution::Empty);
                decisions.push((tile_id, Resolution::Channel));
                decisions
            }
            // entered, and one way is shut
            EdgeTally { channel: 1, empty: 1, unknown: 1 } => {
                let mut decisions = unknown_edges_of(tableau, centre, Resolution::Channel);
                decisions.push((tile_id, Resolution::Channel));
                decisions
            }
            EdgeTally { channel: 1, empty: 0, unknown: 2 } => vec![(tile_id, Resolution::Channel)],
            EdgeTally { channel: 0, empty: 3, unknown: 0 } | EdgeTally { channel: 0, empty: 2, unknown: 1 } => {
                vec![(tile_id, Resolution::Empty)]
            }
            EdgeTally { channel: 3, .. } | EdgeTally { channel: 1, empty: 2, .. } => {
                warn!(tile = %centre, ?tally, "tile edges contradict the channel");
                vec![]
            }
            _ => vec![],
        }
    }
}

impl Rule for TileEdgeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::TileEdge
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau, ComponentKind::Tile, ComponentKind::Edge]
    }

    fn invoke(&self, state: &mut SolverState, component: ComponentId) {
        let tableau = state.tableau();
        let mut decisions = vec![];

        // an edge beside an empty tile carries nothing
        if let ComponentId::Edge(key) = component {
            let beside_empty = tableau.edge(key)
                .is_some_and(|edge| edge.tiles().any(|centre| tableau.tile_resolution(centre).is_empty()));
            if beside_empty {
                decisions.push((component, Resolution::Empty));
            }
        }

        for centre in tiles_in_scope(tableau, component) {
            decisions.extend(Self::deduce(tableau, centre));
        }

        let decisions = withhold_extra_exits(tableau, decisions);
        state.apply(decisions, Reason::TileEdge);
    }
}
