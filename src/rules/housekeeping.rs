use itertools::Itertools;

use crate::component::ComponentId;
use crate::resolution::Resolution;
use crate::rules::unknown_edges_of;
use crate::solver::{Reason, SolverState};

/// Bookkeeping which follows directly from a single resolution.
///
/// An Empty tile takes its edges with it, and a Channel edge makes both of its tiles Channel and is linked into the
/// thalweg. Unlike the other rules this is never scheduled: [`SolverState`] runs it inside every notification.
pub struct HousekeepingRule;

impl HousekeepingRule {
    /// # Panics
    /// If an edge resolves Channel beside an Empty tile.
    pub(crate) fn tidy(state: &mut SolverState, component: ComponentId, resolution: Resolution) {
        match (component, resolution) {
            (ComponentId::Tile(centre), Resolution::Empty) => {
                let decisions = unknown_edges_of(state.tableau(), centre, Resolution::Empty);
                state.apply(decisions, Reason::Housekeeping);
            }
            (ComponentId::Edge(key), Resolution::Channel) => {
                let tableau = state.tableau();
                let Some(edge) = tableau.edge(key) else {
                    return;
                };
                let tiles = edge.tiles().collect_vec();
                if let Some(empty) = tiles.iter().find(|centre| tableau.tile_resolution(**centre).is_empty()) {
                    panic!("edge {key:?} carries the channel into empty tile {empty}");
                }

                let decisions = tiles.into_iter()
                    .map(|centre| (ComponentId::Tile(centre), Resolution::Channel))
                    .collect_vec();
                state.apply(decisions, Reason::Housekeeping);
                state.link(key);
            }
            _ => {}
        }
    }
}
