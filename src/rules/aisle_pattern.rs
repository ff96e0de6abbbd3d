use std::collections::HashMap;

use itertools::Itertools;
use tracing::{trace, warn};

use crate::aisle::Aisle;
use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::{Resolution, Resolvable};
use crate::rules::{aisles_in_scope, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::Tableau;

/// Enumerates every way of placing an aisle's remaining channel tiles among its unresolved tiles, discards placements
/// that strand a channel tile, and resolves whatever all surviving placements agree on.
///
/// A placement strands a channel tile when fewer than two of its edges could still carry the channel: an edge is
/// ruled out if it is Empty, or if it leads to another tile of the same aisle which the placement leaves empty, or to
/// an Empty tile of another aisle.
pub struct AisleResolutionPatternRule;

/// `n` choose `k`, saturating.
pub(crate) fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }

    let k = k.min(n - k) as u64;
    let n = n as u64;
    (0..k).fold(1u64, |acc, i| acc.saturating_mul(n - i) / (i + 1))
}

impl AisleResolutionPatternRule {
    fn deduce(tableau: &Tableau, aisle: &Aisle, pattern_limit: usize) -> Vec<Decision> {
        let tiles = aisle.tiles();
        let open = tiles.iter()
            .enumerate()
            .filter(|(_, centre)| tableau.tile_resolution(**centre).is_unknown())
            .map(|(i, _)| i)
            .collect_vec();
        if open.is_empty() || aisle.is_overfull() {
            return vec![];
        }

        let needed = aisle.unresolved_channel_count();
        let patterns = binomial(open.len(), needed);
        if patterns > pattern_limit as u64 {
            trace!(aisle = %aisle.id(), patterns, "too many patterns to enumerate");
            return vec![];
        }

        let position: HashMap<Coordinates, usize> = tiles.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        let base = tiles.iter().map(|c| tableau.tile_resolution(*c).is_channel()).collect_vec();

        // tiles channel in every surviving pattern, and tiles empty in every surviving pattern
        let mut always_channel: Option<Vec<bool>> = None;
        let mut always_empty: Option<Vec<bool>> = None;

        for chosen in open.iter().combinations(needed) {
            let mut pattern = base.clone();
            for i in chosen {
                pattern[*i] = true;
            }

            if !Self::is_feasible(tableau, tiles, &position, &pattern) {
                continue;
            }

            match (&mut always_channel, &mut always_empty) {
                (Some(channel), Some(empty)) => {
                    for (i, is_channel) in pattern.iter().enumerate() {
                        channel[i] &= *is_channel;
                        empty[i] &= !*is_channel;
                    }
                }
                _ => {
                    always_empty = Some(pattern.iter().map(|c| !c).collect());
                    always_channel = Some(pattern);
                }
            }
        }

        let (Some(channel), Some(empty)) = (always_channel, always_empty) else {
            warn!(aisle = %aisle.id(), "no placement of channel tiles fits this aisle");
            return vec![];
        };

        open.into_iter()
            .filter_map(|i| {
                let target = if channel[i] {
                    Resolution::Channel
                } else if empty[i] {
                    Resolution::Empty
                } else {
                    return None;
                };
                Some((ComponentId::Tile(tiles[i]), target))
            })
            .collect()
    }

    fn is_feasible(tableau: &Tableau, tiles: &[Coordinates], position: &HashMap<Coordinates, usize>, pattern: &[bool]) -> bool {
        tiles.iter()
            .zip(pattern)
            .filter(|(_, is_channel)| **is_channel)
            .all(|(centre, _)| Self::open_edge_count(tableau, *centre, position, pattern) >= 2)
    }

    fn open_edge_count(tableau: &Tableau, centre: Coordinates, position: &HashMap<Coordinates, usize>, pattern: &[bool]) -> usize {
        let Some(tile) = tableau.tile(centre) else {
            return 0;
        };

        tile.edges().into_iter()
            .filter_map(|key| tableau.edge(key))
            .filter(|edge| !edge.resolution().is_empty())
            .filter(|edge| match edge.other_tile(centre) {
                None => true,
                Some(neighbor) => match position.get(&neighbor) {
                    Some(i) => pattern[*i],
                    None => !tableau.tile_resolution(neighbor).is_empty(),
                },
            })
            .count()
    }
}

impl Rule for AisleResolutionPatternRule {
    fn kind(&self) -> RuleKind {
        RuleKind::AisleResolutionPattern
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau, ComponentKind::Aisle, ComponentKind::Tile]
    }

    fn invoke(&self, state: &mut SolverState, component: ComponentId) {
        let tableau = state.tableau();
        let limit = state.config().pattern_limit;
        let decisions: Vec<Decision> = aisles_in_scope(tableau, component).into_iter()
            .filter_map(|id| tableau.aisle(id))
            .flat_map(|aisle| Self::deduce(tableau, aisle, limit))
            .collect();

        state.apply(decisions, Reason::AisleResolutionPattern);
    }
}
