use itertools::Itertools;

use crate::aisle::{Aisle, AisleId};
use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::Resolution;
use crate::rules::{aisles_in_scope, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::Tableau;

/// An aisle with two channel tiles left to place, crossed by two aisles that each force a channel tile into
/// a disjoint pair of its unresolved tiles, has its two channel tiles inside those pairs.
///
/// A crossing aisle with a single empty slot left can leave at most one of any two of its unresolved tiles empty.
pub struct AisleCountIntersectionRule;

impl AisleCountIntersectionRule {
    fn deduce(tableau: &Tableau, aisle: &Aisle) -> Vec<Decision> {
        if aisle.unresolved_channel_count() != 2 {
            return vec![];
        }

        let open = aisle.tiles().iter()
            .copied()
            .filter(|centre| tableau.tile_resolution(*centre).is_unknown())
            .collect_vec();

        // pairs of open tiles which share a crossing aisle that must take a channel tile from them
        let pairs: Vec<[Coordinates; 2]> = aisle.id().axis.others().into_iter()
            .flat_map(|axis| {
                open.iter()
                    .copied()
                    .into_group_map_by(|centre| tableau.grid().aisle_index(*centre, axis))
                    .into_iter()
                    .filter(move |(index, _)| {
                        tableau.aisle(AisleId::new(axis, *index)).is_some_and(|crossing| crossing.unresolved_empty_count() == 1)
                    })
                    .filter_map(|(_, group)| <[Coordinates; 2]>::try_from(group).ok())
            })
            .sorted()
            .collect();

        let Some((first, second)) = pairs.iter()
            .tuple_combinations()
            .find(|(first, second)| first.iter().all(|c| !second.contains(c)))
        else {
            return vec![];
        };

        open.iter()
            .filter(|centre| !first.contains(*centre) && !second.contains(*centre))
            .map(|centre| (ComponentId::Tile(*centre), Resolution::Empty))
            .collect()
    }
}

impl Rule for AisleCountIntersectionRule {
    fn kind(&self) -> RuleKind {
        RuleKind::AisleCountIntersection
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau, ComponentKind::Aisle, ComponentKind::Tile]
    }

    fn invoke(&self, state: &mut SolverState, component: ComponentId) {
        let tableau = state.tableau();
        let decisions: Vec<Decision> = aisles_in_scope(tableau, component).into_iter()
            .filter_map(|id| tableau.aisle(id))
            .flat_map(|aisle| Self::deduce(tableau, aisle))
            .collect();

        state.apply(decisions, Reason::AisleCountIntersection);
    }
}
