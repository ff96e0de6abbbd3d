use tracing::warn;

use crate::aisle::Aisle;
use crate::component::{ComponentId, ComponentKind};
use crate::resolution::Resolution;
use crate::rules::{aisles_in_scope, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::Tableau;

/// Once an aisle has found all of its channel tiles, the rest are empty; once it has found all of its empty tiles,
/// the rest are channel.
pub struct AisleCountRule;

impl AisleCountRule {
    fn deduce(tableau: &Tableau, aisle: &Aisle) -> Vec<Decision> {
        if aisle.unresolved_tile_count() == 0 {
            return vec![];
        }

        if aisle.is_overfull() {
            warn!(aisle = %aisle.id(), hint = aisle.channel_tile_count(), "aisle resolutions contradict its hint");
            return vec![];
        }

        let target = if aisle.unresolved_channel_count() == 0 {
            Resolution::Empty
        } else if aisle.unresolved_empty_count() == 0 {
            Resolution::Channel
        } else {
            return vec![];
        };

        aisle.tiles().iter()
            .filter(|centre| tableau.tile_resolution(**centre).is_unknown())
            .map(|centre| (ComponentId::Tile(*centre), target))
            .collect()
    }
}

impl Rule for AisleCountRule {
    fn kind(&self) -> RuleKind {
        RuleKind::AisleCount
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

        state.apply(decisions, Reason::AisleCount);
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TableauBuilder;
    use crate::coordinates::Coordinates;
    use crate::solver::SolverConfig;

    use super::*;

    #[test]
    fn zero_hint_empties_the_aisle() {
        let tableau = TableauBuilder::new(1).with_counts(&[1, 1, 0, 2, 2, 0]).build().unwrap();
        let mut state = SolverState::new(tableau, SolverConfig::default());

        // Y0 holds (2,-1), (1,-2), and (-1,-1) and wants no channel
        let resolved = state.invoke_rule(RuleKind::AisleCount, ComponentId::Tile(Coordinates::new(1, -2)));
        assert!(resolved >= 3);
        for centre in [(2, -1), (1, -2), (-1, -1)] {
            assert_eq!(state.tableau().tile_resolution(centre.into()), Resolution::Empty);
        }
        assert!(state.resolutions_by(Reason::AisleCount).all(|r| matches!(r.component(), ComponentId::Tile(_))));
    }

    #[test]
    fn full_hint_fills_the_aisle() {
        let tableau = TableauBuilder::new(1).with_counts(&[3, 3, 3, 3, 3, 3]).build().unwrap();
        let mut state = SolverState::new(tableau, SolverConfig::default());
        state.invoke_rule(RuleKind::AisleCount, ComponentId::Tableau);
        assert_eq!(state.tableau().resolved_channel_tile_count(), 6);
    }

    #[test]
    fn open_aisles_are_left_alone() {
        let tableau = TableauBuilder::new(2).with_counts(&[1, 2, 2, 1, 1, 2, 2, 1, 1, 2, 2, 1]).build().unwrap();
        let mut state = SolverState::new(tableau, SolverConfig::default());
        assert_eq!(state.invoke_rule(RuleKind::AisleCount, ComponentId::Tableau), 0);
    }
}
