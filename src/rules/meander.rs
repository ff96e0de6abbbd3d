use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::Resolution;
use crate::rules::{tiles_in_scope, unknown_edges_of, withhold_extra_exits, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::Tableau;

/// A channel tile with one closed edge must use both of the others.
pub struct MeanderRule;

impl MeanderRule {
    fn deduce(tableau: &Tableau, centre: Coordinates) -> Vec<Decision> {
        if !tableau.tile_resolution(centre).is_channel() || tableau.edge_tally(centre).empty != 1 {
            return vec![];
        }

        unknown_edges_of(tableau, centre, Resolution::Channel)
    }
}

impl Rule for MeanderRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Meander
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau, ComponentKind::Tile, ComponentKind::Edge]
    }

    fn invoke(&self, state: &mut SolverState, component: ComponentId) {
        let tableau = state.tableau();
        let decisions: Vec<Decision> = tiles_in_scope(tableau, component).into_iter()
            .flat_map(|centre| Self::deduce(tableau, centre))
            .collect();

        let decisions = withhold_extra_exits(tableau, decisions);
        state.apply(decisions, Reason::Meander);
    }
}
