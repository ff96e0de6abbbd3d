use itertools::Itertools;
use tracing::warn;

use crate::component::{ComponentId, ComponentKind};
use crate::resolution::{Resolution, Resolvable};
use crate::rules::{withhold_extra_exits, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::tableau::Tableau;

/// The channel leaves the grid exactly twice.
///
/// Once both exits are known every other border edge is Empty. Before that, a border edge can only still be an exit
/// if the tile inside it is not Empty and has not already used both of its channel edges; when exactly enough such
/// edges remain, they are all exits.
pub struct ExitCountRule;

pub(crate) const EXIT_COUNT: usize = 2;

impl ExitCountRule {
    fn deduce(tableau: &Tableau) -> Vec<Decision> {
        let exits = tableau.thalweg().exits().len();
        let unknown = tableau.border_edges()
            .filter(|edge| edge.resolution().is_unknown())
            .collect_vec();

        if exits >= EXIT_COUNT {
            return unknown.into_iter()
                .map(|edge| (ComponentId::Edge(edge.key()), Resolution::Empty))
                .collect();
        }

        let candidates = unknown.into_iter()
            .filter(|edge| edge.inside().is_some_and(|inside| {
                !tableau.tile_resolution(inside).is_empty() && tableau.edge_tally(inside).channel < 2
            }))
            .collect_vec();

        match (exits + candidates.len()).cmp(&EXIT_COUNT) {
            std::cmp::Ordering::Equal => candidates.into_iter()
                .map(|edge| (ComponentId::Edge(edge.key()), Resolution::Channel))
                .collect(),
            std::cmp::Ordering::Less => {
                warn!(exits, candidates = candidates.len(), "too few border edges left for the channel to leave");
                vec![]
            }
            std::cmp::Ordering::Greater => vec![],
        }
    }
}

impl Rule for ExitCountRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ExitCount
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau]
    }

    fn invoke(&self, state: &mut SolverState, _component: ComponentId) {
        let tableau = state.tableau();
        let decisions = withhold_extra_exits(tableau, Self::deduce(tableau));
        state.apply(decisions, Reason::ExitCount);
    }
}
