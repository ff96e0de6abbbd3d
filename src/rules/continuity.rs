use tracing::{trace, warn};

use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::{Resolution, Resolvable};
use crate::rules::{withhold_extra_exits, Decision, Rule, RuleKind};
use crate::solver::{Reason, SolverState};
use crate::shape::FULL_REVOLUTION;
use crate::tableau::Tableau;
use crate::thalweg::Segment;

/// Keeps the thalweg a single simple path.
///
/// Looks at every unresolved edge leaving an open end of a segment:
/// * an edge back into the same segment would close a loop, so it is Empty;
/// * an edge into another segment is Empty if the joined segment would hold more tiles than the channel has; if
///   both segments already reach the border, the join is exactly the whole channel or nothing;
/// * an edge to an unlinked tile is Empty once the segment holds every channel tile;
/// * the border edge at the free end of a half-terminated segment is Channel exactly when the segment is complete.
pub struct ChannelContinuityRule;

impl ChannelContinuityRule {
    fn deduce(tableau: &Tableau) -> Vec<Decision> {
        let thalweg = tableau.thalweg();
        let total = thalweg.channel_total();
        let mut decisions = vec![];

        for segment in thalweg.segments() {
            if segment.termination_count() == 2 {
                if segment.tile_count() < total {
                    warn!(segment = %segment.id(), tiles = segment.tile_count(), total, "channel reaches both exits too early");
                }
                continue;
            }

            for end in segment.open_ends() {
                decisions.extend(Self::deduce_at(tableau, segment, end, total));
            }
        }

        decisions
    }

    fn deduce_at(tableau: &Tableau, segment: &Segment, end: Coordinates, total: usize) -> Vec<Decision> {
        let thalweg = tableau.thalweg();
        let Some(tile) = tableau.tile(end) else {
            return vec![];
        };

        tile.edges().into_iter()
            .filter_map(|key| tableau.edge(key))
            .filter(|edge| edge.resolution().is_unknown())
            .filter_map(|edge| {
                let component = ComponentId::Edge(edge.key());

                let Some(neighbor) = edge.other_tile(end) else {
                    // the border: only a half-terminated segment knows enough
                    if segment.termination_count() != 1 {
                        return None;
                    }
                    let target = if segment.tile_count() == total { Resolution::Channel } else { Resolution::Empty };
                    return Some((component, target));
                };

                let Some(other) = thalweg.segment_of(neighbor) else {
                    return (segment.tile_count() >= total).then_some((component, Resolution::Empty));
                };

                if other.id() == segment.id() {
                    let joins_ends = segment.termination_count() == 0
                        && (segment.first().coordinates() == neighbor || segment.last().coordinates() == neighbor);
                    if joins_ends {
                        let rotation = segment.closing_rotation();
                        debug_assert_eq!(rotation.map(i32::abs), Some(FULL_REVOLUTION), "segment {} closes without a full turn", segment.id());
                        trace!(segment = %segment.id(), ?rotation, "refusing to close a loop");
                    }
                    return Some((component, Resolution::Empty));
                }

                if !other.open_ends().contains(&neighbor) {
                    return Some((component, Resolution::Empty));
                }

                let joined = segment.tile_count() + other.tile_count();
                if segment.termination_count() + other.termination_count() == 2 {
                    let target = if joined == total { Resolution::Channel } else { Resolution::Empty };
                    Some((component, target))
                } else {
                    (joined > total).then_some((component, Resolution::Empty))
                }
            })
            .collect()
    }
}

impl Rule for ChannelContinuityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ChannelContinuity
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Thalweg]
    }

    fn invoke(&self, state: &mut SolverState, _component: ComponentId) {
        let tableau = state.tableau();
        let decisions = withhold_extra_exits(tableau, Self::deduce(tableau));
        state.apply(decisions, Reason::ChannelContinuity);
    }
}
