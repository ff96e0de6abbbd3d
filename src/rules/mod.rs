//! Deduction rules.
//!
//! A rule looks at the current state of a [`Tableau`] around one component and proposes resolutions it can prove.
//! Rules never mutate anything themselves: they hand their decisions to [`SolverState::apply`], which resolves,
//! notifies, and re-enqueues. Every rule is sound; a rule which cannot prove anything proposes nothing.

use itertools::Itertools;
use strum::{Display, VariantArray};
use tracing::warn;

pub use aisle_count::AisleCountRule;
pub use aisle_intersection::AisleCountIntersectionRule;
pub use aisle_pattern::AisleResolutionPatternRule;
pub use continuity::ChannelContinuityRule;
pub use exit_count::ExitCountRule;
pub use housekeeping::HousekeepingRule;
pub use meander::MeanderRule;
pub use tarjans::{articulation_points, TarjansRule};
pub use tile_edge::TileEdgeRule;
pub(crate) use exit_count::EXIT_COUNT;

use crate::aisle::AisleId;
use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::{Resolution, Resolvable};
use crate::solver::SolverState;
use crate::tableau::Tableau;

mod aisle_count;
mod aisle_intersection;
mod aisle_pattern;
mod continuity;
mod exit_count;
mod housekeeping;
mod meander;
mod tarjans;
mod tile_edge;

/// A proposed resolution.
pub type Decision = (ComponentId, Resolution);

/// A deduction procedure which can be registered with a [`SolverState`].
pub trait Rule {
    /// Registry entry for this rule.
    fn kind(&self) -> RuleKind;

    /// Component kinds whose resolution should schedule this rule.
    fn triggers(&self) -> &'static [ComponentKind];

    /// Reason about `component` and apply whatever can be proven.
    fn invoke(&self, state: &mut SolverState, component: ComponentId);
}

/// Every rule which may be registered. [`HousekeepingRule`] is not among them, since it always runs.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum RuleKind {
    /// See [`AisleCountRule`].
    AisleCount,
    /// See [`TileEdgeRule`].
    TileEdge,
    /// See [`AisleCountIntersectionRule`].
    AisleCountIntersection,
    /// See [`AisleResolutionPatternRule`].
    AisleResolutionPattern,
    /// See [`MeanderRule`].
    Meander,
    /// See [`ChannelContinuityRule`].
    ChannelContinuity,
    /// See [`ExitCountRule`].
    ExitCount,
    /// See [`TarjansRule`].
    Tarjans,
}

impl RuleKind {
    /// The rule itself.
    pub fn rule(self) -> &'static dyn Rule {
        match self {
            Self::AisleCount => &AisleCountRule,
            Self::TileEdge => &TileEdgeRule,
            Self::AisleCountIntersection => &AisleCountIntersectionRule,
            Self::AisleResolutionPattern => &AisleResolutionPatternRule,
            Self::Meander => &MeanderRule,
            Self::ChannelContinuity => &ChannelContinuityRule,
            Self::ExitCount => &ExitCountRule,
            Self::Tarjans => &TarjansRule,
        }
    }

    /// Shorthand for [`Rule::triggers`].
    pub fn triggers(self) -> &'static [ComponentKind] {
        self.rule().triggers()
    }

    /// Scheduling priority; lower runs first. Cheap local rules go ahead of the expensive global ones.
    pub fn priority(self) -> u8 {
        match self {
            Self::TileEdge | Self::Meander => 0,
            Self::AisleCount => 1,
            Self::ChannelContinuity => 2,
            Self::AisleCountIntersection => 3,
            Self::AisleResolutionPattern => 4,
            Self::ExitCount => 5,
            Self::Tarjans => 6,
        }
    }
}

/// The aisles a rule should examine when invoked on `component`.
pub(crate) fn aisles_in_scope(tableau: &Tableau, component: ComponentId) -> Vec<AisleId> {
    match component {
        ComponentId::Tableau => tableau.aisle_ids().collect(),
        ComponentId::Aisle(id) => vec![id],
        ComponentId::Tile(centre) => tableau.tile(centre).map(|tile| tile.aisles().to_vec()).unwrap_or_default(),
        ComponentId::Edge(_) | ComponentId::Thalweg => vec![],
    }
}

/// The tiles a rule should examine when invoked on `component`.
pub(crate) fn tiles_in_scope(tableau: &Tableau, component: ComponentId) -> Vec<Coordinates> {
    match component {
        ComponentId::Tableau => tableau.tiles().map(|tile| tile.centre()).collect(),
        ComponentId::Tile(centre) => vec![centre],
        ComponentId::Edge(key) => tableau.edge(key).map(|edge| edge.tiles().collect_vec()).unwrap_or_default(),
        ComponentId::Aisle(id) => tableau.aisle(id).map(|aisle| aisle.tiles().to_vec()).unwrap_or_default(),
        ComponentId::Thalweg => vec![],
    }
}

/// Propose every unresolved edge of `centre` as `target`.
pub(crate) fn unknown_edges_of(tableau: &Tableau, centre: Coordinates, target: Resolution) -> Vec<Decision> {
    let Some(tile) = tableau.tile(centre) else {
        return vec![];
    };

    tile.edges().into_iter()
        .filter(|key| tableau.edge(*key).is_some_and(|edge| edge.resolution().is_unknown()))
        .map(|key| (ComponentId::Edge(key), target))
        .collect()
}

/// Drop proposals which would open more border exits than the channel has.
///
/// Counts the exits already linked plus each border edge proposed Channel, in order.
pub(crate) fn withhold_extra_exits(tableau: &Tableau, decisions: Vec<Decision>) -> Vec<Decision> {
    let mut exits = tableau.thalweg().exits().len();
    decisions.into_iter()
        .filter(|(component, target)| {
            let ComponentId::Edge(key) = component else {
                return true;
            };
            let opens_exit = target.is_channel()
                && tableau.edge(*key).is_some_and(|edge| edge.is_border() && edge.resolution().is_unknown());
            if !opens_exit {
                return true;
            }

            if exits >= EXIT_COUNT {
                warn!(edge = ?key, exits, "channel already leaves the grid twice");
                return false;
            }
            exits += 1;
            true
        })
        .collect()
}
