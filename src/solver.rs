use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use itertools::Itertools;
use strum::{AsRefStr, Display, VariantArray};
use tracing::{debug, info, trace, warn};

use crate::aisle::Aisle;
use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::EdgeKey;
use crate::resolution::{Resolution, Resolvable};
use crate::rules::{Decision, HousekeepingRule, RuleKind};
use crate::tableau::Tableau;
use crate::thalweg::{Contradiction, LinkOutcome};

/// Why a component was resolved.
#[derive(AsRefStr, Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Reason {
    /// Resolved from outside the solver, e.g. a given or a test fixture.
    Seed,
    /// Forced by a single resolution; see [`HousekeepingRule`].
    Housekeeping,
    /// An aisle whose every tile has been resolved.
    AisleComplete,
    /// Left over once the thalweg was complete.
    Completion,
    /// Proposed by [`RuleKind::AisleCount`].
    AisleCount,
    /// Proposed by [`RuleKind::TileEdge`].
    TileEdge,
    /// Proposed by [`RuleKind::AisleCountIntersection`].
    AisleCountIntersection,
    /// Proposed by [`RuleKind::AisleResolutionPattern`].
    AisleResolutionPattern,
    /// Proposed by [`RuleKind::Meander`].
    Meander,
    /// Proposed by [`RuleKind::ChannelContinuity`].
    ChannelContinuity,
    /// Proposed by [`RuleKind::ExitCount`].
    ExitCount,
    /// Proposed by [`RuleKind::Tarjans`].
    Tarjans,
}

impl From<RuleKind> for Reason {
    fn from(value: RuleKind) -> Self {
        match value {
            RuleKind::AisleCount => Self::AisleCount,
            RuleKind::TileEdge => Self::TileEdge,
            RuleKind::AisleCountIntersection => Self::AisleCountIntersection,
            RuleKind::AisleResolutionPattern => Self::AisleResolutionPattern,
            RuleKind::Meander => Self::Meander,
            RuleKind::ChannelContinuity => Self::ChannelContinuity,
            RuleKind::ExitCount => Self::ExitCount,
            RuleKind::Tarjans => Self::Tarjans,
        }
    }
}

/// One entry of the audit log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolutionResult {
    component: ComponentId,
    resolution: Resolution,
    reason: Reason,
}

impl ResolutionResult {
    /// What was resolved.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// What it was resolved to.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Who resolved it.
    pub fn reason(&self) -> Reason {
        self.reason
    }
}

/// Knobs for a [`SolverState`]. Start from [`Default`] and adjust with the `with_*` methods.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Upper bound on rule invocations made by [`SolverState::run`].
    pub max_invocations: usize,
    /// Aisles with more placements than this are skipped by [`AisleResolutionPatternRule`](crate::rules::AisleResolutionPatternRule).
    pub pattern_limit: usize,
    /// Re-run the global rules when the work queue drains before the puzzle is solved.
    pub reseed_when_idle: bool,
    /// Resolve everything left Unknown to Empty once the thalweg is complete.
    pub finish_on_solve: bool,
    /// The rules to register.
    pub rules: Vec<RuleKind>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_invocations: 100_000,
            pattern_limit: 4096,
            reseed_when_idle: true,
            finish_on_solve: true,
            rules: RuleKind::VARIANTS.to_vec(),
        }
    }
}

impl SolverConfig {
    /// Set [`Self::max_invocations`].
    pub fn with_max_invocations(mut self, max_invocations: usize) -> Self {
        self.max_invocations = max_invocations;
        self
    }

    /// Set [`Self::pattern_limit`].
    pub fn with_pattern_limit(mut self, pattern_limit: usize) -> Self {
        self.pattern_limit = pattern_limit;
        self
    }

    /// Set [`Self::reseed_when_idle`].
    pub fn with_reseed_when_idle(mut self, reseed_when_idle: bool) -> Self {
        self.reseed_when_idle = reseed_when_idle;
        self
    }

    /// Set [`Self::finish_on_solve`].
    pub fn with_finish_on_solve(mut self, finish_on_solve: bool) -> Self {
        self.finish_on_solve = finish_on_solve;
        self
    }

    /// Register exactly these rules.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item=RuleKind>) -> Self {
        self.rules = rules.into_iter().unique().collect();
        self
    }

    /// Unregister `rule`.
    pub fn without_rule(mut self, rule: RuleKind) -> Self {
        self.rules.retain(|kind| *kind != rule);
        self
    }
}

/// How a call to [`SolverState::solve`] ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolveOutcome {
    /// The thalweg runs through every channel tile from one exit to the other.
    pub solved: bool,
    /// The work queue drained without anything new being resolved.
    pub stalled: bool,
    /// The resolutions made contradict each other, so these hints have no solution.
    pub contradicted: bool,
    /// Rule invocations made during this call.
    pub invocations: usize,
}

/// A pending rule invocation. Ordered so that a max-heap yields the lowest priority, then the oldest.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Obligation {
    priority: u8,
    sequence: u64,
    rule: RuleKind,
    component: ComponentId,
}

impl Ord for Obligation {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Obligation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A [`Tableau`] being solved, with the rules registered against it and everything they have done so far.
///
/// Every resolution goes through [`Self::try_resolve`], which records it, updates the tableau, runs housekeeping, and
/// schedules each rule registered for the resolved component's kind.
pub struct SolverState {
    tableau: Tableau,
    config: SolverConfig,
    registry: HashMap<ComponentKind, Vec<RuleKind>>,
    queue: BinaryHeap<Obligation>,
    pending: HashSet<(RuleKind, ComponentId)>,
    audit: Vec<ResolutionResult>,
    contradiction: Option<Contradiction>,
    sequence: u64,
    invocations: usize,
}

impl SolverState {
    /// Wrap `tableau`, registering the rules `config` names. Nothing runs until [`Self::solve`].
    pub fn new(tableau: Tableau, config: SolverConfig) -> Self {
        let mut registry: HashMap<ComponentKind, Vec<RuleKind>> = HashMap::new();
        for rule in config.rules.iter().unique() {
            for kind in rule.triggers() {
                registry.entry(*kind).or_default().push(*rule);
            }
        }

        Self {
            tableau,
            config,
            registry,
            queue: BinaryHeap::new(),
            pending: HashSet::new(),
            audit: vec![],
            contradiction: None,
            sequence: 0,
            invocations: 0,
        }
    }

    /// The tableau in its current state.
    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    /// The configuration this solver was built with.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Give the tableau back, as far as it has been solved.
    pub fn into_tableau(self) -> Tableau {
        self.tableau
    }

    /// Every resolution made so far, oldest first.
    pub fn audit(&self) -> &[ResolutionResult] {
        &self.audit
    }

    /// Audit entries made for `reason`.
    pub fn resolutions_by(&self, reason: Reason) -> impl Iterator<Item=&ResolutionResult> + '_ {
        self.audit.iter().filter(move |result| result.reason == reason)
    }

    /// Total rule invocations over the lifetime of this state.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    /// The first Channel edge the thalweg refused, if any. Once set, solving stops.
    pub fn contradiction(&self) -> Option<Contradiction> {
        self.contradiction
    }

    /// Solved without any contradiction along the way.
    pub fn is_solved(&self) -> bool {
        self.contradiction.is_none() && self.tableau.is_solved()
    }

    /// Resolve `component` to `target` and propagate.
    /// Returns `false`, doing nothing, if the component was already resolved or `target` is Unknown.
    pub fn try_resolve(&mut self, component: ComponentId, target: Resolution, reason: Reason) -> bool {
        if target.is_unknown() || !self.tableau.resolve(component, target) {
            return false;
        }

        self.notify_resolution(component, target, reason);
        true
    }

    /// Try every decision in turn, returning how many took effect.
    pub(crate) fn apply(&mut self, decisions: Vec<Decision>, reason: Reason) -> usize {
        decisions.into_iter()
            .filter(|(component, target)| self.try_resolve(*component, *target, reason))
            .count()
    }

    fn notify_resolution(&mut self, component: ComponentId, resolution: Resolution, reason: Reason) {
        trace!(%component, %resolution, %reason, "resolved");
        self.audit.push(ResolutionResult { component, resolution, reason });

        let completed = self.tableau.notify_resolution(component, resolution);
        HousekeepingRule::tidy(self, component, resolution);

        for id in completed {
            let Some(target) = self.tableau.aisle(id).map(Aisle::completed_resolution) else {
                continue;
            };
            self.try_resolve(ComponentId::Aisle(id), target, Reason::AisleComplete);
        }

        self.enqueue_dependents(component);
    }

    /// Link a freshly Channel edge into the thalweg, scheduling the thalweg rules if anything changed.
    /// A refused edge is recorded as the contradiction which stops the solve.
    pub(crate) fn link(&mut self, key: EdgeKey) {
        let Some(outcome) = self.tableau.link(key) else {
            return;
        };

        match outcome {
            LinkOutcome::Merged { survivor, absorbed } => trace!(%survivor, %absorbed, "thalweg merged"),
            LinkOutcome::Contradiction(contradiction) => {
                warn!(%contradiction, "hints admit no channel");
                self.contradiction.get_or_insert(contradiction);
            }
            _ => {}
        }
        if outcome.changed() {
            self.enqueue_dependents(ComponentId::Thalweg);
        }
    }

    fn enqueue(&mut self, rule: RuleKind, component: ComponentId) {
        if !self.pending.insert((rule, component)) {
            return;
        }

        self.queue.push(Obligation { priority: rule.priority(), sequence: self.sequence, rule, component });
        self.sequence += 1;
    }

    /// Schedule the rules registered for `component`'s kind. Aisle rules woken by a tile run once per aisle rather than
    /// once per tile.
    fn enqueue_dependents(&mut self, component: ComponentId) {
        let Some(rules) = self.registry.get(&component.kind()).cloned() else {
            return;
        };
        let aisles = match component {
            ComponentId::Tile(centre) => self.tableau.tile(centre).map(|tile| tile.aisles()),
            _ => None,
        };

        for rule in rules {
            match aisles {
                Some(aisles) if rule.triggers().contains(&ComponentKind::Aisle) => {
                    for id in aisles {
                        self.enqueue(rule, ComponentId::Aisle(id));
                    }
                }
                _ => self.enqueue(rule, component),
            }
        }
    }

    /// Schedule every registered rule which reasons about the whole tableau or thalweg.
    fn seed(&mut self) {
        for (kind, component) in [(ComponentKind::Tableau, ComponentId::Tableau), (ComponentKind::Thalweg, ComponentId::Thalweg)] {
            for rule in self.registry.get(&kind).cloned().unwrap_or_default() {
                self.enqueue(rule, component);
            }
        }
    }

    /// Invoke one rule on one component, returning how many resolutions followed, propagation included.
    pub fn invoke_rule(&mut self, kind: RuleKind, component: ComponentId) -> usize {
        let before = self.audit.len();
        self.invocations += 1;
        trace!(rule = %kind, %component, "invoking");
        kind.rule().invoke(self, component);
        self.audit.len() - before
    }

    /// Work through the queue until the puzzle is solved, `max_invocations` rules have run, nothing more can be
    /// deduced, or the resolutions contradict each other.
    pub fn solve(&mut self, max_invocations: usize) -> SolveOutcome {
        info!(size = self.tableau.grid().size(), channel_total = self.tableau.channel_total(), "solving");
        let start = self.invocations;
        let mut resolved_at_seed = self.audit.len();
        let mut stalled = false;

        self.seed();
        while !self.is_solved() && self.contradiction.is_none() && self.invocations - start < max_invocations {
            let Some(obligation) = self.queue.pop() else {
                if !self.config.reseed_when_idle || self.audit.len() == resolved_at_seed {
                    debug!(unresolved = self.tableau.unresolved_tile_count(), "stalled");
                    stalled = true;
                    break;
                }

                debug!(resolutions = self.audit.len() - resolved_at_seed, "reseeding");
                resolved_at_seed = self.audit.len();
                self.seed();
                continue;
            };

            self.pending.remove(&(obligation.rule, obligation.component));
            self.invoke_rule(obligation.rule, obligation.component);
        }

        let solved = self.is_solved();
        if solved && self.config.finish_on_solve {
            self.finish();
        }

        let invocations = self.invocations - start;
        let contradicted = self.contradiction.is_some();
        info!(solved, stalled, contradicted, invocations, resolutions = self.audit.len(), "finished");
        SolveOutcome { solved, stalled, contradicted, invocations }
    }

    /// [`Self::solve`] with the configured budget.
    pub fn run(&mut self) -> SolveOutcome {
        self.solve(self.config.max_invocations)
    }

    /// Everything off the finished channel is land.
    fn finish(&mut self) {
        let tiles = self.tableau.tiles()
            .filter(|tile| tile.resolution().is_unknown())
            .map(|tile| (ComponentId::Tile(tile.centre()), Resolution::Empty))
            .collect_vec();
        self.apply(tiles, Reason::Completion);

        let edges = self.tableau.edges()
            .filter(|edge| edge.resolution().is_unknown())
            .map(|edge| (ComponentId::Edge(edge.key()), Resolution::Empty))
            .collect_vec();
        self.apply(edges, Reason::Completion);

        self.queue.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::aisle::AisleId;
    use crate::builder::TableauBuilder;
    use crate::coordinates::Coordinates;
    use crate::shape::Axis;

    use super::*;

    fn hexagon() -> Tableau {
        TableauBuilder::new(1).with_counts(&[1, 1, 0, 2, 2, 0]).build().unwrap()
    }

    #[test]
    fn obligations_pop_by_priority_then_age() {
        let mut queue = BinaryHeap::new();
        let entries = [(RuleKind::Tarjans, 0), (RuleKind::AisleCount, 1), (RuleKind::TileEdge, 2), (RuleKind::AisleCount, 3)];
        for (rule, sequence) in entries {
            queue.push(Obligation { priority: rule.priority(), sequence, rule, component: ComponentId::Tableau });
        }

        let order = std::iter::from_fn(|| queue.pop()).map(|o| o.sequence).collect_vec();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn redundant_resolutions_are_ignored() {
        let mut state = SolverState::new(hexagon(), SolverConfig::default());
        let centre = ComponentId::Tile(Coordinates::new(1, 1));
        assert!(state.try_resolve(centre, Resolution::Channel, Reason::Seed));
        assert!(!state.try_resolve(centre, Resolution::Empty, Reason::Seed));
        assert!(!state.try_resolve(ComponentId::Tile(Coordinates::new(-1, 2)), Resolution::Unknown, Reason::Seed));
        assert!(!state.try_resolve(ComponentId::Tableau, Resolution::Channel, Reason::Seed));
        assert_eq!(state.audit().len(), 1);
    }

    #[test]
    fn completed_aisles_resolve() {
        let mut state = SolverState::new(hexagon(), SolverConfig::default());
        for centre in [(2, -1), (1, -2), (-1, -1)] {
            state.try_resolve(ComponentId::Tile(centre.into()), Resolution::Empty, Reason::Seed);
        }

        let y0 = ComponentId::Aisle(AisleId::new(Axis::Y, 0));
        assert!(state.resolutions_by(Reason::AisleComplete).any(|r| r.component() == y0));
        assert_eq!(state.tableau().resolution_of(y0), Some(Resolution::Empty));
    }

    #[test]
    fn rules_can_be_left_out() {
        let config = SolverConfig::default().without_rule(RuleKind::Tarjans).with_rules([RuleKind::AisleCount, RuleKind::AisleCount]);
        assert_eq!(config.rules, vec![RuleKind::AisleCount]);

        let mut state = SolverState::new(hexagon(), config);
        let outcome = state.run();
        // aisle counts alone place the tiles but never link them
        assert!(!outcome.solved);
        assert!(outcome.stalled);
        assert_eq!(state.tableau().resolved_channel_tile_count(), 2);
        assert_eq!(state.tableau().thalweg().exits().len(), 0);
    }

    #[test]
    fn contradictions_stop_the_solve() {
        const RING: [(i32, i32); 6] = [(2, -1), (1, 1), (-1, 2), (-2, 1), (-1, -1), (1, -2)];
        let tableau = TableauBuilder::new(1).with_counts(&[3, 3, 3, 3, 3, 3]).build().unwrap();
        let mut state = SolverState::new(tableau, SolverConfig::default());
        for i in 0..RING.len() {
            let (a, b) = (RING[i].into(), RING[(i + 1) % RING.len()].into());
            let key = state.tableau().edge_between(a, b).unwrap();
            state.try_resolve(ComponentId::Edge(key), Resolution::Channel, Reason::Seed);
        }

        assert!(matches!(state.contradiction(), Some(Contradiction::Loop { .. })));
        assert!(!state.is_solved());

        let outcome = state.run();
        assert_eq!(outcome, SolveOutcome { solved: false, stalled: false, contradicted: true, invocations: 0 });
        assert_eq!(state.tableau().resolved_channel_tile_count(), 6);
    }

    #[test]
    fn budget_bounds_the_work() {
        let tableau = TableauBuilder::new(3).with_counts(&[2, 5, 5, 5, 8, 4, 4, 6, 5, 7, 7, 0, 3, 6, 4, 8, 7, 1]).build().unwrap();
        let mut state = SolverState::new(tableau, SolverConfig::default().with_max_invocations(3));
        let outcome = state.run();
        assert!(!outcome.solved);
        assert!(!outcome.stalled);
        assert_eq!(outcome.invocations, 3);
    }

    #[test]
    fn reasons_name_their_rules() {
        for kind in RuleKind::VARIANTS {
            assert_eq!(Reason::from(*kind).as_ref(), kind.to_string());
        }
        assert_eq!(Reason::AisleComplete.to_string(), "AisleComplete");
    }
}
