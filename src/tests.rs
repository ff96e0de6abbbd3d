#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;
    use proptest::prelude::*;
    use strum::VariantArray;

    use crate::builder::TableauBuilder;
    use crate::component::ComponentId;
    use crate::coordinates::{edge_key, Coordinates, EdgeKey};
    use crate::error::BuildError;
    use crate::grid::Grid;
    use crate::resolution::{Resolution, Resolvable};
    use crate::rules::RuleKind;
    use crate::shape::Axis;
    use crate::solver::{Reason, SolverConfig, SolverState};
    use crate::tableau::Tableau;

    const REFERENCE_COUNTS: [usize; 18] = [2, 5, 5, 5, 8, 4, 4, 6, 5, 7, 7, 0, 3, 6, 4, 8, 7, 1];

    const REFERENCE_PATH: [(i32, i32, i32); 29] = [
        (-8, 1, 7), (-7, 2, 5), (-5, 1, 4), (-4, -1, 5), (-2, -2, 4), (-1, -1, 2), (-2, 1, 1), (-4, 2, 2),
        (-5, 4, 1), (-4, 5, -1), (-2, 4, -2), (-1, 5, -4), (1, 4, -5), (2, 5, -7), (4, 4, -8), (5, 2, -7),
        (4, 1, -5), (5, -1, -4), (7, -2, -5), (8, -4, -4), (7, -5, -2), (5, -4, -1), (4, -5, 1), (2, -4, 2),
        (1, -5, 4), (2, -7, 5), (4, -8, 4), (5, -7, 2), (7, -8, 1),
    ];

    /// Routes solver events to the test harness; filter with `RUST_LOG`.
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
            .with_test_writer()
            .try_init();
    }

    fn reference() -> Tableau {
        TableauBuilder::new(3).with_counts(&REFERENCE_COUNTS).build().unwrap()
    }

    fn reference_path() -> Vec<Coordinates> {
        REFERENCE_PATH.iter()
            .map(|(x, y, z)| Coordinates::try_new(*x, *y, *z).unwrap())
            .collect()
    }

    fn reference_exits() -> [EdgeKey; 2] {
        [
            edge_key(Coordinates::new(-9, 0), Coordinates::new(-9, 3)),
            edge_key(Coordinates::new(6, -9), Coordinates::new(9, -9)),
        ]
    }

    /// Every edge the reference channel crosses, exits included.
    fn reference_channel_edges(tableau: &Tableau) -> HashSet<EdgeKey> {
        reference_path().into_iter()
            .tuple_windows()
            .map(|(a, b)| tableau.edge_between(a, b).unwrap())
            .chain(reference_exits())
            .collect()
    }

    fn assert_matches_reference(path: &[Coordinates]) {
        let expected = reference_path();
        let reversed = expected.iter().rev().copied().collect_vec();
        assert!(path == expected.as_slice() || path == reversed.as_slice(), "unexpected channel {path:?}");
    }

    #[test]
    fn malformed_puzzles_do_not_build() {
        assert_eq!(
            TableauBuilder::new(9).with_counts(&[0; 54]).build().unwrap_err(),
            BuildError::SizeOutOfRange { size: 9, min: 1, max: 8 }
        );
        assert_eq!(TableauBuilder::new(2).build().unwrap_err(), BuildError::MissingCounts);
        assert_eq!(
            TableauBuilder::new(1).with_counts(&[1, 1, 2, 0, 1, 0]).build().unwrap_err(),
            BuildError::AxisSumMismatch { x: 2, y: 2, z: 1 }
        );
        assert!(Coordinates::try_new(1, 1, 1).is_err());
    }

    #[test]
    fn small_hexagon_solves_locally() {
        init_logging();
        let mut state = SolverState::new(TableauBuilder::new(1).with_counts(&[1, 1, 0, 2, 2, 0]).build().unwrap(), SolverConfig::default());
        let outcome = state.run();
        assert!(outcome.solved);
        assert!(!outcome.stalled);

        for reason in [Reason::ExitCount, Reason::AisleResolutionPattern, Reason::AisleCountIntersection] {
            assert_eq!(state.resolutions_by(reason).count(), 0, "{reason} should not be needed");
        }

        let path = state.tableau().thalweg().path().unwrap();
        assert!(path == [Coordinates::new(1, 1), Coordinates::new(-1, 2)] || path == [Coordinates::new(-1, 2), Coordinates::new(1, 1)]);
        assert_eq!(state.tableau().unresolved_tile_count(), 0);
        assert!(state.tableau().edges().all(|edge| !edge.resolution().is_unknown()));
    }

    #[test]
    fn seeded_channel_links_into_one_segment() {
        let mut state = SolverState::new(reference(), SolverConfig::default());
        let path = reference_path();
        assert_eq!(state.tableau().channel_total(), path.len());

        for centre in &path {
            assert!(state.try_resolve(ComponentId::Tile(*centre), Resolution::Channel, Reason::Seed));
        }
        // the channel brushes against itself, so only consecutive tiles are linked
        for (a, b) in path.iter().tuple_windows() {
            let key = state.tableau().edge_between(*a, *b).unwrap();
            assert!(state.try_resolve(ComponentId::Edge(key), Resolution::Channel, Reason::Seed));
        }

        let thalweg = state.tableau().thalweg();
        assert_eq!(thalweg.segment_count(), 1);
        assert_eq!(thalweg.linked_tile_count(), 29);
        assert_eq!(thalweg.unlinked_tile_count(), 0);
        assert!(thalweg.exits().is_empty());
        assert!(!state.is_solved());

        for key in reference_exits() {
            assert!(state.try_resolve(ComponentId::Edge(key), Resolution::Channel, Reason::Seed));
        }
        assert!(state.is_solved());
        assert_matches_reference(&state.tableau().thalweg().path().unwrap());
    }

    #[test]
    fn reference_puzzle_solves() {
        init_logging();
        let (tableau, outcome) = reference().solve();
        assert!(outcome.solved, "stopped after {} invocations", outcome.invocations);
        assert_matches_reference(&tableau.thalweg().path().unwrap());

        let exits = tableau.thalweg().exits().iter().map(|exit| exit.edge()).collect::<HashSet<_>>();
        assert_eq!(exits, HashSet::from(reference_exits()));
        assert_eq!(tableau.resolved_channel_tile_count(), 29);
        assert_eq!(tableau.unresolved_tile_count(), 0);
        assert!(tableau.aisles().all(|aisle| aisle.resolution().is_channel() == (aisle.channel_tile_count() > 0)));
    }

    #[test]
    fn counts_round_trip() {
        let tableau = reference();
        assert_eq!(tableau.grid().counts_for_tiles(&reference_path()), REFERENCE_COUNTS);

        let (solved, _) = tableau.solve();
        assert_eq!(solved.channel_counts(), solved.counts());
    }

    #[test]
    fn rules_are_idempotent_once_solved() {
        let mut state = SolverState::new(reference(), SolverConfig::default());
        assert!(state.run().solved);

        let before = state.audit().len();
        for kind in RuleKind::VARIANTS {
            let component = if *kind == RuleKind::ChannelContinuity { ComponentId::Thalweg } else { ComponentId::Tableau };
            assert_eq!(state.invoke_rule(*kind, component), 0, "{kind} changed a solved tableau");
        }
        assert_eq!(state.audit().len(), before);
    }

    #[test]
    fn stalls_without_global_rules() {
        init_logging();
        let config = SolverConfig::default().with_rules([RuleKind::AisleCount, RuleKind::TileEdge, RuleKind::Meander]);
        let mut state = SolverState::new(reference(), config);
        let outcome = state.run();
        assert!(!outcome.solved);
        assert!(outcome.stalled);

        let path = reference_path();
        for tile in state.tableau().tiles().filter(|tile| !tile.resolution().is_unknown()) {
            assert_eq!(tile.resolution().is_channel(), path.contains(&tile.centre()));
        }
    }

    #[test]
    fn unsolvable_hints_end_unsolved() {
        init_logging();
        // meets the count contract, but no channel fits it
        let counts = [2, 0, 3, 1, 1, 1, 3, 1, 2, 1, 0, 3];
        let mut state = SolverState::new(TableauBuilder::new(2).with_counts(&counts).build().unwrap(), SolverConfig::default());
        let outcome = state.run();
        assert!(!outcome.solved);
        assert!(outcome.stalled || outcome.contradicted);
        assert_eq!(outcome.contradicted, state.contradiction().is_some());

        let tableau = state.tableau();
        assert_eq!(tableau.counts(), &counts[..]);
        assert!(tableau.thalweg().exits().len() <= 2);
        assert!(tableau.thalweg().path().is_none());
        assert_eq!(
            tableau.resolved_channel_tile_count() + tableau.resolved_empty_tile_count() + tableau.unresolved_tile_count(),
            tableau.grid().tile_count()
        );
    }

    #[test]
    fn aisles_report_their_axis_totals() {
        let tableau = reference();
        for axis in Axis::ALL {
            let total: usize = tableau.aisles()
                .filter(|aisle| aisle.id().axis == axis)
                .map(|aisle| aisle.channel_tile_count())
                .sum();
            assert_eq!(total, tableau.channel_total());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn deductions_agree_with_the_solution(
            tile_seeds in prop::collection::vec(prop::bool::weighted(0.15), 54),
            edge_seeds in prop::collection::vec(prop::bool::weighted(0.1), 90),
        ) {
            let tableau = reference();
            let path = reference_path();
            let channel_edges = reference_channel_edges(&tableau);
            let tiles = tableau.tiles().map(|tile| tile.centre()).collect_vec();
            let edges = tableau.edges().map(|edge| edge.key()).collect_vec();
            prop_assert_eq!(tiles.len(), tile_seeds.len());
            prop_assert_eq!(edges.len(), edge_seeds.len());

            let mut seeds = vec![];
            for (centre, _) in tiles.iter().zip(&tile_seeds).filter(|(_, seed)| **seed) {
                let target = if path.contains(centre) { Resolution::Channel } else { Resolution::Empty };
                seeds.push((ComponentId::Tile(*centre), target));
            }
            for (key, _) in edges.iter().zip(&edge_seeds).filter(|(_, seed)| **seed) {
                let target = if channel_edges.contains(key) { Resolution::Channel } else { Resolution::Empty };
                seeds.push((ComponentId::Edge(*key), target));
            }

            let mut state = SolverState::new(tableau, SolverConfig::default());
            for (component, target) in &seeds {
                state.try_resolve(*component, *target, Reason::Seed);
            }
            state.run();
            let tableau = state.tableau();

            // seeds are never overwritten
            for (component, target) in &seeds {
                prop_assert_eq!(tableau.resolution_of(*component), Some(*target));
            }

            // every deduction agrees with the known channel
            for tile in tableau.tiles().filter(|tile| !tile.resolution().is_unknown()) {
                prop_assert_eq!(tile.resolution().is_channel(), path.contains(&tile.centre()));
            }
            for edge in tableau.edges().filter(|edge| !edge.resolution().is_unknown()) {
                prop_assert_eq!(edge.resolution().is_channel(), channel_edges.contains(&edge.key()));
            }

            // conservation
            prop_assert_eq!(
                tableau.resolved_channel_tile_count() + tableau.resolved_empty_tile_count() + tableau.unresolved_tile_count(),
                tableau.grid().tile_count()
            );
            for aisle in tableau.aisles() {
                prop_assert_eq!(
                    aisle.resolved_channel_tile_count() + aisle.resolved_empty_tile_count() + aisle.unresolved_tile_count(),
                    aisle.tile_count()
                );
                prop_assert!(aisle.resolved_channel_tile_count() <= aisle.channel_tile_count());
            }

            let thalweg = tableau.thalweg();
            prop_assert!(thalweg.exits().len() <= 2);
            prop_assert_eq!(thalweg.segments().map(|segment| segment.tile_count()).sum::<usize>(), thalweg.linked_tile_count());
            prop_assert!(thalweg.segments().all(|segment| segment.tiles().all_unique()));
        }

        #[test]
        fn arbitrary_hints_never_abort_the_solve(
            (size, keep) in (1usize..=3).prop_flat_map(|size| (Just(size), prop::collection::vec(prop::bool::weighted(0.33), 6 * size * size))),
        ) {
            let grid = Grid::new(size).unwrap();
            let tiles = grid.tile_centres()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|(centre, _)| centre)
                .collect_vec();
            let counts = grid.counts_for_tiles(&tiles);

            let (tableau, outcome) = TableauBuilder::new(size).with_counts(&counts).build().unwrap().solve();
            prop_assert!(!(outcome.solved && outcome.contradicted));
            prop_assert!(tableau.thalweg().exits().len() <= 2);
            if outcome.solved {
                // anything reported solved really is a channel matching the hints
                prop_assert_eq!(tableau.channel_counts(), counts);
                prop_assert_eq!(tableau.thalweg().path().map(|path| path.len()), Some(tableau.channel_total()));
            }
        }
    }
}
