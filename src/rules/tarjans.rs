use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use petgraph::graphmap::UnGraphMap;
use tracing::debug;

use crate::component::{ComponentId, ComponentKind};
use crate::coordinates::Coordinates;
use crate::resolution::Resolvable;
use crate::rules::{Rule, RuleKind};
use crate::solver::SolverState;
use crate::tableau::Tableau;

/// Finds the tiles whose loss would split the part of the grid the channel can still use.
///
/// This rule only reports; it never resolves anything.
pub struct TarjansRule;

impl TarjansRule {
    /// Every tile not known to be Empty, joined across every interior edge not known to be Empty.
    pub fn open_tile_graph(tableau: &Tableau) -> UnGraphMap<Coordinates, ()> {
        let mut graph = UnGraphMap::new();
        for tile in tableau.tiles().filter(|tile| !tile.resolution().is_empty()) {
            graph.add_node(tile.centre());
        }

        for edge in tableau.edges().filter(|edge| !edge.resolution().is_empty()) {
            if let (Some(minus), Some(plus)) = (edge.minus(), edge.plus()) {
                if graph.contains_node(minus) && graph.contains_node(plus) {
                    graph.add_edge(minus, plus, ());
                }
            }
        }

        graph
    }

    /// Open tiles whose loss would split the open tile graph.
    pub fn articulation_tiles(tableau: &Tableau) -> BTreeSet<Coordinates> {
        let graph = Self::open_tile_graph(tableau);
        articulation_points(graph.nodes(), |node| graph.neighbors(node))
    }
}

/// Cut vertices of an undirected graph, by Tarjan's low-link method.
///
/// `neighbors` must be symmetric and free of self loops. Works iteratively, so deep graphs do not exhaust the stack.
pub fn articulation_points<N, I>(nodes: impl IntoIterator<Item=N>, mut neighbors: impl FnMut(N) -> I) -> BTreeSet<N>
where
    N: Copy + Eq + Hash + Ord,
    I: IntoIterator<Item=N>,
{
    // discovery time and low link
    let mut visits: HashMap<N, (usize, usize)> = HashMap::new();
    let mut points = BTreeSet::new();
    let mut clock = 0;

    for root in nodes {
        if visits.contains_key(&root) {
            continue;
        }
        visits.insert(root, (clock, clock));
        clock += 1;

        let mut root_children = 0;
        let mut stack: Vec<(N, Option<N>, I::IntoIter)> = vec![(root, None, neighbors(root).into_iter())];

        while let Some(top) = stack.last_mut() {
            let (node, parent) = (top.0, top.1);
            let next = top.2.next();
            match next {
                Some(child) if Some(child) == parent => {}
                Some(child) => match visits.get(&child).map(|(discovered, _)| *discovered) {
                    Some(discovered) => {
                        if let Some((_, low)) = visits.get_mut(&node) {
                            *low = (*low).min(discovered);
                        }
                    }
                    None => {
                        visits.insert(child, (clock, clock));
                        clock += 1;
                        if node == root {
                            root_children += 1;
                        }
                        stack.push((child, Some(node), neighbors(child).into_iter()));
                    }
                },
                None => {
                    stack.pop();
                    let Some(parent) = parent else {
                        continue;
                    };

                    let child_low = visits.get(&node).map_or(usize::MAX, |(_, low)| *low);
                    if let Some((discovered, low)) = visits.get_mut(&parent) {
                        *low = (*low).min(child_low);
                        if parent != root && child_low >= *discovered {
                            points.insert(parent);
                        }
                    }
                }
            }
        }

        if root_children > 1 {
            points.insert(root);
        }
    }

    points
}

impl Rule for TarjansRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Tarjans
    }

    fn triggers(&self) -> &'static [ComponentKind] {
        &[ComponentKind::Tableau]
    }

    fn invoke(&self, state: &mut SolverState, _component: ComponentId) {
        let tableau = state.tableau();
        let points = Self::articulation_tiles(tableau);
        let channel = points.iter()
            .filter(|centre| tableau.tile_resolution(**centre).is_channel())
            .count();
        debug!(articulation_points = points.len(), channel, "open tiles checked for cut points");
    }
}
