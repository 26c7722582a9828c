//! Structural graph algorithms used by reporting

use crate::graph::SocialGraph;
use petgraph::unionfind::UnionFind;

/// Label each node with its connected component (labels are dense, first-seen order)
pub fn connected_components(graph: &SocialGraph) -> Vec<u32> {
    let node_count = graph.node_count();
    let mut sets = UnionFind::<usize>::new(node_count);

    for &(a, b) in graph.edges() {
        sets.union(a as usize, b as usize);
    }

    let roots = sets.into_labeling();
    let mut dense = vec![u32::MAX; node_count];
    let mut labels = Vec::with_capacity(node_count);
    let mut next = 0;
    for root in roots {
        if dense[root] == u32::MAX {
            dense[root] = next;
            next += 1;
        }
        labels.push(dense[root]);
    }

    labels
}

pub fn component_count(graph: &SocialGraph) -> usize {
    connected_components(graph)
        .into_iter()
        .max()
        .map_or(0, |max| max as usize + 1)
}

/// Density: actual edges / potential undirected edges
pub fn density(graph: &SocialGraph) -> f64 {
    let n = graph.node_count();
    if n <= 1 {
        return 1.0; // By convention, singletons have density 1
    }

    let potential_edges = n * (n - 1) / 2;
    graph.edge_count() as f64 / potential_edges as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Edge;
    use crate::graph::build_graph;

    #[test]
    fn counts_disjoint_components() {
        let graph = build_graph(&[
            Edge::new("a", "b"),
            Edge::new("c", "d"),
            Edge::new("b", "e"),
        ])
        .unwrap();

        let labels = connected_components(&graph);
        assert_eq!(labels, vec![0, 0, 1, 1, 0]);
        assert_eq!(component_count(&graph), 2);
    }

    #[test]
    fn triangle_is_fully_dense() {
        let graph = build_graph(&[
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("c", "a"),
        ])
        .unwrap();
        assert!((density(&graph) - 1.0).abs() < 1e-12);
    }
}
