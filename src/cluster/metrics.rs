//! Centrality scoring

use crate::cluster::CentralityMap;
use crate::config::Config;
use crate::graph::SocialGraph;
use rayon::prelude::*;

/// Graphs at least this large are iterated with rayon
const PARALLEL_THRESHOLD: usize = 10_000;

/// PageRank on the undirected graph by power iteration
#[derive(Debug, Clone)]
pub struct PageRank {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl PageRank {
    pub fn from_config(config: &Config) -> Self {
        Self {
            damping: config.damping.clamp(0.0, 1.0),
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }

    /// Stationary distribution of the walk. Isolated nodes always teleport.
    /// Hitting the iteration cap returns the last iterate.
    pub fn score(&self, graph: &SocialGraph) -> CentralityMap {
        let n = graph.node_count();
        if n == 0 {
            return CentralityMap::from_scores(Vec::new());
        }
        if n == 1 {
            return CentralityMap::from_scores(vec![1.0]);
        }

        let d = self.damping;
        let uniform = 1.0 / n as f64;
        let mut ranks = vec![uniform; n];
        let mut converged = false;

        for iteration in 0..self.max_iterations {
            let dangling: f64 = (0..n)
                .filter(|&node| graph.degree(node) == 0)
                .map(|node| ranks[node])
                .sum();
            let base = (1.0 - d) * uniform + d * dangling * uniform;

            let pull = |node: usize| -> f64 {
                let inflow: f64 = graph
                    .neighbors(node)
                    .iter()
                    .map(|&nbr| ranks[nbr as usize] / graph.degree(nbr as usize) as f64)
                    .sum();
                base + d * inflow
            };

            let next: Vec<f64> = if n >= PARALLEL_THRESHOLD {
                (0..n).into_par_iter().map(pull).collect()
            } else {
                (0..n).map(pull).collect()
            };

            let change: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
            ranks = next;

            if change < n as f64 * self.tolerance {
                log::debug!("PageRank converged after {} iterations", iteration + 1);
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!(
                "PageRank did not converge within {} iterations; using last iterate",
                self.max_iterations
            );
        }

        let total: f64 = ranks.iter().sum();
        if total.is_finite() && total > 0.0 {
            ranks.iter_mut().for_each(|r| *r /= total);
        } else {
            ranks = vec![uniform; n];
        }

        CentralityMap::from_scores(ranks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph_of(pairs: &[(&str, &str)], isolated: &[&str]) -> SocialGraph {
        let mut builder = GraphBuilder::with_capacity(pairs.len());
        for (a, b) in pairs {
            builder.add_edge(a, b);
        }
        for id in isolated {
            builder.get_or_create_node(id);
        }
        builder.build().unwrap()
    }

    fn assert_distribution(map: &CentralityMap) {
        let tolerance = 1e-6 * map.len() as f64;
        assert!(map.scores().iter().all(|&s| s >= 0.0));
        assert!((map.total() - 1.0).abs() < tolerance, "sum was {}", map.total());
    }

    #[test]
    fn hub_outranks_leaves() {
        let graph = graph_of(&[("A", "B"), ("A", "C")], &[]);
        let ranks = PageRank::default().score(&graph);

        assert_distribution(&ranks);
        assert!(ranks.score(0) > ranks.score(1));
        assert!(ranks.score(0) > ranks.score(2));
        assert!((ranks.score(1) - ranks.score(2)).abs() < 1e-9);
    }

    #[test]
    fn single_node_scores_one() {
        let graph = graph_of(&[], &["solo"]);
        assert_eq!(PageRank::default().score(&graph).scores(), &[1.0]);
    }

    #[test]
    fn edgeless_graph_is_uniform() {
        let graph = graph_of(&[], &["a", "b", "c", "d"]);
        let ranks = PageRank::default().score(&graph);
        for &score in ranks.scores() {
            assert!((score - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn disconnected_graph_with_isolated_node_is_a_distribution() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("x", "y")], &["lonely"]);
        let ranks = PageRank::default().score(&graph);
        assert_distribution(&ranks);
        assert!(ranks.score(1) > ranks.score(0));
    }

    #[test]
    fn iteration_cap_still_returns_a_distribution() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("a", "c")], &[]);
        let pagerank = PageRank {
            max_iterations: 1,
            tolerance: 0.0,
            ..PageRank::default()
        };
        assert_distribution(&pagerank.score(&graph));
    }
}
