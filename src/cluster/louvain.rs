//! Deterministic Louvain modularity optimisation
//!
//! Nodes are visited in index order (the graph's first-seen order) and
//! candidate communities are scanned in ascending id, with a strict
//! improvement required to switch. Equal gains therefore resolve to the
//! lowest-indexed community and repeated runs give identical partitions.

use crate::cluster::{CommunityDetection, Partition};
use crate::error::DetectionError;
use crate::graph::SocialGraph;
use std::collections::BTreeMap;

/// Gains closer than this are treated as ties
const GAIN_EPSILON: f64 = 1e-12;

/// Weighted graph for one coarsening level
struct LevelGraph {
    /// Weighted neighbors, excluding self-loops; each edge listed from both ends
    adjacency: Vec<Vec<(usize, f64)>>,

    /// Self-loop weight per node (collapsed intra-community edges)
    self_loops: Vec<f64>,

    /// Weighted degree; a self-loop counts twice
    degrees: Vec<f64>,

    /// Sum of all edge weights (m)
    total_weight: f64,
}

impl LevelGraph {
    fn from_social(graph: &SocialGraph) -> Self {
        let adjacency: Vec<Vec<(usize, f64)>> = (0..graph.node_count())
            .map(|node| {
                graph
                    .neighbors(node)
                    .iter()
                    .map(|&nbr| (nbr as usize, 1.0))
                    .collect()
            })
            .collect();
        let self_loops = vec![0.0; adjacency.len()];

        Self::assemble(adjacency, self_loops)
    }

    fn assemble(adjacency: Vec<Vec<(usize, f64)>>, self_loops: Vec<f64>) -> Self {
        let degrees: Vec<f64> = adjacency
            .iter()
            .zip(&self_loops)
            .map(|(links, &own)| links.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * own)
            .collect();
        let total_weight = degrees.iter().sum::<f64>() / 2.0;

        Self {
            adjacency,
            self_loops,
            degrees,
            total_weight,
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Collapse each community into a single super-node
    fn induce(&self, communities: &[usize], count: usize) -> Self {
        let mut self_loops = vec![0.0; count];
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];

        for node in 0..self.len() {
            let c = communities[node];
            self_loops[c] += self.self_loops[node];

            for &(nbr, w) in &self.adjacency[node] {
                let d = communities[nbr];
                if c == d {
                    if node < nbr {
                        self_loops[c] += w;
                    }
                } else {
                    *links[c].entry(d).or_default() += w;
                }
            }
        }

        let adjacency = links
            .into_iter()
            .map(|map| map.into_iter().collect())
            .collect();

        Self::assemble(adjacency, self_loops)
    }

    fn modularity(&self, communities: &[usize], resolution: f64) -> f64 {
        let m = self.total_weight;
        if m == 0.0 {
            return 0.0;
        }

        let count = communities.iter().max().map_or(0, |&c| c + 1);
        let mut internal = vec![0.0; count];
        let mut totals = vec![0.0; count];

        for node in 0..self.len() {
            let c = communities[node];
            totals[c] += self.degrees[node];
            internal[c] += self.self_loops[node];
            for &(nbr, w) in &self.adjacency[node] {
                if node < nbr && communities[nbr] == c {
                    internal[c] += w;
                }
            }
        }

        internal
            .iter()
            .zip(&totals)
            .map(|(&inner, &tot)| inner / m - resolution * (tot / (2.0 * m)).powi(2))
            .sum()
    }
}

/// Map arbitrary community ids to 0..count in first-seen order
fn renumber(communities: &[usize]) -> (Vec<usize>, usize) {
    let mut dense: BTreeMap<usize, usize> = BTreeMap::new();
    let renumbered = communities
        .iter()
        .map(|&c| {
            let next = dense.len();
            *dense.entry(c).or_insert(next)
        })
        .collect();
    (renumbered, dense.len())
}

#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution γ; 1.0 is standard modularity
    pub resolution: f64,

    /// Minimum modularity increase for a pass or level to count
    pub min_gain: f64,

    /// Cap on local-moving passes per level
    pub max_passes: usize,

    /// Cap on coarsening levels
    pub max_levels: usize,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            min_gain: 1e-7,
            max_passes: 100,
            max_levels: 32,
        }
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local moving phase. `communities` starts as the identity assignment.
    fn one_level(
        &self,
        level: &LevelGraph,
        communities: &mut [usize],
        depth: usize,
    ) -> Result<(), DetectionError> {
        let two_m = 2.0 * level.total_weight;
        let mut totals = level.degrees.clone();
        let mut current = level.modularity(communities, self.resolution);

        for _ in 0..self.max_passes {
            let mut moved = false;

            for node in 0..level.len() {
                let own = communities[node];
                let k = level.degrees[node];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                links.insert(own, 0.0);
                for &(nbr, w) in &level.adjacency[node] {
                    *links.entry(communities[nbr]).or_default() += w;
                }

                totals[own] -= k;

                let mut best = own;
                let mut best_gain = f64::NEG_INFINITY;
                for (&candidate, &weight) in &links {
                    let gain = weight - self.resolution * totals[candidate] * k / two_m;
                    if gain > best_gain + GAIN_EPSILON {
                        best = candidate;
                        best_gain = gain;
                    }
                }

                totals[best] += k;
                if best != own {
                    communities[node] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }

            let next = level.modularity(communities, self.resolution);
            if !next.is_finite() {
                return Err(DetectionError::NonFiniteModularity { level: depth });
            }
            if next - current < self.min_gain {
                break;
            }
            current = next;
        }

        Ok(())
    }

    /// Multi-level optimisation without the baseline comparison
    fn optimise(&self, graph: &SocialGraph) -> Result<Partition, DetectionError> {
        let node_count = graph.node_count();
        let mut level = LevelGraph::from_social(graph);

        if !level.total_weight.is_finite() {
            return Err(DetectionError::NonFiniteWeight);
        }
        if level.total_weight == 0.0 {
            return Ok(Partition::singletons(node_count));
        }

        // input node -> super-node at the current level
        let mut membership: Vec<usize> = (0..node_count).collect();
        let mut current = level.modularity(&membership, self.resolution);

        for depth in 0..self.max_levels {
            let mut communities: Vec<usize> = (0..level.len()).collect();
            self.one_level(&level, &mut communities, depth)?;

            let (communities, count) = renumber(&communities);
            let next = level.modularity(&communities, self.resolution);
            if !next.is_finite() {
                return Err(DetectionError::NonFiniteModularity { level: depth });
            }

            log::debug!(
                "Louvain level {}: {} -> {} communities, modularity {:.6}",
                depth,
                level.len(),
                count,
                next
            );

            if count == level.len() || next - current < self.min_gain {
                break;
            }

            for slot in membership.iter_mut() {
                *slot = communities[*slot];
            }
            level = level.induce(&communities, count);
            current = next;
        }

        Ok(Partition::from_assignments(membership))
    }
}

impl CommunityDetection for Louvain {
    /// Never scores below the all-in-one or all-singleton partitions.
    fn detect(&self, graph: &SocialGraph) -> Result<Partition, DetectionError> {
        let node_count = graph.node_count();
        let optimised = self.optimise(graph)?;
        if optimised.len() != node_count {
            return Err(DetectionError::IncompletePartition {
                assigned: optimised.len(),
                expected: node_count,
            });
        }

        let mut best_score = modularity(graph, &optimised);
        let mut best = optimised;
        for baseline in [
            Partition::single_community(node_count),
            Partition::singletons(node_count),
        ] {
            let score = modularity(graph, &baseline);
            if score > best_score + GAIN_EPSILON {
                best_score = score;
                best = baseline;
            }
        }

        log::info!(
            "Detected {} communities (modularity {:.4})",
            best.community_count(),
            best_score
        );

        Ok(best)
    }
}

/// Standard (γ = 1) modularity of a partition; 0 for an edgeless graph
pub fn modularity(graph: &SocialGraph, partition: &Partition) -> f64 {
    let communities: Vec<usize> = partition.assignments().iter().map(|&c| c as usize).collect();
    LevelGraph::from_social(graph).modularity(&communities, 1.0)
}
