//! Community detection, centrality and naming

pub mod louvain;
pub mod metrics;
pub mod naming;

use crate::error::DetectionError;
use crate::graph::SocialGraph;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub use louvain::{modularity, Louvain};
pub use metrics::PageRank;
pub use naming::{name_communities, CommunityLabels};

/// Community id per node, indexed like the graph's nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    communities: Vec<u32>,
}

impl Partition {
    /// Ids are renumbered densely in first-seen order; only grouping matters
    pub fn from_assignments<I: IntoIterator<Item = usize>>(assignments: I) -> Self {
        let mut dense: BTreeMap<usize, u32> = BTreeMap::new();
        let communities = assignments
            .into_iter()
            .map(|raw| {
                let next = dense.len() as u32;
                *dense.entry(raw).or_insert(next)
            })
            .collect();
        Self { communities }
    }

    /// Every node in community 0
    pub fn single_community(node_count: usize) -> Self {
        Self {
            communities: vec![0; node_count],
        }
    }

    /// Every node in its own community
    pub fn singletons(node_count: usize) -> Self {
        Self {
            communities: (0..node_count as u32).collect(),
        }
    }

    pub fn community_of(&self, node: usize) -> u32 {
        self.communities[node]
    }

    pub fn assignments(&self) -> &[u32] {
        &self.communities
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    pub fn community_count(&self) -> usize {
        self.members().len()
    }

    /// Node indices grouped by community, ascending
    pub fn members(&self) -> BTreeMap<u32, Vec<usize>> {
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (node, &community) in self.communities.iter().enumerate() {
            groups.entry(community).or_default().push(node);
        }
        groups
    }
}

/// Centrality per node, indexed like the graph's nodes; sums to 1
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityMap {
    scores: Vec<f64>,
}

impl CentralityMap {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        Self { scores }
    }

    pub fn score(&self, node: usize) -> f64 {
        self.scores[node]
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }
}

/// A modularity-based partitioning strategy
pub trait CommunityDetection: Send + Sync {
    fn detect(&self, graph: &SocialGraph) -> Result<Partition, DetectionError>;
}

/// Run a detector, substituting the single-community partition if it fails.
///
/// The flag is true when the fallback was used. A panicking detector is
/// treated the same as one that returns an error.
pub fn detect_or_degrade(detector: &dyn CommunityDetection, graph: &SocialGraph) -> (Partition, bool) {
    let outcome = match catch_unwind(AssertUnwindSafe(|| detector.detect(graph))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::warn!(
                "DetectionDegraded: detector panicked ({}); using a single community",
                message
            );
            return (Partition::single_community(graph.node_count()), true);
        }
    };

    match outcome {
        Ok(partition) if partition.len() == graph.node_count() => (partition, false),
        Ok(partition) => {
            log::warn!(
                "DetectionDegraded: {}",
                DetectionError::IncompletePartition {
                    assigned: partition.len(),
                    expected: graph.node_count(),
                }
            );
            (Partition::single_community(graph.node_count()), true)
        }
        Err(e) => {
            log::warn!("DetectionDegraded: {}; using a single community", e);
            (Partition::single_community(graph.node_count()), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl CommunityDetection for Broken {
        fn detect(&self, _graph: &SocialGraph) -> Result<Partition, DetectionError> {
            Err(DetectionError::NonFiniteWeight)
        }
    }

    struct Panics;

    impl CommunityDetection for Panics {
        fn detect(&self, graph: &SocialGraph) -> Result<Partition, DetectionError> {
            let empty: Vec<u32> = Vec::new();
            let community = empty[graph.node_count()];
            Ok(Partition::single_community(community as usize))
        }
    }

    #[test]
    fn from_assignments_renumbers_in_first_seen_order() {
        let partition = Partition::from_assignments([7, 7, 3, 9, 3]);
        assert_eq!(partition.assignments(), &[0, 0, 1, 2, 1]);
        assert_eq!(partition.community_count(), 3);
        assert_eq!(partition.members()[&1], vec![2, 4]);
    }

    #[test]
    fn failing_detector_degrades_to_single_community() {
        let mut builder = crate::graph::GraphBuilder::with_capacity(4);
        builder.add_edge("a", "b");
        builder.add_edge("c", "d");
        let graph = builder.build().unwrap();

        let (partition, degraded) = detect_or_degrade(&Broken, &graph);
        assert!(degraded);
        assert_eq!(partition.assignments(), &[0, 0, 0, 0]);
    }

    #[test]
    fn panicking_detector_degrades_to_single_community() {
        let mut builder = crate::graph::GraphBuilder::with_capacity(3);
        builder.add_edge("a", "b");
        builder.add_edge("a", "c");
        let graph = builder.build().unwrap();

        let (partition, degraded) = detect_or_degrade(&Panics, &graph);
        assert!(degraded);
        assert_eq!(partition.assignments(), &[0, 0, 0]);
    }
}
