//! Read-only projections of an analysis for presentation code

use crate::cluster::{modularity, Partition};
use crate::graph::algorithms::{component_count, density};
use crate::pipeline::Analysis;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;

/// Identities ranked by descending centrality, ties by identity
pub fn top_influencers(analysis: &Analysis, n: usize) -> Vec<(String, f64)> {
    let ids = analysis.graph.node_ids();
    analysis
        .centrality
        .scores()
        .iter()
        .enumerate()
        .sorted_by(|(a, sa), (b, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ids[*a].cmp(&ids[*b]))
        })
        .take(n)
        .map(|(node, &score)| (ids[node].clone(), score))
        .collect()
}

/// Member count per community, largest first, ties by community id
pub fn community_sizes(partition: &Partition) -> Vec<(u32, usize)> {
    partition
        .assignments()
        .iter()
        .copied()
        .counts()
        .into_iter()
        .sorted_by(|(ca, a), (cb, b)| b.cmp(a).then(ca.cmp(cb)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedMember {
    pub id: String,
    pub centrality: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommunitySummary {
    pub id: u32,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub seed: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub density: f64,
    pub community_count: usize,
    pub modularity: f64,
    pub detection_degraded: bool,
    pub crawl_failures: usize,
    pub top_influencers: Vec<RankedMember>,
    pub communities: Vec<CommunitySummary>,
}

impl Summary {
    pub fn from_analysis(analysis: &Analysis, top_n: usize) -> Self {
        let communities = community_sizes(&analysis.partition)
            .into_iter()
            .map(|(id, size)| CommunitySummary {
                id,
                name: analysis.labels[&id].clone(),
                size,
            })
            .collect();

        Self {
            seed: analysis.seed.clone(),
            node_count: analysis.graph.node_count(),
            edge_count: analysis.graph.edge_count(),
            component_count: component_count(&analysis.graph),
            density: density(&analysis.graph),
            community_count: analysis.partition.community_count(),
            modularity: modularity(&analysis.graph, &analysis.partition),
            detection_degraded: analysis.detection_degraded,
            crawl_failures: analysis.crawl_failures,
            top_influencers: top_influencers(analysis, top_n)
                .into_iter()
                .map(|(id, centrality)| RankedMember { id, centrality })
                .collect(),
            communities,
        }
    }
}

/// Text report of the strongest influencers and largest communities
pub fn log_summary(summary: &Summary) {
    log::info!("{}", "=".repeat(50));
    log::info!("FOLLOW GRAPH REPORT for {}", summary.seed);
    log::info!(
        "Nodes: {} | Edges: {} | Components: {} | Modularity: {:.4}",
        summary.node_count,
        summary.edge_count,
        summary.component_count,
        summary.modularity
    );

    log::info!("Top {} influencers:", summary.top_influencers.len());
    for (rank, member) in summary.top_influencers.iter().enumerate() {
        log::info!("   {}. {} (score: {:.4})", rank + 1, member.id, member.centrality);
    }

    log::info!("Largest communities:");
    for community in summary.communities.iter().take(3) {
        log::info!("   - {}: {} members", community.name, community.size);
    }

    if summary.detection_degraded {
        log::warn!("Community detection degraded to a single community");
    }
    log::info!("{}", "=".repeat(50));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_sizes_rank_largest_first() {
        let partition = Partition::from_assignments([0, 1, 1, 2, 1, 2]);
        assert_eq!(community_sizes(&partition), vec![(1, 3), (2, 2), (0, 1)]);
    }

    #[test]
    fn equal_sizes_order_by_id() {
        let partition = Partition::from_assignments([0, 1, 2]);
        assert_eq!(community_sizes(&partition), vec![(0, 1), (1, 1), (2, 1)]);
    }
}
