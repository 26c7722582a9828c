//! Community naming after the most central member

use crate::cluster::{CentralityMap, Partition};
use std::collections::BTreeMap;

/// Display label per community id
pub type CommunityLabels = BTreeMap<u32, String>;

pub fn community_label(leader: &str) -> String {
    format!("The {} Cluster", leader)
}

/// Highest-centrality node of each community. Ties go to the
/// lexicographically smallest identity.
pub fn leaders(
    node_ids: &[String],
    partition: &Partition,
    centrality: &CentralityMap,
) -> BTreeMap<u32, usize> {
    let mut leaders: BTreeMap<u32, usize> = BTreeMap::new();

    for (node, &community) in partition.assignments().iter().enumerate() {
        let score = centrality.score(node);
        leaders
            .entry(community)
            .and_modify(|current| {
                let current_score = centrality.score(*current);
                if score > current_score
                    || (score == current_score && node_ids[node] < node_ids[*current])
                {
                    *current = node;
                }
            })
            .or_insert(node);
    }

    leaders
}

/// Label every community present in the partition
pub fn name_communities(
    node_ids: &[String],
    partition: &Partition,
    centrality: &CentralityMap,
) -> CommunityLabels {
    leaders(node_ids, partition, centrality)
        .into_iter()
        .map(|(community, leader)| (community, community_label(&node_ids[leader])))
        .collect()
}
