//! Graph construction module

use crate::crawl::Edge;
use crate::error::MiningError;
use crate::graph::SocialGraph;
use std::collections::{HashMap, HashSet};

/// Builder for incrementally constructing a SocialGraph from raw follow edges
pub struct GraphBuilder {
    /// Mapping from identities to node indices
    id_to_index: HashMap<String, u32>,

    /// Node identities in first-seen order
    node_ids: Vec<String>,

    /// Undirected pairs already recorded, keyed (min, max)
    seen: HashSet<(u32, u32)>,

    /// Deduplicated edges in discovery order
    edges: Vec<(u32, u32)>,

    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given edge capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            edges: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Get or create a node index for the given identity
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add an undirected edge; duplicates and self-loops are dropped
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str) {
        if src_id == dst_id {
            return;
        }

        let src_idx = self.get_or_create_node(src_id);
        let dst_idx = self.get_or_create_node(dst_id);

        let key = (src_idx.min(dst_idx), src_idx.max(dst_idx));
        if !self.seen.insert(key) {
            return;
        }

        self.edges.push((src_idx, dst_idx));
        self.adjacency_lists[src_idx as usize].push(dst_idx);
        self.adjacency_lists[dst_idx as usize].push(src_idx);
    }

    /// Build the compressed graph
    pub fn build(mut self) -> Result<SocialGraph, MiningError> {
        if self.node_ids.is_empty() {
            return Err(MiningError::EmptyGraph);
        }

        let mut offsets = Vec::with_capacity(self.node_ids.len() + 1);
        offsets.push(0);

        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            offsets.push(offset);
        }

        let mut neighbors = Vec::with_capacity(offset as usize);
        for list in &mut self.adjacency_lists {
            // Sorted for binary search in has_edge
            list.sort_unstable();
            neighbors.extend_from_slice(list);
        }

        Ok(SocialGraph {
            offsets,
            neighbors,
            node_ids: self.node_ids,
            edges: self.edges,
            index: self.id_to_index,
        })
    }
}

/// Collapse raw directed edges into an undirected simple graph
pub fn build_graph(edges: &[Edge]) -> Result<SocialGraph, MiningError> {
    let mut builder = GraphBuilder::with_capacity(edges.len());
    for edge in edges {
        builder.add_edge(&edge.source, &edge.target);
    }

    let graph = builder.build()?;
    log::info!(
        "Built graph with {} nodes and {} edges from {} raw edges",
        graph.node_count(),
        graph.edge_count(),
        edges.len()
    );

    Ok(graph)
}
