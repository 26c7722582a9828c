//! Compressed undirected simple graph

use std::collections::HashMap;

/// Undirected simple graph in compressed sparse row form.
///
/// Every undirected edge appears twice in `neighbors` (once per endpoint)
/// and once in `edges`, oriented the way it was first discovered.
/// Node indices are assigned in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialGraph {
    /// Offset array: offsets[i] to offsets[i+1] is the neighbor range of node i
    pub(crate) offsets: Vec<u32>,

    /// Concatenated, sorted neighbor lists
    pub(crate) neighbors: Vec<u32>,

    /// Identity of each node
    pub(crate) node_ids: Vec<String>,

    /// Deduplicated undirected edges in discovery order
    pub(crate) edges: Vec<(u32, u32)>,

    /// Mapping from identities to node indices
    pub(crate) index: HashMap<String, u32>,
}

impl SocialGraph {
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn node_id(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    pub fn index_of(&self, identity: &str) -> Option<usize> {
        self.index.get(identity).map(|&idx| idx as usize)
    }

    /// Neighbors of a node, sorted by index
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.neighbors[start..end]
    }

    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&(b as u32)).is_ok()
    }

    /// Edges as index pairs
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Edges as identity pairs, in discovery order
    pub fn edge_ids(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| (self.node_id(a as usize), self.node_id(b as usize)))
    }
}
