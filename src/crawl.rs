//! Bounded breadth-first crawl over a source adapter

use crate::config::Config;
use crate::error::MiningError;
use crate::source::SourceAdapter;
use dashmap::DashSet;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;

/// Raw "source follows target" edge as discovered by the crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Follower count per identity; absent identities count as zero
pub type PopularityMap = HashMap<String, u64>;

pub fn popularity_of(popularity: &PopularityMap, identity: &str) -> u64 {
    popularity.get(identity).copied().unwrap_or(0)
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOutput {
    pub edges: Vec<Edge>,
    pub popularity: PopularityMap,

    /// Identities that consumed budget, in visit order
    pub visited: Vec<String>,

    /// Number of visited identities whose fetch failed
    pub failures: usize,
}

pub struct Crawler<S> {
    source: S,
    node_budget: usize,
    max_concurrency: usize,
}

impl<S: SourceAdapter> Crawler<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            node_budget: config.node_budget,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Crawl to completion. Never fails; a dead seed yields an empty output.
    pub async fn crawl(&self, seed: &str) -> CrawlOutput {
        self.traverse(seed, None).await.0
    }

    /// Crawl until done or until `cancel` fires
    pub async fn crawl_with_cancel(
        &self,
        seed: &str,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutput, MiningError> {
        let (output, cancelled) = self.traverse(seed, Some(cancel)).await;
        if cancelled {
            info!(
                "Crawl for {} cancelled after {} nodes",
                seed,
                output.visited.len()
            );
            return Err(MiningError::Cancelled {
                seed: seed.to_string(),
            });
        }
        Ok(output)
    }

    async fn traverse(&self, seed: &str, cancel: Option<&CancellationToken>) -> (CrawlOutput, bool) {
        info!("Crawling started for {} (budget {})", seed, self.node_budget);

        let mut output = CrawlOutput::default();
        let visited: DashSet<String> = DashSet::new();
        let mut frontier = VecDeque::from([seed.to_string()]);

        while !frontier.is_empty() && visited.len() < self.node_budget {
            if cancel.is_some_and(|token| token.is_cancelled()) {
                return (output, true);
            }

            // Claim up to max_concurrency unvisited nodes without exceeding the budget
            let room = self.node_budget - visited.len();
            let mut batch = Vec::with_capacity(self.max_concurrency.min(room));
            while batch.len() < self.max_concurrency.min(room) {
                let Some(node) = frontier.pop_front() else {
                    break;
                };
                // insert is the atomic check-and-mark; revisits cost nothing
                if visited.insert(node.clone()) {
                    batch.push(node);
                }
            }

            if batch.is_empty() {
                continue;
            }

            let fetches = join_all(batch.iter().map(|node| self.source.fetch(node)));
            let results = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return (output, true),
                    results = fetches => results,
                },
                None => fetches.await,
            };

            for (node, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(profile) => {
                        debug!("Found {} connections for {}", profile.outbound.len(), node);
                        output.popularity.insert(node.clone(), profile.follower_count);

                        for target in profile.outbound {
                            output.edges.push(Edge::new(&node, &target));
                            if !visited.contains(&target) {
                                frontier.push_back(target);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("No data for {}: {}", node, e);
                        output.failures += 1;
                    }
                }
                output.visited.push(node);
            }
        }

        info!(
            "Crawl finished: {} visited, {} raw edges, {} failed fetches, {} left in frontier",
            output.visited.len(),
            output.edges.len(),
            output.failures,
            frontier.len()
        );

        (output, false)
    }
}
