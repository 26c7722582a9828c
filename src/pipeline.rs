//! Pipeline orchestration: crawl, build, analyze, assemble

use crate::cluster::naming::name_communities;
use crate::cluster::{
    detect_or_degrade, CentralityMap, CommunityDetection, CommunityLabels, Louvain, PageRank,
    Partition,
};
use crate::config::Config;
use crate::crawl::{popularity_of, Crawler, PopularityMap};
use crate::error::{MiningError, Stage};
use crate::graph::{build_graph, SocialGraph};
use crate::source::SourceAdapter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One graph node as handed to the serving layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultNode {
    pub id: String,
    pub group: u32,
    pub group_name: String,

    /// Centrality scaled for display
    #[serde(rename = "val")]
    pub centrality_value: f64,

    /// Follower count, 0 when the crawl recorded none
    #[serde(rename = "followers")]
    pub popularity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEdge {
    pub source: String,
    pub target: String,
}

/// Externally visible outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningResult {
    pub nodes: Vec<ResultNode>,

    #[serde(rename = "links")]
    pub edges: Vec<ResultEdge>,
}

/// Everything computed for one seed, before projection to a `MiningResult`
#[derive(Debug, Clone)]
pub struct Analysis {
    pub seed: String,
    pub graph: SocialGraph,
    pub partition: Partition,
    pub centrality: CentralityMap,
    pub labels: CommunityLabels,
    pub popularity: PopularityMap,
    pub detection_degraded: bool,
    pub crawl_failures: usize,
}

impl Analysis {
    pub fn to_result(&self, score_scale: f64) -> MiningResult {
        let nodes = self
            .graph
            .node_ids()
            .iter()
            .enumerate()
            .map(|(node, id)| {
                let group = self.partition.community_of(node);
                ResultNode {
                    id: id.clone(),
                    group,
                    group_name: self.labels[&group].clone(),
                    centrality_value: self.centrality.score(node) * score_scale,
                    popularity: popularity_of(&self.popularity, id),
                }
            })
            .collect();

        let edges = self
            .graph
            .edge_ids()
            .map(|(source, target)| ResultEdge {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect();

        MiningResult { nodes, edges }
    }
}

pub struct Pipeline<S> {
    crawler: Crawler<S>,
    detector: Arc<dyn CommunityDetection>,
    pagerank: PageRank,
    config: Config,
}

impl<S: SourceAdapter> Pipeline<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self {
            crawler: Crawler::new(source, &config),
            detector: Arc::new(Louvain::default()),
            pagerank: PageRank::from_config(&config),
            config,
        }
    }

    /// Swap the community detection strategy
    pub fn with_detector<D: CommunityDetection + 'static>(mut self, detector: D) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        self.crawler.source()
    }

    pub async fn run(&self, seed: &str) -> Result<MiningResult, MiningError> {
        self.run_with_cancel(seed, &CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
        &self,
        seed: &str,
        cancel: &CancellationToken,
    ) -> Result<MiningResult, MiningError> {
        let analysis = self.analyze(seed, cancel).await?;
        Ok(analysis.to_result(self.config.score_scale))
    }

    pub async fn analyze(
        &self,
        seed: &str,
        cancel: &CancellationToken,
    ) -> Result<Analysis, MiningError> {
        let crawl = self.crawler.crawl_with_cancel(seed, cancel).await?;
        if crawl.edges.is_empty() {
            return Err(MiningError::NoData {
                seed: seed.to_string(),
            });
        }

        let graph = build_graph(&crawl.edges)?;

        // Detection and scoring share the immutable graph and run side by side
        let detector = Arc::clone(&self.detector);
        let pagerank = self.pagerank.clone();
        let (graph, (partition, detection_degraded), centrality) =
            tokio::task::spawn_blocking(move || {
                let (detected, centrality) = rayon::join(
                    || detect_or_degrade(detector.as_ref(), &graph),
                    || pagerank.score(&graph),
                );
                (graph, detected, centrality)
            })
            .await
            .map_err(|e| MiningError::unexpected(seed, Stage::Analyze, e.to_string()))?;

        if cancel.is_cancelled() {
            return Err(MiningError::Cancelled {
                seed: seed.to_string(),
            });
        }

        if partition.len() != graph.node_count() || centrality.len() != graph.node_count() {
            return Err(MiningError::unexpected(
                seed,
                Stage::Assemble,
                format!(
                    "{} nodes but {} community and {} centrality entries",
                    graph.node_count(),
                    partition.len(),
                    centrality.len()
                ),
            ));
        }

        let labels = name_communities(graph.node_ids(), &partition, &centrality);

        log::info!(
            "Analysis for {} complete: {} nodes, {} edges, {} communities",
            seed,
            graph.node_count(),
            graph.edge_count(),
            labels.len()
        );

        Ok(Analysis {
            seed: seed.to_string(),
            graph,
            partition,
            centrality,
            labels,
            popularity: crawl.popularity,
            detection_degraded,
            crawl_failures: crawl.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    #[tokio::test]
    async fn result_mirrors_graph_order() {
        let source = StaticSource::new()
            .with_profile("A", 10, ["B", "C"])
            .with_profile("B", 4, ["A"])
            .with_profile("C", 0, Vec::<String>::new());

        let result = Pipeline::new(source, Config::new(10)).run("A").await.unwrap();

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(
            result.edges,
            vec![
                ResultEdge { source: "A".into(), target: "B".into() },
                ResultEdge { source: "A".into(), target: "C".into() },
            ]
        );
        assert_eq!(result.nodes[0].popularity, 10);
        assert_eq!(result.nodes[2].popularity, 0);
    }

    #[test]
    fn wire_format_uses_frontend_field_names() {
        let result = MiningResult {
            nodes: vec![ResultNode {
                id: "A".into(),
                group: 0,
                group_name: "The A Cluster".into(),
                centrality_value: 500.0,
                popularity: 3,
            }],
            edges: vec![ResultEdge { source: "A".into(), target: "B".into() }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["nodes"][0]["val"], 500.0);
        assert_eq!(json["nodes"][0]["followers"], 3);
        assert_eq!(json["links"][0]["target"], "B");
    }
}
