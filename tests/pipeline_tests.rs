// End-to-end tests for the mining pipeline over stubbed sources

use follow_graph_miner::cluster::{CommunityDetection, Partition};
use follow_graph_miner::error::DetectionError;
use follow_graph_miner::graph::SocialGraph;
use follow_graph_miner::report::{community_sizes, top_influencers, Summary};
use follow_graph_miner::source::StaticSource;
use follow_graph_miner::{Config, FailureKind, MiningError, MiningResult, Pipeline};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

fn small_source() -> StaticSource {
    StaticSource::new()
        .with_profile("A", 120, ["B", "C"])
        .with_profile("B", 8, ["A"])
        .with_profile("C", 3, Vec::<String>::new())
}

/// Two triangles joined through a single hub edge pair
fn two_cluster_source() -> StaticSource {
    StaticSource::new()
        .with_profile("hub", 50, ["a1", "b1"])
        .with_profile("a1", 5, ["a2", "a3", "hub"])
        .with_profile("a2", 4, ["a3", "a1"])
        .with_profile("a3", 3, ["a1"])
        .with_profile("b1", 5, ["b2", "b3"])
        .with_profile("b2", 2, ["b3"])
        .with_profile("b3", 1, ["b1"])
}

struct AlwaysFails;

impl CommunityDetection for AlwaysFails {
    fn detect(&self, _graph: &SocialGraph) -> Result<Partition, DetectionError> {
        Err(DetectionError::NonFiniteModularity { level: 0 })
    }
}

struct PanickingDetector;

impl CommunityDetection for PanickingDetector {
    fn detect(&self, graph: &SocialGraph) -> Result<Partition, DetectionError> {
        let empty: Vec<usize> = Vec::new();
        Ok(Partition::from_assignments([empty[graph.node_count()]]))
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_small_follow_graph() {
    let result = Pipeline::new(small_source(), Config::new(10))
        .run("A")
        .await
        .unwrap();

    let nodes: BTreeSet<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(nodes, BTreeSet::from(["A", "B", "C"]));

    let edges: BTreeSet<(&str, &str)> = result
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(edges, BTreeSet::from([("A", "B"), ("A", "C")]));

    let a = &result.nodes[0];
    assert!(result.nodes.iter().all(|n| a.centrality_value >= n.centrality_value));
    assert!(result.nodes.iter().all(|n| n.group == a.group));
    assert!(result.nodes.iter().all(|n| n.group_name == "The A Cluster"));
    assert_eq!(a.popularity, 120);
}

#[tokio::test]
async fn test_empty_seed_is_no_data() {
    let source = StaticSource::new().with_profile("A", 0, Vec::<String>::new());
    let err = Pipeline::new(source, Config::default())
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, MiningError::NoData { ref seed } if seed == "A"));
    assert_eq!(err.kind(), FailureKind::NoData);
}

#[tokio::test]
async fn test_unknown_seed_is_no_data() {
    let err = Pipeline::new(StaticSource::new(), Config::default())
        .run("ghost")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::NoData);
}

#[tokio::test]
async fn test_detection_failure_degrades_without_failing() {
    let pipeline = Pipeline::new(two_cluster_source(), Config::new(20)).with_detector(AlwaysFails);

    let analysis = pipeline
        .analyze("hub", &CancellationToken::new())
        .await
        .unwrap();

    assert!(analysis.detection_degraded);
    assert!(analysis.partition.assignments().iter().all(|&c| c == 0));
    assert_eq!(analysis.labels.len(), 1);
}

#[tokio::test]
async fn test_panicking_detector_degrades_without_failing() {
    let pipeline = Pipeline::new(small_source(), Config::new(10)).with_detector(PanickingDetector);

    let analysis = pipeline
        .analyze("A", &CancellationToken::new())
        .await
        .unwrap();

    assert!(analysis.detection_degraded);
    assert_eq!(analysis.partition.assignments(), &[0, 0, 0]);

    let summary = Summary::from_analysis(&analysis, 5);
    assert_eq!(summary.communities.len(), 1);
    assert_eq!(summary.communities[0].name, "The A Cluster");

    let result = analysis.to_result(1000.0);
    assert!(result.nodes.iter().all(|n| n.group_name == "The A Cluster"));
}

#[tokio::test]
async fn test_two_clusters_are_named_after_their_leaders() {
    let pipeline = Pipeline::new(two_cluster_source(), Config::new(20));
    let analysis = pipeline
        .analyze("hub", &CancellationToken::new())
        .await
        .unwrap();

    assert!(!analysis.detection_degraded);
    let graph = &analysis.graph;
    let group = |id: &str| analysis.partition.community_of(graph.index_of(id).unwrap());

    assert_eq!(group("a2"), group("a3"));
    assert_eq!(group("b2"), group("b3"));
    assert_ne!(group("a2"), group("b2"));

    // Every label names a member with maximal centrality in its community
    for (community, members) in analysis.partition.members() {
        let label = &analysis.labels[&community];
        let best = members
            .iter()
            .map(|&m| analysis.centrality.score(m))
            .fold(f64::MIN, f64::max);
        let leader = members
            .iter()
            .find(|&&m| label == &format!("The {} Cluster", graph.node_id(m)))
            .expect("leader is a member");
        assert!(analysis.centrality.score(*leader) >= best);
    }
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn test_centrality_is_a_distribution() {
    let analysis = Pipeline::new(two_cluster_source(), Config::new(20))
        .analyze("hub", &CancellationToken::new())
        .await
        .unwrap();

    let n = analysis.graph.node_count() as f64;
    assert!(analysis.centrality.scores().iter().all(|&s| s >= 0.0));
    assert!((analysis.centrality.total() - 1.0).abs() < 1e-6 * n);
    assert!(analysis.partition.community_count() <= analysis.graph.node_count());
    assert_eq!(analysis.partition.len(), analysis.graph.node_count());
}

#[tokio::test]
async fn test_reporting_projections() {
    let analysis = Pipeline::new(small_source(), Config::new(10))
        .analyze("A", &CancellationToken::new())
        .await
        .unwrap();

    let top = top_influencers(&analysis, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].0, "A");
    assert!(top[0].1 >= top[1].1);
    // B and C tie on score, so identity order decides
    assert_eq!(top[1].0, "B");

    assert_eq!(community_sizes(&analysis.partition), vec![(0, 3)]);

    let summary = Summary::from_analysis(&analysis, 5);
    assert_eq!(summary.node_count, 3);
    assert_eq!(summary.edge_count, 2);
    assert_eq!(summary.component_count, 1);
    assert_eq!(summary.communities[0].name, "The A Cluster");
}

#[tokio::test]
async fn test_result_json_round_trip() {
    let result = Pipeline::new(two_cluster_source(), Config::new(20))
        .run("hub")
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: MiningResult = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, result);
}

#[tokio::test]
async fn test_cancelled_run_reports_cancellation() {
    let token = CancellationToken::new();
    token.cancel();

    let pipeline = Pipeline::new(small_source(), Config::default());
    let err = pipeline.run_with_cancel("A", &token).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Cancelled);
    assert!(pipeline.source().requests().is_empty());
}
