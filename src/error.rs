//! Error types surfaced by the mining pipeline

use thiserror::Error;

/// Pipeline stage names carried by unexpected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Crawl,
    Build,
    Analyze,
    Assemble,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Crawl => "crawl",
            Stage::Build => "build",
            Stage::Analyze => "analyze",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Failures that end a pipeline run
#[derive(Error, Debug)]
pub enum MiningError {
    #[error("no connections found for '{seed}'")]
    NoData { seed: String },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("run for '{seed}' was cancelled")]
    Cancelled { seed: String },

    #[error("unexpected failure for '{seed}' during {stage}: {message}")]
    Unexpected {
        seed: String,
        stage: Stage,
        message: String,
    },
}

/// Coarse classification a serving layer maps to response semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoData,
    Cancelled,
    Internal,
}

impl MiningError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MiningError::NoData { .. } => FailureKind::NoData,
            MiningError::Cancelled { .. } => FailureKind::Cancelled,
            MiningError::EmptyGraph | MiningError::Unexpected { .. } => FailureKind::Internal,
        }
    }

    pub(crate) fn unexpected(seed: &str, stage: Stage, message: impl Into<String>) -> Self {
        MiningError::Unexpected {
            seed: seed.to_string(),
            stage,
            message: message.into(),
        }
    }
}

/// Internal community-detection failure; the pipeline degrades instead of failing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("graph total weight is not finite")]
    NonFiniteWeight,

    #[error("modularity became non-finite at level {level}")]
    NonFiniteModularity { level: usize },

    #[error("partition covers {assigned} nodes, graph has {expected}")]
    IncompletePartition { assigned: usize, expected: usize },
}
