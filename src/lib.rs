//! Core library functions for the follow-graph miner

pub mod config;
pub mod error;
pub mod source;
pub mod crawl;
pub mod graph;
pub mod cluster;
pub mod pipeline;
pub mod report;
pub mod storage;

pub use anyhow::{Result, anyhow};
pub use config::Config;
pub use error::{FailureKind, MiningError};
pub use pipeline::{MiningResult, Pipeline};
