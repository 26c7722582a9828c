//! Source adapter boundary: resolves an identity's outbound follow edges

pub mod github;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::{GithubSource, Relation};
pub use memory::StaticSource;

/// What the adapter knows about one identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Number of followers reported by the provider
    pub follower_count: u64,

    /// Identities this one follows
    #[serde(default)]
    pub outbound: Vec<String>,
}

impl Profile {
    pub fn new<I, S>(follower_count: u64, outbound: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            follower_count,
            outbound: outbound.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-node fetch failure. Absorbed by the crawler, never surfaced to callers.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity '{0}' not found")]
    NotFound(String),

    #[error("provider answered with status {code}")]
    Status { code: u16 },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// Capability the crawler depends on; never a concrete client
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, identity: &str) -> Result<Profile, AdapterError>;
}

#[async_trait]
impl<T: SourceAdapter + ?Sized> SourceAdapter for std::sync::Arc<T> {
    async fn fetch(&self, identity: &str) -> Result<Profile, AdapterError> {
        (**self).fetch(identity).await
    }
}
