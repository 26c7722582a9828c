//! In-memory source adapter backed by a fixed identity mapping

use super::{AdapterError, Profile, SourceAdapter};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

/// Serves profiles from a map. Used for fixtures and tests.
#[derive(Debug, Default)]
pub struct StaticSource {
    profiles: HashMap<String, Profile>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: HashMap<String, Profile>) -> Self {
        Self {
            profiles,
            ..Self::default()
        }
    }

    /// Parse a JSON object of `{ "<identity>": { "follower_count": n, "outbound": [...] } }`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let profiles: HashMap<String, Profile> = serde_json::from_str(json)?;
        Ok(Self::from_profiles(profiles))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading fixture file: {}", path.display());

        if !path.exists() {
            return Err(anyhow::anyhow!("File not found: {}", path.display()));
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_profile<I, S>(mut self, identity: &str, follower_count: u64, outbound: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles
            .insert(identity.to_string(), Profile::new(follower_count, outbound));
        self
    }

    /// Make every fetch for `identity` fail with a provider error
    pub fn with_failure(mut self, identity: &str) -> Self {
        self.failing.insert(identity.to_string());
        self
    }

    /// Identities fetched so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SourceAdapter for StaticSource {
    async fn fetch(&self, identity: &str) -> Result<Profile, AdapterError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(identity.to_string());
        }

        if self.failing.contains(identity) {
            return Err(AdapterError::Status { code: 503 });
        }

        self.profiles
            .get(identity)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(identity.to_string()))
    }
}
