//! GitHub REST adapter

use super::{AdapterError, Profile, SourceAdapter};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Which user list is treated as the outbound edge set
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Relation {
    Following,
    Followers,
}

impl Relation {
    fn path_segment(self) -> &'static str {
        match self {
            Relation::Following => "following",
            Relation::Followers => "followers",
        }
    }
}

#[derive(Deserialize)]
struct UserResponse {
    followers: u64,
}

#[derive(Deserialize)]
struct UserRef {
    login: String,
}

pub struct GithubSource {
    client: Client,
    api_url: Url,
    token: Option<String>,
    relation: Relation,
    per_user_limit: usize,
}

impl GithubSource {
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("follow-graph-miner/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .build()?;

        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            anyhow::bail!("API url {} cannot carry a path", api_url);
        }

        Ok(Self {
            client,
            api_url,
            token: token.filter(|t| !t.is_empty()),
            relation: Relation::Following,
            per_user_limit: 10,
        })
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_per_user_limit(mut self, limit: usize) -> Self {
        self.per_user_limit = limit;
        self
    }

    /// `users/<identity>[/<tail>]` under the API root, each part encoded
    /// as a single path segment
    fn user_url(&self, identity: &str, tail: Option<&str>) -> Result<Url, AdapterError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AdapterError::Other(format!("bad API url {}", self.api_url)))?;
            segments.pop_if_empty().push("users").push(identity);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        identity: &str,
    ) -> Result<T, AdapterError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(AdapterError::NotFound(identity.to_string())),
            status if !status.is_success() => {
                return Err(AdapterError::Status {
                    code: status.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| AdapterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SourceAdapter for GithubSource {
    async fn fetch(&self, identity: &str) -> Result<Profile, AdapterError> {
        let user: UserResponse = self.get_json(self.user_url(identity, None)?, identity).await?;

        if self.per_user_limit == 0 {
            return Ok(Profile::new(user.followers, Vec::<String>::new()));
        }

        let mut url = self.user_url(identity, Some(self.relation.path_segment()))?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_user_limit.min(100).to_string());
        let refs: Vec<UserRef> = self.get_json(url, identity).await?;
        log::debug!("{} lists {} {}", identity, refs.len(), self.relation.path_segment());

        Ok(Profile::new(
            user.followers,
            refs.into_iter()
                .take(self.per_user_limit)
                .map(|r| r.login),
        ))
    }
}
