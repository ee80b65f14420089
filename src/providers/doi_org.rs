use async_trait::async_trait;
use log::debug;
use reqwest::{redirect, Client};
use std::time::Duration;

use crate::app_config::ResolverConfig;
use crate::errors::ResolverError;
use crate::providers::Resolver;

/// DOI resolver client (doi.org or a compatible mirror)
#[derive(Debug, Clone)]
pub struct DoiOrg {
    /// HTTP client with redirects disabled
    client: Client,
    /// Resolver base URL, without trailing slash
    base_url: String,
}

impl DoiOrg {
    /// Create a client from the resolver configuration
    ///
    /// Some resolvers reject the default client signature, so the configured
    /// browser user agent is always sent.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.concurrent_requests)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Resolver for DoiOrg {
    async fn status(&self, doi: &str) -> Result<u16, ResolverError> {
        let url = self.url_for(doi);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolverError::DoiCheckNetworkError(format!("timed out: {}", url))
            } else {
                ResolverError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        debug!("{} -> {}", url, status);
        Ok(status)
    }

    fn url_for(&self, doi: &str) -> String {
        format!("{}/{}", self.base_url, doi)
    }
}
