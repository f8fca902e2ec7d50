//! [`CatalogClient`] backed by The Cat API.

use std::time::Duration;

use cat_mirror::{BreedId, BreedRecord, CatalogClient, ImageRecord, UpstreamError};
use serde::de::DeserializeOwned;

pub const DEFAULT_API_BASE_URL: &str = "https://api.thecatapi.com/v1";

const USER_AGENT: &str = "cat-mirror";
const API_KEY_HEADER: &str = "x-api-key";

/// Configuration for the upstream catalog client.
#[derive(Debug, Clone)]
pub struct CatApiConfig {
    pub api_key: String,
    pub api_base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl CatApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: None,
            timeout: None,
        }
    }
}

/// HTTP client for The Cat API. Every request carries the API key the
/// client was built with.
pub struct CatApiClient {
    config: CatApiConfig,
    client: reqwest::Client,
}

impl CatApiClient {
    pub fn new(config: CatApiConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| UpstreamError::Network(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(base_url = %api_base(&config), "cat api client initialized");
        Ok(Self { config, client })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<reqwest::Url, UpstreamError> {
        let raw = format!("{}{}", api_base(&self.config).trim_end_matches('/'), path);
        let parsed = if params.is_empty() {
            reqwest::Url::parse(&raw)
        } else {
            reqwest::Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| UpstreamError::Network(format!("invalid request url {raw}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = self.url(path, params)?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".into());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    async fn search_images(
        &self,
        filter: (&str, String),
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        self.get_json("/images/search", &[filter, ("limit", limit.to_string())])
            .await
    }
}

fn api_base(config: &CatApiConfig) -> &str {
    config
        .api_base_url
        .as_deref()
        .unwrap_or(DEFAULT_API_BASE_URL)
}

#[async_trait::async_trait]
impl CatalogClient for CatApiClient {
    async fn fetch_all_breeds(&self) -> Result<Vec<BreedRecord>, UpstreamError> {
        tracing::debug!("fetching all breeds");

        let result: Result<Vec<BreedRecord>, _> = self.get_json("/breeds", &[]).await;

        match &result {
            Ok(breeds) => tracing::info!(count = breeds.len(), "fetched breeds"),
            Err(e) => tracing::error!(error = %e, "error fetching breeds"),
        }
        result
    }

    async fn fetch_images_for_breed(
        &self,
        breed: &BreedId,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        tracing::debug!(%breed, limit, "fetching breed images");

        let result = self
            .search_images(("breed_ids", breed.to_string()), limit)
            .await;

        match &result {
            Ok(images) => tracing::info!(%breed, count = images.len(), "fetched breed images"),
            Err(e) => tracing::error!(%breed, error = %e, "error fetching breed images"),
        }
        result
    }

    async fn fetch_images_for_category(
        &self,
        category_code: u32,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        tracing::debug!(category_code, limit, "fetching category images");

        let result = self
            .search_images(("category_ids", category_code.to_string()), limit)
            .await;

        match &result {
            Ok(images) => {
                tracing::info!(category_code, count = images.len(), "fetched category images")
            }
            Err(e) => tracing::error!(category_code, error = %e, "error fetching category images"),
        }
        result
    }
}
