use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod models;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use models::{
    EpisodeSearchCommand, SeasonStatistics, SonarrCommandResponse, SonarrEpisode,
    SonarrQueuePage, SonarrQueueRecord, SonarrSeason, SonarrSeries,
};

const API_KEY_HEADER: &str = "X-Api-Key";
const QUEUE_PAGE_SIZE: u32 = 250;

#[derive(Debug, Error)]
pub enum SonarrError {
    #[error("invalid Sonarr url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to Sonarr failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sonarr responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// The subset of the Sonarr API the reconciler depends on.
#[async_trait]
pub trait LibraryManager: Send + Sync {
    /// Looks up a series by its TVDB id. `None` when Sonarr does not track it.
    async fn series_by_tvdb_id(&self, tvdb_id: u32) -> Result<Option<SonarrSeries>, SonarrError>;

    async fn episodes(&self, series_id: u64) -> Result<Vec<SonarrEpisode>, SonarrError>;

    async fn search_episodes(
        &self,
        episode_ids: &[u64],
    ) -> Result<SonarrCommandResponse, SonarrError>;

    async fn queue(&self) -> Result<Vec<SonarrQueueRecord>, SonarrError>;
}

#[derive(Clone)]
pub struct SonarrClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl SonarrClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, SonarrError> {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, SonarrError> {
        let mut base_url = Url::parse(base_url)?;

        // Url::join drops the last path segment unless it ends with a slash,
        // which breaks instances served under a sub-path.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SonarrError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SonarrError> {
        let url = self.endpoint(path)?;
        debug!(%method, %url, "sonarr request");

        Ok(self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SonarrError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SonarrError::Status { status, body });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl LibraryManager for SonarrClient {
    async fn series_by_tvdb_id(&self, tvdb_id: u32) -> Result<Option<SonarrSeries>, SonarrError> {
        let request = self
            .request(Method::GET, "api/v3/series")?
            .query(&[("tvdbId", tvdb_id)]);

        let series: Vec<SonarrSeries> = Self::send(request).await?;

        Ok(series.into_iter().next())
    }

    async fn episodes(&self, series_id: u64) -> Result<Vec<SonarrEpisode>, SonarrError> {
        let request = self
            .request(Method::GET, "api/v3/episode")?
            .query(&[("seriesId", series_id)]);

        Self::send(request).await
    }

    async fn search_episodes(
        &self,
        episode_ids: &[u64],
    ) -> Result<SonarrCommandResponse, SonarrError> {
        let request = self
            .request(Method::POST, "api/v3/command")?
            .json(&EpisodeSearchCommand::new(episode_ids));

        Self::send(request).await
    }

    async fn queue(&self) -> Result<Vec<SonarrQueueRecord>, SonarrError> {
        let request = self
            .request(Method::GET, "api/v3/queue")?
            .query(&[("page", 1), ("pageSize", QUEUE_PAGE_SIZE)]);

        let page: SonarrQueuePage = Self::send(request).await?;

        Ok(page.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoints_onto_root_url() {
        let client = SonarrClient::new("http://localhost:8989", "key").unwrap();

        assert_eq!(
            client.endpoint("api/v3/series").unwrap().as_str(),
            "http://localhost:8989/api/v3/series"
        );
    }

    #[test]
    fn keeps_sub_path_of_base_url() {
        let client = SonarrClient::new("https://media.example.org/sonarr", "key").unwrap();

        assert_eq!(client.base_url().as_str(), "https://media.example.org/sonarr/");
        assert_eq!(
            client.endpoint("api/v3/command").unwrap().as_str(),
            "https://media.example.org/sonarr/api/v3/command"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = SonarrClient::new("not a url", "key");

        assert!(matches!(result, Err(SonarrError::Url(_))));
    }
}
