use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::BusinessQuery,
    error::ApiError,
    protocol::{AnalyzeBusinessRequest, BusinessAnalysis, HeadlineResponse, RegenerateHeadlineQuery},
};
use tracing::debug;
use url::Url;

use crate::{
    error::{Endpoint, RequestFailure},
    AnalysisBackend,
};

const ANALYSIS_PATH: &str = "api/business-data";
const HEADLINE_PATH: &str = "api/regenerate-headline";

pub struct HttpAnalysisBackend {
    http: Client,
    analysis_url: Url,
    headline_url: Url,
}

impl HttpAnalysisBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, HttpBackendSetupError> {
        let base = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(HttpBackendSetupError::Client)?;
        Ok(Self {
            http,
            analysis_url: join(&base, ANALYSIS_PATH)?,
            headline_url: join(&base, HEADLINE_PATH)?,
        })
    }

    pub fn analysis_url(&self) -> &Url {
        &self.analysis_url
    }

    pub fn headline_url(&self) -> &Url {
        &self.headline_url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpBackendSetupError {
    #[error("invalid api base url '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    Scheme(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

fn parse_base_url(raw: &str) -> Result<Url, HttpBackendSetupError> {
    let trimmed = raw.trim();
    // Without a trailing slash `Url::join` would replace the last segment.
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalized).map_err(|source| HttpBackendSetupError::BaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpBackendSetupError::Scheme(raw.to_string()));
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, HttpBackendSetupError> {
    base.join(path)
        .map_err(|source| HttpBackendSetupError::BaseUrl {
            url: base.to_string(),
            source,
        })
}

async fn decode_success<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, RequestFailure> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.json::<ApiError>().await.ok();
        return Err(RequestFailure::Status {
            endpoint,
            status: status.as_u16(),
            detail,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|source| RequestFailure::Transport { endpoint, source })
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, query: &BusinessQuery) -> Result<BusinessAnalysis, RequestFailure> {
        let endpoint = Endpoint::Analysis;
        debug!(
            url = %self.analysis_url,
            name = %query.name,
            location = %query.location,
            "requesting business analysis"
        );
        let response = self
            .http
            .post(self.analysis_url.clone())
            .json(&AnalyzeBusinessRequest::from(query))
            .send()
            .await
            .map_err(|source| RequestFailure::Transport { endpoint, source })?;
        let analysis: BusinessAnalysis = decode_success(endpoint, response).await?;
        analysis
            .check()
            .map_err(|reason| RequestFailure::InvalidPayload { endpoint, reason })?;
        Ok(analysis)
    }

    async fn regenerate_headline(&self, query: &BusinessQuery) -> Result<String, RequestFailure> {
        let endpoint = Endpoint::Headline;
        debug!(
            url = %self.headline_url,
            name = %query.name,
            location = %query.location,
            "requesting headline"
        );
        let response = self
            .http
            .get(self.headline_url.clone())
            .query(&RegenerateHeadlineQuery::from(query))
            .send()
            .await
            .map_err(|source| RequestFailure::Transport { endpoint, source })?;
        let body: HeadlineResponse = decode_success(endpoint, response).await?;
        if body.headline.trim().is_empty() {
            return Err(RequestFailure::InvalidPayload {
                endpoint,
                reason: "headline is empty".to_string(),
            });
        }
        Ok(body.headline)
    }
}

#[cfg(test)]
#[path = "tests/http_backend_tests.rs"]
mod tests;
