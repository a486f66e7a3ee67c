//! HTTP adapter for the content backend.

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::application::query::{HOME_PAGE_PATH, home_page_query};
use crate::application::source::{ContentSource, Envelope, HomePageDocument, SourceError};
use crate::config::ContentSettings;
use crate::infra::error::InfraError;

/// Single-shot reader for a Strapi-style content backend. One GET per call,
/// no retries; transport and decode failures surface as [`SourceError`].
pub struct StrapiContentSource {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl StrapiContentSource {
    pub fn new(settings: &ContentSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build content http client: {err}"))
            })?;

        Ok(Self {
            client,
            base: settings.base_url.clone(),
            token: settings.api_token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("vetrina/", env!("CARGO_PKG_VERSION"))
    }

    fn document_url(&self, path: &str, query: &str) -> Result<Url, SourceError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| SourceError::Url(err.to_string()))?;
        url.set_query(Some(query));
        Ok(url)
    }
}

#[async_trait]
impl ContentSource for StrapiContentSource {
    async fn home_page(&self) -> Result<Envelope<HomePageDocument>, SourceError> {
        let url = self.document_url(HOME_PAGE_PATH, home_page_query())?;
        counter!("vetrina_content_fetch_total").increment(1);

        debug!(target: "vetrina::content", url = %url, "fetching home page document");

        let mut request = self.client.get(url);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            counter!("vetrina_content_fetch_failure_total").increment(1);
            SourceError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            counter!("vetrina_content_fetch_failure_total").increment(1);
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Envelope<HomePageDocument>>()
            .await
            .map_err(|err| {
                counter!("vetrina_content_fetch_failure_total").increment(1);
                SourceError::Decode(err.to_string())
            })
    }
}
