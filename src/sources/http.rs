//! HTTP client for the fixture and live-score sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::SourceError;
use crate::sources::models::{decode_list, ApiEnvelope, Match, SeasonInfo};
use crate::sources::MatchSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Two read-only JSON sources: one for season fixtures, one for
/// in-progress scores.
#[derive(Debug, Clone)]
pub struct HttpMatchSource {
    client: Client,
    fixtures_url: String,
    live_scores_url: String,
    api_key: Option<String>,
}

impl HttpMatchSource {
    pub fn new(
        fixtures_url: impl Into<String>,
        live_scores_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            fixtures_url: trim_base(fixtures_url.into()),
            live_scores_url: trim_base(live_scores_url.into()),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Self::new(
            config.fixtures_url.clone(),
            config.live_scores_url.clone(),
            config.api_key.clone(),
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<ApiEnvelope<T>, SourceError> {
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "source response");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MatchSource for HttpMatchSource {
    async fn fetch_live_matches(&self) -> Result<Vec<Match>, SourceError> {
        let url = format!("{}/currentMatches", self.live_scores_url);
        // Entries that are not match objects are skipped, not fatal
        let envelope: ApiEnvelope<Value> = self.get_json(url, &[("offset", "0")]).await?;
        Ok(envelope.data.map(decode_list::<Match>).unwrap_or_default())
    }

    async fn fetch_match(&self, match_id: &str) -> Result<Option<Match>, SourceError> {
        let url = format!("{}/match_info", self.live_scores_url);
        let envelope: ApiEnvelope<Match> = self.get_json(url, &[("id", match_id)]).await?;
        Ok(envelope.data)
    }

    async fn fetch_season_fixtures(&self, season_id: &str) -> Result<Vec<Match>, SourceError> {
        let url = format!("{}/series_info", self.fixtures_url);
        let envelope: ApiEnvelope<SeasonInfo> = self.get_json(url, &[("id", season_id)]).await?;
        Ok(envelope.data.map(|info| info.match_list).unwrap_or_default())
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_urls_are_trimmed() {
        let source = HttpMatchSource::new("https://a.example/v1/", "https://b.example/v1", None)
            .unwrap();
        assert_eq!(source.fixtures_url, "https://a.example/v1");
        assert_eq!(source.live_scores_url, "https://b.example/v1");
    }

    #[tokio::test]
    async fn test_unreachable_source_is_transport_error() {
        // Port 9 (discard) on localhost is not an HTTP server
        let source = HttpMatchSource::new("http://127.0.0.1:9", "http://127.0.0.1:9", None).unwrap();
        let result = source.fetch_live_matches().await;
        assert!(matches!(result, Err(SourceError::Http(_))));
    }
}
