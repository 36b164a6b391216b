//! Preview lookup against the companion backend
//!
//! `GET {base}/preview?q=<query>` answers with
//! `{success, results: [{name, spotifyUrl, previewUrls: [..]}]}`; only the
//! first URL of the first result is used.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<PreviewResult>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spotify_url: String,
    #[serde(default)]
    pub preview_urls: Vec<String>,
}

impl PreviewResponse {
    /// The playable URL this response offers, or `""` when there is none
    pub fn first_preview_url(&self) -> String {
        if !self.success {
            return String::new();
        }
        self.results
            .first()
            .and_then(|r| r.preview_urls.first())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait PreviewResolver: Send + Sync {
    /// Resolve a preview URL for a track name. An empty string means
    /// "nothing to play"; lookup failures also end up there.
    async fn resolve(&self, query: &str) -> String;
}

pub struct HttpPreviewResolver {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPreviewResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn lookup(&self, query: &str) -> Result<PreviewResponse> {
        crate::log_api_request!("preview_lookup", query);
        let response = self
            .http
            .get(format!("{}/preview", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<PreviewResponse>().await?)
    }
}

#[async_trait]
impl PreviewResolver for HttpPreviewResolver {
    async fn resolve(&self, query: &str) -> String {
        match self.lookup(query).await {
            Ok(response) => {
                let url = response.first_preview_url();
                if url.is_empty() {
                    tracing::debug!(query, "No preview available");
                }
                url
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Preview lookup failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PreviewResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn picks_first_url_of_first_result() {
        let response = parse(
            r#"{"success":true,"results":[
                {"name":"A","spotifyUrl":"https://open.spotify.com/track/a","previewUrls":["http://p/a1.mp3","http://p/a2.mp3"]},
                {"name":"B","spotifyUrl":"https://open.spotify.com/track/b","previewUrls":["http://p/b.mp3"]}
            ]}"#,
        );
        assert_eq!(response.results[0].spotify_url, "https://open.spotify.com/track/a");
        assert_eq!(response.first_preview_url(), "http://p/a1.mp3");
    }

    #[test]
    fn empty_results_or_urls_mean_nothing_to_play() {
        assert_eq!(parse(r#"{"success":true,"results":[]}"#).first_preview_url(), "");
        assert_eq!(
            parse(r#"{"success":true,"results":[{"name":"A","spotifyUrl":"x","previewUrls":[]}]}"#)
                .first_preview_url(),
            ""
        );
    }

    #[test]
    fn unsuccessful_response_is_ignored() {
        let response = parse(
            r#"{"success":false,"results":[{"name":"A","spotifyUrl":"x","previewUrls":["http://p/a.mp3"]}]}"#,
        );
        assert_eq!(response.first_preview_url(), "");
    }
}
