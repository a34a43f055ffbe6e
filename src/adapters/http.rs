use crate::core::DocumentSource;
use crate::utils::error::{PlotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches certificate pages from the land registry website.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: Client,
    base_url: Url,
}

impl HttpDocumentSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(PlotError::InvalidConfigValueError {
                field: "source.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    /// `{base}/certificate/{title_deed}`, with each `/`-separated part of the
    /// deed number percent-encoded as its own path segment.
    fn certificate_url(&self, title_deed: &str) -> Result<String> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                PlotError::InvalidConfigValueError {
                    field: "source.base_url".to_string(),
                    value: self.base_url.to_string(),
                    reason: "URL cannot carry path segments".to_string(),
                }
            })?;
            segments.pop_if_empty().push("certificate");
            for part in title_deed.split('/') {
                segments.push(part);
            }
        }
        Ok(url.to_string())
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("Making request to: {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("❌ Failed to fetch HTML: {}", e);
            PlotError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!("Registry response status: {}", status);

        if !status.is_success() {
            tracing::error!("❌ Registry answered {} for {}", status, url);
            return Err(PlotError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
