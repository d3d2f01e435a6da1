use serde::Deserialize;

use crate::provider::{ProviderError, TextProvider};

#[derive(Deserialize)]
struct TextBody {
    text: String,
}

/// Client for the `/api/texts` service.
pub struct HttpTextProvider {
    base_url: String,
}

impl HttpTextProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn texts_url(&self) -> String {
        format!("{}/api/texts", self.base_url)
    }

    pub fn text_url(&self, id: usize) -> String {
        format!("{}/api/text/{id}", self.base_url)
    }
}

impl TextProvider for HttpTextProvider {
    fn texts(&self) -> Result<Vec<String>, ProviderError> {
        let body = fetch_url(&self.texts_url())?;
        Ok(serde_json::from_str(&body)?)
    }

    fn text(&self, id: usize) -> Result<String, ProviderError> {
        let body = fetch_url(&self.text_url(id)).map_err(|err| match err {
            ProviderError::Status(404) => ProviderError::NotFound(id),
            other => other,
        })?;
        let parsed: TextBody = serde_json::from_str(&body)?;
        Ok(parsed.text)
    }
}

#[cfg(feature = "network")]
fn fetch_url(url: &str) -> Result<String, ProviderError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }
    Ok(response.text()?)
}

#[cfg(not(feature = "network"))]
fn fetch_url(_url: &str) -> Result<String, ProviderError> {
    Err(ProviderError::Offline)
}
