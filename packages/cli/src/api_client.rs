use std::path::Path;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid server URL")?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("failed to build API URL")
    }

    fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = req.send()?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("API error ({}): {}", status, error_message(&body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Upload a file and return the receipt the server issued for it.
    pub fn issue(&self, path: &Path) -> Result<IssuedReceipt> {
        let form = multipart::Form::new()
            .file("file", path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let url = self.url("/receipts")?;
        self.send_json(self.http.post(url).multipart(form))
    }

    /// Fetch a receipt; `None` when the server has no such id.
    pub fn show(&self, id: &str) -> Result<Option<Receipt>> {
        let url = self.url(&format!("/receipts/{id}"))?;
        let response = self.http.get(url).send()?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(serde_json::from_str(&body)?)),
            s => anyhow::bail!("API error ({}): {}", s, error_message(&body)),
        }
    }
}

/// Pull `error` / `details` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
        details: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) => body.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub content_hash: String,
    pub created_at: String,
    pub filename: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: i64,
}

#[derive(Debug, Deserialize)]
pub struct IssuedReceipt {
    pub receipt: Receipt,
    pub url: String,
}
