//! HTML-to-PDF renderer client.
//!
//! Certificates are rendered by a headless-browser service that accepts an
//! HTML document and answers with the PDF bytes.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

/// Error type for PDF rendering.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The renderer did not finish within the timeout.
    #[error("PDF rendering timed out")]
    Timeout,

    /// The renderer answered with a non-success status.
    #[error("PDF renderer error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The renderer answered with an empty document.
    #[error("PDF renderer returned an empty document")]
    EmptyDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    html: &'a str,
    format: &'static str,
    print_background: bool,
    timeout_ms: u64,
}

/// Browser-rendering service client.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    client: Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl PdfRenderer {
    /// Create a new renderer client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PdfError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            token,
            timeout,
        })
    }

    /// Render an HTML document to A4 PDF bytes.
    pub async fn render(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let mut request = self.client.post(&self.url).json(&RenderRequest {
            html,
            format: "A4",
            print_background: true,
            timeout_ms,
        });
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PdfError::Api {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(classify)?;
        if bytes.is_empty() {
            return Err(PdfError::EmptyDocument);
        }

        Ok(bytes.to_vec())
    }
}

fn classify(err: reqwest::Error) -> PdfError {
    if err.is_timeout() {
        PdfError::Timeout
    } else {
        PdfError::Http(err)
    }
}
