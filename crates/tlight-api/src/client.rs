// Gateway HTTP client
//
// Wraps `reqwest::Client` with gateway URL construction, status checking
// and JSON decoding. Endpoint modules (nodes, effects) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{JSON_CONTENT_TYPE, TransportConfig};

/// Raw HTTP client for the lighting gateway.
///
/// All paths are resolved relative to the base URL, which already carries
/// the API version prefix (e.g. `http://localhost:3001/v1`).
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a gateway client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL: `{base}/{seg}/{seg}...`
    ///
    /// Segments are percent-encoded, so node ids containing `/` or spaces
    /// stay a single path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = Self::checked_body(resp).await?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Send a POST request with a JSON body. The response body is ignored
    /// beyond status checking.
    pub(crate) async fn post(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!("POST {}", url);

        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::checked_body(resp).await.map(|_| ())
    }

    /// Read the response body, turning any non-2xx status into
    /// `Error::Status` with the body attached.
    async fn checked_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
