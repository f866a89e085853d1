//! Single-GET retrieval with bounded timeouts.
//!
//! One [`Retriever`] is built per run and cloned into every worker; clones
//! share the underlying connection pool.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use userdb_shared::{HttpConfig, Result, UserDbError};

/// User-Agent string for registry requests.
const USER_AGENT: &str = concat!("userdb/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow for a registry download.
const MAX_REDIRECTS: usize = 5;

/// HTTP GET client shared by discovery and every fetch job.
#[derive(Debug, Clone)]
pub struct Retriever {
    client: Client,
}

impl Retriever {
    /// Build a retriever honoring the configured timeouts.
    ///
    /// `connect_timeout_secs` bounds the TCP/TLS handshake only. Waiting for
    /// headers and reading a slow body are bounded by `request_timeout_secs`,
    /// which covers the whole exchange.
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .build()
            .map_err(|e| UserDbError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and return the raw body.
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| UserDbError::network(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UserDbError::Status {
                url: url.to_string(),
                status: status.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UserDbError::network(url.as_str(), format!("failed to read body: {e}")))?;

        debug!(%url, bytes = body.len(), "registry body received");
        Ok(body.to_vec())
    }

    /// GET `url` and decode the body as (lossy) UTF-8 text.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        let bytes = self.get_bytes(url).await?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

/// Split a registry body into lines.
///
/// Accepts `\n` and `\r\n` terminators; a final terminator does not add an empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}
