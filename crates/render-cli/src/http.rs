use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A fetched page: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// Build a blocking HTTP client with the given request timeout.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed (e.g., invalid TLS config).
pub fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs.max(1))))
        .user_agent(concat!("render-command/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("could not build HTTP client: {e}"))
}

/// Issue a single GET. Any HTTP status is a successful fetch; only transport
/// failures (DNS, connect, timeout, unreadable body) are errors.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or the body cannot be read.
pub fn get_page(client: &reqwest::blocking::Client, url: &reqwest::Url) -> anyhow::Result<Page> {
    let resp = client
        .get(url.clone())
        .send()
        .map_err(|e| anyhow::anyhow!("could not reach {url}: {e}"))?;
    let status = resp.status().as_u16();
    tracing::debug!(%url, status, "received response");
    let body = resp
        .text()
        .map_err(|e| anyhow::anyhow!("failed to read response body from {url}: {e}"))?;
    Ok(Page { status, body })
}
