//! Image fetching: one HTTP GET per locator, failures reduced to `None`.
//!
//! A missing panel is not worth aborting the card for, so nothing in this
//! module returns an error to its caller. Every outcome (body received,
//! empty locator, transport error, non-success status) is classified,
//! reported as a [`Diagnostic`], and folded into an `Option`.
//!
//! There is deliberately one attempt per call: no retry and no backoff.

use crate::diagnostics::{emit, Diagnostic, Observer};
use crate::error::{CardError, FetchError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Anything that can turn a locator into image bytes.
///
/// The pipeline only talks to this trait, so tests can substitute canned
/// buffers for the network.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch `url`, returning the body on success and `None` on any failure.
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// [`ImageSource`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    observer: Option<Observer>,
}

impl HttpFetcher {
    /// Build a fetcher with its own client. `timeout_secs = None` keeps the
    /// transport default (no overall deadline).
    pub fn new(timeout_secs: Option<u64>, observer: Option<Observer>) -> Result<Self, CardError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CardError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, observer))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client, observer: Option<Observer>) -> Self {
        Self { client, observer }
    }
}

#[async_trait]
impl ImageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        fetch_image(&self.client, url, self.observer.as_ref()).await
    }
}

/// Fetch one image, reporting the outcome and never failing.
pub async fn fetch_image(
    client: &reqwest::Client,
    url: &str,
    observer: Option<&Observer>,
) -> Option<Vec<u8>> {
    match try_fetch(client, url).await {
        Ok((status, body)) => {
            emit(
                observer,
                Diagnostic::FetchSucceeded {
                    url: url.to_string(),
                    status,
                    bytes: body.len(),
                },
            );
            Some(body)
        }
        Err(e) => {
            emit(observer, Diagnostic::FetchFailed(e));
            None
        }
    }
}

/// Classified single-attempt fetch. Returns the status code with the body.
pub async fn try_fetch(client: &reqwest::Client, url: &str) -> Result<(u16, Vec<u8>), FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::EmptyUrl);
    }

    debug!("GET {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok((status.as_u16(), body.to_vec()))
}
