//! The fetch capability and its blocking HTTP implementation.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("matchday-harvester/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Turns a URL into the raw text served there.
///
/// The harvester never retries a failed fetch; retry policy, timeouts and
/// cancellation belong to the implementation.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<String>;
}

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Blocking HTTP fetcher.
///
/// Makes a single attempt per fetch unless configured with retries, in
/// which case connection errors, timeouts and 5xx responses are retried
/// with exponential backoff (500ms, 1000ms, 2000ms, ...).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    /// Create a fetcher that never retries.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            retries: 0,
        })
    }

    /// Set the number of retries after a transient failure.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        let attempts = self.retries + 1;
        let mut last_error: Option<HarvesterError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1).min(6));
                tracing::debug!(%url, attempt, delay_ms = delay, "Retrying after delay");
                thread::sleep(Duration::from_millis(delay));
            }

            match self.client.get(url.as_str()).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            %url,
                            status = %status,
                            attempt = attempt + 1,
                            attempts,
                            "Server error"
                        );
                        last_error = Some(HarvesterError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                        continue;
                    }

                    // Client errors (4xx) won't succeed on retry
                    if !status.is_success() {
                        return Err(HarvesterError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    return response.text().map_err(|source| HarvesterError::Fetch {
                        url: url.to_string(),
                        source,
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::warn!(
                        %url,
                        error = %e,
                        attempt = attempt + 1,
                        attempts,
                        "Connection error"
                    );
                    last_error = Some(HarvesterError::Fetch {
                        url: url.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    return Err(HarvesterError::Fetch {
                        url: url.to_string(),
                        source: e,
                    });
                }
            }
        }

        match last_error {
            Some(e) if attempts == 1 => Err(e),
            last => Err(HarvesterError::RetriesExhausted {
                attempts,
                message: last.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
            }),
        }
    }
}
