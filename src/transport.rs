use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::GeoError;

/// Byte retrieval from a remote location. The atomic rename-into-place
/// discipline is owned by the [`Store`](crate::store::Store); implementations
/// only ever write to the destination they are handed.
pub trait Transport: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, GeoError>;

    /// Check whether `url` exists remotely without transferring the body.
    fn probe(&self, url: &str) -> Result<bool, GeoError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, GeoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("geodatasets/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GeoError::Filesystem(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| GeoError::Fetch {
                url: String::new(),
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }

    fn send_with_retries<F>(&self, url: &str, mut make_req: F) -> Result<reqwest::blocking::Response, GeoError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(url, status, attempt, "retrying after status");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(url, attempt, "retrying after error: {err}");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(GeoError::Fetch {
                        url: url.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, GeoError> {
        let mut response = self.send_with_retries(url, || self.client.get(url))?;
        if !response.status().is_success() {
            return Err(GeoError::Fetch {
                url: url.to_string(),
                message: format!("server returned status {}", response.status().as_u16()),
            });
        }
        let mut file = File::create(dest).map_err(|err| GeoError::Filesystem(err.to_string()))?;
        let written = std::io::copy(&mut response, &mut file).map_err(|err| GeoError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        debug!(url, written, "download complete");
        Ok(written)
    }

    fn probe(&self, url: &str) -> Result<bool, GeoError> {
        let response = self.send_with_retries(url, || self.client.head(url))?;
        Ok(response.status().is_success())
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
