//! Blocking HTTP archive fetcher

use super::Fetcher;
use crate::core::error::FetchError;
use crate::core::progress;
use std::io::Read;
use std::time::Duration;

const USER_AGENT: &str = concat!("pff-prep/", env!("CARGO_PKG_VERSION"));

/// Downloads archives over HTTP(S) with ureq.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let pb = progress::spinner(&format!("downloading {}", url));

        let response = ureq::get(url)
            .timeout(timeout)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| {
                pb.finish_and_clear();
                match e {
                    ureq::Error::Status(code, _) => FetchError::Status {
                        url: url.to_string(),
                        code,
                    },
                    ureq::Error::Transport(t) => FetchError::Transport {
                        url: url.to_string(),
                        reason: t.to_string(),
                    },
                }
            })?;

        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            progress::upgrade_to_bytes(&pb, len);
        }

        let mut reader = response.into_reader();
        let mut data = Vec::new();
        let mut buffer = [0u8; 8192];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(FetchError::Body {
                        url: url.to_string(),
                        source: e,
                    });
                }
            };
            data.extend_from_slice(&buffer[..read]);
            pb.set_position(data.len() as u64);
        }

        pb.finish_and_clear();
        tracing::debug!(url, bytes = data.len(), "download complete");
        Ok(data)
    }
}
