//! Remote image fetching. Blocking; only ever called from job threads.

use crate::error::{ButtonError, Result};

pub trait RemoteFetch: Send + Sync {
    /// Fetch the raw bytes at `url`
    fn fetch(&self, url: &str, user: Option<&str>, password: Option<&str>) -> Result<Vec<u8>>;
}

/// Decode an inline `data:` URI (base64 payloads only)
pub fn decode_data_uri(url: &str) -> Option<Result<Vec<u8>>> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let rest = url.strip_prefix("data:")?;
    let Some((meta, payload)) = rest.split_once(',') else {
        return Some(Err(ButtonError::Fetch("Malformed data URI".into())));
    };
    if !meta.ends_with(";base64") {
        return Some(Err(ButtonError::Fetch(format!(
            "Unsupported data URI encoding: {}",
            meta
        ))));
    }
    Some(
        STANDARD
            .decode(payload.trim())
            .map_err(|e| ButtonError::Fetch(format!("Invalid base64 payload: {}", e))),
    )
}

/// HTTP(S) fetcher with basic authentication
#[cfg(feature = "http")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ButtonError::Fetch(format!("Failed to create client: {}", e)))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl RemoteFetch for HttpFetcher {
    fn fetch(&self, url: &str, user: Option<&str>, password: Option<&str>) -> Result<Vec<u8>> {
        if let Some(inline) = decode_data_uri(url) {
            return inline;
        }

        let mut request = self.client.get(url);
        if let Some(user) = user {
            request = request.basic_auth(user, password);
        }
        let response = request
            .send()
            .map_err(|e| ButtonError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ButtonError::Fetch(format!("{}: HTTP {}", url, status)));
        }
        let bytes = response
            .bytes()
            .map_err(|e| ButtonError::Fetch(format!("{}: {}", url, e)))?;
        log::debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap().unwrap();
        assert_eq!(bytes, b"hello");
        assert!(decode_data_uri("http://cam/snap.jpg").is_none());
        assert!(decode_data_uri("data:text/plain,hello").unwrap().is_err());
        assert!(decode_data_uri("data:image/png;base64").unwrap().is_err());
    }
}
