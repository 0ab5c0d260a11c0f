//! HTTP access to the remote dua API
//!
//! This module owns everything that touches the wire: the endpoint URL
//! shapes (dictated by the remote API, not designed here), the reqwest-based
//! [`NetworkClient`] implementation, and the connectivity probes.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::loader::{ConnectivityProbe, FetchError, NetworkClient};

/// Default base URL for the content API
const DEFAULT_API_BASE: &str = "https://api.duaread.app";

/// Connect timeout for the reachability probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Builds the two endpoint URLs the loader needs
#[derive(Debug, Clone)]
pub struct ApiRoutes {
    base: String,
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ApiRoutes {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Metadata endpoint for a subcategory
    pub fn subcategory_url(&self, key: &str) -> String {
        format!("{}/api/subcategories/{}", self.base, key)
    }

    /// Item list endpoint for a subcategory
    pub fn items_url(&self, key: &str) -> String {
        format!("{}/api/duas/subcategory/{}", self.base, key)
    }

    /// Base URL this instance points at
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// reqwest-backed network client
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl NetworkClient for HttpClient {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}

/// Reachability probe that opens a TCP connection to the API host
///
/// A point-in-time snapshot only; the loader consults it once per load.
/// DNS failure counts as unreachable, which is exactly what an offline
/// machine reports.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    /// `host:port` to dial
    authority: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Derives the probe target from an API base URL
    pub fn from_base_url(base: &str) -> Self {
        Self {
            authority: authority_of(base),
            timeout: PROBE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_authority(authority: impl Into<String>, timeout: Duration) -> Self {
        Self {
            authority: authority.into(),
            timeout,
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_reachable(&self) -> bool {
        let Ok(addrs) = self.authority.to_socket_addrs() else {
            return false;
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        false
    }
}

/// Probe that always reports unreachable, backing the `--offline` flag
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProbe;

impl ConnectivityProbe for OfflineProbe {
    fn is_reachable(&self) -> bool {
        false
    }
}

/// Extracts `host:port` from a base URL, defaulting the port by scheme
fn authority_of(base: &str) -> String {
    let (default_port, rest) = if let Some(rest) = base.strip_prefix("https://") {
        (443, rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        (80, rest)
    } else {
        (443, base)
    };

    let host = rest.split('/').next().unwrap_or(rest);
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, default_port)
    }
}
