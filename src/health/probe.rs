//! Health probes
//!
//! Only reachability matters: a probe either completes in time or it does
//! not. The response body is never read and the status code does not
//! change the outcome.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Endpoint probed when none is configured
pub const DEFAULT_PROBE_URL: &str = "http://httpbin.org/ip";

/// Why a probe did not succeed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No answer within the probe timeout
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// The request failed before a response arrived
    #[error("probe request failed: {0}")]
    Request(String),
}

/// A single external health check
///
/// Implementations return the measured round-trip on success. The monitor
/// bounds every call with its own timeout, so an implementation that hangs
/// is still reported as [`ProbeError::Timeout`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lighthouse::{HealthProbe, ProbeError};
///
/// struct AlwaysUp;
///
/// impl HealthProbe for AlwaysUp {
///     async fn probe(&self) -> Result<Duration, ProbeError> {
///         Ok(Duration::from_millis(1))
///     }
/// }
/// ```
pub trait HealthProbe: Send + Sync + 'static {
    /// Run one check
    fn probe(&self) -> impl Future<Output = std::result::Result<Duration, ProbeError>> + Send;
}

/// HTTP `GET` reachability probe
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a probe for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ProbeClient(e.to_string()))?;

        Ok(Self::with_client(client, url, timeout))
    }

    /// Create a probe around an existing client
    ///
    /// `timeout` is only used to label timeout errors; the client's own
    /// timeout is what bounds the request.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Probed URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HealthProbe for HttpProbe {
    async fn probe(&self) -> std::result::Result<Duration, ProbeError> {
        let started = Instant::now();

        match self.client.get(&self.url).send().await {
            Ok(response) => {
                tracing::trace!(url = %self.url, status = %response.status(), "Probe answered");
                Ok(started.elapsed())
            }
            Err(e) if e.is_timeout() => Err(ProbeError::Timeout(self.timeout)),
            Err(e) => Err(ProbeError::Request(e.to_string())),
        }
    }
}
