//! Document fetching: the raw-markup source, URL normalization, and the
//! pass-scoped document cache.

mod cache;
mod patch;

pub use cache::DocumentCache;
pub use patch::{IdentityPatcher, RewritePatcher, UrlPatcher};

use std::path::Path;
use std::time::Duration;

use crate::errors::{CollationError, Result};

/// Retrieves raw markup for a URL.
///
/// Implementations are called from blocking worker tasks, one call per
/// distinct URL in a pass.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Default source: `http(s)://` URLs over HTTP, anything else from the local
/// filesystem (`file://` prefix optional).
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    /// Creates a source whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }

    fn fetch_http(&self, url: &str) -> Result<String> {
        let fetch_failed = |e: ureq::Error| CollationError::FetchFailed {
            url: url.to_string(),
            message: e.to_string(),
        };
        let mut response = self.agent.get(url).call().map_err(fetch_failed)?;
        response.body_mut().read_to_string().map_err(fetch_failed)
    }

    fn fetch_file(&self, url: &str) -> Result<String> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        std::fs::read_to_string(path).map_err(|e| CollationError::FetchFailed {
            url: url.to_string(),
            message: format!("failed to read '{}': {}", path.display(), e),
        })
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String> {
        if is_http_url(url) {
            self.fetch_http(url)
        } else {
            self.fetch_file(url)
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
