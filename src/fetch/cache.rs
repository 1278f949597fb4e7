use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::document::CollationDocument;
use crate::errors::{CollationError, Result};

use super::{DocumentSource, UrlPatcher};

/// Documents referenced by one dereferencing pass, keyed by the URL written
/// in the pointers.
///
/// A cache is filled once by [`DocumentCache::load_all`] and never modified
/// afterwards. Each pass builds its own.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<String, CollationDocument>,
}

impl DocumentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and parses every distinct URL in `urls`.
    ///
    /// All URLs are patched before any fetch starts. Fetches then run
    /// concurrently and the load waits for every one of them to settle. If any
    /// fetch or parse failed, the whole batch fails with the first error in
    /// URL order and no cache is returned.
    pub async fn load_all<I, S>(
        urls: I,
        source: Arc<dyn DocumentSource>,
        patcher: &dyn UrlPatcher,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start = Instant::now();
        let distinct: BTreeSet<String> = urls.into_iter().map(Into::into).collect();

        let mut requests = Vec::with_capacity(distinct.len());
        for url in distinct {
            let patched = patcher.patch(&url).inspect_err(|e| {
                error!(url = %url, "{}", e);
            })?;
            requests.push((url, patched));
        }

        info!(count = requests.len(), "fetching referenced documents");

        let handles: Vec<_> = requests
            .into_iter()
            .map(|(url, patched)| {
                let source = Arc::clone(&source);
                let handle = tokio::task::spawn_blocking(move || {
                    debug!(url = %patched, "fetching");
                    source.fetch(&patched)
                });
                (url, handle)
            })
            .collect();

        let mut fetched = Vec::with_capacity(handles.len());
        let mut first_error = None;
        for (url, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(CollationError::FetchFailed {
                    url: url.clone(),
                    message: format!("fetch task failed: {}", e),
                }),
            };
            match outcome {
                Ok(markup) => fetched.push((url, markup)),
                Err(e) => {
                    error!(url = %url, "{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let mut documents = HashMap::with_capacity(fetched.len());
        for (url, markup) in fetched {
            let document = CollationDocument::parse(url.clone(), &markup).map_err(|e| {
                CollationError::FetchFailed {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;
            documents.insert(url, document);
        }

        info!(
            count = documents.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "referenced documents loaded"
        );
        Ok(Self { documents })
    }

    /// Returns the document loaded for `url`.
    ///
    /// Asking for a URL that was not part of the loaded batch is a usage
    /// error and yields `DocumentNotLoaded`.
    pub fn get(&self, url: &str) -> Result<&CollationDocument> {
        self.documents
            .get(url)
            .ok_or_else(|| CollationError::DocumentNotLoaded {
                url: url.to_string(),
            })
    }

    /// Returns `true` if a document was loaded for `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.documents.contains_key(url)
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
