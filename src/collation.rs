use std::sync::Arc;

use tracing::info;

use crate::document::CollationDocument;
use crate::errors::{CollationError, Result};
use crate::resolution::Dereferencer;
use crate::types::*;

/// A collation document paired with the dereferencer that resolves its
/// pointers.
pub struct CollationGathering {
    collation: CollationDocument,
    dereferencer: Dereferencer,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl CollationGathering {
    pub fn new(collation: CollationDocument, dereferencer: Dereferencer) -> Self {
        Self {
            collation,
            dereferencer,
        }
    }

    /// Fetches the collation document at `url` through the dereferencer's
    /// own source and parses it.
    pub async fn open_url(url: &str, dereferencer: Dereferencer) -> Result<Self> {
        let source = Arc::clone(dereferencer.source());
        let target = url.to_string();
        let markup = tokio::task::spawn_blocking(move || source.fetch(&target))
            .await
            .map_err(|e| CollationError::FetchFailed {
                url: url.to_string(),
                message: format!("fetch task failed: {}", e),
            })??;

        info!(url, bytes = markup.len(), "loaded collation document");
        let collation = CollationDocument::parse(url, &markup)?;
        Ok(Self::new(collation, dereferencer))
    }

    /// Parses a collation document held in memory.
    pub fn from_markup(
        name: impl Into<String>,
        markup: &str,
        dereferencer: Dereferencer,
    ) -> Result<Self> {
        let collation = CollationDocument::parse(name, markup)?;
        Ok(Self::new(collation, dereferencer))
    }
}

// ---------------------------------------------------------------------------
// Dereferencing
// ---------------------------------------------------------------------------

impl CollationGathering {
    /// The root collation document.
    pub fn collation(&self) -> &CollationDocument {
        &self.collation
    }

    /// Pointers found in the collation document, in document order.
    pub fn pointers(&self) -> Result<Vec<Pointer>> {
        self.dereferencer.extract_pointers(&self.collation)
    }

    /// Runs one dereferencing pass over the collation document.
    pub async fn dereference_pointers(&self) -> Result<Vec<PointerResolution>> {
        self.dereferencer.dereference_all(&self.collation).await
    }
}
