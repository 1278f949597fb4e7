use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::CollationConfig;
use crate::document::CollationDocument;
use crate::errors::Result;
use crate::extraction::{PointerExtractor, PointerSyntax};
use crate::fetch::{DocumentCache, DocumentSource, HttpSource, IdentityPatcher, UrlPatcher};
use crate::types::*;

use super::evaluator::{identifier_query, LocatorEvaluator, XPathEvaluator};

/// Dereferences every pointer in a collation document.
///
/// Each call to [`Dereferencer::dereference_all`] is an independent pass with
/// its own document cache, so one `Dereferencer` can serve many passes.
pub struct Dereferencer {
    extractor: PointerExtractor,
    source: Arc<dyn DocumentSource>,
    patcher: Arc<dyn UrlPatcher>,
    evaluator: Arc<dyn LocatorEvaluator>,
    /// Attribute matched by the identifier tier, e.g. `xml:id`.
    id_attribute: String,
}

impl Dereferencer {
    /// Creates a dereferencer over `source` with the default pointer syntax,
    /// identity URL patching and the XPath evaluator.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            extractor: PointerExtractor::default(),
            source,
            patcher: Arc::new(IdentityPatcher),
            evaluator: Arc::new(XPathEvaluator),
            id_attribute: "xml:id".to_string(),
        }
    }

    /// Builds a dereferencer fetching over HTTP/filesystem as configured.
    pub fn from_config(config: &CollationConfig) -> Self {
        let source = HttpSource::new(Duration::from_secs(config.fetch_timeout_secs));
        Self::new(Arc::new(source))
            .with_syntax(PointerSyntax {
                tag: config.pointer_tag.clone(),
                target_attribute: config.target_attribute.clone(),
            })
            .with_patcher(config.url_patcher())
            .with_id_attribute(config.id_attribute.clone())
    }

    pub fn with_syntax(mut self, syntax: PointerSyntax) -> Self {
        self.extractor = PointerExtractor::new(syntax);
        self
    }

    pub fn with_patcher(mut self, patcher: Arc<dyn UrlPatcher>) -> Self {
        self.patcher = patcher;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn LocatorEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = id_attribute.into();
        self
    }

    /// The source documents are fetched from.
    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    /// Extracts the pointers of `root` without fetching anything.
    pub fn extract_pointers(&self, root: &CollationDocument) -> Result<Vec<Pointer>> {
        self.extractor.extract(root)
    }

    /// Runs one dereferencing pass over `root`.
    ///
    /// 1. Extract all pointers (malformed markers abort the pass).
    /// 2. Fetch each distinct target URL once; any failed fetch aborts the
    ///    pass.
    /// 3. Resolve each pointer against its cached target document.
    ///
    /// Results come back in pointer order. A pointer neither tier can
    /// resolve is reported as [`Resolution::Unresolved`].
    pub async fn dereference_all(
        &self,
        root: &CollationDocument,
    ) -> Result<Vec<PointerResolution>> {
        let pointers = self.extract_pointers(root)?;

        let urls: BTreeSet<&str> = pointers.iter().map(|p| p.url.as_str()).collect();
        let cache =
            DocumentCache::load_all(urls, Arc::clone(&self.source), self.patcher.as_ref()).await?;

        let mut results = Vec::with_capacity(pointers.len());
        for pointer in pointers {
            let resolution = self.resolve_one(&cache, &pointer)?;
            results.push(PointerResolution {
                pointer,
                resolution,
            });
        }

        let summary = DereferenceSummary::from_results(&results);
        info!(
            document = root.name(),
            total = summary.total,
            resolved = summary.resolved_count,
            unresolved = summary.unresolved_count,
            "dereferenced pointers"
        );
        Ok(results)
    }

    /// Resolves a single pointer against a loaded cache.
    ///
    /// Strategies are tried in order:
    /// 1. **Identifier** -- the locator is taken as an element id. Most
    ///    locators in collation documents are bare ids.
    /// 2. **Expression** -- the locator is evaluated as a path expression,
    ///    only when the identifier lookup found nothing.
    ///
    /// Only a missing cache entry is an error.
    pub fn resolve_one(&self, cache: &DocumentCache, pointer: &Pointer) -> Result<Resolution> {
        let document = cache.get(&pointer.url)?;

        // Strategy 1: identifier lookup
        let by_id = self.lookup(document, &identifier_query(&self.id_attribute, &pointer.locator));
        debug!(locator = %pointer.locator, matches = by_id.len(), "id search");
        if !by_id.is_empty() {
            return Ok(Resolution::Resolved {
                tier: ResolutionTier::Identifier,
                nodes: by_id,
            });
        }

        // Strategy 2: raw locator as a path expression
        let by_expression = self.lookup(document, &pointer.locator);
        debug!(locator = %pointer.locator, matches = by_expression.len(), "xpath search");
        if !by_expression.is_empty() {
            return Ok(Resolution::Resolved {
                tier: ResolutionTier::Expression,
                nodes: by_expression,
            });
        }

        warn!(url = %pointer.url, locator = %pointer.locator, "can't resolve pointer");
        Ok(Resolution::Unresolved)
    }

    /// Evaluates `expression`, treating evaluation errors as no match.
    fn lookup(&self, document: &CollationDocument, expression: &str) -> Vec<MatchedNode> {
        match self.evaluator.evaluate(document, expression) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(document = document.name(), "{}", e);
                Vec::new()
            }
        }
    }
}
