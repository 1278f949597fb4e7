use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use collation::errors::{CollationError, Result};
use collation::fetch::{DocumentCache, DocumentSource, IdentityPatcher, RewritePatcher};

/// In-memory source that records every URL it is asked for.
struct MapSource {
    documents: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl MapSource {
    fn new(documents: &[(&str, &str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(url, markup)| (url.to_string(), markup.to_string()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        let mut urls = self.requested.lock().unwrap().clone();
        urls.sort();
        urls
    }
}

impl DocumentSource for MapSource {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| CollationError::FetchFailed {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}

#[tokio::test]
async fn test_load_all_fetches_each_url_once() {
    let source = Arc::new(MapSource::new(&[
        ("docA", "<a xml:id='x'/>"),
        ("docB", "<b/>"),
    ]));

    let urls = ["docA", "docA", "docB", "docA", "docB"];
    let cache = DocumentCache::load_all(urls, source.clone(), &IdentityPatcher)
        .await
        .unwrap();

    assert_eq!(source.requested(), vec!["docA", "docB"]);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains("docA"));
    assert_eq!(cache.get("docB").unwrap().name(), "docB");
}

#[tokio::test]
async fn test_load_all_with_no_urls() {
    let source = Arc::new(MapSource::new(&[]));
    let cache = DocumentCache::load_all(Vec::<String>::new(), source.clone(), &IdentityPatcher)
        .await
        .unwrap();
    assert!(cache.is_empty());
    assert!(source.requested().is_empty());
}

#[tokio::test]
async fn test_single_failed_fetch_fails_the_batch() {
    let source = Arc::new(MapSource::new(&[("docA", "<a/>")]));

    let err = DocumentCache::load_all(["docA", "missing"], source.clone(), &IdentityPatcher)
        .await
        .unwrap_err();

    assert!(matches!(err, CollationError::FetchFailed { ref url, .. } if url == "missing"));
    // Every fetch settles before the batch reports the failure.
    assert_eq!(source.requested(), vec!["docA", "missing"]);
}

#[tokio::test]
async fn test_unparseable_document_is_a_fetch_failure() {
    let source = Arc::new(MapSource::new(&[("docA", "<a><b></a>")]));

    let err = DocumentCache::load_all(["docA"], source, &IdentityPatcher)
        .await
        .unwrap_err();
    assert!(matches!(err, CollationError::FetchFailed { ref url, .. } if url == "docA"));
}

#[tokio::test]
async fn test_patched_url_is_fetched_but_original_is_the_key() {
    let source = Arc::new(MapSource::new(&[(
        "https://example.org/variorum-chunks/f1818_C07.xml",
        "<TEI/>",
    )]));
    let patcher = RewritePatcher::new("edition-chunks/P5-", "variorum-chunks/");
    let original = "https://example.org/edition-chunks/P5-f1818_C07.xml";

    let cache = DocumentCache::load_all([original], source.clone(), &patcher)
        .await
        .unwrap();

    assert_eq!(
        source.requested(),
        vec!["https://example.org/variorum-chunks/f1818_C07.xml"]
    );
    assert!(cache.contains(original));
    assert!(!cache.contains("https://example.org/variorum-chunks/f1818_C07.xml"));
}

#[tokio::test]
async fn test_patch_failure_aborts_before_fetching() {
    let source = Arc::new(MapSource::new(&[("https://example.org/other.xml", "<a/>")]));
    let patcher = RewritePatcher::new("edition-chunks/P5-", "variorum-chunks/");

    let err = DocumentCache::load_all(["https://example.org/other.xml"], source.clone(), &patcher)
        .await
        .unwrap_err();

    assert!(matches!(err, CollationError::UrlPatchFailed { .. }));
    assert!(source.requested().is_empty());
}

#[test]
fn test_get_before_load_is_document_not_loaded() {
    let cache = DocumentCache::new();
    let err = cache.get("docA").unwrap_err();
    assert!(matches!(err, CollationError::DocumentNotLoaded { url } if url == "docA"));
}

/// Source whose fetches block until two of them are running at once.
struct RendezvousSource {
    barrier: Barrier,
}

impl DocumentSource for RendezvousSource {
    fn fetch(&self, url: &str) -> Result<String> {
        self.barrier.wait();
        Ok(format!("<{}/>", url))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetches_are_in_flight_together() {
    let source = Arc::new(RendezvousSource {
        barrier: Barrier::new(2),
    });

    let cache = tokio::time::timeout(
        Duration::from_secs(5),
        DocumentCache::load_all(["a", "b"], source, &IdentityPatcher),
    )
    .await
    .expect("fetches ran one after another")
    .unwrap();

    assert!(cache.contains("a"));
    assert!(cache.contains("b"));
}
