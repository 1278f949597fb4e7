use crate::errors::{CollationError, Result};

/// Hook that maps the URL written in a pointer to the location it is
/// actually fetched from.
///
/// Documents stay keyed by the original URL; only the fetch uses the patched
/// one.
pub trait UrlPatcher: Send + Sync {
    fn patch(&self, url: &str) -> Result<String>;
}

/// Fetches every URL as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPatcher;

impl UrlPatcher for IdentityPatcher {
    fn patch(&self, url: &str) -> Result<String> {
        Ok(url.to_string())
    }
}

/// Replaces `find` with `replace` in every URL.
///
/// A URL the rule does not change is an error, since every URL is expected to
/// need the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePatcher {
    find: String,
    replace: String,
}

impl RewritePatcher {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

impl UrlPatcher for RewritePatcher {
    fn patch(&self, url: &str) -> Result<String> {
        let patched = url.replace(&self.find, &self.replace);
        if patched == url {
            return Err(CollationError::UrlPatchFailed {
                url: url.to_string(),
            });
        }
        Ok(patched)
    }
}
