use thiserror::Error;

/// Errors that can abort a dereferencing pass.
///
/// Unresolved locators are not represented here; they are a normal outcome
/// recorded per pointer.
#[derive(Error, Debug)]
pub enum CollationError {
    #[error("pointer #{index} (<{tag}>) has no target attribute")]
    MissingTargetAttribute { index: usize, tag: String },

    #[error("target '{target}' is not well formatted, expected url#locator")]
    MalformedPointer { target: String },

    #[error("can't patch url '{url}'")]
    UrlPatchFailed { url: String },

    #[error("fetch error: {message} (url: {url})")]
    FetchFailed { url: String, message: String },

    #[error("no document loaded for '{url}'; was the batch fetched first?")]
    DocumentNotLoaded { url: String },

    #[error("parse error: {message} (document: {name})")]
    Parse { name: String, message: String },

    #[error("evaluation error: {message} (expression: {expression})")]
    Evaluation { expression: String, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `CollationError`.
pub type Result<T> = std::result::Result<T, CollationError>;
