/// Pointer extraction module.
///
/// Scans a collation document for pointer markers and parses each marker's
/// target attribute into a structured `Pointer`.
mod pointer_extractor;

pub use pointer_extractor::{PointerExtractor, PointerSyntax};
