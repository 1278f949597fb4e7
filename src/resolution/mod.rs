/// Pointer resolution module.
///
/// Loads every document referenced by a collation document, then resolves
/// each pointer's locator against its target with a two-tier fallback.
mod evaluator;
mod resolver;

pub use evaluator::{identifier_query, string_literal, LocatorEvaluator, XPathEvaluator};
pub use resolver::Dereferencer;
