use serde::{Deserialize, Serialize};

/// A reference extracted from a pointer marker: a target document URL and a
/// locator inside that document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pointer {
    /// URL of the target document, exactly as written in the marker.
    pub url: String,
    /// Element identifier or path expression inside the target document.
    pub locator: String,
}

impl Pointer {
    /// Parses a raw `url#locator` target string.
    ///
    /// Returns `None` unless splitting on `#` yields exactly two non-empty
    /// parts.
    pub fn parse_target(target: &str) -> Option<Pointer> {
        let mut parts = target.split('#');
        let url = parts.next()?;
        let locator = parts.next()?;
        if parts.next().is_some() || url.is_empty() || locator.is_empty() {
            return None;
        }
        Some(Pointer {
            url: url.to_string(),
            locator: locator.to_string(),
        })
    }

    /// Returns the pointer in its `url#locator` form.
    pub fn target(&self) -> String {
        format!("{}#{}", self.url, self.locator)
    }
}

/// Kinds of nodes a locator can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

impl MatchKind {
    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Root => "root",
            MatchKind::Element => "element",
            MatchKind::Attribute => "attribute",
            MatchKind::Text => "text",
            MatchKind::Comment => "comment",
            MatchKind::ProcessingInstruction => "processing_instruction",
            MatchKind::Namespace => "namespace",
        }
    }
}

/// Owned snapshot of a node matched inside a target document.
///
/// Snapshots outlive the pass-scoped document cache, so results can be handed
/// to the caller after the fetched documents are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedNode {
    pub kind: MatchKind,
    /// Local name for elements, attributes and processing instructions.
    pub name: Option<String>,
    /// The element's `xml:id`, if it carries one.
    pub xml_id: Option<String>,
    /// String value of the node.
    pub text: String,
}

/// Which resolution tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// The locator matched an element identifier.
    Identifier,
    /// The locator matched when evaluated as a path expression.
    Expression,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Expression => "expression",
        }
    }
}

/// Outcome of resolving one pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved {
        tier: ResolutionTier,
        nodes: Vec<MatchedNode>,
    },
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    /// Matched nodes, empty when unresolved.
    pub fn nodes(&self) -> &[MatchedNode] {
        match self {
            Resolution::Resolved { nodes, .. } => nodes,
            Resolution::Unresolved => &[],
        }
    }

    pub fn tier(&self) -> Option<ResolutionTier> {
        match self {
            Resolution::Resolved { tier, .. } => Some(*tier),
            Resolution::Unresolved => None,
        }
    }
}

/// A pointer paired with its resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerResolution {
    pub pointer: Pointer,
    pub resolution: Resolution,
}

/// Aggregate counts over one dereferencing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DereferenceSummary {
    /// Number of pointers extracted from the root document.
    pub total: usize,
    pub resolved_count: usize,
    pub unresolved_count: usize,
    /// Number of distinct documents fetched.
    pub documents_loaded: usize,
}

impl DereferenceSummary {
    /// Tallies a pass's outcomes.
    pub fn from_results(results: &[PointerResolution]) -> Self {
        let resolved_count = results
            .iter()
            .filter(|r| r.resolution.is_resolved())
            .count();
        let documents_loaded = results
            .iter()
            .map(|r| r.pointer.url.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();

        Self {
            total: results.len(),
            resolved_count,
            unresolved_count: results.len() - resolved_count,
            documents_loaded,
        }
    }
}
