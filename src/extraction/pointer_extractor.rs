use tracing::debug;

use crate::document::CollationDocument;
use crate::errors::{CollationError, Result};
use crate::types::Pointer;

/// Element and attribute names that identify pointer markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerSyntax {
    /// Local name of the marker element.
    pub tag: String,
    /// Attribute holding the `url#locator` target.
    pub target_attribute: String,
}

impl Default for PointerSyntax {
    fn default() -> Self {
        Self {
            tag: "ptr".to_string(),
            target_attribute: "target".to_string(),
        }
    }
}

/// Extracts pointers from a collation document.
#[derive(Debug, Clone, Default)]
pub struct PointerExtractor {
    syntax: PointerSyntax,
}

impl PointerExtractor {
    pub fn new(syntax: PointerSyntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> &PointerSyntax {
        &self.syntax
    }

    /// Extracts every pointer in `root`, in document order.
    ///
    /// Fails on the first marker without a target attribute or with a target
    /// that is not of the form `url#locator`.
    pub fn extract(&self, root: &CollationDocument) -> Result<Vec<Pointer>> {
        let markers = root.elements_named(&self.syntax.tag);
        let mut pointers = Vec::with_capacity(markers.len());

        for (index, marker) in markers.into_iter().enumerate() {
            let target = marker
                .attribute_value(self.syntax.target_attribute.as_str())
                .ok_or_else(|| CollationError::MissingTargetAttribute {
                    index,
                    tag: self.syntax.tag.clone(),
                })?;

            let pointer =
                Pointer::parse_target(target).ok_or_else(|| CollationError::MalformedPointer {
                    target: target.to_string(),
                })?;
            pointers.push(pointer);
        }

        debug!(
            document = root.name(),
            count = pointers.len(),
            "extracted pointers"
        );
        Ok(pointers)
    }
}
