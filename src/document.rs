use std::fmt;

use sxd_document::dom;
use sxd_document::Package;

use crate::errors::{CollationError, Result};

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed, queryable XML document together with the name (usually the URL)
/// it was loaded from.
///
/// Documents are immutable once parsed.
pub struct CollationDocument {
    name: String,
    package: Package,
}

impl CollationDocument {
    /// Parses markup into a document.
    pub fn parse(name: impl Into<String>, markup: &str) -> Result<Self> {
        let name = name.into();
        let package = sxd_document::parser::parse(markup).map_err(|e| CollationError::Parse {
            name: name.clone(),
            message: format!("{:?}", e),
        })?;
        Ok(Self { name, package })
    }

    /// Name or URL this document was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrows the underlying DOM.
    pub fn dom(&self) -> dom::Document<'_> {
        self.package.as_document()
    }

    /// Returns all elements with the given local name, in document order.
    pub fn elements_named(&self, local_name: &str) -> Vec<dom::Element<'_>> {
        let mut found = Vec::new();
        for child in self.dom().root().children() {
            if let dom::ChildOfRoot::Element(element) = child {
                collect_elements(element, local_name, &mut found);
            }
        }
        found
    }
}

impl fmt::Debug for CollationDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollationDocument")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Depth-first, pre-order walk so results come back in document order.
fn collect_elements<'d>(
    element: dom::Element<'d>,
    local_name: &str,
    out: &mut Vec<dom::Element<'d>>,
) {
    if element.name().local_part() == local_name {
        out.push(element);
    }
    for child in element.children() {
        if let dom::ChildOfElement::Element(inner) = child {
            collect_elements(inner, local_name, out);
        }
    }
}

/// Returns the `xml:id` of an element, if present.
pub fn xml_id(element: dom::Element<'_>) -> Option<String> {
    element
        .attributes()
        .into_iter()
        .find(|a| {
            let name = a.name();
            name.local_part() == "id" && name.namespace_uri() == Some(XML_NAMESPACE)
        })
        .map(|a| a.value().to_string())
}
