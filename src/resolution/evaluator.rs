use sxd_xpath::nodeset::Node as XNode;
use sxd_xpath::{Context, Factory, Value};

use crate::document::{xml_id, CollationDocument, XML_NAMESPACE};
use crate::errors::{CollationError, Result};
use crate::types::{MatchKind, MatchedNode};

/// Evaluates a path expression against a document.
///
/// A syntactically valid expression that matches nothing yields an empty
/// vector; errors are reserved for expressions that cannot be evaluated.
pub trait LocatorEvaluator: Send + Sync {
    fn evaluate(&self, document: &CollationDocument, expression: &str) -> Result<Vec<MatchedNode>>;
}

/// XPath 1.0 evaluator with the `xml` prefix bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct XPathEvaluator;

impl XPathEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl LocatorEvaluator for XPathEvaluator {
    fn evaluate(&self, document: &CollationDocument, expression: &str) -> Result<Vec<MatchedNode>> {
        let evaluation_error = |message: String| CollationError::Evaluation {
            expression: expression.to_string(),
            message,
        };

        let xpath = Factory::new()
            .build(expression)
            .map_err(|e| evaluation_error(e.to_string()))?
            .ok_or_else(|| evaluation_error("empty expression".to_string()))?;

        let mut context = Context::new();
        context.set_namespace("xml", XML_NAMESPACE);

        let value = xpath
            .evaluate(&context, document.dom().root())
            .map_err(|e| evaluation_error(e.to_string()))?;

        match value {
            Value::Nodeset(nodes) => Ok(nodes.document_order().into_iter().map(snapshot).collect()),
            // Numbers, strings and booleans do not locate anything.
            _ => Ok(Vec::new()),
        }
    }
}

/// Builds the expression selecting every element whose `id_attribute`
/// equals `id`.
pub fn identifier_query(id_attribute: &str, id: &str) -> String {
    format!("//*[@{}={}]", id_attribute, string_literal(id))
}

/// Quotes `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value holding both quote characters
/// is assembled with `concat()`.
pub fn string_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    let parts: Vec<String> = value
        .split('"')
        .map(|part| format!("\"{}\"", part))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}

fn snapshot(node: XNode<'_>) -> MatchedNode {
    let text = node.string_value();
    let (kind, name, id) = match node {
        XNode::Root(_) => (MatchKind::Root, None, None),
        XNode::Element(e) => (
            MatchKind::Element,
            Some(e.name().local_part().to_string()),
            xml_id(e),
        ),
        XNode::Attribute(a) => (
            MatchKind::Attribute,
            Some(a.name().local_part().to_string()),
            None,
        ),
        XNode::Text(_) => (MatchKind::Text, None, None),
        XNode::Comment(_) => (MatchKind::Comment, None, None),
        XNode::ProcessingInstruction(pi) => (
            MatchKind::ProcessingInstruction,
            Some(pi.target().to_string()),
            None,
        ),
        XNode::Namespace(_) => (MatchKind::Namespace, None, None),
    };
    MatchedNode {
        kind,
        name,
        xml_id: id,
        text,
    }
}
