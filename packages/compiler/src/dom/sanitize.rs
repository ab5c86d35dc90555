//! Markup Sanitization
//!
//! Applied to values written by raw-markup bindings before they are parsed
//! into the document.

use std::fmt;

use super::document::{Document, NodeId};
use super::markup;

pub trait MarkupSanitizer: fmt::Debug {
    fn sanitize(&self, markup: &str) -> String;
}

/// Removes elements that can run code and any attribute that carries script.
#[derive(Debug, Clone)]
pub struct BasicSanitizer {
    blocked_elements: Vec<String>,
}

const BLOCKED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];
const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "xlink:href"];

impl BasicSanitizer {
    pub fn new() -> Self {
        BasicSanitizer {
            blocked_elements: BLOCKED_ELEMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn block_element(mut self, tag_name: &str) -> Self {
        self.blocked_elements.push(tag_name.to_ascii_lowercase());
        self
    }

    fn clean(&self, doc: &mut Document, id: NodeId) {
        for child in doc.children(id).to_vec() {
            let blocked = doc
                .tag_name(child)
                .is_some_and(|tag| self.blocked_elements.iter().any(|b| b == tag));
            if blocked {
                doc.remove_child(id, child);
                continue;
            }
            for (name, value) in doc.attributes(child) {
                if name.starts_with("on") || (URL_ATTRIBUTES.contains(&name.as_str()) && is_script_url(&value)) {
                    doc.remove_attribute(child, &name);
                }
            }
            self.clean(doc, child);
        }
    }
}

impl Default for BasicSanitizer {
    fn default() -> Self {
        BasicSanitizer::new()
    }
}

impl MarkupSanitizer for BasicSanitizer {
    fn sanitize(&self, source: &str) -> String {
        let mut scratch = Document::new();
        let fragment = scratch.parse_fragment(source);
        self.clean(&mut scratch, fragment);
        markup::serialize(&scratch, fragment)
    }
}

fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    compact.to_ascii_lowercase().starts_with("javascript:")
}
