//! Update Appliers
//!
//! One procedure per binding kind, writing a freshly computed value onto a host
//! node. Every applier is idempotent for the same node and value, and maps
//! `undefined` to an empty default instead of the word "undefined".

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, MarkupSanitizer, NodeId};
use crate::value::Value;

/// Property whose value is mapped through the visibility keywords.
pub const VISIBILITY_PROPERTY: &str = "display";
pub const HIDDEN_KEYWORD: &str = "none";
pub const VISIBLE_KEYWORD: &str = "initial";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    PendingLocalEdit,
}

/// Per-binding guard of a two-way value binding.
///
/// The control's input listener enters `PendingLocalEdit` before writing the
/// scope; the value applier then skips exactly one application and returns
/// the guard to `Idle`.
#[derive(Clone, Default)]
pub struct EditGuard(Rc<Cell<EditState>>);

impl EditGuard {
    pub fn new() -> Self {
        EditGuard::default()
    }

    pub fn state(&self) -> EditState {
        self.0.get()
    }

    pub fn begin_local_edit(&self) {
        self.0.set(EditState::PendingLocalEdit);
    }

    /// Consume a pending local edit. True when one was pending.
    pub fn take_pending(&self) -> bool {
        self.0.replace(EditState::Idle) == EditState::PendingLocalEdit
    }

    pub fn reset(&self) {
        self.0.set(EditState::Idle);
    }
}

impl fmt::Debug for EditGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EditGuard").field(&self.state()).finish()
    }
}

#[derive(Clone)]
pub enum Update {
    Text,
    Markup(Option<Rc<dyn MarkupSanitizer>>),
    Value(EditGuard),
    Attribute(String),
    StyleProperty(String),
    /// Presence of the node, positioned before `anchor`.
    Presence { anchor: NodeId },
}

impl Update {
    pub fn name(&self) -> &'static str {
        match self {
            Update::Text => "text",
            Update::Markup(_) => "markup",
            Update::Value(_) => "value",
            Update::Attribute(_) => "attribute",
            Update::StyleProperty(_) => "style",
            Update::Presence { .. } => "presence",
        }
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Text => write!(f, "Text"),
            Update::Markup(sanitizer) => f.debug_tuple("Markup").field(sanitizer).finish(),
            Update::Value(guard) => f.debug_tuple("Value").field(guard).finish(),
            Update::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Update::StyleProperty(name) => f.debug_tuple("StyleProperty").field(name).finish(),
            Update::Presence { anchor } => f.debug_struct("Presence").field("anchor", anchor).finish(),
        }
    }
}

/// Write `value` onto `node`. Released nodes are skipped.
pub fn apply(doc: &mut Document, node: NodeId, update: &Update, value: &Value) {
    if !doc.is_alive(node) {
        return;
    }
    match update {
        Update::Text => update_text(doc, node, value),
        Update::Markup(sanitizer) => update_markup(doc, node, value, sanitizer.as_deref()),
        Update::Value(guard) => update_value(doc, node, value, guard),
        Update::Attribute(name) => update_attribute(doc, node, value, name),
        Update::StyleProperty(property) => update_style(doc, node, value, property),
        Update::Presence { anchor } => update_presence(doc, node, value, *anchor),
    }
}

/// `undefined` renders as the empty string; everything else uses its string form.
fn display_string(value: &Value) -> String {
    match value {
        Value::Undefined => String::new(),
        other => other.to_string(),
    }
}

pub fn update_text(doc: &mut Document, node: NodeId, value: &Value) {
    doc.set_text_content(node, &display_string(value));
}

pub fn update_markup(
    doc: &mut Document,
    node: NodeId,
    value: &Value,
    sanitizer: Option<&dyn MarkupSanitizer>,
) {
    let markup = display_string(value);
    match sanitizer {
        Some(sanitizer) => doc.set_inner_markup(node, &sanitizer.sanitize(&markup)),
        None => doc.set_inner_markup(node, &markup),
    }
}

pub fn update_value(doc: &mut Document, node: NodeId, value: &Value, guard: &EditGuard) {
    if guard.take_pending() {
        return;
    }
    let text = match value {
        Value::Undefined | Value::Null => String::new(),
        other => other.to_string(),
    };
    doc.set_value(node, &text);
}

pub fn update_attribute(doc: &mut Document, node: NodeId, value: &Value, name: &str) {
    doc.set_attribute(node, name, &display_string(value));
}

pub fn update_style(doc: &mut Document, node: NodeId, value: &Value, property: &str) {
    let text = if property == VISIBILITY_PROPERTY {
        if value.is_truthy() {
            VISIBLE_KEYWORD.to_string()
        } else {
            HIDDEN_KEYWORD.to_string()
        }
    } else {
        display_string(value)
    };
    doc.set_style_property(node, property, &text);
}

pub fn update_presence(doc: &mut Document, node: NodeId, value: &Value, anchor: NodeId) {
    if value.is_truthy() {
        if !doc.is_alive(anchor) {
            return;
        }
        if let Some(parent) = doc.parent(anchor) {
            if doc.parent(node) != Some(parent) {
                doc.insert_before(parent, node, Some(anchor));
            }
        }
    } else {
        doc.detach(node);
    }
}
