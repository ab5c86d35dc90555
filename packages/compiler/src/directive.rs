//! Directive Dispatcher
//!
//! Recognizes directive attributes (`v-type` or `v-type:prop`) and classifies
//! them for the compiler.

/// A directive attribute split into its type and optional sub-property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDescriptor {
    pub name: String,
    pub prop: Option<String>,
}

impl DirectiveDescriptor {
    pub fn kind(&self) -> Option<DirectiveKind> {
        DirectiveKind::from_name(&self.name)
    }
}

/// Resolve `attr_name` against `prefix`. Ordinary attributes yield `None`.
pub fn check_directive(attr_name: &str, prefix: &str) -> Option<DirectiveDescriptor> {
    let rest = attr_name.strip_prefix(prefix)?;
    let (name, prop) = match rest.split_once(':') {
        Some((name, prop)) => (name, Some(prop)),
        None => (rest, None),
    };
    if name.is_empty() {
        return None;
    }
    Some(DirectiveDescriptor {
        name: name.to_string(),
        prop: prop.filter(|p| !p.is_empty()).map(str::to_string),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Text,
    Html,
    Model,
    On,
    Bind,
    Show,
    If,
    For,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "text" => DirectiveKind::Text,
            "html" => DirectiveKind::Html,
            "model" => DirectiveKind::Model,
            "on" => DirectiveKind::On,
            "bind" => DirectiveKind::Bind,
            "show" => DirectiveKind::Show,
            "if" => DirectiveKind::If,
            "for" => DirectiveKind::For,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DirectiveKind::Text => "text",
            DirectiveKind::Html => "html",
            DirectiveKind::Model => "model",
            DirectiveKind::On => "on",
            DirectiveKind::Bind => "bind",
            DirectiveKind::Show => "show",
            DirectiveKind::If => "if",
            DirectiveKind::For => "for",
        }
    }

    /// Structural directives decide whether the subtree is compiled at all and
    /// run after every other directive on the element.
    pub fn is_structural(&self) -> bool {
        matches!(self, DirectiveKind::If | DirectiveKind::For)
    }
}
