//! Directive Handlers
//!
//! One method per directive type. Each receives the element, the scope it is
//! compiled against, the attribute value and the optional sub-property.

use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;

use super::Compiler;
use crate::dom::{Event, Listener, NodeId};
use crate::error::{CompilerError, Result};
use crate::expression_parser::lexer;
use crate::scope::Scope;
use crate::translator;
use crate::updater::{EditGuard, Update, VISIBILITY_PROPERTY};
use crate::value::Value;

static REPEAT_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_$][\w$]*)\s+in\s+(.+?)\s*$").unwrap());

/// `item in items` split into the loop variable and the collection path.
pub(crate) fn parse_repeat(expression: &str) -> Result<(String, Vec<String>)> {
    let malformed = |reason: &str| CompilerError::MalformedRepeat {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };
    let captures = REPEAT_REGEXP
        .captures(expression)
        .ok_or_else(|| malformed("expected '<item> in <collection>'"))?;
    let item = captures.get(1).map_or("", |m| m.as_str()).to_string();
    let path = captures.get(2).map_or("", |m| m.as_str());
    let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
    if segments.iter().any(|segment| !lexer::is_identifier(segment)) {
        return Err(malformed("collection must be a property path such as 'list' or 'data.list'"));
    }
    Ok((item, segments))
}

/// True for `name` or `a.b.c`.
fn is_assignable_path(expression: &str) -> bool {
    expression
        .split('.')
        .all(|segment| lexer::is_identifier(segment.trim()))
}

impl Compiler {
    pub(super) fn text_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        self.bind_watcher(node, scope, expression, Update::Text)?;
        Ok(())
    }

    pub(super) fn html_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        let update = Update::Markup(self.sanitizer.clone());
        self.bind_watcher(node, scope, expression, update)?;
        Ok(())
    }

    /// Two-way value binding on form controls. Other elements are left alone.
    pub(super) fn model_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        let event_type = match self.document.borrow().tag_name(node) {
            Some("input") | Some("textarea") => "input",
            Some("select") => "change",
            other => {
                self.logger.debug(&format!(
                    "Ignoring model binding on <{}>",
                    other.unwrap_or("?")
                ));
                return Ok(());
            }
        };
        let path = expression.trim();
        if !is_assignable_path(path) {
            return Err(CompilerError::parse(
                "model binding needs an assignable property path",
                expression,
            ));
        }

        let guard = EditGuard::new();
        self.bind_watcher(node, scope, path, Update::Value(guard.clone()))?;

        let document = Rc::downgrade(&self.document);
        let scope = scope.clone();
        let logger = Rc::clone(&self.logger);
        let path = path.to_string();
        let listener: Listener = Rc::new(move |event: &Event| {
            let Some(document) = document.upgrade() else {
                return;
            };
            let value = document.borrow().value(event.target);
            guard.begin_local_edit();
            if let Err(error) = scope.set_path(&path, value) {
                logger.error(&format!("Cannot write '{}': {}", path, error));
            }
            // nothing consumed the edit when the value did not change
            guard.reset();
        });
        self.document
            .borrow_mut()
            .add_event_listener(node, event_type, listener);
        Ok(())
    }

    /// Attach the function at the property path `expression` as an event
    /// listener. The path is resolved once and never called while compiling.
    pub(super) fn on_handler(
        &mut self,
        node: NodeId,
        scope: &Scope,
        expression: &str,
        event_type: Option<&str>,
    ) -> Result<()> {
        let Some(event_type) = event_type else {
            self.logger.warn(&format!("Event binding '{}' has no event type", expression));
            return Ok(());
        };
        let path = expression.trim();
        if !is_assignable_path(path) {
            return Err(CompilerError::parse(
                "event handler must name a function, such as 'save' or 'form.submit'",
                expression,
            ));
        }
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        let function = match resolve_path(scope, &segments) {
            Some(Value::Function(function)) => function,
            other => {
                self.logger.warn(&format!(
                    "Event handler '{}' is {}, not a function",
                    path,
                    other.unwrap_or_default().type_name()
                ));
                return Ok(());
            }
        };

        let receiver = scope.clone();
        let listener: Listener = Rc::new(move |event: &Event| {
            function.call(&receiver, &[event.to_value()]);
        });
        self.document
            .borrow_mut()
            .add_event_listener(node, event_type, listener);
        Ok(())
    }

    /// `bind:attr`. Class and style shorthand extend the static attribute.
    pub(super) fn bind_handler(
        &mut self,
        node: NodeId,
        scope: &Scope,
        expression: &str,
        attribute: Option<&str>,
    ) -> Result<()> {
        let attribute = attribute.ok_or_else(|| CompilerError::MissingArgument {
            directive: format!("{}bind", self.config.directive_prefix),
        })?;
        let attribute = attribute.to_ascii_lowercase();

        let expression = match attribute.as_str() {
            "class" => {
                let dynamic = translator::class_to_expression(expression)?;
                let existing = self.static_attribute(node, "class");
                let existing = existing.trim();
                if existing.is_empty() {
                    dynamic
                } else {
                    format!("{}+{}", translator::quote_literal(&format!("{} ", existing)), dynamic)
                }
            }
            "style" => {
                let dynamic = translator::style_to_expression(expression)?;
                let existing = self.static_attribute(node, "style");
                let existing = existing.trim().trim_end_matches(';').trim_end();
                if existing.is_empty() {
                    dynamic
                } else {
                    format!("{}+{}", translator::quote_literal(&format!("{};", existing)), dynamic)
                }
            }
            _ => expression.to_string(),
        };
        self.bind_watcher(node, scope, &expression, Update::Attribute(attribute))?;
        Ok(())
    }

    pub(super) fn show_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        let update = Update::StyleProperty(VISIBILITY_PROPERTY.to_string());
        self.bind_watcher(node, scope, expression, update)?;
        Ok(())
    }

    /// Compile the subtree, then swap the element for an empty text anchor and
    /// bind its presence.
    pub(super) fn if_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        self.compile_children(node, scope)?;

        let anchor = {
            let mut doc = self.document.borrow_mut();
            let parent = doc.parent(node).ok_or_else(|| CompilerError::DetachedNode {
                directive: format!("{}if", self.config.directive_prefix),
            })?;
            let anchor = doc.create_text("");
            doc.insert_before(parent, anchor, Some(node));
            doc.remove_child(parent, node);
            anchor
        };
        self.bind_watcher(node, scope, expression, Update::Presence { anchor })?;
        Ok(())
    }

    /// Clone the element once per item of the collection, each compiled in a
    /// child scope binding the loop variable, then drop the template.
    ///
    /// The collection is read once; later changes to it are not tracked.
    pub(super) fn for_handler(&mut self, node: NodeId, scope: &Scope, expression: &str) -> Result<()> {
        let (item_name, path) = parse_repeat(expression)?;
        let items = resolve_collection(scope, &path).ok_or_else(|| {
            CompilerError::UnresolvedCollection {
                expression: expression.trim().to_string(),
                path: path.join("."),
            }
        })?;
        let parent = self.document.borrow().parent(node).ok_or_else(|| {
            CompilerError::DetachedNode {
                directive: format!("{}for", self.config.directive_prefix),
            }
        })?;

        for item in items {
            let clone = {
                let mut doc = self.document.borrow_mut();
                let clone = doc.clone_node(node, true);
                doc.insert_before(parent, clone, Some(node));
                clone
            };
            let item_scope = scope.child();
            item_scope.declare(item_name.as_str(), item);
            self.compile_element_node(clone, &item_scope)?;
        }

        self.document.borrow_mut().release(node);
        self.logger.debug(&format!("Expanded '{}'", expression.trim()));
        Ok(())
    }

    fn static_attribute(&self, node: NodeId, name: &str) -> String {
        self.document
            .borrow()
            .get_attribute(node, name)
            .unwrap_or_default()
            .to_string()
    }
}

/// Follow `a.b.c` through the scope chain without evaluating anything.
fn resolve_path<S: AsRef<str>>(scope: &Scope, path: &[S]) -> Option<Value> {
    let (root, rest) = path.split_first()?;
    let mut current = scope.lookup(root.as_ref())?;
    for segment in rest {
        current = current.member(segment.as_ref())?;
    }
    Some(current)
}

fn resolve_collection(scope: &Scope, path: &[String]) -> Option<Vec<Value>> {
    match resolve_path(scope, path)? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}
