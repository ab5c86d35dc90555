//! Template Compiler
//!
//! Walks a host subtree depth-first, turning interpolated text and directive
//! attributes into live bindings against a [`Scope`]. Structural directives
//! (`if`, `for`) run after every other directive on their element because
//! they decide whether, and how many times, the subtree is compiled.

mod binding;
mod handlers;

pub use binding::View;

use std::rc::Rc;

use crate::config::{CompilerConfig, StructuralConflict};
use crate::directive::{check_directive, DirectiveDescriptor, DirectiveKind};
use crate::dom::{MarkupSanitizer, NodeId, NodeType, SharedDocument};
use crate::error::{CompilerError, Result};
use crate::logging::{ConsoleLogger, LogLevel, Logger};
use crate::scope::Scope;
use crate::translator;
use crate::watcher::{DependencyTracker, ScopeTracker, WatcherId};

/// A problem recorded while compiling in non-strict mode, or an unknown
/// directive in either mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: LogLevel,
    pub node: NodeId,
    pub message: String,
}

pub struct Compiler {
    document: SharedDocument,
    scope: Scope,
    config: CompilerConfig,
    logger: Rc<dyn Logger>,
    tracker: Rc<dyn DependencyTracker>,
    custom_tracker: bool,
    sanitizer: Option<Rc<dyn MarkupSanitizer>>,
    diagnostics: Vec<Diagnostic>,
    watchers: Vec<WatcherId>,
}

/// A structural directive waiting for the other directives of its element.
struct Pending {
    kind: DirectiveKind,
    attribute: String,
    expression: String,
}

impl Compiler {
    pub fn new(document: SharedDocument, scope: Scope) -> Self {
        Compiler::with_config(document, scope, CompilerConfig::default())
    }

    pub fn with_config(document: SharedDocument, scope: Scope, config: CompilerConfig) -> Self {
        let logger: Rc<dyn Logger> = Rc::new(ConsoleLogger::new(config.log_level));
        Compiler {
            document,
            scope,
            config,
            tracker: Rc::new(ScopeTracker::new(Rc::clone(&logger))),
            logger,
            custom_tracker: false,
            sanitizer: None,
            diagnostics: Vec::new(),
            watchers: Vec::new(),
        }
    }

    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        if !self.custom_tracker {
            self.tracker = Rc::new(ScopeTracker::new(Rc::clone(&logger)));
        }
        self.logger = logger;
        self
    }

    pub fn with_tracker(mut self, tracker: Rc<dyn DependencyTracker>) -> Self {
        self.tracker = tracker;
        self.custom_tracker = true;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Rc<dyn MarkupSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn watchers(&self) -> &[WatcherId] {
        &self.watchers
    }

    /// Compile the children of `root` and bind them to the root scope.
    ///
    /// The children are moved into a detached fragment for the walk and moved
    /// back afterwards, even when compilation fails. On failure every watcher
    /// registered so far is released.
    pub fn mount(mut self, root: NodeId) -> Result<View> {
        self.config.validate()?;
        let fragment = self.node_to_fragment(root);
        let result = self.compile(fragment, None);

        {
            let mut doc = self.document.borrow_mut();
            let children = doc.children(fragment).to_vec();
            for child in children {
                doc.append_child(root, child);
            }
            doc.release(fragment);
        }

        if let Err(error) = result {
            self.logger.error(&format!("Mount aborted: {}", error));
            for &id in &self.watchers {
                self.tracker.unwatch(&self.scope, id);
            }
            return Err(error);
        }

        self.logger.info(&format!(
            "Mounted {} with {} bindings",
            root,
            self.watchers.len()
        ));
        Ok(View::new(
            self.document,
            root,
            self.scope,
            self.tracker,
            self.watchers,
            self.diagnostics,
        ))
    }

    /// Move the children of `root` into a new fragment, dropping comments and
    /// line-break whitespace.
    fn node_to_fragment(&self, root: NodeId) -> NodeId {
        let mut doc = self.document.borrow_mut();
        let fragment = doc.create_fragment();
        let children = doc.children(root).to_vec();
        for child in children {
            let ignorable = match doc.node_type(child) {
                NodeType::Comment => true,
                NodeType::Text => doc
                    .data(child)
                    .is_some_and(|text| text.trim().is_empty() && text.contains('\n')),
                _ => false,
            };
            if ignorable {
                doc.release(child);
            } else {
                doc.append_child(fragment, child);
            }
        }
        fragment
    }

    /// Compile every child of `node` against `scope`, or the root scope.
    pub fn compile(&mut self, node: NodeId, scope: Option<&Scope>) -> Result<()> {
        let scope = scope.cloned().unwrap_or_else(|| self.scope.clone());
        self.compile_children(node, &scope)
    }

    fn compile_children(&mut self, node: NodeId, scope: &Scope) -> Result<()> {
        let children = self.document.borrow().children(node).to_vec();
        for child in children {
            let node_type = self.document.borrow().node_type(child);
            match node_type {
                NodeType::Text => self.compile_text_node(child, scope)?,
                NodeType::Element => self.compile_element_node(child, scope)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn compile_text_node(&mut self, node: NodeId, scope: &Scope) -> Result<()> {
        let text = self.document.borrow().text_content(node);
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let expression = translator::text_to_expression(text);
        let result = self.text_handler(node, scope, &expression);
        self.check(node, result)
    }

    fn compile_element_node(&mut self, node: NodeId, scope: &Scope) -> Result<()> {
        let attributes = self.document.borrow().attributes(node);
        let mut structural: Option<Pending> = None;
        let mut structural_attributes = Vec::new();
        let mut directives: Vec<(String, DirectiveDescriptor, String)> = Vec::new();
        let mut conflict = None;

        for (name, value) in attributes {
            let Some(descriptor) = check_directive(&name, &self.config.directive_prefix) else {
                continue;
            };
            match descriptor.kind() {
                Some(kind) if kind.is_structural() => {
                    structural_attributes.push(name.clone());
                    let next = Pending {
                        kind,
                        attribute: name,
                        expression: value,
                    };
                    structural = match structural {
                        None => Some(next),
                        Some(first) => match self.config.structural_conflict {
                            StructuralConflict::Reject => {
                                conflict = Some(CompilerError::ConflictingStructural {
                                    first: first.attribute.clone(),
                                    second: next.attribute,
                                });
                                Some(first)
                            }
                            StructuralConflict::FirstWins => {
                                self.logger.warn(&format!(
                                    "Ignoring '{}'; '{}' takes precedence",
                                    next.attribute, first.attribute
                                ));
                                Some(first)
                            }
                            StructuralConflict::LastWins => {
                                self.logger.warn(&format!(
                                    "Ignoring '{}'; '{}' takes precedence",
                                    first.attribute, next.attribute
                                ));
                                Some(next)
                            }
                        },
                    };
                }
                _ => directives.push((name, descriptor, value)),
            }
        }

        for name in &structural_attributes {
            self.document.borrow_mut().remove_attribute(node, name);
        }

        if let Some(error) = conflict {
            for (name, _, _) in &directives {
                self.document.borrow_mut().remove_attribute(node, name);
            }
            return self.report(node, error);
        }

        match structural {
            Some(pending) if pending.kind == DirectiveKind::For => {
                // the remaining directives are compiled on each clone
                for (name, descriptor, _) in &directives {
                    if descriptor.kind().is_none() {
                        self.document.borrow_mut().remove_attribute(node, name);
                        self.unknown_directive(node, name);
                    }
                }
                let result = self.for_handler(node, scope, &pending.expression);
                // only reachable on the template when expansion failed
                for (name, _, _) in &directives {
                    self.document.borrow_mut().remove_attribute(node, name);
                }
                self.check(node, result)
            }
            structural => {
                for (name, descriptor, value) in directives {
                    self.document.borrow_mut().remove_attribute(node, &name);
                    match descriptor.kind() {
                        Some(kind) => {
                            let result =
                                self.apply_directive(kind, node, scope, &value, descriptor.prop.as_deref());
                            self.check(node, result)?;
                        }
                        None => self.unknown_directive(node, &name),
                    }
                }
                match structural {
                    Some(pending) => {
                        let result = self.if_handler(node, scope, &pending.expression);
                        self.check(node, result)
                    }
                    None => self.compile_children(node, scope),
                }
            }
        }
    }

    fn apply_directive(
        &mut self,
        kind: DirectiveKind,
        node: NodeId,
        scope: &Scope,
        expression: &str,
        prop: Option<&str>,
    ) -> Result<()> {
        match kind {
            DirectiveKind::Text => self.text_handler(node, scope, expression),
            DirectiveKind::Html => self.html_handler(node, scope, expression),
            DirectiveKind::Model => self.model_handler(node, scope, expression),
            DirectiveKind::On => self.on_handler(node, scope, expression, prop),
            DirectiveKind::Bind => self.bind_handler(node, scope, expression, prop),
            DirectiveKind::Show => self.show_handler(node, scope, expression),
            DirectiveKind::If => self.if_handler(node, scope, expression),
            DirectiveKind::For => self.for_handler(node, scope, expression),
        }
    }

    fn unknown_directive(&mut self, node: NodeId, attribute: &str) {
        let message = format!("Unknown directive '{}'", attribute);
        self.logger.warn(&message);
        self.diagnostics.push(Diagnostic {
            level: LogLevel::Warn,
            node,
            message,
        });
    }

    fn check(&mut self, node: NodeId, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(error) => self.report(node, error),
        }
    }

    /// Strict mode aborts on `error`; otherwise it is logged and recorded.
    ///
    /// An error returned from a nested walk passes through here once per
    /// enclosing structural directive, so only the non-strict path logs.
    fn report(&mut self, node: NodeId, error: CompilerError) -> Result<()> {
        if self.config.strict {
            return Err(error);
        }
        let message = error.to_string();
        self.logger.error(&message);
        self.diagnostics.push(Diagnostic {
            level: LogLevel::Error,
            node,
            message,
        });
        Ok(())
    }
}
