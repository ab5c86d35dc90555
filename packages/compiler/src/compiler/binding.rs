//! Binding Registration
//!
//! Connects an update applier to the dependency tracker, and the [`View`]
//! handle that owns the resulting watchers.

use std::rc::Rc;

use super::{Compiler, Diagnostic};
use crate::dom::{NodeId, SharedDocument};
use crate::error::Result;
use crate::scope::Scope;
use crate::updater::{self, Update};
use crate::value::Value;
use crate::watcher::{DependencyTracker, OnChange, WatcherId};

impl Compiler {
    /// Watch `expression` in `scope` and apply every value to `node` through
    /// `update`. The initial value is applied before this returns.
    pub(crate) fn bind_watcher(
        &mut self,
        node: NodeId,
        scope: &Scope,
        expression: &str,
        update: Update,
    ) -> Result<WatcherId> {
        let document = Rc::downgrade(&self.document);
        let logger = Rc::clone(&self.logger);
        let kind = update.name();
        let on_change: OnChange = Rc::new(move |value: &Value| {
            let Some(document) = document.upgrade() else {
                return;
            };
            match document.try_borrow_mut() {
                Ok(mut doc) => updater::apply(&mut doc, node, &update, value),
                Err(_) => logger.warn(&format!(
                    "Document is borrowed; dropped {} update for {}",
                    update.name(),
                    node
                )),
            };
        });

        let id = self.tracker.watch(expression, scope, on_change)?;
        self.watchers.push(id);
        self.logger
            .debug(&format!("Bound {} {} to '{}'", kind, node, expression));
        Ok(id)
    }
}

/// A mounted template: its live watchers and the diagnostics of the compile.
pub struct View {
    document: SharedDocument,
    root: NodeId,
    scope: Scope,
    tracker: Rc<dyn DependencyTracker>,
    watchers: Vec<WatcherId>,
    diagnostics: Vec<Diagnostic>,
}

impl View {
    pub(super) fn new(
        document: SharedDocument,
        root: NodeId,
        scope: Scope,
        tracker: Rc<dyn DependencyTracker>,
        watchers: Vec<WatcherId>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        View {
            document,
            root,
            scope,
            tracker,
            watchers,
            diagnostics,
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn watchers(&self) -> &[WatcherId] {
        &self.watchers
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Serialized content of the root element.
    pub fn markup(&self) -> String {
        self.document.borrow().inner_markup(self.root)
    }

    /// Unregister every watcher. Returns how many were still registered.
    pub fn dispose(&mut self) -> usize {
        let tracker = &self.tracker;
        let scope = &self.scope;
        self.watchers
            .drain(..)
            .filter(|&id| tracker.unwatch(scope, id))
            .count()
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("root", &self.root)
            .field("watchers", &self.watchers.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
