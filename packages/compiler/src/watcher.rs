//! Dependency Tracking
//!
//! The compiler only relies on the [`DependencyTracker`] contract: evaluate an
//! expression against a scope now, and call back with the fresh value whenever
//! a scope name it read is written. [`ScopeTracker`] is the implementation
//! backed by the registry every scope chain carries.

use indexmap::{IndexMap, IndexSet};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::expression_parser::{evaluate, Parser, AST};
use crate::logging::{Logger, NullLogger};
use crate::scope::Scope;
use crate::value::Value;

/// Callback receiving each newly computed value.
pub type OnChange = Rc<dyn Fn(&Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

pub trait DependencyTracker {
    /// Evaluate `expression` in `scope`, deliver the value to `on_change`, and keep
    /// delivering whenever the value changes.
    fn watch(&self, expression: &str, scope: &Scope, on_change: OnChange) -> Result<WatcherId>;

    /// Stop a watcher created on `scope`'s chain. Returns false when unknown.
    fn unwatch(&self, scope: &Scope, id: WatcherId) -> bool;
}

/// Default tracker; subscriptions live in the scope chain's [`Registry`].
pub struct ScopeTracker {
    parser: Parser,
    logger: Rc<dyn Logger>,
}

impl ScopeTracker {
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        ScopeTracker {
            parser: Parser::new(),
            logger,
        }
    }
}

impl Default for ScopeTracker {
    fn default() -> Self {
        ScopeTracker::new(Rc::new(NullLogger::new()))
    }
}

impl DependencyTracker for ScopeTracker {
    fn watch(&self, expression: &str, scope: &Scope, on_change: OnChange) -> Result<WatcherId> {
        let ast = self.parser.parse_binding(expression)?;
        let registry = scope.registry();
        let watcher = Rc::new(Watcher {
            id: registry.next_id(),
            expression: expression.to_string(),
            ast,
            scope: scope.clone(),
            on_change,
            logger: Rc::clone(&self.logger),
            state: RefCell::new(WatcherState::default()),
        });
        registry.insert(Rc::clone(&watcher));
        watcher.run(true);
        Ok(watcher.id)
    }

    fn unwatch(&self, scope: &Scope, id: WatcherId) -> bool {
        scope.registry().remove(id)
    }
}

#[derive(Default)]
struct WatcherState {
    dependencies: IndexSet<String>,
    last: Value,
}

struct Watcher {
    id: WatcherId,
    expression: String,
    ast: AST,
    scope: Scope,
    on_change: OnChange,
    logger: Rc<dyn Logger>,
    state: RefCell<WatcherState>,
}

impl Watcher {
    fn depends_on(&self, name: &str) -> bool {
        self.state
            .try_borrow()
            .map(|state| state.dependencies.contains(name))
            .unwrap_or(false)
    }

    /// Re-evaluate and notify. `initial` forces delivery of the first value.
    fn run(&self, initial: bool) {
        let value = {
            // a re-entrant notification while evaluating is dropped
            let Ok(mut state) = self.state.try_borrow_mut() else {
                return;
            };
            let value = match evaluate(&self.ast, &self.scope) {
                Ok(evaluation) => {
                    state.dependencies = evaluation.dependencies;
                    evaluation.value
                }
                Err(error) => {
                    self.logger.warn(&format!(
                        "Error evaluating '{}': {}; using undefined",
                        self.expression, error
                    ));
                    // keep reacting to the names the expression mentions
                    state.dependencies = self.ast.free_names().into_iter().collect();
                    Value::Undefined
                }
            };
            if !initial && value == state.last {
                return;
            }
            state.last = value.clone();
            value
        };
        (self.on_change)(&value);
    }
}

/// Watchers registered against one scope chain.
pub struct Registry {
    next_id: Cell<u64>,
    watchers: RefCell<IndexMap<WatcherId, Rc<Watcher>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Registry {
            next_id: Cell::new(0),
            watchers: RefCell::new(IndexMap::new()),
        }
    }

    fn next_id(&self) -> WatcherId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        WatcherId(id)
    }

    fn insert(&self, watcher: Rc<Watcher>) {
        self.watchers.borrow_mut().insert(watcher.id, watcher);
    }

    fn remove(&self, id: WatcherId) -> bool {
        self.watchers.borrow_mut().shift_remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-run every watcher that read `name`.
    pub(crate) fn notify(&self, name: &str) {
        let affected: Vec<Rc<Watcher>> = self
            .watchers
            .borrow()
            .values()
            .filter(|watcher| watcher.depends_on(name))
            .cloned()
            .collect();
        for watcher in affected {
            // an earlier callback may have disposed it
            if self.watchers.borrow().contains_key(&watcher.id) {
                watcher.run(false);
            }
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("watchers", &self.len())
            .finish()
    }
}
