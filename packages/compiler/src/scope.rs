//! Scope
//!
//! A scope is the state object a template region reads and writes. Scopes form a
//! chain through explicit parent pointers: lookups that miss the local table fall
//! back to the parent, and a child created for a repeat iteration shadows the loop
//! variable without touching its parent.
//!
//! All scopes of one chain share a single watcher [`Registry`]; every write
//! notifies it with the written name.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{CompilerError, Result};
use crate::value::Value;
use crate::watcher::Registry;

struct ScopeInner {
    bindings: RefCell<IndexMap<String, Value>>,
    parent: Option<Scope>,
    registry: Rc<Registry>,
}

#[derive(Clone)]
pub struct Scope(Rc<ScopeInner>);

impl Scope {
    pub fn new() -> Self {
        Scope(Rc::new(ScopeInner {
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
            registry: Rc::new(Registry::new()),
        }))
    }

    /// Build a root scope from a JSON object.
    pub fn from_json(data: serde_json::Value) -> Result<Self> {
        match Value::from_json(data) {
            Value::Object(map) => {
                let scope = Scope::new();
                *scope.0.bindings.borrow_mut() = map;
                Ok(scope)
            }
            other => Err(CompilerError::InvalidScope {
                found: other.type_name().to_string(),
            }),
        }
    }

    /// A child scope delegating unknown names to `self`.
    pub fn child(&self) -> Scope {
        Scope(Rc::new(ScopeInner {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(self.clone()),
            registry: Rc::clone(&self.0.registry),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    pub(crate) fn registry(&self) -> &Rc<Registry> {
        &self.0.registry
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(value) = scope.0.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            current = scope.parent();
        }
        None
    }

    /// Value of `name` along the chain, `undefined` when no scope declares it.
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or_default()
    }

    /// Bind `name` in this scope only, shadowing any inherited binding.
    pub fn declare(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        self.0
            .bindings
            .borrow_mut()
            .insert(name.clone(), value.into());
        self.0.registry.notify(&name);
    }

    /// Write `name` in the nearest scope declaring it, or locally if none does.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let owner = self.owner_of(name).unwrap_or(self);
        owner
            .0
            .bindings
            .borrow_mut()
            .insert(name.to_string(), value.into());
        self.0.registry.notify(name);
    }

    /// Write through a dotted path such as `user.address.city`.
    ///
    /// Every intermediate value must already be an object.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(CompilerError::eval(format!("invalid assignment path '{}'", path)));
        }
        let (root, rest) = segments.split_at(1);
        if rest.is_empty() {
            self.set(root[0], value);
            return Ok(());
        }

        let mut root_value = self.get(root[0]);
        assign_nested(&mut root_value, rest, value.into(), path)?;
        self.set(root[0], root_value);
        Ok(())
    }

    fn owner_of(&self, name: &str) -> Option<&Scope> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if scope.has_own(name) {
                return Some(scope);
            }
            current = scope.parent();
        }
        None
    }

    /// Names declared locally, in insertion order.
    pub fn own_names(&self) -> Vec<String> {
        self.0.bindings.borrow().keys().cloned().collect()
    }
}

fn assign_nested(target: &mut Value, segments: &[&str], value: Value, path: &str) -> Result<()> {
    let Value::Object(map) = target else {
        return Err(CompilerError::eval(format!(
            "cannot assign '{}': intermediate value is {}",
            path,
            target.type_name()
        )));
    };
    match segments {
        [last] => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        [head, tail @ ..] => {
            let next = map.entry(head.to_string()).or_insert(Value::Undefined);
            assign_nested(next, tail, value, path)
        }
        [] => Ok(()),
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.0.bindings.borrow())
            .field("parent", &self.0.parent)
            .finish()
    }
}
