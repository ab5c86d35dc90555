//! Expression Evaluator
//!
//! Computes a parsed binding expression against a [`Scope`]. While walking the
//! tree it records every root name read from the scope, which is what the
//! watcher subscribes to.

use indexmap::{IndexMap, IndexSet};

use super::ast::*;
use crate::error::{CompilerError, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Result of one evaluation: the value plus the scope names it depended on.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub dependencies: IndexSet<String>,
}

pub fn evaluate(ast: &AST, scope: &Scope) -> Result<Evaluation> {
    let mut evaluator = Evaluator::new(scope);
    let value = evaluator.visit(ast)?;
    Ok(Evaluation {
        value,
        dependencies: evaluator.dependencies,
    })
}

struct Evaluator<'a> {
    scope: &'a Scope,
    dependencies: IndexSet<String>,
}

impl<'a> Evaluator<'a> {
    fn new(scope: &'a Scope) -> Self {
        Evaluator {
            scope,
            dependencies: IndexSet::new(),
        }
    }

    fn visit(&mut self, ast: &AST) -> Result<Value> {
        match ast {
            AST::ImplicitReceiver(_) => Ok(self.scope_as_object()),
            AST::PropertyRead(read) => self.visit_property_read(read),
            AST::KeyedRead(read) => {
                if matches!(*read.receiver, AST::ImplicitReceiver(_)) {
                    // `this[key]` reads one scope name, like `this.key`
                    let name = self.visit(&read.key)?.to_string();
                    self.dependencies.insert(name.clone());
                    return Ok(self.scope.get(&name));
                }
                let receiver = self.visit(&read.receiver)?;
                let key = self.visit(&read.key)?;
                receiver.index(&key).ok_or_else(|| {
                    CompilerError::eval(format!(
                        "Cannot read properties of {} (reading '{}')",
                        receiver.type_name(),
                        key
                    ))
                })
            }
            AST::Call(call) => self.visit_call(call),
            AST::LiteralPrimitive(literal) => Ok(match &literal.value {
                LiteralValue::Undefined => Value::Undefined,
                LiteralValue::Null => Value::Null,
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::String(s.clone()),
            }),
            AST::LiteralArray(array) => Ok(Value::Array(
                array
                    .expressions
                    .iter()
                    .map(|expression| self.visit(expression))
                    .collect::<Result<Vec<_>>>()?,
            )),
            AST::LiteralMap(map) => {
                let mut object = IndexMap::new();
                for (key, value) in map.keys.iter().zip(&map.values) {
                    object.insert(key.clone(), self.visit(value)?);
                }
                Ok(Value::Object(object))
            }
            AST::Unary(unary) => {
                let operand = self.visit(&unary.expr)?.to_number();
                Ok(Value::Number(if unary.operator == "-" {
                    -operand
                } else {
                    operand
                }))
            }
            AST::PrefixNot(not) => Ok(Value::Bool(!self.visit(&not.expression)?.is_truthy())),
            AST::TypeofExpression(t) => {
                let value = self.visit(&t.expression)?;
                let name = match value {
                    Value::Null | Value::Array(_) | Value::Object(_) => "object",
                    other => other.type_name(),
                };
                Ok(Value::from(name))
            }
            AST::Binary(binary) => self.visit_binary(binary),
            AST::Conditional(cond) => {
                if self.visit(&cond.condition)?.is_truthy() {
                    self.visit(&cond.true_exp)
                } else {
                    self.visit(&cond.false_exp)
                }
            }
        }
    }

    fn visit_property_read(&mut self, read: &PropertyRead) -> Result<Value> {
        if matches!(*read.receiver, AST::ImplicitReceiver(_)) {
            self.dependencies.insert(read.name.clone());
            return Ok(self.scope.get(&read.name));
        }
        let receiver = self.visit(&read.receiver)?;
        if read.safe && receiver.is_nullish() {
            return Ok(Value::Undefined);
        }
        receiver.member(&read.name).ok_or_else(|| {
            CompilerError::eval(format!(
                "Cannot read properties of {} (reading '{}')",
                receiver.type_name(),
                read.name
            ))
        })
    }

    fn visit_call(&mut self, call: &Call) -> Result<Value> {
        let callee = self.visit(&call.receiver)?;
        let args = call
            .args
            .iter()
            .map(|arg| self.visit(arg))
            .collect::<Result<Vec<_>>>()?;
        match callee {
            Value::Function(function) => Ok(function.call(self.scope, &args)),
            other => Err(CompilerError::eval(format!(
                "{} is not a function",
                describe_callee(&call.receiver, &other)
            ))),
        }
    }

    fn visit_binary(&mut self, binary: &Binary) -> Result<Value> {
        let left = self.visit(&binary.left)?;
        // short-circuit operators return an operand, not a boolean
        match binary.operation.as_str() {
            "&&" => {
                return if left.is_truthy() {
                    self.visit(&binary.right)
                } else {
                    Ok(left)
                }
            }
            "||" => {
                return if left.is_truthy() {
                    Ok(left)
                } else {
                    self.visit(&binary.right)
                }
            }
            "??" => {
                return if left.is_nullish() {
                    self.visit(&binary.right)
                } else {
                    Ok(left)
                }
            }
            _ => {}
        }

        let right = self.visit(&binary.right)?;
        let value = match binary.operation.as_str() {
            "+" => {
                if left.is_string_like() || right.is_string_like() {
                    Value::String(format!("{}{}", left, right))
                } else {
                    Value::Number(left.to_number() + right.to_number())
                }
            }
            "-" => Value::Number(left.to_number() - right.to_number()),
            "*" => Value::Number(left.to_number() * right.to_number()),
            "/" => Value::Number(left.to_number() / right.to_number()),
            "%" => Value::Number(left.to_number() % right.to_number()),
            "==" => Value::Bool(left.loose_equals(&right)),
            "!=" => Value::Bool(!left.loose_equals(&right)),
            "===" => Value::Bool(left.strict_equals(&right)),
            "!==" => Value::Bool(!left.strict_equals(&right)),
            "<" | ">" | "<=" | ">=" => Value::Bool(compare(&binary.operation, &left, &right)),
            other => {
                return Err(CompilerError::eval(format!("Unsupported operator '{}'", other)));
            }
        };
        Ok(value)
    }

    /// `this` evaluates to a snapshot of every name visible from the scope,
    /// and depends on all of them.
    fn scope_as_object(&mut self) -> Value {
        let mut chain = Vec::new();
        let mut current = Some(self.scope);
        while let Some(scope) = current {
            chain.push(scope);
            current = scope.parent();
        }
        let mut object = IndexMap::new();
        for scope in chain.into_iter().rev() {
            for name in scope.own_names() {
                let value = scope.get(&name);
                self.dependencies.insert(name.clone());
                object.insert(name, value);
            }
        }
        Value::Object(object)
    }
}

fn compare(operation: &str, left: &Value, right: &Value) -> bool {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return match operation {
            "<" => a < b,
            ">" => a > b,
            "<=" => a <= b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match operation {
        "<" => a < b,
        ">" => a > b,
        "<=" => a <= b,
        _ => a >= b,
    }
}

fn describe_callee(receiver: &AST, value: &Value) -> String {
    match receiver {
        AST::PropertyRead(read) => format!("'{}' ({})", read.name, value.type_name()),
        _ => value.type_name().to_string(),
    }
}
