/**
 * Binding Expression AST
 *
 * Node types for template binding expressions
 */

use serde::{Deserialize, Serialize};

/// Source span for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }
}

/// Literal values that can appear directly in an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Main AST enum containing all node types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    ImplicitReceiver(ImplicitReceiver),
    PropertyRead(PropertyRead),
    KeyedRead(KeyedRead),
    Call(Call),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Unary(Unary),
    PrefixNot(PrefixNot),
    TypeofExpression(TypeofExpression),
    Binary(Binary),
    Conditional(Conditional),
}

impl AST {
    pub fn span(&self) -> ParseSpan {
        match self {
            AST::ImplicitReceiver(n) => n.span,
            AST::PropertyRead(n) => n.span,
            AST::KeyedRead(n) => n.span,
            AST::Call(n) => n.span,
            AST::LiteralPrimitive(n) => n.span,
            AST::LiteralArray(n) => n.span,
            AST::LiteralMap(n) => n.span,
            AST::Unary(n) => n.span,
            AST::PrefixNot(n) => n.span,
            AST::TypeofExpression(n) => n.span,
            AST::Binary(n) => n.span,
            AST::Conditional(n) => n.span,
        }
    }

    /// Root identifiers this expression reads from its scope, in source order.
    pub fn free_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_free_names(self, &mut names);
        names
    }
}

fn collect_free_names(ast: &AST, names: &mut Vec<String>) {
    match ast {
        AST::ImplicitReceiver(_) | AST::LiteralPrimitive(_) => {}
        AST::PropertyRead(read) => {
            if matches!(*read.receiver, AST::ImplicitReceiver(_)) {
                if !names.contains(&read.name) {
                    names.push(read.name.clone());
                }
            } else {
                collect_free_names(&read.receiver, names);
            }
        }
        AST::KeyedRead(read) => {
            collect_free_names(&read.receiver, names);
            collect_free_names(&read.key, names);
        }
        AST::Call(call) => {
            collect_free_names(&call.receiver, names);
            call.args.iter().for_each(|arg| collect_free_names(arg, names));
        }
        AST::LiteralArray(array) => {
            array.expressions.iter().for_each(|e| collect_free_names(e, names));
        }
        AST::LiteralMap(map) => {
            map.values.iter().for_each(|v| collect_free_names(v, names));
        }
        AST::Unary(unary) => collect_free_names(&unary.expr, names),
        AST::PrefixNot(not) => collect_free_names(&not.expression, names),
        AST::TypeofExpression(t) => collect_free_names(&t.expression, names),
        AST::Binary(binary) => {
            collect_free_names(&binary.left, names);
            collect_free_names(&binary.right, names);
        }
        AST::Conditional(cond) => {
            collect_free_names(&cond.condition, names);
            collect_free_names(&cond.true_exp, names);
            collect_free_names(&cond.false_exp, names);
        }
    }
}

/// The scope an unqualified name is read from (also `this`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
}

/// `receiver.name`, or a bare `name` on the implicit receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub name: String,
    /// `?.` access yields undefined on a nullish receiver
    pub safe: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub args: Vec<Box<AST>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub expressions: Vec<Box<AST>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub keys: Vec<String>,
    pub values: Vec<Box<AST>>,
}

/// Unary `-expr` / `+expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeofExpression {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}
