pub mod ast;
/**
 * Expression Parser Module
 *
 * Lexer, parser and evaluator for template binding expressions
 */
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use evaluator::{evaluate, Evaluation};
pub use lexer::Lexer;
pub use parser::Parser;
