/**
 * Binding Expression Parser
 *
 * Recursive descent parser for template binding expressions
 */
use super::ast::*;
use super::lexer::{Lexer, Token, TokenType};
use crate::error::{CompilerError, Result};

/// Parser for binding expressions
#[derive(Debug, Default, Clone)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            lexer: Lexer::new(),
        }
    }

    /// Parse a binding expression (property, text, attribute bindings)
    pub fn parse_binding(&self, input: &str) -> Result<AST> {
        let tokens = self.lexer.tokenize(input);
        if let Some(error) = tokens.iter().find(|token| token.is_error()) {
            return Err(CompilerError::parse(error.str_value.clone(), input));
        }
        if tokens.is_empty() {
            return Err(CompilerError::parse("Blank expressions are not allowed", input));
        }

        let mut parse_ast = ParseAST::new(input, tokens);
        let ast = parse_ast.parse_conditional()?;

        if let Some(token) = parse_ast.current() {
            return Err(parse_ast.error_at(token.index, &format!("Unexpected token '{}'", describe(token))));
        }
        Ok(ast)
    }
}

fn describe(token: &Token) -> String {
    match token.token_type {
        TokenType::Number => token.num_value.to_string(),
        _ => token.str_value.clone(),
    }
}

/// Internal parser state
struct ParseAST<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> ParseAST<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        ParseAST {
            input,
            tokens,
            index: 0,
        }
    }

    fn error_at(&self, column: usize, message: &str) -> CompilerError {
        CompilerError::parse(format!("{} at column {}", message, column), self.input)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn input_index(&self) -> usize {
        self.current()
            .map(|token| token.index)
            .unwrap_or(self.input.len())
    }

    fn span(&self, start: usize) -> ParseSpan {
        let end = if self.index > 0 {
            self.tokens[self.index - 1].end
        } else {
            start
        };
        ParseSpan::new(start, end.max(start))
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.current().is_some_and(|token| token.is_character(code)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.current().is_some_and(|token| token.is_operator(op)) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_character(&mut self, code: char) -> Result<()> {
        if self.consume_optional_character(code) {
            Ok(())
        } else {
            Err(self.error_at(self.input_index(), &format!("Missing expected {}", code)))
        }
    }

    fn current_operator(&self, candidates: &[&str]) -> Option<String> {
        let token = self.current()?;
        if token.token_type == TokenType::Operator
            && candidates.contains(&token.str_value.as_str())
        {
            Some(token.str_value.clone())
        } else {
            None
        }
    }

    /// Parse conditional/ternary expression (e.g., `a ? b : c`)
    fn parse_conditional(&mut self) -> Result<AST> {
        let start = self.input_index();
        let result = self.parse_nullish_coalescing()?;

        if self.consume_optional_operator("?") {
            let true_exp = self.parse_conditional()?;
            self.expect_character(':')?;
            let false_exp = self.parse_conditional()?;

            return Ok(AST::Conditional(Conditional {
                span: self.span(start),
                condition: Box::new(result),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            }));
        }

        Ok(result)
    }

    fn parse_nullish_coalescing(&mut self) -> Result<AST> {
        self.parse_binary_level(&["??"], Self::parse_logical_or)
    }

    fn parse_logical_or(&mut self) -> Result<AST> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<AST> {
        self.parse_binary_level(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<AST> {
        self.parse_binary_level(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<AST> {
        self.parse_binary_level(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<AST> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<AST> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_prefix)
    }

    /// Left-associative binary operators of one precedence level
    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> Result<AST>,
    ) -> Result<AST> {
        let start = self.input_index();
        let mut result = next(self)?;

        while let Some(operation) = self.current_operator(operators) {
            self.advance();
            let right = next(self)?;
            result = AST::Binary(Binary {
                span: self.span(start),
                operation,
                left: Box::new(result),
                right: Box::new(right),
            });
        }

        Ok(result)
    }

    fn parse_prefix(&mut self) -> Result<AST> {
        let start = self.input_index();
        if let Some(operator) = self.current_operator(&["+", "-", "!"]) {
            self.advance();
            let expression = self.parse_prefix()?;
            return Ok(match operator.as_str() {
                "!" => AST::PrefixNot(PrefixNot {
                    span: self.span(start),
                    expression: Box::new(expression),
                }),
                _ => AST::Unary(Unary {
                    span: self.span(start),
                    operator,
                    expr: Box::new(expression),
                }),
            });
        }
        if self.current().is_some_and(|token| token.is_keyword_named("typeof")) {
            self.advance();
            let expression = self.parse_prefix()?;
            return Ok(AST::TypeofExpression(TypeofExpression {
                span: self.span(start),
                expression: Box::new(expression),
            }));
        }
        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> Result<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;

        loop {
            if self.consume_optional_character('.') {
                result = self.parse_access_member(result, start, false)?;
            } else if self.consume_optional_operator("?.") {
                result = self.parse_access_member(result, start, true)?;
            } else if self.consume_optional_character('[') {
                let key = self.parse_conditional()?;
                self.expect_character(']')?;
                result = AST::KeyedRead(KeyedRead {
                    span: self.span(start),
                    receiver: Box::new(result),
                    key: Box::new(key),
                });
            } else if self.consume_optional_character('(') {
                let args = self.parse_call_arguments()?;
                self.expect_character(')')?;
                result = AST::Call(Call {
                    span: self.span(start),
                    receiver: Box::new(result),
                    args,
                });
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<AST> {
        let start = self.input_index();
        let Some(token) = self.current().cloned() else {
            return Err(self.error_at(self.input.len(), "Unexpected end of expression"));
        };

        if token.is_character('(') {
            self.advance();
            let result = self.parse_conditional()?;
            self.expect_character(')')?;
            return Ok(result);
        }
        if token.is_character('[') {
            self.advance();
            return self.parse_literal_array(start);
        }
        if token.is_character('{') {
            self.advance();
            return self.parse_literal_map(start);
        }

        match token.token_type {
            TokenType::Keyword => {
                self.advance();
                let value = match token.str_value.as_str() {
                    "null" => LiteralValue::Null,
                    "undefined" => LiteralValue::Undefined,
                    "true" => LiteralValue::Bool(true),
                    "false" => LiteralValue::Bool(false),
                    "this" => {
                        return Ok(AST::ImplicitReceiver(ImplicitReceiver {
                            span: self.span(start),
                        }))
                    }
                    other => {
                        return Err(self.error_at(token.index, &format!("Unexpected keyword '{}'", other)))
                    }
                };
                Ok(self.literal(start, value))
            }
            TokenType::Identifier => {
                let receiver = AST::ImplicitReceiver(ImplicitReceiver {
                    span: ParseSpan::new(start, start),
                });
                self.parse_access_member(receiver, start, false)
            }
            TokenType::Number => {
                self.advance();
                Ok(self.literal(start, LiteralValue::Number(token.num_value)))
            }
            TokenType::String => {
                self.advance();
                Ok(self.literal(start, LiteralValue::String(token.str_value)))
            }
            _ => Err(self.error_at(token.index, &format!("Unexpected token '{}'", describe(&token)))),
        }
    }

    fn literal(&self, start: usize, value: LiteralValue) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: self.span(start),
            value,
        })
    }

    fn parse_access_member(&mut self, receiver: AST, start: usize, safe: bool) -> Result<AST> {
        let Some(token) = self.current().cloned() else {
            return Err(self.error_at(self.input.len(), "Expected identifier for property access"));
        };
        if !(token.is_identifier() || token.is_keyword()) {
            return Err(self.error_at(token.index, "Expected identifier for property access"));
        }
        self.advance();
        Ok(AST::PropertyRead(PropertyRead {
            span: self.span(start),
            receiver: Box::new(receiver),
            name: token.str_value,
            safe,
        }))
    }

    fn parse_literal_array(&mut self, start: usize) -> Result<AST> {
        let mut expressions = Vec::new();
        if !self.consume_optional_character(']') {
            loop {
                expressions.push(Box::new(self.parse_conditional()?));
                if !self.consume_optional_character(',') {
                    break;
                }
                if self.current().is_some_and(|token| token.is_character(']')) {
                    break;
                }
            }
            self.expect_character(']')?;
        }
        Ok(AST::LiteralArray(LiteralArray {
            span: self.span(start),
            expressions,
        }))
    }

    fn parse_literal_map(&mut self, start: usize) -> Result<AST> {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if !self.consume_optional_character('}') {
            loop {
                let Some(token) = self.current().cloned() else {
                    return Err(self.error_at(self.input.len(), "Unterminated object literal"));
                };
                let key = match token.token_type {
                    TokenType::Identifier | TokenType::Keyword | TokenType::String => {
                        token.str_value.clone()
                    }
                    TokenType::Number => crate::value::format_number(token.num_value),
                    _ => return Err(self.error_at(token.index, "Expected object key")),
                };
                self.advance();
                if self.consume_optional_character(':') {
                    values.push(Box::new(self.parse_conditional()?));
                } else if token.is_identifier() {
                    // shorthand `{ name }`
                    values.push(Box::new(AST::PropertyRead(PropertyRead {
                        span: ParseSpan::new(token.index, token.end),
                        receiver: Box::new(AST::ImplicitReceiver(ImplicitReceiver {
                            span: ParseSpan::new(token.index, token.index),
                        })),
                        name: key.clone(),
                        safe: false,
                    })));
                } else {
                    return Err(self.error_at(self.input_index(), "Missing expected :"));
                }
                keys.push(key);
                if !self.consume_optional_character(',') {
                    break;
                }
                if self.current().is_some_and(|token| token.is_character('}')) {
                    break;
                }
            }
            self.expect_character('}')?;
        }
        Ok(AST::LiteralMap(LiteralMap {
            span: self.span(start),
            keys,
            values,
        }))
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Box<AST>>> {
        let mut args = Vec::new();
        if self.current().is_some_and(|token| token.is_character(')')) {
            return Ok(args);
        }
        loop {
            args.push(Box::new(self.parse_conditional()?));
            if !self.consume_optional_character(',') {
                break;
            }
        }
        Ok(args)
    }
}
