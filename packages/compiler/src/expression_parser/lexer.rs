/**
 * Binding Expression Lexer
 *
 * Tokenizes template expressions into tokens for parsing
 */

use serde::{Deserialize, Serialize};

/// Token types in binding expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    Error = 6,
}

/// Token representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    pub fn new(
        index: usize,
        end: usize,
        token_type: TokenType,
        num_value: f64,
        str_value: String,
    ) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
        }
    }

    pub fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, str_value.to_string())
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.chars().next() == Some(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

/// Expression lexer
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

const KEYWORDS: &[&str] = &["null", "undefined", "true", "false", "this", "typeof"];

const EOF: char = '\0';

/// Scanner for tokenizing input
struct Scanner<'a> {
    input: &'a str,
    length: usize,
    index: usize,
    peek: char,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        let peek = input.chars().next().unwrap_or(EOF);
        Scanner {
            input,
            length: input.len(),
            index: 0,
            peek,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token() {
            let is_error = token.is_error();
            tokens.push(token);
            if is_error {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.char_at(self.index);
    }

    fn char_at(&self, index: usize) -> char {
        if index < self.length {
            self.input[index..].chars().next().unwrap_or(EOF)
        } else {
            EOF
        }
    }

    fn next_char(&self) -> char {
        self.char_at(self.index + self.peek.len_utf8())
    }

    fn scan_token(&mut self) -> Option<Token> {
        while self.index < self.length && self.peek.is_whitespace() {
            self.advance();
        }

        if self.index >= self.length {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }

        if ch.is_ascii_digit() {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            '.' => {
                if self.next_char().is_ascii_digit() {
                    return Some(self.scan_number(start));
                }
                self.scan_character(start, ch)
            }
            '(' | ')' | '[' | ']' | '{' | '}' | ',' | ':' | ';' => self.scan_character(start, ch),
            '\'' | '"' => self.scan_string(ch),
            '+' | '-' | '*' | '/' | '%' => self.scan_operator(start, ch.encode_utf8(&mut [0; 4])),
            '?' => {
                if self.next_char() == '?' {
                    self.advance();
                    self.scan_operator(start, "??")
                } else if self.next_char() == '.' {
                    self.advance();
                    self.scan_operator(start, "?.")
                } else {
                    self.scan_operator(start, "?")
                }
            }
            '<' | '>' => self.scan_complex_operator(start, ch, '=', None),
            '!' | '=' => self.scan_complex_operator(start, ch, '=', Some('=')),
            '&' => self.scan_doubled_operator(start, '&'),
            '|' => self.scan_doubled_operator(start, '|'),
            _ => {
                self.advance();
                self.error(start, format!("Unexpected character [{}]", ch))
            }
        };
        Some(token)
    }

    fn scan_character(&mut self, start: usize, code: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, code as u32 as f64, code.to_string())
    }

    fn scan_operator(&mut self, start: usize, text: &str) -> Token {
        self.advance();
        Token::operator(start, self.index, text)
    }

    /// `<`, `<=`, `!`, `!=`, `!==`, `=`, `==`, `===`
    fn scan_complex_operator(
        &mut self,
        start: usize,
        one: char,
        two: char,
        three: Option<char>,
    ) -> Token {
        self.advance();
        let mut text = one.to_string();
        if self.peek == two {
            self.advance();
            text.push(two);
            if let Some(three) = three {
                if self.peek == three {
                    self.advance();
                    text.push(three);
                }
            }
        }
        if text == "=" {
            return self.error(start, "Assignments are not supported in bindings".to_string());
        }
        Token::operator(start, self.index, &text)
    }

    fn scan_doubled_operator(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        if self.peek != ch {
            return self.error(start, format!("Unexpected character [{}]", ch));
        }
        self.advance();
        let text: String = [ch, ch].iter().collect();
        Token::operator(start, self.index, &text)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while is_identifier_part(self.peek) {
            self.advance();
        }
        let text = &self.input[start..self.index];
        let token_type = if KEYWORDS.contains(&text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, 0.0, text.to_string())
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut simple = self.index == start && self.peek != '.';
        self.advance();
        loop {
            if self.peek.is_ascii_digit() {
                // keep scanning
            } else if self.peek == '.' {
                simple = false;
            } else if self.peek == 'e' || self.peek == 'E' {
                self.advance();
                if self.peek == '+' || self.peek == '-' {
                    self.advance();
                }
                if !self.peek.is_ascii_digit() {
                    return self.error(start, "Invalid exponent".to_string());
                }
                simple = false;
            } else {
                break;
            }
            self.advance();
        }
        let text = &self.input[start..self.index];
        let value = if simple {
            text.parse::<u64>().map(|n| n as f64).unwrap_or(f64::NAN)
        } else {
            text.parse::<f64>().unwrap_or(f64::NAN)
        };
        if value.is_nan() {
            return self.error(start, format!("Invalid number '{}'", text));
        }
        Token::new(start, self.index, TokenType::Number, value, String::new())
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();
        let mut buffer = String::new();

        loop {
            if self.index >= self.length {
                return self.error(start, "Unterminated quote".to_string());
            }
            let ch = self.peek;
            if ch == quote {
                self.advance();
                break;
            }
            if ch == '\\' {
                self.advance();
                let escaped = match self.peek {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'b' => '\u{0008}',
                    'f' => '\u{000C}',
                    'v' => '\u{000B}',
                    '0' => '\0',
                    'u' => match self.scan_unicode_escape() {
                        Some(c) => c,
                        None => return self.error(start, "Invalid unicode escape".to_string()),
                    },
                    EOF if self.index >= self.length => {
                        return self.error(start, "Unterminated quote".to_string())
                    }
                    other => other,
                };
                buffer.push(escaped);
                self.advance();
                continue;
            }
            buffer.push(ch);
            self.advance();
        }

        Token::new(start, self.index, TokenType::String, 0.0, buffer)
    }

    /// Reads the four hex digits after `\u`, leaving `peek` on the last one.
    fn scan_unicode_escape(&mut self) -> Option<char> {
        let digits_start = self.index + 1;
        let digits = self.input.get(digits_start..digits_start + 4)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        for _ in 0..4 {
            self.advance();
        }
        char::from_u32(code)
    }

    fn error(&mut self, start: usize, message: String) -> Token {
        let position = start;
        Token::new(
            position,
            self.index,
            TokenType::Error,
            0.0,
            format!("Lexer Error: {} at column {} in expression [{}]", message, position, self.input),
        )
    }
}

pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Whether `text` is a plain identifier such as `items` or `$index`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}
