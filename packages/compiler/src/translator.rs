//! Expression Translator
//!
//! Rewrites template syntax into plain binding expressions: text with `{{ }}`
//! interpolation markers, and the object/array shorthand accepted by class and
//! style bindings.

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use crate::error::{CompilerError, Result};

static INTERPOLATION_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPiece {
    Literal(String),
    Expression(String),
}

/// Split text into literal runs and the expressions found between markers.
/// Empty literal runs are omitted.
pub fn split_interpolation(text: &str) -> SmallVec<[TextPiece; 4]> {
    let mut pieces = SmallVec::new();
    let mut last = 0;
    for captures in INTERPOLATION_REGEXP.captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last {
            pieces.push(TextPiece::Literal(text[last..whole.start()].to_string()));
        }
        pieces.push(TextPiece::Expression(inner.as_str().trim().to_string()));
        last = whole.end();
    }
    if last < text.len() {
        pieces.push(TextPiece::Literal(text[last..].to_string()));
    }
    pieces
}

pub fn has_interpolation(text: &str) -> bool {
    INTERPOLATION_REGEXP.is_match(text)
}

/// `a {{b}} c` becomes `"a "+(b)+" c"`. Text without markers becomes one
/// string literal.
pub fn text_to_expression(text: &str) -> String {
    let pieces = split_interpolation(text);
    if pieces.is_empty() {
        return quote_literal("");
    }
    pieces
        .iter()
        .map(|piece| match piece {
            TextPiece::Literal(literal) => quote_literal(literal),
            TextPiece::Expression(expression) => format!("({})", expression),
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// Double-quoted string literal for `text`.
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

enum Shorthand<'a> {
    Object(Vec<(String, &'a str)>),
    Array(Vec<&'a str>),
    Bare(&'a str),
}

/// Class shorthand: `{active: a, 'text-danger': b}` produces
/// `((a)?"active ":"")+((b)?"text-danger ":"")`. Array entries and bare
/// expressions contribute `(x)+" "`.
pub fn class_to_expression(expression: &str) -> Result<String> {
    let terms: Vec<String> = match parse_shorthand(expression)? {
        Shorthand::Object(entries) => entries
            .iter()
            .map(|(key, value)| format!("(({})?{}:\"\")", value, quote_literal(&format!("{} ", key))))
            .collect(),
        Shorthand::Array(items) => items.iter().map(|item| format!("({})+\" \"", item)).collect(),
        Shorthand::Bare(bare) => vec![format!("({})+\" \"", bare)],
    };
    Ok(join_terms(terms))
}

/// Style shorthand: `{color: c, font-size: s}` produces
/// `"color:"+(c)+";"+"font-size:"+(s)+";"`. Array entries and bare expressions
/// contribute `(x)+";"`.
pub fn style_to_expression(expression: &str) -> Result<String> {
    let terms: Vec<String> = match parse_shorthand(expression)? {
        Shorthand::Object(entries) => entries
            .iter()
            .map(|(key, value)| format!("{}+({})+\";\"", quote_literal(&format!("{}:", key)), value))
            .collect(),
        Shorthand::Array(items) => items.iter().map(|item| format!("({})+\";\"", item)).collect(),
        Shorthand::Bare(bare) => vec![format!("({})+\";\"", bare)],
    };
    Ok(join_terms(terms))
}

fn join_terms(terms: Vec<String>) -> String {
    if terms.is_empty() {
        quote_literal("")
    } else {
        terms.join("+")
    }
}

fn parse_shorthand(expression: &str) -> Result<Shorthand<'_>> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Ok(Shorthand::Array(Vec::new()));
    }

    if let Some(inner) = trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let mut entries = Vec::new();
        for entry in split_top_level(inner, ',')? {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = split_top_level_once(entry, ':').ok_or_else(|| {
                unsupported(expression, format!("entry '{}' has no ':'", entry))
            })?;
            let key = key.trim().trim_matches(|c| matches!(c, '\'' | '"' | '`'));
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(unsupported(expression, format!("entry '{}' is incomplete", entry)));
            }
            reject_nested(expression, value)?;
            entries.push((key.to_string(), value));
        }
        return Ok(Shorthand::Object(entries));
    }

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let mut items = Vec::new();
        for item in split_top_level(inner, ',')? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            reject_nested(expression, item)?;
            items.push(item);
        }
        return Ok(Shorthand::Array(items));
    }

    Ok(Shorthand::Bare(trimmed))
}

fn reject_nested(expression: &str, value: &str) -> Result<()> {
    if value.starts_with('{') || value.starts_with('[') {
        return Err(unsupported(
            expression,
            format!("nested value '{}' is not allowed", value),
        ));
    }
    Ok(())
}

fn unsupported(expression: &str, reason: String) -> CompilerError {
    CompilerError::UnsupportedShorthand {
        expression: expression.to_string(),
        reason,
    }
}

/// Split on `separator` outside quotes and brackets.
pub fn split_top_level(input: &str, separator: char) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in input.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if ch == separator && depth == 0 => {
                parts.push(&input[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
        if depth < 0 {
            return Err(CompilerError::parse(
                format!("Unbalanced '{}' at column {}", ch, index),
                input,
            ));
        }
    }
    if quote.is_some() {
        return Err(CompilerError::parse("Unterminated quote", input));
    }
    if depth != 0 {
        return Err(CompilerError::parse("Unclosed bracket", input));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn split_top_level_once(input: &str, separator: char) -> Option<(&str, &str)> {
    let parts = split_top_level(input, separator).ok()?;
    let first = *parts.first()?;
    if parts.len() < 2 {
        return None;
    }
    Some((first, &input[first.len() + separator.len_utf8()..]))
}
