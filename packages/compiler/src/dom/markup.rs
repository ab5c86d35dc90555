//! Markup Reader and Writer
//!
//! A lenient HTML fragment reader used for `set_inner_markup` and for building
//! templates, plus the matching serializer. Unclosed elements are closed at the
//! end of input and stray end tags are ignored.

use super::document::{Document, NodeId, NodeType};

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is read verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// Parse `source` and append the resulting nodes to `parent`.
pub fn parse_into(doc: &mut Document, parent: NodeId, source: &str) {
    let mut reader = MarkupReader {
        doc,
        input: source,
        pos: 0,
        stack: vec![parent],
    };
    reader.run();
}

struct MarkupReader<'a> {
    doc: &'a mut Document,
    input: &'a str,
    pos: usize,
    stack: Vec<NodeId>,
}

impl<'a> MarkupReader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn current(&self) -> NodeId {
        // the base parent is never popped
        self.stack[self.stack.len() - 1]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn append(&mut self, node: NodeId) {
        let parent = self.current();
        self.doc.append_child(parent, node);
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.read_comment();
            } else if rest.starts_with("</") {
                self.read_end_tag();
            } else if rest.starts_with('<')
                && rest[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            {
                self.read_start_tag();
            } else {
                self.read_text();
            }
        }
    }

    fn read_comment(&mut self) {
        let body_start = self.pos + 4;
        let (body, next) = match self.input[body_start..].find("-->") {
            Some(end) => (
                &self.input[body_start..body_start + end],
                body_start + end + 3,
            ),
            None => (&self.input[body_start..], self.input.len()),
        };
        let comment = self.doc.create_comment(body);
        self.append(comment);
        self.pos = next;
    }

    fn read_text(&mut self) {
        let start = self.pos;
        // a '<' that opens nothing is plain text
        self.bump();
        while let Some(ch) = self.peek() {
            if ch == '<' {
                break;
            }
            self.bump();
        }
        let text = decode_entities(&self.input[start..self.pos]);
        self.append_text(&text);
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        // merge adjacent text nodes
        if let Some(&last) = self.doc.children(parent).last() {
            if self.doc.node_type(last) == NodeType::Text {
                let merged = format!("{}{}", self.doc.data(last).unwrap_or(""), text);
                self.doc.set_text_content(last, &merged);
                return;
            }
        }
        let node = self.doc.create_text(text);
        self.doc.append_child(parent, node);
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '>' | '/' | '=') {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn read_end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        match self.rest().find('>') {
            Some(end) => self.pos += end + 1,
            None => self.pos = self.input.len(),
        }
        // close up to the nearest open element with this name
        let open = self.stack[1..]
            .iter()
            .rposition(|&id| self.doc.tag_name(id) == Some(name.as_str()));
        if let Some(index) = open {
            self.stack.truncate(index + 1);
        }
    }

    fn read_start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let element = self.doc.create_element(&name);
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('/') => {
                    self.bump();
                    if self.peek() == Some('>') {
                        self.bump();
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let attr_name = self.read_name();
                    if attr_name.is_empty() {
                        // unparseable character, skip it
                        self.bump();
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.bump();
                        self.skip_whitespace();
                        self.read_attribute_value()
                    } else {
                        String::new()
                    };
                    if !self.doc.has_attribute(element, &attr_name) {
                        self.doc.set_attribute(element, &attr_name, &value);
                    }
                }
            }
        }

        if name == "input" {
            if let Some(value) = self.doc.get_attribute(element, "value").map(str::to_string) {
                self.doc.set_value(element, &value);
            }
        }
        self.append(element);

        if is_void_element(&name) || self_closing {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.read_raw_text(element, &name);
            return;
        }
        self.stack.push(element);
    }

    fn read_attribute_value(&mut self) -> String {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                let end = self.rest().find(quote).map(|i| start + i);
                let raw = match end {
                    Some(end) => {
                        self.pos = end + 1;
                        &self.input[start..end]
                    }
                    None => {
                        self.pos = self.input.len();
                        &self.input[start..]
                    }
                };
                decode_entities(raw)
            }
            _ => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch.is_whitespace() || ch == '>' {
                        break;
                    }
                    self.bump();
                }
                decode_entities(&self.input[start..self.pos])
            }
        }
    }

    fn read_raw_text(&mut self, element: NodeId, name: &str) {
        let closing = format!("</{}", name);
        let lowered = self.rest().to_ascii_lowercase();
        let (raw, next) = match lowered.find(&closing) {
            Some(end) => {
                let raw = &self.input[self.pos..self.pos + end];
                let after = self.pos + end;
                let close = self.input[after..]
                    .find('>')
                    .map(|i| after + i + 1)
                    .unwrap_or(self.input.len());
                (raw, close)
            }
            None => (self.rest(), self.input.len()),
        };
        let text = if name == "textarea" {
            decode_entities(raw)
        } else {
            raw.to_string()
        };
        if !text.is_empty() {
            let node = self.doc.create_text(&text);
            self.doc.append_child(element, node);
        }
        if name == "textarea" {
            self.doc.set_value(element, &text);
        }
        self.pos = next;
    }
}

/// Decode the character references this reader understands.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            decode_entity(name).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Serialize `id` and its subtree.
pub fn serialize(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.node_type(id) {
        NodeType::Text => {
            let text = doc.data(id).unwrap_or("");
            let raw_parent = doc
                .parent(id)
                .and_then(|parent| doc.tag_name(parent))
                .is_some_and(|tag| tag == "script" || tag == "style");
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(doc.data(id).unwrap_or(""));
            out.push_str("-->");
        }
        NodeType::Fragment => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeType::Element => {
            let tag = doc.tag_name(id).unwrap_or("");
            out.push('<');
            out.push_str(tag);
            for (name, value) in doc.attributes(id) {
                out.push(' ');
                out.push_str(&name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&value));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_element(tag) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}
