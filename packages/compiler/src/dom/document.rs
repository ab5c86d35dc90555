//! Host Document
//!
//! An arena-backed node tree providing the capabilities bindings need: child
//! enumeration, node types, attributes, inline style, form values, markup,
//! cloning, insertion/removal and event listeners.

use indexmap::IndexMap;
use std::fmt;

use super::event::Listener;
use super::markup;

/// Handle to a node slot. The generation tells a released slot's old handles
/// apart from the node that reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Node type codes, matching the classic DOM numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Fragment = 11,
}

struct ElementData {
    tag_name: String,
    attributes: IndexMap<String, String>,
    value: String,
    listeners: Vec<(String, Listener)>,
}

enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    generation: u32,
}

#[derive(Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    free: Vec<usize>,
}

/// Elements whose `value` is user-editable.
pub const FORM_CONTROLS: &[&str] = &["input", "textarea", "select"];

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index];
            slot.kind = kind;
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let id = NodeId {
            index: self.nodes.len(),
            generation: 0,
        };
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            generation: 0,
        });
        id
    }

    /// False once the node's subtree has been released.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index)
            .is_some_and(|node| node.generation == id.generation)
    }

    /// Nodes currently allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Detach `id` and free its whole subtree for reuse. Handles to released
    /// nodes stop being alive.
    pub fn release(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = &mut self.nodes[current.index];
            pending.append(&mut node.children);
            node.kind = NodeKind::Fragment;
            node.parent = None;
            node.generation = node.generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            value: String::new(),
            listeners: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    /// Parse `source` into a new fragment.
    pub fn parse_fragment(&mut self, source: &str) -> NodeId {
        let fragment = self.create_fragment();
        markup::parse_into(self, fragment, source);
        fragment
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index]
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.node(id).kind {
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Fragment => NodeType::Fragment,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node_type(id) == NodeType::Element
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag_name.as_str())
    }

    pub fn is_form_control(&self, id: NodeId) -> bool {
        self.tag_name(id)
            .is_some_and(|tag| FORM_CONTROLS.contains(&tag))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ---- text ----

    /// Character data of a text or comment node.
    pub fn data(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Comment(_) => String::new(),
            NodeKind::Element(_) | NodeKind::Fragment => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match &self.node(child).kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) | NodeKind::Fragment => self.collect_text(child, out),
                NodeKind::Comment(_) => {}
            }
        }
    }

    /// Replace a text node's data, or an element's children with one text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(data) | NodeKind::Comment(data) = &mut self.node_mut(id).kind {
            *data = text.to_string();
            return;
        }
        self.remove_all_children(id);
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(id, child);
        }
    }

    // ---- attributes ----

    /// Snapshot of the attributes in document order.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.element(id)
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element
                .attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id)
            .and_then(|element| element.attributes.shift_remove(name))
    }

    // ---- inline style ----

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.get_attribute(id, "style")?;
        parse_declarations(style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Set one declaration of the `style` attribute; an empty value removes it.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        if !self.is_element(id) {
            return;
        }
        let mut declarations = self
            .get_attribute(id, "style")
            .map(parse_declarations)
            .unwrap_or_default();
        let property = property.trim().to_ascii_lowercase();
        if value.is_empty() {
            declarations.shift_remove(&property);
        } else {
            declarations.insert(property, value.trim().to_string());
        }
        if declarations.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            let text = declarations
                .iter()
                .map(|(name, value)| format!("{}: {};", name, value))
                .collect::<Vec<_>>()
                .join(" ");
            self.set_attribute(id, "style", &text);
        }
    }

    // ---- form values ----

    pub fn value(&self, id: NodeId) -> String {
        self.element(id)
            .map(|element| element.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.value = value.to_string();
        }
    }

    // ---- markup ----

    pub fn inner_markup(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|&child| markup::serialize(self, child))
            .collect()
    }

    pub fn outer_markup(&self, id: NodeId) -> String {
        markup::serialize(self, id)
    }

    /// Replace the children of `id` with the nodes parsed from `source`.
    pub fn set_inner_markup(&mut self, id: NodeId, source: &str) {
        if !matches!(self.node_type(id), NodeType::Element | NodeType::Fragment) {
            return;
        }
        self.remove_all_children(id);
        markup::parse_into(self, id, source);
    }

    // ---- tree edits ----

    /// Insert `child` into `parent` before `reference`, appending when the
    /// reference is absent or not a child of `parent`. A child that already has
    /// a parent is moved.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if child == parent || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        let position = reference
            .and_then(|r| self.children(parent).iter().position(|&c| c == r))
            .unwrap_or(self.children(parent).len());
        self.node_mut(parent).children.insert(position, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Remove `child` from `parent`; false when it is not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let children = &mut self.node_mut(parent).children;
        match children.iter().position(|&c| c == child) {
            Some(position) => {
                children.remove(position);
                self.node_mut(child).parent = None;
                true
            }
            None => false,
        }
    }

    /// Remove `id` from whatever parent it has.
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => false,
        }
    }

    /// Drop every child of `id`, releasing their subtrees.
    pub fn remove_all_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.release(child);
        }
    }

    /// Copy of `id`, detached. Attributes and values are copied, listeners are not.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let kind = match &self.node(id).kind {
            NodeKind::Element(element) => NodeKind::Element(ElementData {
                tag_name: element.tag_name.clone(),
                attributes: element.attributes.clone(),
                value: element.value.clone(),
                listeners: Vec::new(),
            }),
            NodeKind::Text(text) => NodeKind::Text(text.clone()),
            NodeKind::Comment(text) => NodeKind::Comment(text.clone()),
            NodeKind::Fragment => NodeKind::Fragment,
        };
        let copy = self.push(kind);
        if deep {
            let children = self.children(id).to_vec();
            for child in children {
                let child_copy = self.clone_node(child, true);
                self.append_child(copy, child_copy);
            }
        }
        copy
    }

    // ---- events ----

    pub fn add_event_listener(&mut self, id: NodeId, event_type: &str, listener: Listener) {
        if let Some(element) = self.element_mut(id) {
            element.listeners.push((event_type.to_string(), listener));
        }
    }

    pub fn listeners(&self, id: NodeId, event_type: &str) -> Vec<Listener> {
        self.element(id)
            .map(|element| {
                element
                    .listeners
                    .iter()
                    .filter(|(kind, _)| kind == event_type)
                    .map(|(_, listener)| listener.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.element(id)
            .map(|element| element.listeners.len())
            .unwrap_or(0)
    }
}

/// Split `a: b; c: d` into ordered declarations.
pub fn parse_declarations(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value.to_string()))
            }
        })
        .collect()
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .finish()
    }
}
