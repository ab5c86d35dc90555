use indexmap::IndexMap;
use std::rc::Rc;

use super::document::NodeId;
use super::SharedDocument;
use crate::value::Value;

/// An event delivered to listeners registered on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Event {
            event_type: event_type.into(),
            target,
        }
    }

    /// Script-visible form handed to event handler functions.
    pub fn to_value(&self) -> Value {
        let mut object = IndexMap::new();
        object.insert("type".to_string(), Value::from(self.event_type.as_str()));
        object.insert("target".to_string(), Value::from(self.target.index()));
        Value::Object(object)
    }
}

pub type Listener = Rc<dyn Fn(&Event)>;

/// Run every `event_type` listener of `target`. Returns how many ran.
///
/// Listeners are collected first so they are free to borrow the document.
pub fn dispatch_event(doc: &SharedDocument, target: NodeId, event_type: &str) -> usize {
    let listeners = doc.borrow().listeners(target, event_type);
    let event = Event::new(event_type, target);
    for listener in &listeners {
        listener(&event);
    }
    listeners.len()
}
