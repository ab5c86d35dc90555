//! Host Document Model
//!
//! The node tree compiled templates are bound to.

pub mod document;
pub mod event;
pub mod markup;
pub mod sanitize;

use std::cell::RefCell;
use std::rc::Rc;

pub use document::{Document, NodeId, NodeType};
pub use event::{dispatch_event, Event, Listener};
pub use sanitize::{BasicSanitizer, MarkupSanitizer};

/// Document handle shared between the compiler and live bindings.
pub type SharedDocument = Rc<RefCell<Document>>;

pub fn shared(document: Document) -> SharedDocument {
    Rc::new(RefCell::new(document))
}
