#![deny(clippy::all)]

/**
 * MVVM Template Compiler
 *
 * Compiles directive-annotated markup into live bindings between a host
 * document and a reactive scope.
 */

pub mod compiler;
pub mod config;
pub mod directive;
pub mod dom;
pub mod error;
pub mod expression_parser;
pub mod logging;
pub mod scope;
pub mod translator;
pub mod updater;
pub mod value;
pub mod watcher;

// Re-exports
pub use compiler::{Compiler, Diagnostic, View};
pub use config::{CompilerConfig, StructuralConflict};
pub use dom::{shared, Document, NodeId, NodeType, SharedDocument};
pub use error::{CompilerError, Result};
pub use scope::Scope;
pub use value::{Function, Value};
pub use watcher::{DependencyTracker, ScopeTracker, WatcherId};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `template` into a fresh document under a `div` root and mount it
/// against `data`.
pub fn mount_template(
    template: &str,
    data: serde_json::Value,
    config: CompilerConfig,
) -> Result<View> {
    let scope = Scope::from_json(data)?;
    let document = shared(Document::new());
    let root = {
        let mut doc = document.borrow_mut();
        let root = doc.create_element("div");
        doc.set_inner_markup(root, template);
        root
    };
    Compiler::with_config(document, scope, config).mount(root)
}
