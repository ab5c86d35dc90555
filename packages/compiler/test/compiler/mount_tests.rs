/**
 * Mount Tests
 *
 * The entry point: fragment handling, strict and lenient failure, view
 * disposal, configuration, logging and pluggable dependency tracking
 */

#[path = "support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use super::support::fixture;
    use mvvm_compiler::logging::{LogLevel, Logger, MemoryLogger};
    use mvvm_compiler::watcher::OnChange;
    use mvvm_compiler::{
        mount_template, Compiler, CompilerConfig, CompilerError, DependencyTracker, Result, Scope,
        ScopeTracker, WatcherId, VERSION,
    };
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn should_reattach_compiled_children() {
        let f = fixture("<p>{{a}}</p><p>b</p>", json!({"a": 1}));
        let view = f.mount();
        assert_eq!(view.root(), f.root);
        assert_eq!(f.document.borrow().children(f.root).len(), 2);
        assert_eq!(view.markup(), "<p>1</p><p>b</p>");
    }

    #[test]
    fn should_count_watchers() {
        let f = fixture(
            r#"<p v-bind:title="t">{{a}}</p><input v-model="m">"#,
            json!({}),
        );
        let view = f.mount();
        assert_eq!(view.watchers().len(), 3);
        assert!(view.diagnostics().is_empty());
    }

    #[test]
    fn should_stop_updating_after_dispose() {
        let f = fixture("<p>{{a}}</p>", json!({"a": 1}));
        let mut view = f.mount();
        assert_eq!(view.dispose(), 1);
        f.scope.set("a", 2);
        assert_eq!(f.markup(), "<p>1</p>");
        assert_eq!(view.dispose(), 0);
    }

    #[test]
    fn should_reattach_and_release_watchers_on_strict_failure() {
        let f = fixture(
            r#"<p>{{a}}</p><ul><li v-for="bad">x</li></ul>"#,
            json!({"a": 1}),
        );
        let err = f.try_mount(CompilerConfig::default().with_strict(true)).unwrap_err();
        assert!(matches!(err, CompilerError::MalformedRepeat { .. }));

        assert_eq!(f.markup(), "<p>1</p><ul><li>x</li></ul>");
        f.scope.set("a", 2);
        assert_eq!(f.markup(), "<p>1</p><ul><li>x</li></ul>");
    }

    #[test]
    fn should_collect_diagnostics_when_lenient() {
        let f = fixture(
            r#"<p v-text="(">a</p><p v-unknown="x">b</p><p v-for="x in nope">c</p><p>{{ok}}</p>"#,
            json!({"ok": "fine"}),
        );
        let view = f.try_mount(CompilerConfig::default().with_strict(false)).unwrap();
        let levels: Vec<LogLevel> = view.diagnostics().iter().map(|d| d.level).collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Warn, LogLevel::Error]);
        assert!(f.markup().ends_with("<p>fine</p>"));
    }

    #[test]
    fn should_reject_invalid_configuration() {
        let f = fixture("<p>x</p>", json!({}));
        let err = f
            .try_mount(CompilerConfig::default().with_prefix(""))
            .unwrap_err();
        assert!(matches!(err, CompilerError::InvalidConfig(_)));
        // nothing was moved
        assert_eq!(f.markup(), "<p>x</p>");
    }

    #[test]
    fn should_load_configuration_from_json() -> anyhow::Result<()> {
        let config = CompilerConfig::from_json(r#"{"directivePrefix": "data-", "strict": false}"#)?;
        let f = fixture(r#"<p data-text="a">x</p>"#, json!({"a": "y"}));
        f.try_mount(config)?;
        assert_eq!(f.markup(), "<p>y</p>");

        assert!(matches!(
            CompilerConfig::from_json(r#"{"directivePrefix": "a:b"}"#),
            Err(CompilerError::InvalidConfig(_))
        ));
        assert!(matches!(
            CompilerConfig::from_json("{"),
            Err(CompilerError::ConfigJson(_))
        ));
        Ok(())
    }

    #[test]
    fn should_log_through_the_configured_logger() {
        let f = fixture(r#"<p v-nope="x">{{missing.deep}}</p>"#, json!({}));
        let logger = Rc::new(MemoryLogger::new(LogLevel::Warn));
        Compiler::new(Rc::clone(&f.document), f.scope.clone())
            .with_logger(logger.clone())
            .mount(f.root)
            .unwrap();

        let warnings = logger.messages_at(LogLevel::Warn);
        assert_eq!(warnings.len(), 2, "{:?}", warnings);
        assert!(warnings[0].contains("Unknown directive 'v-nope'"));
        assert!(warnings[1].contains("missing.deep"));
        assert!(logger.messages_at(LogLevel::Debug).is_empty());
    }

    /// Records every watched expression, then defers to the scope tracker.
    struct RecordingTracker {
        inner: ScopeTracker,
        seen: RefCell<Vec<String>>,
    }

    impl DependencyTracker for RecordingTracker {
        fn watch(&self, expression: &str, scope: &Scope, on_change: OnChange) -> Result<WatcherId> {
            self.seen.borrow_mut().push(expression.to_string());
            self.inner.watch(expression, scope, on_change)
        }

        fn unwatch(&self, scope: &Scope, id: WatcherId) -> bool {
            self.inner.unwatch(scope, id)
        }
    }

    #[test]
    fn should_use_a_custom_tracker() {
        let f = fixture(
            r#"<p class="s" v-bind:class="{on: a}">x {{b}}</p>"#,
            json!({"a": true, "b": 2}),
        );
        let tracker = Rc::new(RecordingTracker {
            inner: ScopeTracker::default(),
            seen: RefCell::new(Vec::new()),
        });
        let logger: Rc<dyn Logger> = Rc::new(MemoryLogger::new(LogLevel::Error));
        Compiler::new(Rc::clone(&f.document), f.scope.clone())
            .with_tracker(tracker.clone())
            .with_logger(logger)
            .mount(f.root)
            .unwrap();

        assert_eq!(
            *tracker.seen.borrow(),
            vec![r#""s "+((a)?"on ":"")"#.to_string(), r#""x "+(b)"#.to_string()]
        );
        assert_eq!(f.markup(), r#"<p class="s on ">x 2</p>"#);
    }

    #[test]
    fn should_mount_a_template_string() -> anyhow::Result<()> {
        let view = mount_template(
            "<h1>{{title}}</h1>",
            json!({"title": "Hello"}),
            CompilerConfig::default(),
        )?;
        assert_eq!(view.markup(), "<h1>Hello</h1>");
        view.scope().set("title", "Bye");
        assert_eq!(view.markup(), "<h1>Bye</h1>");
        Ok(())
    }

    #[test]
    fn should_require_object_scope_data() {
        let err = mount_template("<p></p>", json!([1, 2]), CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidScope { .. }));
    }

    #[test]
    fn should_expose_the_crate_version() {
        assert!(!VERSION.is_empty());
    }
}
