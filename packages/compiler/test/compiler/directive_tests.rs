/**
 * Directive Tests
 *
 * Non-structural directives: text, html, bind, show, on, and the handling of
 * unknown or malformed directive attributes
 */

#[path = "support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use super::support::fixture;
    use mvvm_compiler::dom::BasicSanitizer;
    use mvvm_compiler::logging::LogLevel;
    use mvvm_compiler::{CompilerConfig, CompilerError, Value};
    use serde_json::json;
    use std::rc::Rc;

    mod removal {
        use super::*;

        #[test]
        fn should_strip_directives_and_keep_plain_attributes() {
            let f = fixture(
                r#"<p id="x" class="c" v-text="a" v-bind:title="a" v-show="a" v-on:click="h">z</p>"#,
                json!({"a": "t"}),
            );
            f.mount();
            let p = f.find("p");
            let doc = f.document.borrow();
            let names: Vec<String> = doc.attributes(p).into_iter().map(|(name, _)| name).collect();
            assert!(names.iter().all(|name| !name.starts_with("v-")), "{:?}", names);
            assert_eq!(doc.get_attribute(p, "id"), Some("x"));
            assert_eq!(doc.get_attribute(p, "class"), Some("c"));
        }

        #[test]
        fn should_report_unknown_directives_without_failing() {
            let f = fixture(r#"<p v-cloak v-text="a">z</p>"#, json!({"a": "ok"}));
            let view = f.mount();
            assert_eq!(f.markup(), "<p>ok</p>");
            assert_eq!(view.diagnostics().len(), 1);
            assert_eq!(view.diagnostics()[0].level, LogLevel::Warn);
            assert!(view.diagnostics()[0].message.contains("v-cloak"));
        }

        #[test]
        fn should_honour_a_custom_prefix() {
            let f = fixture(r#"<p x-text="a" v-text="b"></p>"#, json!({"a": "1", "b": "2"}));
            f.try_mount(CompilerConfig::default().with_prefix("x-")).unwrap();
            let p = f.find("p");
            assert_eq!(f.text(p), "1");
            assert_eq!(f.attribute(p, "v-text").as_deref(), Some("b"));
        }
    }

    mod text_and_html {
        use super::*;

        #[test]
        fn should_bind_text_content() {
            let f = fixture(r#"<span v-text="msg">placeholder</span>"#, json!({"msg": "hi"}));
            f.mount();
            assert_eq!(f.markup(), "<span>hi</span>");
            f.scope.set("msg", "<b>");
            assert_eq!(f.markup(), "<span>&lt;b&gt;</span>");
        }

        #[test]
        fn should_bind_markup() {
            let f = fixture(
                r#"<div v-html="content"></div>"#,
                json!({"content": "<b>bold</b> text"}),
            );
            f.mount();
            assert_eq!(f.markup(), "<div><b>bold</b> text</div>");
        }

        #[test]
        fn should_reuse_node_slots_across_updates() {
            let f = fixture(
                r#"<p v-text="n"></p><div v-html="content"></div>"#,
                json!({"n": 0, "content": "<b>0</b>"}),
            );
            f.mount();
            let count = f.document.borrow().node_count();
            for i in 1..1000 {
                f.scope.set("n", i);
                f.scope.set("content", format!("<b>{}</b><i>x</i>", i));
            }
            assert_eq!(f.markup(), "<p>999</p><div><b>999</b><i>x</i></div>");
            // the extra <i> and its text are the only growth
            assert_eq!(f.document.borrow().node_count(), count + 2);
        }

        #[test]
        fn should_pass_markup_through_the_sanitizer() {
            let f = fixture(
                r#"<div v-html="content"></div>"#,
                json!({"content": "<b onclick=\"x()\">ok</b><script>bad()</script>"}),
            );
            f.compiler(CompilerConfig::default())
                .with_sanitizer(Rc::new(BasicSanitizer::new()))
                .mount(f.root)
                .unwrap();
            assert_eq!(f.markup(), "<div><b>ok</b></div>");
        }
    }

    mod bind {
        use super::*;

        #[test]
        fn should_bind_plain_attributes() {
            let f = fixture(r#"<a v-bind:href="base + '/' + page">x</a>"#, json!({"base": "/docs", "page": "intro"}));
            f.mount();
            let a = f.find("a");
            assert_eq!(f.attribute(a, "href").as_deref(), Some("/docs/intro"));
            f.scope.set("page", "api");
            assert_eq!(f.attribute(a, "href").as_deref(), Some("/docs/api"));
        }

        #[test]
        fn should_write_empty_string_for_undefined() {
            let f = fixture(r#"<a v-bind:title="missing">x</a>"#, json!({}));
            f.mount();
            let a = f.find("a");
            assert_eq!(f.attribute(a, "title").as_deref(), Some(""));
        }

        #[test]
        fn should_extend_static_classes() {
            let f = fixture(
                r#"<p class="static" v-bind:class="{active: isActive, danger: hasError}">x</p>"#,
                json!({"isActive": true, "hasError": false}),
            );
            f.mount();
            let p = f.find("p");
            assert_eq!(f.attribute(p, "class").as_deref(), Some("static active "));

            f.scope.set("hasError", true);
            assert_eq!(f.attribute(p, "class").as_deref(), Some("static active danger "));
        }

        #[test]
        fn should_build_classes_without_static_ones() {
            let f = fixture(r#"<p v-bind:class="[kind, size]">x</p>"#, json!({"kind": "btn", "size": "lg"}));
            f.mount();
            assert_eq!(f.attribute(f.find("p"), "class").as_deref(), Some("btn lg "));
        }

        #[test]
        fn should_append_style_shorthand_to_inline_style() {
            let f = fixture(
                r#"<p style="margin: 0" v-bind:style="{color: 'red'}">x</p>"#,
                json!({}),
            );
            f.mount();
            assert_eq!(f.attribute(f.find("p"), "style").as_deref(), Some("margin: 0;color:red;"));
        }

        #[test]
        fn should_require_an_attribute_name() {
            let f = fixture(r#"<p v-bind="x">y</p>"#, json!({}));
            let err = f.try_mount(CompilerConfig::default().with_strict(true)).unwrap_err();
            assert!(matches!(err, CompilerError::MissingArgument { .. }));
        }

        #[test]
        fn should_reject_nested_shorthand() {
            let f = fixture(r#"<p v-bind:class="{a: {b: c}}">y</p>"#, json!({}));
            let err = f.try_mount(CompilerConfig::default().with_strict(true)).unwrap_err();
            assert!(matches!(err, CompilerError::UnsupportedShorthand { .. }));
        }
    }

    mod show {
        use super::*;

        #[test]
        fn should_toggle_display() {
            let f = fixture(r#"<p v-show="visible">x</p>"#, json!({"visible": false}));
            f.mount();
            let p = f.find("p");
            assert_eq!(f.attribute(p, "style").as_deref(), Some("display: none;"));
            f.scope.set("visible", "yes");
            assert_eq!(f.attribute(p, "style").as_deref(), Some("display: initial;"));
        }

        #[test]
        fn should_hide_when_undefined() {
            let f = fixture(r#"<p style="color: red" v-show="missing">x</p>"#, json!({}));
            f.mount();
            assert_eq!(
                f.attribute(f.find("p"), "style").as_deref(),
                Some("color: red; display: none;")
            );
        }
    }

    mod on {
        use super::*;

        #[test]
        fn should_call_handler_with_scope_as_receiver() {
            let f = fixture(
                r#"<button v-on:click="increment">{{count}}</button>"#,
                json!({"count": 0}),
            );
            f.scope.set(
                "increment",
                Value::function(|scope, _args| {
                    let next = scope.get("count").to_number() + 1.0;
                    scope.set("count", next);
                    Value::Undefined
                }),
            );
            f.mount();
            let button = f.find("button");
            assert_eq!(f.dispatch(button, "click"), 1);
            assert_eq!(f.dispatch(button, "click"), 1);
            assert_eq!(f.markup(), "<button>2</button>");
        }

        #[test]
        fn should_pass_the_event() {
            let f = fixture(r#"<button v-on:dblclick="record">x</button>"#, json!({}));
            f.scope.set(
                "record",
                Value::function(|scope, args| {
                    let event = args.first().cloned().unwrap_or_default();
                    scope.set("last", event.member("type").unwrap_or_default());
                    Value::Undefined
                }),
            );
            f.mount();
            f.dispatch(f.find("button"), "dblclick");
            assert_eq!(f.scope.get("last"), Value::from("dblclick"));
        }

        #[test]
        fn should_not_react_to_later_handler_changes() {
            let f = fixture(r#"<button v-on:click="handler">x</button>"#, json!({"hits": 0}));
            f.scope.set(
                "handler",
                Value::function(|scope, _| {
                    scope.set("hits", scope.get("hits").to_number() + 1.0);
                    Value::Undefined
                }),
            );
            f.mount();
            f.scope.set("handler", Value::Null);
            f.dispatch(f.find("button"), "click");
            assert_eq!(f.scope.get("hits"), Value::Number(1.0));
        }

        #[test]
        fn should_not_call_the_handler_while_compiling() {
            let counting = || {
                let f = fixture(
                    r#"<button v-on:click="handle(1)">x</button><p>{{calls}}</p>"#,
                    json!({"calls": 0}),
                );
                f.scope.set(
                    "handle",
                    Value::function(|scope, _| {
                        scope.set("calls", scope.get("calls").to_number() + 1.0);
                        Value::Undefined
                    }),
                );
                f
            };

            let f = counting();
            let view = f.mount();
            assert_eq!(f.scope.get("calls"), Value::Number(0.0));
            assert_eq!(view.diagnostics().len(), 1);
            assert_eq!(f.document.borrow().listener_count(f.find("button")), 0);

            let f = counting();
            let err = f.try_mount(CompilerConfig::default().with_strict(true));
            assert!(matches!(err, Err(CompilerError::ParseError { .. })));
            assert_eq!(f.scope.get("calls"), Value::Number(0.0));
        }

        #[test]
        fn should_resolve_handlers_on_nested_objects() {
            let f = fixture(r#"<button v-on:click="actions.save">x</button>"#, json!({"saved": false}));
            let mut actions = indexmap::IndexMap::new();
            actions.insert(
                "save".to_string(),
                Value::function(|scope, _| {
                    scope.set("saved", true);
                    Value::Undefined
                }),
            );
            f.scope.set("actions", Value::Object(actions));
            f.mount();
            f.dispatch(f.find("button"), "click");
            assert_eq!(f.scope.get("saved"), Value::Bool(true));
        }

        #[test]
        fn should_skip_missing_functions_and_event_types() {
            let f = fixture(
                r#"<button v-on:click="missing" v-on="handler">x</button>"#,
                json!({}),
            );
            f.scope.set("handler", Value::function(|_, _| Value::Undefined));
            f.mount();
            let button = f.find("button");
            assert_eq!(f.document.borrow().listener_count(button), 0);
        }
    }

    mod non_strict {
        use super::*;

        #[test]
        fn should_keep_compiling_siblings_by_default() {
            let f = fixture(
                r#"<p v-bind:title="a +">x</p><span>{{ok}}</span>"#,
                json!({"ok": "yes"}),
            );
            let view = f.try_mount(CompilerConfig::default()).unwrap();
            assert_eq!(f.markup(), "<p>x</p><span>yes</span>");
            assert_eq!(view.diagnostics().len(), 1);
            assert_eq!(view.diagnostics()[0].level, LogLevel::Error);

            f.scope.set("ok", "still bound");
            assert_eq!(f.text(f.find("span")), "still bound");
        }

        #[test]
        fn should_record_errors_and_continue() {
            let f = fixture(
                r#"<p v-text="a +">x</p><span v-text="b">y</span>"#,
                json!({"b": "fine"}),
            );
            let view = f.try_mount(CompilerConfig::default().with_strict(false)).unwrap();
            assert_eq!(view.diagnostics().len(), 1);
            assert_eq!(view.diagnostics()[0].level, LogLevel::Error);
            assert_eq!(f.text(f.find("span")), "fine");
        }
    }
}
