/**
 * Two-Way Binding Tests
 *
 * `v-model` on form controls: scope to control, control to scope, and the
 * edit guard that keeps the two from fighting
 */

#[path = "support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use super::support::fixture;
    use mvvm_compiler::{CompilerConfig, CompilerError, Value};
    use serde_json::json;

    #[test]
    fn should_render_the_scope_value() {
        let f = fixture(r#"<input v-model="name">"#, json!({"name": "ann"}));
        f.mount();
        let input = f.find("input");
        assert_eq!(f.value(input), "ann");
        assert_eq!(f.attribute(input, "v-model"), None);
    }

    #[test]
    fn should_follow_scope_writes() {
        let f = fixture(r#"<input v-model="name">"#, json!({"name": "ann"}));
        f.mount();
        let input = f.find("input");
        for value in ["bob", "", "carl"] {
            f.scope.set("name", value);
            assert_eq!(f.value(input), value);
        }
        f.scope.set("name", 42);
        assert_eq!(f.value(input), "42");
    }

    #[test]
    fn should_write_typed_text_to_the_scope() {
        let f = fixture(
            r#"<input v-model="name"><p>{{name}}</p>"#,
            json!({"name": "ann"}),
        );
        f.mount();
        let input = f.find("input");
        f.type_into(input, "annie", "input");
        assert_eq!(f.scope.get("name"), Value::from("annie"));
        assert_eq!(f.value(input), "annie");
        assert_eq!(f.text(f.find("p")), "annie");
    }

    #[test]
    fn should_clear_the_guard_after_one_round_trip() {
        let f = fixture(r#"<input v-model="name">"#, json!({"name": "ann"}));
        f.mount();
        let input = f.find("input");

        f.type_into(input, "typed", "input");
        // the next external write must reach the control again
        f.scope.set("name", "external");
        assert_eq!(f.value(input), "external");
    }

    #[test]
    fn should_clear_the_guard_when_the_value_is_unchanged() {
        let f = fixture(r#"<input v-model="name">"#, json!({"name": "same"}));
        f.mount();
        let input = f.find("input");

        f.type_into(input, "same", "input");
        f.scope.set("name", "changed");
        assert_eq!(f.value(input), "changed");
    }

    #[test]
    fn should_render_undefined_and_null_as_empty() {
        let f = fixture(r#"<input v-model="missing"><input v-model="nothing">"#, json!({"nothing": null}));
        f.mount();
        let inputs = f.find_all("input");
        assert_eq!(f.value(inputs[0]), "");
        assert_eq!(f.value(inputs[1]), "");
    }

    #[test]
    fn should_write_through_property_paths() {
        let f = fixture(
            r#"<input v-model="user.name"><p>{{user.name}}</p>"#,
            json!({"user": {"name": "ann", "age": 3}}),
        );
        f.mount();
        f.type_into(f.find("input"), "zoe", "input");
        assert_eq!(f.text(f.find("p")), "zoe");
        assert_eq!(
            f.scope.get("user"),
            Value::from(json!({"name": "zoe", "age": 3}))
        );
    }

    #[test]
    fn should_bind_textarea_and_select() {
        let f = fixture(
            r#"<textarea v-model="note"></textarea><select v-model="choice"></select>"#,
            json!({"note": "n", "choice": "a"}),
        );
        f.mount();
        let textarea = f.find("textarea");
        let select = f.find("select");
        assert_eq!(f.value(textarea), "n");
        assert_eq!(f.value(select), "a");

        f.type_into(textarea, "longer", "input");
        assert_eq!(f.scope.get("note"), Value::from("longer"));

        // select only reacts to change
        f.type_into(select, "b", "input");
        assert_eq!(f.scope.get("choice"), Value::from("a"));
        f.type_into(select, "b", "change");
        assert_eq!(f.scope.get("choice"), Value::from("b"));
    }

    #[test]
    fn should_ignore_non_form_elements() {
        let f = fixture(r#"<div v-model="name">x</div>"#, json!({"name": "ann"}));
        f.mount();
        let div = f.find("div");
        assert_eq!(f.markup(), "<div>x</div>");
        assert_eq!(f.document.borrow().listener_count(div), 0);
    }

    #[test]
    fn should_write_the_loop_variable_in_its_own_scope() {
        let f = fixture(
            r#"<p v-for="item in items"><input v-model="item"></p>"#,
            json!({"items": ["a", "b"]}),
        );
        f.mount();
        let inputs = f.find_all("input");
        f.type_into(inputs[0], "changed", "input");
        assert_eq!(f.value(inputs[1]), "b");
        assert_eq!(f.scope.get("item"), Value::Undefined);
    }

    #[test]
    fn should_reject_non_assignable_expressions() {
        let f = fixture(r#"<input v-model="a + b">"#, json!({}));
        let err = f.try_mount(CompilerConfig::default().with_strict(true)).unwrap_err();
        assert!(matches!(err, CompilerError::ParseError { .. }));
    }
}
