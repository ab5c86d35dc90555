/**
 * Parser Tests
 *
 * Shape of the trees produced for binding expressions and the errors raised
 * for malformed input
 */

#[cfg(test)]
mod tests {
    use mvvm_compiler::expression_parser::{ast::*, parser::Parser};
    use mvvm_compiler::CompilerError;

    fn parse(text: &str) -> AST {
        Parser::new()
            .parse_binding(text)
            .unwrap_or_else(|e| panic!("'{}' should parse: {}", text, e))
    }

    fn parse_error(text: &str) -> String {
        match Parser::new().parse_binding(text) {
            Ok(ast) => panic!("'{}' should not parse, got {:?}", text, ast),
            Err(CompilerError::ParseError { message, .. }) => message,
            Err(other) => panic!("unexpected error kind: {:?}", other),
        }
    }

    fn binary(ast: &AST) -> &Binary {
        match ast {
            AST::Binary(b) => b,
            other => panic!("expected binary, got {:?}", other),
        }
    }

    fn name_of(ast: &AST) -> &str {
        match ast {
            AST::PropertyRead(read) => &read.name,
            other => panic!("expected property read, got {:?}", other),
        }
    }

    mod precedence {
        use super::*;

        #[test]
        fn should_bind_multiplication_tighter_than_addition() {
            let ast = parse("a + b * c");
            let add = binary(&ast);
            assert_eq!(add.operation, "+");
            assert_eq!(name_of(&add.left), "a");
            assert_eq!(binary(&add.right).operation, "*");
        }

        #[test]
        fn should_be_left_associative() {
            let ast = parse("a - b - c");
            let outer = binary(&ast);
            assert_eq!(name_of(&outer.right), "c");
            assert_eq!(binary(&outer.left).operation, "-");
        }

        #[test]
        fn should_respect_parentheses() {
            let ast = parse("(a + b) * c");
            let mul = binary(&ast);
            assert_eq!(mul.operation, "*");
            assert_eq!(binary(&mul.left).operation, "+");
        }

        #[test]
        fn should_put_logical_or_below_and() {
            let ast = parse("a || b && c");
            let or = binary(&ast);
            assert_eq!(or.operation, "||");
            assert_eq!(binary(&or.right).operation, "&&");
        }

        #[test]
        fn should_parse_nested_conditionals() {
            match parse("a ? b : c ? d : e") {
                AST::Conditional(cond) => {
                    assert_eq!(name_of(&cond.true_exp), "b");
                    assert!(matches!(*cond.false_exp, AST::Conditional(_)));
                }
                other => panic!("expected conditional, got {:?}", other),
            }
        }
    }

    mod access {
        use super::*;

        #[test]
        fn should_parse_member_chains() {
            match parse("user.address.city") {
                AST::PropertyRead(city) => {
                    assert_eq!(city.name, "city");
                    assert_eq!(name_of(&city.receiver), "address");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_safe_navigation() {
            match parse("user?.name") {
                AST::PropertyRead(read) => assert!(read.safe),
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_keyed_reads_and_calls() {
            match parse("items[0].format(a, 'b')") {
                AST::Call(call) => {
                    assert_eq!(call.args.len(), 2);
                    match call.receiver.as_ref() {
                        AST::PropertyRead(read) => {
                            assert_eq!(read.name, "format");
                            assert!(matches!(*read.receiver, AST::KeyedRead(_)));
                        }
                        other => panic!("unexpected {:?}", other),
                    }
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_collect_free_names() {
            let ast = parse("flag ? user.name : fallback(count)");
            assert_eq!(ast.free_names(), vec!["flag", "user", "fallback", "count"]);
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn should_parse_primitive_literals() {
            for (text, expected) in [
                ("null", LiteralValue::Null),
                ("undefined", LiteralValue::Undefined),
                ("true", LiteralValue::Bool(true)),
                ("4.5", LiteralValue::Number(4.5)),
                ("'x'", LiteralValue::String("x".into())),
            ] {
                match parse(text) {
                    AST::LiteralPrimitive(literal) => assert_eq!(literal.value, expected),
                    other => panic!("unexpected {:?}", other),
                }
            }
        }

        #[test]
        fn should_parse_object_literals_with_quoted_and_shorthand_keys() {
            match parse("{ 'text-danger': err, active }") {
                AST::LiteralMap(map) => {
                    assert_eq!(map.keys, vec!["text-danger", "active"]);
                    assert_eq!(name_of(&map.values[1]), "active");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_allow_trailing_commas_in_arrays() {
            match parse("[1, 2,]") {
                AST::LiteralArray(array) => assert_eq!(array.expressions.len(), 2),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_reject_trailing_tokens() {
            assert!(parse_error("a b").contains("Unexpected token 'b'"));
        }

        #[test]
        fn should_reject_unexpected_end() {
            assert!(parse_error("a +").contains("Unexpected end of expression"));
        }

        #[test]
        fn should_reject_unclosed_parenthesis() {
            assert!(parse_error("(a + b").contains("Missing expected )"));
        }

        #[test]
        fn should_surface_lexer_errors() {
            assert!(parse_error("a = 1").contains("Assignments are not supported"));
        }

        #[test]
        fn should_reject_blank_input() {
            assert!(parse_error("  ").contains("Blank expressions"));
        }
    }
}
