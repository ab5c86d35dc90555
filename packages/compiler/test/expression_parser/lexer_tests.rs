/**
 * Lexer Tests
 *
 * Token boundaries and kinds for binding expressions
 */

#[cfg(test)]
mod tests {
    use mvvm_compiler::expression_parser::lexer::{is_identifier, Lexer, Token, TokenType};

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    fn expect_token(token: &Token, index: usize, end: usize) {
        assert_eq!(token.index, index, "Token index mismatch");
        assert_eq!(token.end, end, "Token end mismatch");
    }

    fn expect_operator_token(token: &Token, index: usize, end: usize, operator: &str) {
        expect_token(token, index, end);
        assert!(
            token.is_operator(operator),
            "Expected operator token '{}', got {:?}",
            operator,
            token
        );
    }

    fn expect_number_token(token: &Token, index: usize, end: usize, n: f64) {
        expect_token(token, index, end);
        assert!(token.is_number(), "Expected number token");
        assert!((token.num_value - n).abs() < f64::EPSILON, "Expected number {}", n);
    }

    fn expect_string_token(token: &Token, index: usize, end: usize, str: &str) {
        expect_token(token, index, end);
        assert!(token.is_string(), "Expected string token");
        assert_eq!(token.str_value, str, "Expected string value");
    }

    fn expect_identifier_token(token: &Token, index: usize, end: usize, identifier: &str) {
        expect_token(token, index, end);
        assert!(token.is_identifier(), "Expected identifier token");
        assert_eq!(token.str_value, identifier);
    }

    mod identifiers {
        use super::*;

        #[test]
        fn should_tokenize_a_simple_identifier() {
            let tokens = lex("j");
            assert_eq!(tokens.len(), 1);
            expect_identifier_token(&tokens[0], 0, 1, "j");
        }

        #[test]
        fn should_tokenize_dollar_and_underscore() {
            let tokens = lex("$a _b");
            expect_identifier_token(&tokens[0], 0, 2, "$a");
            expect_identifier_token(&tokens[1], 3, 5, "_b");
        }

        #[test]
        fn should_tokenize_a_dotted_identifier() {
            let tokens = lex("j.k");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 1, "j");
            assert!(tokens[1].is_character('.'));
            expect_identifier_token(&tokens[2], 2, 3, "k");
        }

        #[test]
        fn should_recognize_keywords() {
            let tokens = lex("true null undefined this typeof");
            assert!(tokens.iter().all(|token| token.is_keyword()));
            assert!(tokens[0].is_keyword_named("true"));
        }

        #[test]
        fn should_validate_identifier_text() {
            assert!(is_identifier("items"));
            assert!(is_identifier("$index"));
            assert!(!is_identifier("1abc"));
            assert!(!is_identifier("a-b"));
            assert!(!is_identifier(""));
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn should_tokenize_comparison_operators() {
            let tokens = lex("a <= b !== c");
            expect_operator_token(&tokens[1], 2, 4, "<=");
            expect_operator_token(&tokens[3], 7, 10, "!==");
        }

        #[test]
        fn should_tokenize_logical_operators() {
            let tokens = lex("a && b || c ?? d");
            expect_operator_token(&tokens[1], 2, 4, "&&");
            expect_operator_token(&tokens[3], 7, 9, "||");
            expect_operator_token(&tokens[5], 12, 14, "??");
        }

        #[test]
        fn should_tokenize_safe_navigation() {
            let tokens = lex("a?.b");
            expect_operator_token(&tokens[1], 1, 3, "?.");
            expect_identifier_token(&tokens[2], 3, 4, "b");
        }

        #[test]
        fn should_reject_assignment() {
            let tokens = lex("a = 1");
            let last = tokens.last().unwrap();
            assert!(last.is_error());
            assert!(last.str_value.contains("Assignments are not supported"));
        }

        #[test]
        fn should_reject_single_ampersand() {
            let tokens = lex("a & b");
            assert!(tokens.last().unwrap().is_error());
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn should_tokenize_numbers() {
            let tokens = lex("12 0.5 .5 1e3");
            expect_number_token(&tokens[0], 0, 2, 12.0);
            expect_number_token(&tokens[1], 3, 6, 0.5);
            expect_number_token(&tokens[2], 7, 9, 0.5);
            expect_number_token(&tokens[3], 10, 13, 1000.0);
        }

        #[test]
        fn should_tokenize_quoted_strings() {
            let tokens = lex(r#"'a' "b c""#);
            expect_string_token(&tokens[0], 0, 3, "a");
            expect_string_token(&tokens[1], 4, 9, "b c");
        }

        #[test]
        fn should_decode_escapes() {
            let tokens = lex(r#""a\"b\nA""#);
            assert_eq!(tokens[0].str_value, "a\"b\nA");
        }

        #[test]
        fn should_report_unterminated_quote() {
            let tokens = lex("'abc");
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].token_type, TokenType::Error);
            assert!(tokens[0].str_value.contains("Unterminated quote"));
        }

        #[test]
        fn should_stop_after_the_first_error() {
            let tokens = lex("a # b c");
            assert_eq!(tokens.len(), 2);
            assert!(tokens[1].is_error());
        }
    }
}
