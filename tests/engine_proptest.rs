//! Property-based tests for the evaluation engine
//!
//! These tests pin down the matching policies (literal consumption, longest-match and
//! first-match alternation, reference transparency) over generated inputs, and make sure
//! nothing panics on arbitrary text.

use proptest::prelude::*;
use scenequery::query::config::EngineConfig;
use scenequery::query::grammar::selector;
use scenequery::query::lexing::{lex, quote};
use scenequery::query::selector::Value;
use scenequery::query::{Engine, Grammar, Rule, Scanner, TokenKind, TokenPattern};

/// Query-ish text built from the symbols the lexer knows plus some it doesn't
fn query_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("#"),
            Just("."),
            Just(":"),
            Just(","),
            Just("="),
            Just(">"),
            Just("*"),
            Just("("),
            Just(")"),
            Just("["),
            Just("]"),
            Just("Node"),
            Just("bar"),
            Just("42"),
            Just("\"a b\""),
            Just("$"),
            Just(" "),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn pattern() -> impl Strategy<Value = TokenPattern> {
    prop_oneof![
        Just(TokenPattern::kind(TokenKind::Identifier)),
        Just(TokenPattern::kind(TokenKind::Digits)),
        Just(TokenPattern::exact(TokenKind::Hash, "#")),
        Just(TokenPattern::exact(TokenKind::Dot, ".")),
        Just(TokenPattern::exact(TokenKind::Identifier, "Node")),
    ]
}

/// A sequence of `len` identifier literals
fn identifiers(len: usize) -> Rule {
    Rule::sequence((0..len).map(|_| Rule::identifier()))
}

fn identifier_input(count: usize) -> Scanner {
    Scanner::new(lex(&vec!["a"; count].join(" ")))
}

proptest! {
    #[test]
    fn literal_advances_exactly_one_token(text in query_text(), pattern in pattern()) {
        let engine = Engine::default();
        let tokens = lex(&text);
        let expected_match = tokens.first().is_some_and(|t| pattern.matches(t));
        let expected_end = tokens.len().min(1);

        let rule = Rule::literal(pattern);
        let record = engine.evaluate(&rule, Scanner::new(tokens));
        prop_assert_eq!(record.matched(), expected_match);
        prop_assert_eq!(record.end(), expected_end);
        prop_assert_eq!(record.token().is_some(), expected_match);
    }

    #[test]
    fn alternation_picks_furthest_then_earliest(
        lengths in prop::collection::vec(1usize..5, 1..6),
        count in 0usize..6,
    ) {
        let engine = Engine::default();
        let rule = Rule::alternation(
            lengths.iter().enumerate().map(|(i, &len)| identifiers(len).named(format!("alt{}", i))),
        );
        let record = engine.evaluate(&rule, identifier_input(count));

        let best = lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len <= count)
            .fold(None, |best: Option<(usize, usize)>, (i, &len)| match best {
                Some((_, best_len)) if best_len >= len => best,
                _ => Some((i, len)),
            });

        match best {
            Some((index, len)) => {
                let expected = format!("alt{}", index);
                prop_assert!(record.matched());
                prop_assert_eq!(record.end(), len);
                prop_assert_eq!(record.chosen().and_then(|c| c.name()), Some(expected.as_str()));
            }
            None => {
                prop_assert!(!record.matched());
                prop_assert_eq!(record.end(), 0);
            }
        }
    }

    #[test]
    fn exclusive_alternation_picks_first_match(
        lengths in prop::collection::vec(1usize..5, 1..6),
        count in 0usize..6,
    ) {
        let engine = Engine::default();
        let rule = Rule::exclusive(
            lengths.iter().enumerate().map(|(i, &len)| identifiers(len).named(format!("alt{}", i))),
        );
        let record = engine.evaluate(&rule, identifier_input(count));

        match lengths.iter().position(|&len| len <= count) {
            Some(index) => {
                let expected = format!("alt{}", index);
                prop_assert!(record.matched());
                prop_assert_eq!(record.end(), lengths[index]);
                prop_assert_eq!(record.chosen().and_then(|c| c.name()), Some(expected.as_str()));
            }
            None => prop_assert!(!record.matched()),
        }
    }

    #[test]
    fn optional_always_matches(text in query_text(), pattern in pattern()) {
        let engine = Engine::default();
        let rule = Rule::optional(Rule::literal(pattern));
        let record = engine.evaluate(&rule, Scanner::new(lex(&text)));
        prop_assert!(record.matched());
        prop_assert!(record.consumed() <= 1);
    }

    #[test]
    fn references_are_transparent(text in query_text()) {
        let engine = Engine::default();
        for rule in engine.grammar().rules() {
            let name = rule.name().unwrap();
            let reference = Rule::reference(name);
            let via_reference = engine.evaluate(&reference, Scanner::new(lex(&text)));
            let inline = engine.evaluate(rule, Scanner::new(lex(&text)));
            prop_assert_eq!(via_reference.matched(), inline.matched());
            prop_assert_eq!(via_reference.end(), inline.end());
            prop_assert_eq!(via_reference.name(), Some(name));
        }
    }

    #[test]
    fn complete_parses_extract(text in query_text()) {
        let engine = Engine::default();
        let parse = engine.parse(&text);
        prop_assert!(parse.consumed() <= parse.token_count());
        let selector = engine.parse_selector(&text);
        prop_assert_eq!(parse.is_complete(), selector.is_ok());
        if let Ok(query) = selector {
            let canonical = query.to_string();
            prop_assert_eq!(engine.parse_selector(&canonical).ok(), Some(query));
        }
    }

    #[test]
    fn quoted_values_survive_canonical_form(text in r#"[a-z \r\n\t\x00\x01"'\\]{0,8}"#) {
        let engine = Engine::default();
        let query = engine.parse_selector(&format!("*[k={}]", quote(&text))).unwrap();
        prop_assert_eq!(&query.attributes[0].value, &Value::String(text.clone()));
        prop_assert_eq!(engine.parse_selector(&query.to_string()).ok(), Some(query));
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC*") {
        let engine = Engine::default();
        let parse = engine.parse(&text);
        prop_assert!(parse.consumed() <= parse.token_count());
        let _ = engine.parse_selector(&text);
    }

    #[test]
    fn shallow_depth_limit_never_panics(text in query_text(), max_depth in 0usize..16) {
        let grammar: Grammar = selector::grammar().unwrap();
        let engine = Engine::from_grammar(grammar, EngineConfig { max_depth });
        let parse = engine.parse(&text);
        prop_assert!(parse.consumed() <= parse.token_count());
    }
}
