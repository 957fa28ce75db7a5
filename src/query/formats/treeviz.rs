//! Treeviz formatter for match traces
//!
//! One line per match record, nesting shown with box-drawing connectors, 2 columns per
//! level:
//!
//!     <prefix><connector> <icon> <label> [start..end] = <token>
//!
//! Icons
//!     ✓   the rule matched
//!     ✗   the rule did not match
//!
//! The label is the rule's name, or its kind for anonymous rules; literals also show the
//! pattern they test. Spans are token positions, not byte offsets. The token is only
//! present for literals that matched.
//!
//! Example, for `id := '#' <identifier>` against `#a`:
//!
//!     └─ ✓ id [0..2]
//!       ├─ ✓ literal '#' [0..1] = #
//!       └─ ✓ literal <identifier> [1..2] = a

use crate::query::grammar::RuleKind;
use crate::query::matching::MatchRecord;

pub fn to_treeviz_str(record: &MatchRecord<'_>) -> String {
    to_treeviz_str_with_params(record, true)
}

pub fn to_treeviz_str_with_params(record: &MatchRecord<'_>, show_positions: bool) -> String {
    let mut result = String::new();
    append_record(&mut result, record, "", true, show_positions);
    result
}

fn label(record: &MatchRecord<'_>) -> String {
    let rule = record.rule();
    match (rule.name(), rule.kind()) {
        (Some(name), _) => name.to_string(),
        (None, RuleKind::Literal(pattern)) => format!("literal {}", pattern),
        (None, kind) => kind.label().to_string(),
    }
}

fn append_record(
    result: &mut String,
    record: &MatchRecord<'_>,
    prefix: &str,
    is_last: bool,
    show_positions: bool,
) {
    let connector = if is_last { "└─" } else { "├─" };
    let icon = if record.matched() { "✓" } else { "✗" };

    result.push_str(&format!("{}{} {} {}", prefix, connector, icon, label(record)));
    if show_positions {
        result.push_str(&format!(" [{}..{}]", record.start(), record.end()));
    }
    if let Some(token) = record.token() {
        result.push_str(&format!(" = {}", token.literal));
    }
    result.push('\n');

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = record.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_record(result, child, &new_prefix, is_last, show_positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::config::EngineConfig;
    use crate::query::engine::Engine;
    use crate::query::grammar::{Grammar, Rule};

    fn id_engine() -> Engine {
        let id = Rule::sequence([Rule::reserved("#").unwrap(), Rule::identifier()]).named("id");
        Engine::from_grammar(Grammar::new([id], "id").unwrap(), EngineConfig::default())
    }

    #[test]
    fn test_matched_trace() {
        let engine = id_engine();
        let parse = engine.parse("#a");
        insta::assert_snapshot!(to_treeviz_str(parse.record()), @r###"
        └─ ✓ id [0..2]
          ├─ ✓ literal '#' [0..1] = #
          └─ ✓ literal <identifier> [1..2] = a
        "###);
    }

    #[test]
    fn test_failed_trace_without_positions() {
        let engine = id_engine();
        let parse = engine.parse("#.");
        insta::assert_snapshot!(to_treeviz_str_with_params(parse.record(), false), @r###"
        └─ ✗ id
          ├─ ✓ literal '#' = #
          └─ ✗ literal <identifier>
        "###);
    }

    #[test]
    fn test_alternation_shows_chosen_branch() {
        let engine = Engine::default();
        let parse = engine.parse("#a");
        let trace = to_treeviz_str(parse.record());
        assert!(trace.starts_with("└─ ✓ query [0..2]\n"));
        assert!(trace.contains("✓ attrQuery [0..2]"));
        assert!(!trace.contains("typeIdQuery"));
        assert!(trace.contains("✓ empty [2..2]"));
    }
}
