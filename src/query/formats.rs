//! Output formats
//!
//! - [treeviz]: one line per match record, for reading traces
//! - [grammar_table]: the rules of a grammar in grammar notation
//! - [to_json] / [to_yaml]: serialized [SelectorQuery] values

pub mod treeviz;

use crate::query::grammar::Grammar;
use crate::query::selector::SelectorQuery;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// `name := rule` for every rule, in registration order
pub fn grammar_table(grammar: &Grammar) -> String {
    let width = grammar
        .rules()
        .filter_map(|rule| rule.name())
        .map(str::len)
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for rule in grammar.rules() {
        let name = rule.name().unwrap_or_default();
        output.push_str(&format!("{:<width$} := {}\n", name, rule, width = width));
    }
    output
}

pub fn to_json(query: &SelectorQuery) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(query)?)
}

pub fn to_yaml(query: &SelectorQuery) -> Result<String, FormatError> {
    Ok(serde_yaml::to_string(query)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::engine::Engine;
    use crate::query::grammar::selector;

    #[test]
    fn test_selector_grammar_table() {
        let grammar = selector::grammar().unwrap();
        insta::assert_snapshot!(grammar_table(&grammar), @r###"
        value       := (<identifier> / <digits> / <string>)
        attr        := '[' <identifier> '=' -> value ']' [-> attr]?
        args        := -> value [',' -> args]?
        pseudoClass := ':' <identifier> ['(' -> args ')']?
        selectors   := ('#' | '.') (<identifier> | <string>) [-> selectors]?
        typeIdQuery := (<identifier> | '*') [-> selectors]? [-> pseudoClass]? [-> attr]?
        attrQuery   := -> selectors [-> pseudoClass]? [-> attr]?
        subQuery    := ['>']? -> query
        query       := (-> typeIdQuery | -> attrQuery) [-> subQuery]?
        "###);
    }

    #[test]
    fn test_json_output() {
        let query = Engine::default().parse_selector("Node#a[k=1]").unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&query).unwrap()).unwrap();
        assert_eq!(json["target"]["kind"], "type");
        assert_eq!(json["target"]["name"], "Node");
        assert_eq!(json["selectors"][0]["kind"], "id");
        assert_eq!(json["attributes"][0]["key"], "k");
        assert_eq!(json["attributes"][0]["value"]["kind"], "digits");
        assert!(json["sub_query"].is_null());
    }

    #[test]
    fn test_yaml_output() {
        let query = Engine::default().parse_selector("* > .x").unwrap();
        let yaml = to_yaml(&query).unwrap();
        assert!(yaml.contains("kind: any"));
        assert!(yaml.contains("combinator: child"));
    }
}
