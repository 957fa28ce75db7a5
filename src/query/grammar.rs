//! Grammar registry
//!
//! A [Grammar] is the set of named rules an engine evaluates against, plus the name of the
//! root rule. It is assembled once and never mutated afterwards, so one grammar can serve
//! any number of concurrent parses.
//!
//! Assembly validates the table up front:
//! - every registered rule has a unique name
//! - every composite rule has at least one child
//! - every reference names a registered rule
//! - the root rule is registered
//!
//! References are still resolved by name at evaluation time. That is what lets
//! `subQuery` refer back to `query` without ever expanding the cycle.

pub mod rule;
pub mod selector;

pub use rule::{Rule, RuleKind};

use crate::query::error::{GrammarError, GrammarResult};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    root: usize,
}

impl Grammar {
    /// Assemble and validate a grammar from named rules
    pub fn new(rules: impl IntoIterator<Item = Rule>, root: &str) -> GrammarResult<Self> {
        let rules: Vec<Rule> = rules.into_iter().collect();
        let mut index = HashMap::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            let name = rule.name().ok_or(GrammarError::Unnamed)?;
            if index.insert(name.to_string(), i).is_some() {
                return Err(GrammarError::DuplicateRule {
                    name: name.to_string(),
                });
            }
        }

        for rule in &rules {
            Self::validate(rule, &index)?;
        }

        let root = *index.get(root).ok_or_else(|| GrammarError::MissingRoot {
            name: root.to_string(),
        })?;

        log::debug!(
            "assembled grammar with {} rules, root `{}`",
            rules.len(),
            rules[root].name().unwrap_or_default()
        );

        Ok(Self { rules, index, root })
    }

    fn validate(rule: &Rule, index: &HashMap<String, usize>) -> GrammarResult<()> {
        let owner = rule.name().unwrap_or_default();
        let mut result = Ok(());
        rule.walk(&mut |node| {
            if result.is_err() {
                return;
            }
            if node.is_composite() && node.children().is_empty() {
                result = Err(GrammarError::EmptyComposite {
                    rule: owner.to_string(),
                });
            } else if let RuleKind::Reference { name, .. } = node.kind() {
                if !index.contains_key(name) {
                    result = Err(GrammarError::UnknownRule {
                        name: name.clone(),
                        referenced_from: owner.to_string(),
                    });
                }
            }
        });
        result
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn root(&self) -> &Rule {
        &self.rules[self.root]
    }

    pub fn root_name(&self) -> &str {
        self.root().name().unwrap_or_default()
    }

    /// Rules in registration order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash() -> Rule {
        Rule::reserved("#").unwrap()
    }

    #[test]
    fn test_assembles_recursive_grammar() {
        let grammar = Grammar::new(
            [
                Rule::sequence([hash(), Rule::optional(Rule::reference("ids"))]).named("ids"),
                Rule::reference("ids").named("root"),
            ],
            "root",
        )
        .unwrap();
        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.root_name(), "root");
        assert!(grammar.contains("ids"));
        assert!(grammar.get("missing").is_none());
        let names: Vec<_> = grammar.rules().filter_map(Rule::name).collect();
        assert_eq!(names, vec!["ids", "root"]);
    }

    #[test]
    fn test_rejects_unknown_reference() {
        let err = Grammar::new([Rule::reference("nowhere").named("root")], "root").unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownRule {
                name: "nowhere".to_string(),
                referenced_from: "root".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_empty_composite() {
        let err = Grammar::new(
            [Rule::sequence([hash(), Rule::alternation(Vec::<Rule>::new())]).named("root")],
            "root",
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::EmptyComposite { rule } if rule == "root"));
    }

    #[test]
    fn test_rejects_duplicates_unnamed_and_missing_root() {
        let err = Grammar::new([hash().named("a"), hash().named("a")], "a").unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateRule { .. }));

        let err = Grammar::new([hash()], "a").unwrap_err();
        assert_eq!(err, GrammarError::Unnamed);

        let err = Grammar::new([hash().named("a")], "b").unwrap_err();
        assert_eq!(
            err,
            GrammarError::MissingRoot {
                name: "b".to_string()
            }
        );
    }
}
