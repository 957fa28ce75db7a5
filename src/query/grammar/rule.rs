//! Rule tree: the data model of a grammar
//!
//! A [Rule] is a tagged node ([RuleKind]) with an optional display name and a priority.
//! Rules are plain immutable values; everything that changes while matching lives in
//! [MatchRecord](crate::query::matching::MatchRecord)s, so a rule can be shared by any
//! number of evaluations.
//!
//! Optional constructs have no variant of their own: `optional(r)` is
//! `Alternation(r, Empty)`, and [Rule::is_optional] recognises that shape.
//!
//! Rendering
//!
//!     `Display` writes a rule in grammar notation, for diagnostics only:
//!
//!         '['               literal with an exact token
//!         <identifier>      literal matching any token of a kind
//!         a b c             sequence
//!         (a | b)           alternation (longest match)
//!         (a / b)           exclusive alternation (first match)
//!         [a | b]?          alternation whose last alternative is empty
//!         -> name           reference
//!         <empty>           empty

use crate::query::error::{GrammarError, GrammarResult};
use crate::query::token::{self, TokenKind, TokenPattern};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: Option<String>,
    priority: i32,
    kind: RuleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Matches exactly one token
    Literal(TokenPattern),
    /// All children in order
    Sequence(Vec<Rule>),
    /// The child that consumes the most wins, earliest on ties
    Alternation(Vec<Rule>),
    /// The first child that matches wins
    ExclusiveAlternation(Vec<Rule>),
    /// Zero-width, always matches
    Empty,
    /// Named rule, resolved in the grammar when evaluated. `lazy` is recorded, not acted on.
    Reference { name: String, lazy: bool },
}

impl RuleKind {
    /// Short label for traces
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Literal(_) => "literal",
            RuleKind::Sequence(_) => "sequence",
            RuleKind::Alternation(_) => "alternation",
            RuleKind::ExclusiveAlternation(_) => "exclusive",
            RuleKind::Empty => "empty",
            RuleKind::Reference { .. } => "reference",
        }
    }
}

impl Rule {
    fn from_kind(kind: RuleKind) -> Self {
        Self {
            name: None,
            priority: 0,
            kind,
        }
    }

    pub fn literal(pattern: TokenPattern) -> Self {
        Self::from_kind(RuleKind::Literal(pattern))
    }

    /// Literal for a punctuation symbol from the reserved dictionary
    pub fn reserved(symbol: &str) -> GrammarResult<Self> {
        token::reserved(symbol)
            .cloned()
            .map(Self::literal)
            .ok_or_else(|| GrammarError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    pub fn identifier() -> Self {
        Self::literal(TokenPattern::kind(TokenKind::Identifier))
    }

    pub fn digits() -> Self {
        Self::literal(TokenPattern::kind(TokenKind::Digits))
    }

    pub fn string() -> Self {
        Self::literal(TokenPattern::kind(TokenKind::String))
    }

    pub fn sequence(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self::from_kind(RuleKind::Sequence(rules.into_iter().collect()))
    }

    pub fn alternation(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self::from_kind(RuleKind::Alternation(rules.into_iter().collect()))
    }

    pub fn exclusive(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self::from_kind(RuleKind::ExclusiveAlternation(rules.into_iter().collect()))
    }

    pub fn empty() -> Self {
        Self::from_kind(RuleKind::Empty)
    }

    /// `rule` or nothing
    pub fn optional(rule: Rule) -> Self {
        Self::alternation([rule, Self::empty()])
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::from_kind(RuleKind::Reference {
            name: name.into(),
            lazy: false,
        })
    }

    /// Reference flagged as lazy, used where a rule refers back to itself
    pub fn lazy_reference(name: impl Into<String>) -> Self {
        Self::from_kind(RuleKind::Reference {
            name: name.into(),
            lazy: true,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Children of a composite rule, empty for leaves
    pub fn children(&self) -> &[Rule] {
        match &self.kind {
            RuleKind::Sequence(rules)
            | RuleKind::Alternation(rules)
            | RuleKind::ExclusiveAlternation(rules) => rules,
            _ => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            RuleKind::Sequence(_) | RuleKind::Alternation(_) | RuleKind::ExclusiveAlternation(_)
        )
    }

    pub fn is_empty_rule(&self) -> bool {
        matches!(self.kind, RuleKind::Empty)
    }

    /// An alternation whose last alternative is [RuleKind::Empty]
    pub fn is_optional(&self) -> bool {
        match &self.kind {
            RuleKind::Alternation(rules) => {
                rules.len() > 1 && rules.last().is_some_and(Rule::is_empty_rule)
            }
            _ => false,
        }
    }

    /// Deep copy of this subtree.
    ///
    /// Name, priority and kind are preserved; every child is duplicated in turn, so the
    /// copy shares nothing with the original.
    pub fn duplicate(&self) -> Rule {
        let kind = match &self.kind {
            RuleKind::Literal(pattern) => RuleKind::Literal(pattern.clone()),
            RuleKind::Sequence(rules) => RuleKind::Sequence(Self::duplicate_all(rules)),
            RuleKind::Alternation(rules) => RuleKind::Alternation(Self::duplicate_all(rules)),
            RuleKind::ExclusiveAlternation(rules) => {
                RuleKind::ExclusiveAlternation(Self::duplicate_all(rules))
            }
            RuleKind::Empty => RuleKind::Empty,
            RuleKind::Reference { name, lazy } => RuleKind::Reference {
                name: name.clone(),
                lazy: *lazy,
            },
        };
        Rule {
            name: self.name.clone(),
            priority: self.priority,
            kind,
        }
    }

    fn duplicate_all(rules: &[Rule]) -> Vec<Rule> {
        rules.iter().map(Rule::duplicate).collect()
    }

    /// Visit this rule and every rule below it, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Rule)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Names of all rules referenced from this subtree, in visiting order
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |rule| {
            if let RuleKind::Reference { name, .. } = &rule.kind {
                names.push(name.as_str());
            }
        });
        names
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Sequence(rules) if rules.len() > 1 => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

fn fmt_joined(f: &mut fmt::Formatter<'_>, rules: &[Rule], separator: &str) -> fmt::Result {
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", rule)?;
    }
    Ok(())
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Literal(pattern) => write!(f, "{}", pattern),
            RuleKind::Sequence(rules) => {
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    rule.fmt_nested(f)?;
                }
                Ok(())
            }
            RuleKind::Alternation(rules) if self.is_optional() => {
                f.write_str("[")?;
                fmt_joined(f, &rules[..rules.len() - 1], " | ")?;
                f.write_str("]?")
            }
            RuleKind::Alternation(rules) => {
                f.write_str("(")?;
                fmt_joined(f, rules, " | ")?;
                f.write_str(")")
            }
            RuleKind::ExclusiveAlternation(rules) => {
                f.write_str("(")?;
                fmt_joined(f, rules, " / ")?;
                f.write_str(")")
            }
            RuleKind::Empty => f.write_str("<empty>"),
            RuleKind::Reference { name, .. } => write!(f, "-> {}", name),
        }
    }
}
