//! Match records: the result and trace of evaluating a rule
//!
//! One [MatchRecord] is produced per rule node visited. Its children mirror the rule:
//!
//!     Sequence       one record per child evaluated, in order. Evaluation stops at the
//!                    first failure, and the records up to and including it are kept.
//!     Alternation    the chosen alternative only, or nothing on total failure.
//!     Reference      never appears: the referenced rule's record stands in its place.
//!
//! Records borrow the rules they were produced from, so a trace can be walked by rule
//! name without copying the grammar.

use crate::query::grammar::{Rule, RuleKind};
use crate::query::scanner::Scanner;
use crate::query::token::Token;

#[derive(Debug, Clone)]
pub struct MatchRecord<'g> {
    rule: &'g Rule,
    start: usize,
    scanner: Scanner,
    matched: bool,
    token: Option<Token>,
    children: Vec<MatchRecord<'g>>,
    depth_exceeded: bool,
}

impl<'g> MatchRecord<'g> {
    pub(crate) fn new(rule: &'g Rule, start: usize, scanner: Scanner, matched: bool) -> Self {
        Self {
            rule,
            start,
            scanner,
            matched,
            token: None,
            children: Vec::new(),
            depth_exceeded: false,
        }
    }

    pub(crate) fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub(crate) fn with_children(mut self, children: Vec<MatchRecord<'g>>) -> Self {
        self.depth_exceeded |= children.iter().any(MatchRecord::depth_exceeded);
        self.children = children;
        self
    }

    /// Mark that evaluation below this record was cut short by the depth limit
    pub(crate) fn with_depth_exceeded(mut self, exceeded: bool) -> Self {
        self.depth_exceeded |= exceeded;
        self
    }

    pub fn rule(&self) -> &'g Rule {
        self.rule
    }

    /// Display name of the rule this record was produced by
    pub fn name(&self) -> Option<&'g str> {
        self.rule.name()
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Some branch evaluated for this record, kept or discarded, hit the depth limit
    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    /// The token a successful literal consumed
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn children(&self) -> &[MatchRecord<'g>] {
        &self.children
    }

    /// Cursor state after evaluation
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Token position the rule was attempted at
    pub fn start(&self) -> usize {
        self.start
    }

    /// Token position after evaluation
    pub fn end(&self) -> usize {
        self.scanner.position()
    }

    /// Number of tokens the cursor moved over
    pub fn consumed(&self) -> usize {
        self.end().saturating_sub(self.start)
    }

    /// For alternation records, the alternative that was chosen
    pub fn chosen(&self) -> Option<&MatchRecord<'g>> {
        match self.rule.kind() {
            RuleKind::Alternation(_) | RuleKind::ExclusiveAlternation(_) => self.children.first(),
            _ => None,
        }
    }

    /// First record in this subtree (itself included) produced by the rule named `name`
    pub fn find(&self, name: &str) -> Option<&MatchRecord<'g>> {
        if self.name() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Every record in this subtree produced by the rule named `name`, outermost first
    pub fn find_all(&self, name: &str) -> Vec<&MatchRecord<'g>> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'r>(&'r self, name: &str, found: &mut Vec<&'r MatchRecord<'g>>) {
        if self.name() == Some(name) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }

    /// Tokens consumed by successful literals in this subtree, in order
    pub fn matched_tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens<'r>(&'r self, tokens: &mut Vec<&'r Token>) {
        if !self.matched {
            return;
        }
        if let Some(token) = &self.token {
            tokens.push(token);
        }
        for child in &self.children {
            child.collect_tokens(tokens);
        }
    }

    /// The deepest failed record along the last evaluated path.
    ///
    /// For a failed sequence that is where matching stopped; `None` for a match.
    pub fn failure(&self) -> Option<&MatchRecord<'g>> {
        if self.matched {
            return None;
        }
        match self.children.last() {
            Some(last) if !last.matched => last.failure().or(Some(self)),
            _ => Some(self),
        }
    }
}
