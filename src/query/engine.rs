//! Evaluation engine
//!
//! The engine interprets a [Grammar] against a [Scanner]. Evaluation is a recursive
//! descent over the rule tree that returns a [MatchRecord] per rule visited:
//!
//!     Literal                scan one token and compare. The cursor moves on whether or
//!                            not the token matched.
//!     Sequence               children in order on a threaded cursor, stop at the first
//!                            failure.
//!     Alternation            every alternative from its own duplicate of the same cursor;
//!                            the one that got furthest wins, the earliest on ties.
//!     ExclusiveAlternation   same duplication, but the first alternative to match wins.
//!     Empty                  matches, consumes nothing.
//!     Reference              evaluates the named rule in place; its record is returned
//!                            as if the rule had been written inline.
//!
//! Because a literal consumes on failure, a failed alternative can never leak cursor
//! movement to its siblings (each has its own duplicate), only to later children of the
//! same sequence, which are not evaluated anyway.
//!
//! [Engine::parse] only reports what the grammar recognised. Whether the whole input was
//! consumed is a separate question, answered by [Parse::is_complete].

use crate::query::config::EngineConfig;
use crate::query::error::{GrammarResult, QueryError};
use crate::query::grammar::{selector as selector_grammar, Grammar, Rule, RuleKind};
use crate::query::lexing;
use crate::query::matching::MatchRecord;
use crate::query::scanner::Scanner;
use crate::query::selector::{self, SelectorQuery};
use crate::query::token::Token;

pub struct Engine {
    grammar: Grammar,
    config: EngineConfig,
}

impl Engine {
    /// Engine over the selector query grammar
    pub fn new() -> GrammarResult<Self> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> GrammarResult<Self> {
        Ok(Self::from_grammar(selector_grammar::grammar()?, config))
    }

    /// Engine over an arbitrary grammar
    pub fn from_grammar(grammar: Grammar, config: EngineConfig) -> Self {
        Self { grammar, config }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tokenize `text` and evaluate the root rule against it
    pub fn parse(&self, text: &str) -> Parse<'_> {
        let (tokens, _) = lexing::tokenize(text, 0);
        self.parse_tokens(tokens)
    }

    /// Evaluate the root rule against an already tokenized input
    pub fn parse_tokens(&self, tokens: Vec<Token>) -> Parse<'_> {
        let scanner = Scanner::new(tokens);
        let record = self.evaluate(self.grammar.root(), scanner);
        let parse = Parse::new(record);
        log::debug!(
            "parsed {} tokens: matched={} consumed={}",
            parse.token_count(),
            parse.matched(),
            parse.consumed()
        );
        parse
    }

    /// Parse `text` and extract a typed selector from it.
    ///
    /// Unlike [Engine::parse], this insists the whole input was consumed. An incomplete
    /// parse that ran into the depth limit is reported as [QueryError::DepthLimit], since
    /// the input may well be valid.
    pub fn parse_selector(&self, text: &str) -> Result<SelectorQuery, QueryError> {
        let parse = self.parse(text);
        if !parse.is_complete() && parse.depth_exceeded() {
            return Err(QueryError::DepthLimit {
                max_depth: self.config.max_depth,
            });
        }
        if !parse.matched() {
            return Err(QueryError::NoMatch);
        }
        if let Some(next) = parse.next_token() {
            return Err(QueryError::TrailingInput {
                consumed: parse.consumed(),
                total: parse.token_count(),
                next: next.literal.clone(),
            });
        }
        selector::extract(parse.record())
    }

    /// Evaluate `rule` at the scanner's position.
    ///
    /// References resolve against this engine's grammar. Never enforces end of input.
    pub fn evaluate<'g>(&'g self, rule: &'g Rule, scanner: Scanner) -> MatchRecord<'g> {
        self.eval(rule, scanner, 0)
    }

    fn eval<'g>(&'g self, rule: &'g Rule, mut scanner: Scanner, depth: usize) -> MatchRecord<'g> {
        let start = scanner.position();

        if depth > self.config.max_depth {
            log::warn!(
                "depth limit {} reached at token {}, giving up on this branch",
                self.config.max_depth,
                start
            );
            return MatchRecord::new(rule, start, scanner, false).with_depth_exceeded(true);
        }

        log::trace!(
            "{:indent$}{} {} at {}",
            "",
            rule.name().unwrap_or(rule.kind().label()),
            rule,
            start,
            indent = depth
        );

        match rule.kind() {
            RuleKind::Literal(pattern) => {
                let token = scanner.scan();
                if pattern.matches(&token) {
                    MatchRecord::new(rule, start, scanner, true).with_token(token)
                } else {
                    MatchRecord::new(rule, start, scanner, false)
                }
            }
            RuleKind::Sequence(rules) => {
                let mut records = Vec::with_capacity(rules.len());
                let mut matched = true;
                for child in rules {
                    let record = self.eval(child, scanner.duplicate(), depth + 1);
                    scanner = record.scanner().duplicate();
                    let child_matched = record.matched();
                    records.push(record);
                    if !child_matched {
                        matched = false;
                        break;
                    }
                }
                MatchRecord::new(rule, start, scanner, matched).with_children(records)
            }
            RuleKind::Alternation(rules) => {
                let mut best: Option<MatchRecord<'g>> = None;
                let mut exceeded = false;
                for child in rules {
                    let record = self.eval(child, scanner.duplicate(), depth + 1);
                    exceeded |= record.depth_exceeded();
                    let further = best.as_ref().map_or(true, |b| record.end() > b.end());
                    if record.matched() && further {
                        best = Some(record);
                    }
                }
                Self::chosen(rule, start, scanner, best).with_depth_exceeded(exceeded)
            }
            RuleKind::ExclusiveAlternation(rules) => {
                let mut first = None;
                let mut exceeded = false;
                for child in rules {
                    let record = self.eval(child, scanner.duplicate(), depth + 1);
                    exceeded |= record.depth_exceeded();
                    if record.matched() {
                        first = Some(record);
                        break;
                    }
                }
                Self::chosen(rule, start, scanner, first).with_depth_exceeded(exceeded)
            }
            RuleKind::Empty => MatchRecord::new(rule, start, scanner, true),
            RuleKind::Reference { name, .. } => match self.grammar.get(name) {
                Some(target) => self.eval(target, scanner, depth + 1),
                None => {
                    log::warn!("reference to unregistered rule `{}` does not match", name);
                    MatchRecord::new(rule, start, scanner, false)
                }
            },
        }
    }

    fn chosen<'g>(
        rule: &'g Rule,
        start: usize,
        scanner: Scanner,
        choice: Option<MatchRecord<'g>>,
    ) -> MatchRecord<'g> {
        match choice {
            Some(record) => {
                let after = record.scanner().duplicate();
                MatchRecord::new(rule, start, after, true).with_children(vec![record])
            }
            None => MatchRecord::new(rule, start, scanner, false),
        }
    }
}

/// Engine over the selector grammar with default settings.
///
/// Panics if the built-in selector grammar fails to assemble, which
/// `grammar::selector` tests rule out.
impl Default for Engine {
    fn default() -> Self {
        Self::new().expect("selector grammar is well-formed")
    }
}

/// Outcome of [Engine::parse]: the match tree plus what it takes to judge it.
#[derive(Debug, Clone)]
pub struct Parse<'g> {
    record: MatchRecord<'g>,
}

impl<'g> Parse<'g> {
    fn new(record: MatchRecord<'g>) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &MatchRecord<'g> {
        &self.record
    }

    pub fn into_record(self) -> MatchRecord<'g> {
        self.record
    }

    /// The root rule recognised a prefix of the input
    pub fn matched(&self) -> bool {
        self.record.matched()
    }

    /// Some branch was cut short by the engine's depth limit
    pub fn depth_exceeded(&self) -> bool {
        self.record.depth_exceeded()
    }

    /// Final cursor position
    pub fn consumed(&self) -> usize {
        self.record.end()
    }

    pub fn token_count(&self) -> usize {
        self.record.scanner().len()
    }

    pub fn tokens(&self) -> &[Token] {
        self.record.scanner().tokens()
    }

    /// The root rule matched and the cursor ended on the last token
    pub fn is_complete(&self) -> bool {
        self.matched() && self.consumed() == self.token_count()
    }

    /// First token past the matched prefix, if any
    pub fn next_token(&self) -> Option<&Token> {
        self.tokens().get(self.consumed())
    }
}
