//! Error types for grammar assembly and query extraction
//!
//! A failed match is not an error: it is a record with `matched == false`. Errors are
//! reserved for grammars that can't be assembled and for callers that asked for a typed
//! [SelectorQuery](crate::query::selector::SelectorQuery) out of text that doesn't form one.

use thiserror::Error;

/// Errors that can occur while assembling a [Grammar](crate::query::grammar::Grammar)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule `{referenced_from}` references unknown rule `{name}`")]
    UnknownRule {
        name: String,
        referenced_from: String,
    },

    #[error("composite rule in `{rule}` has no children")]
    EmptyComposite { rule: String },

    #[error("rule `{name}` is registered twice")]
    DuplicateRule { name: String },

    #[error("root rule `{name}` is not registered")]
    MissingRoot { name: String },

    #[error("`{symbol}` is not a reserved symbol")]
    UnknownSymbol { symbol: String },

    #[error("registered rule has no name")]
    Unnamed,
}

/// Errors that can occur while turning query text into a typed selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query does not match the selector grammar")]
    NoMatch,

    #[error("unexpected `{next}` after {consumed} of {total} tokens")]
    TrailingInput {
        consumed: usize,
        total: usize,
        next: String,
    },

    #[error("query nests deeper than the engine's depth limit of {max_depth}")]
    DepthLimit { max_depth: usize },

    #[error("match tree for `{rule}` has an unexpected shape")]
    Malformed { rule: String },
}

/// Type alias for grammar assembly results
pub type GrammarResult<T> = Result<T, GrammarError>;
