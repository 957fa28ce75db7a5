//! Main module for scenequery library functionality
//!
//! Pipeline
//!
//!     text -> [lexing] -> tokens -> [scanner] -> [engine] evaluates the [grammar] -> [matching]
//!     record tree -> [selector] extraction.
//!
//!     The engine only answers "did the grammar recognise a prefix of the input"; the
//!     [engine::Parse] outcome additionally answers "was the whole input consumed".

pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod lexing;
pub mod matching;
pub mod scanner;
pub mod selector;
pub mod token;

pub use engine::{Engine, Parse};
pub use error::{GrammarError, QueryError};
pub use grammar::{Grammar, Rule, RuleKind};
pub use matching::MatchRecord;
pub use scanner::Scanner;
pub use selector::SelectorQuery;
pub use token::{Token, TokenKind, TokenPattern};
