//! Token definitions for the query language
//!
//! A token is a kind plus the literal text it was lexed from. Grammar literals don't hold
//! tokens, they hold a [TokenPattern]: the kind a token must have and, for punctuation,
//! the exact literal. [RESERVED] is the dictionary the grammar builds its punctuation
//! literals from.

use crate::query::lexing;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// All token kinds produced by the lexer, plus the end-of-input sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Digits,
    String,
    Star,
    Hash,
    Dot,
    Colon,
    Comma,
    Equals,
    Greater,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// Text no lexer rule recognises. Kept in the stream so partial matches stay visible.
    Unknown,
    /// Returned by a scanner that has run past its last token. Never lexed.
    EndOfInput,
}

impl TokenKind {
    /// Check if this kind is one of the reserved punctuation symbols
    pub fn is_punctuation(&self) -> bool {
        !matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Digits
                | TokenKind::String
                | TokenKind::Unknown
                | TokenKind::EndOfInput
        )
    }

    /// Name used when rendering kind-only literals (`<identifier>`)
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Digits => "digits",
            TokenKind::String => "string",
            TokenKind::Star => "star",
            TokenKind::Hash => "hash",
            TokenKind::Dot => "dot",
            TokenKind::Colon => "colon",
            TokenKind::Comma => "comma",
            TokenKind::Equals => "equals",
            TokenKind::Greater => "greater",
            TokenKind::OpenParen => "open-paren",
            TokenKind::CloseParen => "close-paren",
            TokenKind::OpenBracket => "open-bracket",
            TokenKind::CloseBracket => "close-bracket",
            TokenKind::Unknown => "unknown",
            TokenKind::EndOfInput => "end-of-input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A lexed token: its kind, its literal text and where it came from.
///
/// For strings the literal is the unquoted, unescaped content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    /// The sentinel a scanner hands out once its buffer is exhausted
    pub fn end_of_input(at: usize) -> Self {
        Self::new(TokenKind::EndOfInput, "", at..at)
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => f.write_str("<end-of-input>"),
            TokenKind::String => f.write_str(&lexing::quote(&self.literal)),
            _ => f.write_str(&self.literal),
        }
    }
}

/// The shape a grammar literal expects: a kind and, optionally, the exact literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenPattern {
    pub kind: TokenKind,
    pub literal: Option<String>,
}

impl TokenPattern {
    /// Pattern matching any token of `kind`
    pub fn kind(kind: TokenKind) -> Self {
        Self {
            kind,
            literal: None,
        }
    }

    /// Pattern matching only a token of `kind` whose literal is `literal`
    pub fn exact(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: Some(literal.into()),
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        token.kind == self.kind
            && self
                .literal
                .as_deref()
                .map_or(true, |literal| literal == token.literal)
    }
}

impl fmt::Display for TokenPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "'{}'", literal),
            None => write!(f, "<{}>", self.kind),
        }
    }
}

/// Punctuation symbols of the language and the kind each one lexes to.
pub const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("[", TokenKind::OpenBracket),
    ("]", TokenKind::CloseBracket),
    ("=", TokenKind::Equals),
    (":", TokenKind::Colon),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    (",", TokenKind::Comma),
    ("#", TokenKind::Hash),
    (".", TokenKind::Dot),
    (">", TokenKind::Greater),
    ("*", TokenKind::Star),
];

/// Reserved dictionary: literal punctuation string to the pattern matching it.
pub static RESERVED: Lazy<HashMap<&'static str, TokenPattern>> = Lazy::new(|| {
    PUNCTUATION
        .iter()
        .map(|&(symbol, kind)| (symbol, TokenPattern::exact(kind, symbol)))
        .collect()
});

/// Look up the pattern for a punctuation symbol
pub fn reserved(symbol: &str) -> Option<&'static TokenPattern> {
    RESERVED.get(symbol)
}
