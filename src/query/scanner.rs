//! Token cursor used by the engine
//!
//! A [Scanner] is a position over an immutable, shared token buffer. Duplicating a scanner
//! copies the position and bumps a reference count; the tokens themselves are never
//! copied. Backtracking is just keeping an older duplicate around.

use crate::query::token::Token;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Scanner {
    tokens: Arc<[Token]>,
    position: usize,
}

impl Scanner {
    pub fn new(tokens: impl Into<Arc<[Token]>>) -> Self {
        Self {
            tokens: tokens.into(),
            position: 0,
        }
    }

    /// Independent cursor over the same buffer, at the same position
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Return the token under the cursor and advance past it.
    ///
    /// Past the last token this returns the end-of-input sentinel and the position
    /// stays at the end of the buffer.
    pub fn scan(&mut self) -> Token {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                token.clone()
            }
            None => Token::end_of_input(self.end_offset()),
        }
    }

    /// The token under the cursor, without advancing
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of tokens in the buffer
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether both scanners walk the very same buffer
    pub fn shares_buffer(&self, other: &Scanner) -> bool {
        Arc::ptr_eq(&self.tokens, &other.tokens)
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, |token| token.span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::lexing::lex;
    use crate::query::token::TokenKind;

    #[test]
    fn test_scan_advances_one_token() {
        let mut scanner = Scanner::new(lex("Node.bar"));
        assert_eq!(scanner.len(), 3);
        assert_eq!(scanner.scan().literal, "Node");
        assert_eq!(scanner.position(), 1);
        assert_eq!(scanner.scan().kind, TokenKind::Dot);
        assert_eq!(scanner.scan().literal, "bar");
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_scan_past_end_returns_sentinel() {
        let mut scanner = Scanner::new(lex("a"));
        scanner.scan();
        let sentinel = scanner.scan();
        assert!(sentinel.is_end_of_input());
        assert_eq!(sentinel.span, 1..1);
        assert_eq!(scanner.position(), 1);
    }

    #[test]
    fn test_duplicates_are_independent() {
        let mut original = Scanner::new(lex("a b c"));
        original.scan();
        let mut copy = original.duplicate();
        copy.scan();
        copy.scan();
        assert_eq!(original.position(), 1);
        assert_eq!(copy.position(), 3);
        assert!(original.shares_buffer(&copy));
        assert_eq!(original.peek().map(|t| t.literal.as_str()), Some("b"));
    }

    #[test]
    fn test_empty_buffer() {
        let mut scanner = Scanner::new(Vec::<Token>::new());
        assert!(scanner.is_empty());
        assert!(scanner.is_at_end());
        assert!(scanner.scan().is_end_of_input());
    }
}
