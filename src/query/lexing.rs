//! Tokenization of query text
//!
//! The raw tokenization is handled entirely by logos. This module maps logos output onto
//! [Token] values: whitespace is skipped, strings are unquoted, and anything the lexer
//! rejects becomes an [TokenKind::Unknown] token instead of being dropped, so that the
//! engine can still report how far a prefix match got.

use crate::query::token::{Token, TokenKind};
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("=")]
    Equals,
    #[token(":")]
    Colon,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,
    #[token("#")]
    Hash,
    #[token(".")]
    Dot,
    #[token(">")]
    Greater,
    #[token("*")]
    Star,

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Identifier,

    #[regex(r"[0-9]+")]
    Digits,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    String,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::OpenBracket => TokenKind::OpenBracket,
            Lexeme::CloseBracket => TokenKind::CloseBracket,
            Lexeme::Equals => TokenKind::Equals,
            Lexeme::Colon => TokenKind::Colon,
            Lexeme::OpenParen => TokenKind::OpenParen,
            Lexeme::CloseParen => TokenKind::CloseParen,
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::Hash => TokenKind::Hash,
            Lexeme::Dot => TokenKind::Dot,
            Lexeme::Greater => TokenKind::Greater,
            Lexeme::Star => TokenKind::Star,
            Lexeme::Identifier => TokenKind::Identifier,
            Lexeme::Digits => TokenKind::Digits,
            Lexeme::String => TokenKind::String,
        }
    }
}

/// Strip the surrounding quotes of a string literal and resolve backslash escapes
fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Double-quote `text` so that lexing it yields a string token holding `text` again.
///
/// Only `"`, `\`, newline and tab are escaped; `unquote` reads every other character
/// back verbatim.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Tokenize `source` starting at byte offset `start`.
///
/// Returns the tokens (spans are absolute offsets into `source`) and the position the
/// next tokenization should resume from, which is always the end of `source`.
/// An offset past the end, or inside a multi-byte character, yields no tokens.
pub fn tokenize(source: &str, start: usize) -> (Vec<Token>, usize) {
    let Some(rest) = source.get(start..) else {
        return (Vec::new(), source.len());
    };

    let mut lexer = Lexeme::lexer(rest);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let absolute = start + span.start..start + span.end;
        let slice = lexer.slice();
        let token = match result {
            Ok(Lexeme::String) => Token::new(TokenKind::String, unquote(slice), absolute),
            Ok(lexeme) => Token::new(lexeme.into(), slice, absolute),
            Err(()) => Token::new(TokenKind::Unknown, slice, absolute),
        };
        tokens.push(token);
    }

    (tokens, source.len())
}

/// Convenience function to tokenize a whole string
pub fn lex(source: &str) -> Vec<Token> {
    tokenize(source, 0).0
}
