//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.
//! Supports position snapshots for speculative parsing (composite-literal
//! type detection).

use sabre_ir::{Span, Token, TokenKind, TokenList};

/// Cursor for navigating tokens.
///
/// Invariant: the position always stays in bounds because the stream ends
/// with an `Eof` token that is never consumed.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        debug_assert!(!tokens.is_empty(), "token stream must end with Eof");
        Cursor { tokens, pos: 0 }
    }

    /// Current position, for snapshots.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Roll back to a snapshot taken with [`Cursor::position`].
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos, "cursor only rolls back");
        self.pos = pos;
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    pub fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Peek `n` tokens ahead (0 = current). Returns `Eof` past the end.
    pub fn peek_kind(&self, n: usize) -> &TokenKind {
        static EOF: TokenKind = TokenKind::Eof;
        self.tokens.get(self.pos + n).map_or(&EOF, |t| &t.kind)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Consume the current token and return it. At `Eof` the cursor stays
    /// put.
    pub fn advance(&mut self) -> Token {
        let token = *self.current();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    /// Check the current token against a kind pattern, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}
