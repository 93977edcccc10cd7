//! Cursor over a tokenized query
//!
//! The stream always ends with an `Eof` token and the cursor never moves
//! past it, so `current()` and `peek_ahead()` are total.
use super::token::{Token, TokenKind};
use crate::utils::Position;

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().map(Token::is_eof).unwrap_or(false) {
            let end = tokens
                .last()
                .map(|token| token.span.end)
                .unwrap_or_else(Position::start);
            tokens.push(Token::eof(end));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    fn last_index(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Token `n` places after the current one, clamped to `Eof`
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let index = (self.position + n).min(self.last_index());
        &self.tokens[index]
    }

    /// Consume and return the current token; stays on `Eof` once reached
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if self.position < self.last_index() {
            self.position += 1;
        }
        token
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Consume the current token if it has `kind`
    pub fn advance_if(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens including the trailing `Eof`
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 1
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.tokens
    }
}
