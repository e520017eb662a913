use std::collections::HashMap;

use crate::{
    ast::Ast,
    parser::{ParserError, Rule},
    source::SourceSpan,
    tokenizer::{Token, TokenTypeName},
    SourceReference,
};

#[derive(Debug, Clone)]
struct Memo {
    ast: Ast,
    next: usize,
}

/// Cursor over a fully tokenized program.
///
/// Speculative parsing takes a snapshot before trying a rule and rolls back
/// on failure. Successful results are remembered per `(position, rule)` so a
/// rule retried at the same position by a later alternative is not parsed a
/// second time. The memo survives rollbacks: a rule that matched at a
/// position matches the same tokens whatever alternative asked for it.
pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
    snapshots: Vec<usize>,
    memo: HashMap<(usize, Rule), Memo>,
    source_code: SourceReference,
}

impl TokenStream {
    /// `tokens` must end with the tokenizer's `Eof` token.
    pub fn new(tokens: Vec<Token>, source_code: SourceReference) -> Self {
        Self {
            tokens,
            index: 0,
            snapshots: Vec::new(),
            memo: HashMap::new(),
            source_code,
        }
    }

    pub fn source_code(&self) -> &SourceReference {
        &self.source_code
    }

    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// Token `distance` places ahead; looking past the end yields `Eof`.
    pub fn peek(&self, distance: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + distance).min(last)]
    }

    /// The most recently consumed token, used to close node spans.
    pub fn previous(&self) -> &Token {
        &self.tokens[self.index.saturating_sub(1)]
    }

    pub fn is_match(&self, name: TokenTypeName) -> bool {
        self.current().name() == name
    }

    pub fn is_at_end(&self) -> bool {
        self.is_match(TokenTypeName::Eof)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.index += 1;
        }
        token
    }

    /// Consumes the current token if it has the expected kind.
    pub fn take(&mut self, expected: TokenTypeName) -> Result<Token, ParserError> {
        if self.is_match(expected) {
            Ok(self.advance())
        } else {
            let actual = self.current();
            Err(ParserError::UnexpectedToken {
                expected,
                actual: actual.name(),
                found_at: actual.span,
                source_code: self.source_code.clone(),
            })
        }
    }

    /// Span from `start` up to the end of the last consumed token.
    pub fn span_from(&self, start: SourceSpan) -> SourceSpan {
        start.to(self.previous().span)
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn take_snapshot(&mut self) {
        self.snapshots.push(self.index);
    }

    pub fn rollback_snapshot(&mut self) {
        if let Some(index) = self.snapshots.pop() {
            self.index = index;
        }
    }

    pub fn commit_snapshot(&mut self) {
        self.snapshots.pop();
    }

    pub fn remember(&mut self, start: usize, rule: Rule, ast: &Ast) {
        self.memo.insert(
            (start, rule),
            Memo {
                ast: ast.clone(),
                next: self.index,
            },
        );
    }

    /// Replays a remembered result at the current position, moving past the
    /// tokens it covered.
    pub fn recall(&mut self, rule: Rule) -> Option<Ast> {
        let memo = self.memo.get(&(self.index, rule))?;
        tracing::trace!(position = self.index, ?rule, "parser memo hit");
        self.index = memo.next;
        Some(memo.ast.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn stream(source: &str) -> TokenStream {
        let source_code = SourceReference::new("test".into(), source.into());
        let tokens = Tokenizer::tokenize(source_code.clone()).unwrap();
        TokenStream::new(tokens, source_code)
    }

    #[test]
    fn peeking_past_the_end_yields_eof() {
        let mut tokens = stream("x;");
        assert_eq!(tokens.peek(5).name(), TokenTypeName::Eof);
        tokens.advance();
        tokens.advance();
        tokens.advance();
        assert!(tokens.is_at_end());
        assert_eq!(tokens.position(), 2);
    }

    #[test]
    fn rollback_and_take() {
        let mut tokens = stream("int x = 1;");
        tokens.take_snapshot();
        assert!(tokens.take(TokenTypeName::IntType).is_ok());
        assert!(matches!(
            tokens.take(TokenTypeName::Equal),
            Err(ParserError::UnexpectedToken {
                expected: TokenTypeName::Equal,
                actual: TokenTypeName::Word,
                ..
            })
        ));
        tokens.rollback_snapshot();
        assert_eq!(tokens.current().name(), TokenTypeName::IntType);
    }
}
