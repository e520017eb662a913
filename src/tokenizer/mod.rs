mod matchers;

use crate::{lexer::Lexer, source::SourceSpan, SourceReference};
use matchers::{LexicalFault, Matcher};
use miette::Diagnostic;
use std::fmt::Display;
use strum::{EnumDiscriminants, IntoStaticStr};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, IntoStaticStr)]
pub enum TokenizerError {
    #[error("Unexpected character: {character:?}")]
    UnexpectedCharacter {
        character: char,
        #[label("No token starts with this character")]
        at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Unterminated string")]
    UnterminatedString {
        #[label("String starts here")]
        at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Integer literal {literal} does not fit in 64 bits")]
    InvalidNumber {
        literal: String,
        #[label("This number")]
        at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
}

impl TokenizerError {
    pub fn found_at(&self) -> SourceSpan {
        match self {
            Self::UnexpectedCharacter { at, .. }
            | Self::UnterminatedString { at, .. }
            | Self::InvalidNumber { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub span: SourceSpan,
    pub token_type: TokenType,
}

impl Token {
    pub fn new(span: SourceSpan, token_type: TokenType) -> Self {
        Self { span, token_type }
    }
    pub fn name(&self) -> TokenTypeName {
        TokenTypeName::from(&self.token_type)
    }
    /// The literal payload for words, strings and numbers.
    pub fn literal_text(&self) -> Option<String> {
        match &self.token_type {
            TokenType::Word(text) | TokenType::QuotedString(text) => Some(text.clone()),
            TokenType::Int(value) => Some(value.to_string()),
            TokenType::Float(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.token_type, f)
    }
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TokenTypeName), derive(Hash))]
pub enum TokenType {
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    EqualEqual,
    BangEqual,
    Greater,
    Less,
    Ampersand,
    Pipe,
    PipePipe,
    Int(i64),
    Float(f64),
    QuotedString(String),
    Word(String),
    True,
    False,
    Nil,
    Fun,
    Var,
    If,
    Else,
    While,
    For,
    Return,
    Print,
    Class,
    New,
    Try,
    Catch,
    Method,
    StringType,
    BoolType,
    IntType,
    FloatType,
    Void,
    WhiteSpace,
    LineComment,
    Eof,
}

impl TokenType {
    fn is_trivia(&self) -> bool {
        matches!(self, TokenType::WhiteSpace | TokenType::LineComment)
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenType::*;
        let lexeme = match self {
            Int(value) => return write!(f, "{}", value),
            Float(value) => return write!(f, "{:?}", value),
            QuotedString(text) => return write!(f, "{:?}", text),
            Word(text) => text.as_str(),
            OpenParen => "(",
            CloseParen => ")",
            OpenBrace => "{",
            CloseBrace => "}",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Arrow => "->",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Caret => "^",
            Equal => "=",
            EqualEqual => "==",
            BangEqual => "!=",
            Greater => ">",
            Less => "<",
            Ampersand => "&",
            Pipe => "|",
            PipePipe => "||",
            True => "true",
            False => "false",
            Nil => "nil",
            Fun => "fun",
            Var => "var",
            If => "if",
            Else => "else",
            While => "while",
            For => "for",
            Return => "return",
            Print => "print",
            Class => "class",
            New => "new",
            Try => "try",
            Catch => "catch",
            Method => "method",
            StringType => "string",
            BoolType => "bool",
            IntType => "int",
            FloatType => "float",
            Void => "void",
            WhiteSpace => " ",
            LineComment => "//",
            Eof => "<eof>",
        };
        f.write_str(lexeme)
    }
}

/// Lazily turns source text into tokens by trying each matcher in order at
/// the cursor; the first matcher to succeed wins. Whitespace and comments are
/// consumed but never yielded. The sequence ends with a single `Eof` token.
pub struct Tokenizer {
    lexer: Lexer,
    matchers: Vec<Box<dyn Matcher>>,
    source_code: SourceReference,
    finished: bool,
}

impl Tokenizer {
    pub fn new(source_code: SourceReference) -> Self {
        Self {
            lexer: Lexer::new(source_code.source()),
            matchers: matchers::ordered_matchers(),
            source_code,
            finished: false,
        }
    }

    pub fn tokenize(source_code: SourceReference) -> Result<Vec<Token>, TokenizerError> {
        Self::new(source_code).collect()
    }

    /// Rewinds to the start of the source so the tokens can be produced again.
    pub fn restart(&mut self) {
        self.lexer.reset();
        self.finished = false;
    }

    fn match_next(&mut self) -> Result<Option<TokenType>, LexicalFault> {
        for matcher in &self.matchers {
            if let Some(token_type) = matcher.try_match(&mut self.lexer)? {
                return Ok(Some(token_type));
            }
        }
        Ok(None)
    }

    fn fault_to_error(&self, fault: LexicalFault, start: usize) -> TokenizerError {
        match fault {
            LexicalFault::UnterminatedString => TokenizerError::UnterminatedString {
                at: start.into(),
                source_code: self.source_code.clone(),
            },
            LexicalFault::InvalidNumber(literal) => TokenizerError::InvalidNumber {
                at: (start..start + literal.len()).into(),
                literal,
                source_code: self.source_code.clone(),
            },
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let start = self.lexer.offset();
            if self.lexer.is_at_end() {
                self.finished = true;
                return Some(Ok(Token::new(
                    SourceSpan::new(start.into(), 0),
                    TokenType::Eof,
                )));
            }
            match self.match_next() {
                Ok(Some(token_type)) if token_type.is_trivia() => continue,
                Ok(Some(token_type)) => {
                    let span = (start..self.lexer.offset()).into();
                    return Some(Ok(Token::new(span, token_type)));
                }
                Ok(None) => {
                    self.finished = true;
                    return Some(Err(TokenizerError::UnexpectedCharacter {
                        character: self.lexer.current().unwrap_or_default(),
                        at: start.into(),
                        source_code: self.source_code.clone(),
                    }));
                }
                Err(fault) => {
                    self.finished = true;
                    return Some(Err(self.fault_to_error(fault, start)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token_types(source: &str) -> Vec<TokenType> {
        Tokenizer::tokenize(SourceReference::new("test".into(), source.into()))
            .unwrap()
            .into_iter()
            .map(|token| token.token_type)
            .filter(|token_type| *token_type != TokenType::Eof)
            .collect()
    }

    #[test]
    fn float_literal_is_one_token() {
        assert_eq!(token_types("1.01"), vec![TokenType::Float(1.01)]);
    }

    #[test]
    fn keywords_need_a_delimiter() {
        use TokenType::*;
        assert_eq!(
            token_types("fun function = 1 print"),
            vec![Fun, Word("function".into()), Equal, Int(1), Print]
        );
    }

    #[test]
    fn mixed_symbols_and_keywords() {
        use TokenType::*;
        assert_eq!(
            token_types(r#"function void int "void int" {} ->*/test^void,5,6,7 8.0"#),
            vec![
                Word("function".into()),
                Void,
                IntType,
                QuotedString("void int".into()),
                OpenBrace,
                CloseBrace,
                Arrow,
                Star,
                Slash,
                Word("test".into()),
                Caret,
                Void,
                Comma,
                Int(5),
                Comma,
                Int(6),
                Comma,
                Int(7),
                Float(8.0),
            ]
        );
    }

    #[test]
    fn both_quote_styles_make_strings() {
        use TokenType::*;
        assert_eq!(
            token_types(r#"print 'single' + "double";"#),
            vec![
                Print,
                QuotedString("single".into()),
                Plus,
                QuotedString("double".into()),
                Semicolon
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        use TokenType::*;
        assert_eq!(
            token_types("x = 1; // trailing words\ny != 2"),
            vec![
                Word("x".into()),
                Equal,
                Int(1),
                Semicolon,
                Word("y".into()),
                BangEqual,
                Int(2)
            ]
        );
    }

    #[test]
    fn dangling_special_character_is_an_error() {
        let result = Tokenizer::tokenize(SourceReference::new("test".into(), "x = !y;".into()));
        assert!(matches!(
            result,
            Err(TokenizerError::UnexpectedCharacter { character: '!', .. })
        ));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let result = Tokenizer::tokenize(SourceReference::new("test".into(), "print 'oops".into()));
        assert!(matches!(result, Err(TokenizerError::UnterminatedString { .. })));
    }

    #[test]
    fn restart_yields_the_same_tokens() {
        let mut tokenizer = Tokenizer::new(SourceReference::new("test".into(), "int x;".into()));
        let first = tokenizer.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
        tokenizer.restart();
        let second = tokenizer.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.last().map(Token::name), Some(TokenTypeName::Eof));
    }
}
