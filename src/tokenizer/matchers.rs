use super::TokenType;
use crate::lexer::Lexer;

/// A matcher recognised the start of its token but the rest is malformed.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum LexicalFault {
    UnterminatedString,
    InvalidNumber(String),
}

pub(super) trait Matcher {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault>;

    /// Runs the matcher inside a snapshot so a failed attempt leaves the
    /// cursor where it was.
    fn try_match(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        lexer.take_snapshot();
        match self.match_token(lexer) {
            Ok(Some(token_type)) => {
                lexer.commit_snapshot();
                Ok(Some(token_type))
            }
            other => {
                lexer.rollback_snapshot();
                other
            }
        }
    }
}

const SPECIAL_STARTS: &[char] = &[
    '-', '=', '!', '|', '{', '}', '(', ')', ';', ',', '.', '+', '*', '/', '^', '>', '<', '&',
];

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || SPECIAL_STARTS.contains(&ch) || is_quote(ch)
}

struct LineComment;

impl Matcher for LineComment {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        if lexer.current() != Some('/') || lexer.peek(1) != Some('/') {
            return Ok(None);
        }
        lexer.advance_while(|ch| ch != '\n');
        Ok(Some(TokenType::LineComment))
    }
}

struct QuotedString {
    quote: char,
}

impl Matcher for QuotedString {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        if lexer.current() != Some(self.quote) {
            return Ok(None);
        }
        lexer.advance();
        let mut text = String::new();
        loop {
            match lexer.advance() {
                Some(ch) if ch == self.quote => return Ok(Some(TokenType::QuotedString(text))),
                Some(ch) => text.push(ch),
                None => return Err(LexicalFault::UnterminatedString),
            }
        }
    }
}

/// Exact lexeme match; longer symbols must be registered before their prefixes.
struct Symbol {
    lexeme: &'static str,
    token_type: TokenType,
}

impl Symbol {
    fn consume(&self, lexer: &mut Lexer) -> bool {
        for (distance, expected) in self.lexeme.chars().enumerate() {
            if lexer.peek(distance) != Some(expected) {
                return false;
            }
        }
        for _ in self.lexeme.chars() {
            lexer.advance();
        }
        true
    }
}

impl Matcher for Symbol {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        Ok(self.consume(lexer).then(|| self.token_type.clone()))
    }
}

/// A symbol that must be followed by a delimiter, so `function` stays a word.
struct Keyword(Symbol);

impl Matcher for Keyword {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        if !self.0.consume(lexer) {
            return Ok(None);
        }
        match lexer.current() {
            None => Ok(Some(self.0.token_type.clone())),
            Some(ch) if is_delimiter(ch) => Ok(Some(self.0.token_type.clone())),
            Some(_) => Ok(None),
        }
    }
}

struct WhiteSpace;

impl Matcher for WhiteSpace {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        Ok((lexer.advance_while(char::is_whitespace) > 0).then(|| TokenType::WhiteSpace))
    }
}

struct Number;

impl Matcher for Number {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        let mut literal = String::new();
        while let Some(ch) = lexer.current().filter(char::is_ascii_digit) {
            literal.push(ch);
            lexer.advance();
        }
        if literal.is_empty() {
            return Ok(None);
        }

        let fractional = lexer.current() == Some('.')
            && lexer.peek(1).map_or(false, |ch| ch.is_ascii_digit());
        if !fractional {
            return literal
                .parse::<i64>()
                .map(|value| Some(TokenType::Int(value)))
                .map_err(|_| LexicalFault::InvalidNumber(literal));
        }

        literal.push('.');
        lexer.advance();
        while let Some(ch) = lexer.current().filter(char::is_ascii_digit) {
            literal.push(ch);
            lexer.advance();
        }
        literal
            .parse::<f64>()
            .map(|value| Some(TokenType::Float(value)))
            .map_err(|_| LexicalFault::InvalidNumber(literal))
    }
}

struct Word;

impl Matcher for Word {
    fn match_token(&self, lexer: &mut Lexer) -> Result<Option<TokenType>, LexicalFault> {
        let mut text = String::new();
        while let Some(ch) = lexer.current().filter(|ch| !is_delimiter(*ch)) {
            text.push(ch);
            lexer.advance();
        }
        Ok((!text.is_empty()).then(|| TokenType::Word(text)))
    }
}

fn symbol(lexeme: &'static str, token_type: TokenType) -> Box<dyn Matcher> {
    Box::new(Symbol { lexeme, token_type })
}

fn keyword(lexeme: &'static str, token_type: TokenType) -> Box<dyn Matcher> {
    Box::new(Keyword(Symbol { lexeme, token_type }))
}

/// The matcher order is the token precedence.
pub(super) fn ordered_matchers() -> Vec<Box<dyn Matcher>> {
    vec![
        Box::new(LineComment),
        Box::new(QuotedString { quote: '"' }),
        Box::new(QuotedString { quote: '\'' }),
        symbol("->", TokenType::Arrow),
        symbol("==", TokenType::EqualEqual),
        symbol("!=", TokenType::BangEqual),
        symbol("||", TokenType::PipePipe),
        symbol("{", TokenType::OpenBrace),
        symbol("}", TokenType::CloseBrace),
        symbol("(", TokenType::OpenParen),
        symbol(")", TokenType::CloseParen),
        symbol(";", TokenType::Semicolon),
        symbol(",", TokenType::Comma),
        symbol(".", TokenType::Dot),
        symbol("+", TokenType::Plus),
        symbol("-", TokenType::Minus),
        symbol("*", TokenType::Star),
        symbol("/", TokenType::Slash),
        symbol("^", TokenType::Caret),
        symbol("=", TokenType::Equal),
        symbol(">", TokenType::Greater),
        symbol("<", TokenType::Less),
        symbol("&", TokenType::Ampersand),
        symbol("|", TokenType::Pipe),
        keyword("fun", TokenType::Fun),
        keyword("var", TokenType::Var),
        keyword("if", TokenType::If),
        keyword("else", TokenType::Else),
        keyword("while", TokenType::While),
        keyword("for", TokenType::For),
        keyword("return", TokenType::Return),
        keyword("print", TokenType::Print),
        keyword("class", TokenType::Class),
        keyword("new", TokenType::New),
        keyword("try", TokenType::Try),
        keyword("catch", TokenType::Catch),
        keyword("method", TokenType::Method),
        keyword("string", TokenType::StringType),
        keyword("bool", TokenType::BoolType),
        keyword("int", TokenType::IntType),
        keyword("float", TokenType::FloatType),
        keyword("void", TokenType::Void),
        keyword("true", TokenType::True),
        keyword("false", TokenType::False),
        keyword("nil", TokenType::Nil),
        Box::new(WhiteSpace),
        Box::new(Number),
        Box::new(Word),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyword_rolls_back_without_delimiter() {
        let mut lexer = Lexer::new("printer");
        let matcher = keyword("print", TokenType::Print);
        assert_eq!(matcher.try_match(&mut lexer), Ok(None));
        assert_eq!(lexer.offset(), 0);
    }

    #[test]
    fn ordered_matchers_cover_comments_strings_and_words() {
        let mut lexer = Lexer::new("// note\n'hi' name");
        let matchers = ordered_matchers();
        let mut found = Vec::new();
        while !lexer.is_at_end() {
            let token_type = matchers
                .iter()
                .find_map(|matcher| matcher.try_match(&mut lexer).unwrap())
                .unwrap();
            found.push(token_type);
        }
        assert_eq!(
            found,
            vec![
                TokenType::LineComment,
                TokenType::WhiteSpace,
                TokenType::QuotedString("hi".into()),
                TokenType::WhiteSpace,
                TokenType::Word("name".into()),
            ]
        );
    }

    #[test]
    fn number_without_fraction_digits_stops_at_dot() {
        let mut lexer = Lexer::new("12.x");
        assert_eq!(Number.try_match(&mut lexer), Ok(Some(TokenType::Int(12))));
        assert_eq!(lexer.current(), Some('.'));
    }

    #[test]
    fn oversized_integer_is_a_fault() {
        let mut lexer = Lexer::new("99999999999999999999");
        assert_eq!(
            Number.try_match(&mut lexer),
            Err(LexicalFault::InvalidNumber("99999999999999999999".into()))
        );
    }
}
