use miette::Diagnostic;
use std::rc::Rc;
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    ast::*,
    side_table::UniqueIdGenerator,
    source::SourceSpan,
    token_stream::TokenStream,
    tokenizer::{Token, TokenType, TokenTypeName},
    SourceReference,
};

#[derive(Error, Diagnostic, Debug, IntoStaticStr)]
pub enum ParserError {
    #[error("Unexpected token")]
    UnexpectedToken {
        expected: TokenTypeName,
        actual: TokenTypeName,
        #[label("Found {actual:?} instead of {expected:?}")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Unknown expression type")]
    UnknownExpression {
        actual: TokenTypeName,
        #[label("No expression starts with {actual:?}")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Expected an operator")]
    ExpectedOperator {
        actual: TokenTypeName,
        #[label("Found {actual:?} instead of an operator")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("A for loop needs a setup, a predicate and an update, but found {actual} parts")]
    ForLoopArity {
        actual: usize,
        #[label("In this for loop header")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
}

impl ParserError {
    pub fn found_at(&self) -> SourceSpan {
        match self {
            Self::UnexpectedToken { found_at, .. }
            | Self::UnknownExpression { found_at, .. }
            | Self::ExpectedOperator { found_at, .. }
            | Self::ForLoopArity { found_at, .. } => *found_at,
        }
    }
}

/// Grammar rules whose successful results are memoized by the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Class,
    MethodDecl,
    TryCatch,
    Lambda,
    VarDeclAssign,
    VarDecl,
    If,
    While,
    For,
    Return,
    Print,
    New,
    FinalOperation,
    Final,
    GroupOperation,
    Group,
    ClassRef,
    FunctionCall,
}

type ParseResult = Result<Option<Ast>, ParserError>;
type RuleFn = fn(&mut Parser) -> ParseResult;

/// Backtracking recursive descent parser.
///
/// Alternatives are tried in order inside token stream snapshots; a failed
/// alternative rolls the stream back and swallows its error. The error that
/// got furthest into the input is kept so a final failure can point at the
/// real problem rather than at the start of the statement.
pub struct Parser {
    tokens: TokenStream,
    ids: UniqueIdGenerator,
    lambda_count: usize,
    furthest_error: Option<ParserError>,
}

impl Parser {
    pub fn parse(tokens: Vec<Token>, source_reference: SourceReference) -> Result<Program, ParserError> {
        let mut parser = Parser {
            tokens: TokenStream::new(tokens, source_reference.clone()),
            ids: UniqueIdGenerator::new(),
            lambda_count: 0,
            furthest_error: None,
        };
        let result = parser.parse_program();
        let root = result.map_err(|err| parser.most_relevant(err))?;
        tracing::debug!(nodes = parser.ids.issued(), "parsed program");
        Ok(Program {
            root,
            source_reference,
            node_ids: parser.ids,
        })
    }

    fn parse_program(&mut self) -> Result<Ast, ParserError> {
        let first = self.tokens.current().clone();
        let mut statements = Vec::new();
        while !self.tokens.is_at_end() {
            let statement = match self.scope_block()? {
                Some(block) => block,
                None => self.statement()?,
            };
            self.skip_semicolon();
            statements.push(statement);
        }
        let span = SourceSpan::range(
            0.into(),
            self.tokens.source_code().source().len().into(),
        );
        Ok(Ast::new(
            self.ids.next_id(),
            first,
            span,
            AstKind::Scope(ScopeBlock { statements }),
        ))
    }

    fn most_relevant(&mut self, err: ParserError) -> ParserError {
        match self.furthest_error.take() {
            Some(furthest) if furthest.found_at().end() > err.found_at().end() => furthest,
            _ => err,
        }
    }

    fn note_error(&mut self, err: ParserError) {
        let is_further = self
            .furthest_error
            .as_ref()
            .map_or(true, |furthest| err.found_at().end() >= furthest.found_at().end());
        if is_further {
            self.furthest_error = Some(err);
        }
    }

    /// Tries `parse` as an alternative: on success the tokens stay consumed and
    /// the result is memoized, otherwise the stream is rolled back.
    fn capture(&mut self, rule: Rule, parse: RuleFn) -> Option<Ast> {
        if let Some(ast) = self.tokens.recall(rule) {
            return Some(ast);
        }
        let start = self.tokens.position();
        self.tokens.take_snapshot();
        match parse(self) {
            Ok(Some(ast)) => {
                self.tokens.commit_snapshot();
                self.tokens.remember(start, rule, &ast);
                Some(ast)
            }
            Ok(None) => {
                self.tokens.rollback_snapshot();
                None
            }
            Err(err) => {
                self.tokens.rollback_snapshot();
                self.note_error(err);
                None
            }
        }
    }

    fn node(&mut self, token: Token, start: SourceSpan, kind: AstKind) -> Ast {
        let span = self.tokens.span_from(start);
        Ast::new(self.ids.next_id(), token, span, kind)
    }

    fn skip_semicolon(&mut self) {
        if self.tokens.is_match(TokenTypeName::Semicolon) {
            self.tokens.advance();
        }
    }

    fn statement(&mut self) -> Result<Ast, ParserError> {
        let declarations: [(Rule, RuleFn); 3] = [
            (Rule::Class, Self::class),
            (Rule::MethodDecl, Self::method_declaration),
            (Rule::TryCatch, Self::try_catch),
        ];
        for (rule, parse) in declarations {
            if let Some(ast) = self.capture(rule, parse) {
                return Ok(ast);
            }
        }
        self.expression()
    }

    fn expression(&mut self) -> Result<Ast, ParserError> {
        if let Some(block) = self.scope_block()? {
            return Ok(block);
        }
        // order is precedence
        let alternatives: [(Rule, RuleFn); 9] = [
            (Rule::Lambda, Self::lambda),
            (Rule::VarDeclAssign, Self::var_declaration_assignment),
            (Rule::VarDecl, Self::var_declaration),
            (Rule::If, Self::if_statement),
            (Rule::While, Self::while_statement),
            (Rule::For, Self::for_statement),
            (Rule::Return, Self::return_statement),
            (Rule::Print, Self::print_statement),
            (Rule::New, Self::new_instance),
        ];
        for (rule, parse) in alternatives {
            if let Some(ast) = self.capture(rule, parse) {
                return Ok(ast);
            }
        }
        if let Some(ast) = self.operation()? {
            return Ok(ast);
        }
        let current = self.tokens.current();
        Err(ParserError::UnknownExpression {
            actual: current.name(),
            found_at: current.span,
            source_code: self.tokens.source_code().clone(),
        })
    }

    fn scope_block(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::OpenBrace) {
            return Ok(None);
        }
        self.block().map(Some)
    }

    fn block(&mut self) -> Result<Ast, ParserError> {
        let open = self.tokens.take(TokenTypeName::OpenBrace)?;
        let mut statements = Vec::new();
        while !self.tokens.is_match(TokenTypeName::CloseBrace) {
            if self.tokens.is_at_end() {
                self.tokens.take(TokenTypeName::CloseBrace)?;
            }
            let statement = self.statement()?;
            if statement.expects_semicolon() {
                self.tokens.take(TokenTypeName::Semicolon)?;
            } else {
                self.skip_semicolon();
            }
            statements.push(statement);
        }
        self.tokens.take(TokenTypeName::CloseBrace)?;
        let start = open.span;
        Ok(self.node(open, start, AstKind::Scope(ScopeBlock { statements })))
    }

    fn class(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Class) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let name = self.identifier()?;
        let body = Box::new(self.block()?);
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::Class(Rc::new(ClassDecl { name, body })),
        )))
    }

    fn method_declaration(&mut self) -> ParseResult {
        if !self.is_type_token() {
            return Ok(None);
        }
        let return_type = self.tokens.advance();
        let name = self.identifier()?;
        let parameters = self.argument_list(true)?;
        let body = Box::new(self.block()?);
        let start = return_type.span;
        Ok(Some(self.node(
            return_type.clone(),
            start,
            AstKind::MethodDecl(Rc::new(MethodDecl {
                name,
                return_type: Some(return_type),
                parameters,
                body,
                kind: MethodKind::Named,
            })),
        )))
    }

    fn lambda(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Fun) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let parameters = self.argument_list(true)?;
        self.tokens.take(TokenTypeName::Arrow)?;
        let body = Box::new(self.block()?);
        self.lambda_count += 1;
        let name = Identifier {
            name: format!("anonymous{}", self.lambda_count),
            source_span: token.span,
        };
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::MethodDecl(Rc::new(MethodDecl {
                name,
                return_type: None,
                parameters,
                body,
                kind: MethodKind::Lambda,
            })),
        )))
    }

    fn try_catch(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Try) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let try_body = Box::new(self.block()?);
        self.tokens.take(TokenTypeName::Catch)?;
        let catch_body = Box::new(self.block()?);
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::TryCatch(TryCatch {
                try_body,
                catch_body,
            }),
        )))
    }

    /// `(a, b; c)`: typed parameter declarations or call arguments.
    fn argument_list(&mut self, typed: bool) -> Result<Vec<Ast>, ParserError> {
        self.tokens.take(TokenTypeName::OpenParen)?;
        let mut arguments = Vec::new();
        while !self.tokens.is_match(TokenTypeName::CloseParen) {
            let argument = if typed {
                self.parameter()?
            } else {
                self.expression()?
            };
            arguments.push(argument);
            if self.tokens.is_match(TokenTypeName::Comma)
                || self.tokens.is_match(TokenTypeName::Semicolon)
            {
                self.tokens.advance();
            }
        }
        self.tokens.take(TokenTypeName::CloseParen)?;
        Ok(arguments)
    }

    fn parameter(&mut self) -> Result<Ast, ParserError> {
        match self.var_declaration()? {
            Some(parameter) => Ok(parameter),
            None => {
                let current = self.tokens.current();
                Err(ParserError::UnexpectedToken {
                    expected: TokenTypeName::Word,
                    actual: current.name(),
                    found_at: current.span,
                    source_code: self.tokens.source_code().clone(),
                })
            }
        }
    }

    fn var_declaration_assignment(&mut self) -> ParseResult {
        if !self.starts_declaration() {
            return Ok(None);
        }
        let decl_type = self.tokens.advance();
        let name = self.identifier()?;
        self.tokens.take(TokenTypeName::Equal)?;
        let value = if self.tokens.is_match(TokenTypeName::Ampersand) {
            let ampersand = self.tokens.advance();
            let target = self.identifier()?;
            let start = ampersand.span;
            self.node(ampersand, start, AstKind::Expr(Expr::Link(target.name)))
        } else {
            self.expression()?
        };
        let start = decl_type.span;
        Ok(Some(self.node(
            decl_type.clone(),
            start,
            AstKind::VarDecl(VarDecl {
                decl_type,
                name,
                value: Some(Box::new(value)),
            }),
        )))
    }

    fn var_declaration(&mut self) -> ParseResult {
        if !self.starts_declaration() {
            return Ok(None);
        }
        let decl_type = self.tokens.advance();
        let name = self.identifier()?;
        let start = decl_type.span;
        Ok(Some(self.node(
            decl_type.clone(),
            start,
            AstKind::VarDecl(VarDecl {
                decl_type,
                name,
                value: None,
            }),
        )))
    }

    fn if_statement(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::If) {
            return Ok(None);
        }
        self.conditional().map(Some)
    }

    fn conditional(&mut self) -> Result<Ast, ParserError> {
        let token = self.tokens.take(TokenTypeName::If)?;
        let (predicate, body) = self.predicate_and_block()?;
        let alternate = if !self.tokens.is_match(TokenTypeName::Else) {
            None
        } else if self.tokens.peek(1).name() == TokenTypeName::If {
            self.tokens.advance();
            Some(Box::new(self.conditional()?))
        } else {
            let else_token = self.tokens.advance();
            let body = Box::new(self.block()?);
            let start = else_token.span;
            Some(Box::new(self.node(
                else_token,
                start,
                AstKind::Conditional(Conditional {
                    predicate: None,
                    body,
                    alternate: None,
                }),
            )))
        };
        let start = token.span;
        Ok(self.node(
            token,
            start,
            AstKind::Conditional(Conditional {
                predicate: Some(predicate),
                body,
                alternate,
            }),
        ))
    }

    fn while_statement(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::While) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let (predicate, body) = self.predicate_and_block()?;
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::While(WhileLoop { predicate, body }),
        )))
    }

    fn predicate_and_block(&mut self) -> Result<(Box<Ast>, Box<Ast>), ParserError> {
        self.tokens.take(TokenTypeName::OpenParen)?;
        let predicate = self.expression()?;
        self.tokens.take(TokenTypeName::CloseParen)?;
        let body = self.block()?;
        Ok((Box::new(predicate), Box::new(body)))
    }

    fn for_statement(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::For) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let header_start = self.tokens.current().span;
        let header = self.argument_list(false)?;
        let header_span = self.tokens.span_from(header_start);
        let [setup, predicate, update]: [Ast; 3] =
            header
                .try_into()
                .map_err(|header: Vec<Ast>| ParserError::ForLoopArity {
                    actual: header.len(),
                    found_at: header_span,
                    source_code: self.tokens.source_code().clone(),
                })?;
        let body = Box::new(self.block()?);
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::For(ForLoop {
                setup: Box::new(setup),
                predicate: Box::new(predicate),
                update: Box::new(update),
                body,
            }),
        )))
    }

    fn return_statement(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Return) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let value = if self.tokens.is_match(TokenTypeName::Semicolon)
            || self.tokens.is_match(TokenTypeName::CloseBrace)
        {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        let start = token.span;
        Ok(Some(self.node(token, start, AstKind::Return(value))))
    }

    fn print_statement(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Print) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let value = Box::new(self.expression()?);
        let start = token.span;
        Ok(Some(self.node(token, start, AstKind::Print(value))))
    }

    fn new_instance(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::New) {
            return Ok(None);
        }
        let token = self.tokens.advance();
        let class_name = self.identifier()?;
        let arguments = self.argument_list(false)?;
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::New(NewInstance {
                class_name,
                arguments,
            }),
        )))
    }

    /// Right associative `operand operator expression` chains, without
    /// operator precedence.
    fn operation(&mut self) -> ParseResult {
        if self.is_operand() {
            if let Some(ast) = self.capture(Rule::FinalOperation, Self::final_operation) {
                return Ok(Some(ast));
            }
            return Ok(self.capture(Rule::Final, Self::final_expression));
        }
        if self.tokens.is_match(TokenTypeName::OpenParen) {
            if let Some(ast) = self.capture(Rule::GroupOperation, Self::group_operation) {
                return Ok(Some(ast));
            }
            return Ok(self.capture(Rule::Group, Self::group));
        }
        Ok(None)
    }

    fn final_operation(&mut self) -> ParseResult {
        match self.capture(Rule::Final, Self::final_expression) {
            Some(left) => self.binary(left).map(Some),
            None => Ok(None),
        }
    }

    fn group_operation(&mut self) -> ParseResult {
        match self.capture(Rule::Group, Self::group) {
            Some(left) => self.binary(left).map(Some),
            None => Ok(None),
        }
    }

    fn group(&mut self) -> ParseResult {
        self.tokens.take(TokenTypeName::OpenParen)?;
        let inner = self.expression()?;
        self.tokens.take(TokenTypeName::CloseParen)?;
        Ok(Some(inner))
    }

    fn binary(&mut self, left: Ast) -> Result<Ast, ParserError> {
        let operator_token = self.tokens.current().clone();
        let operator = self.operator()?;
        self.tokens.advance();
        let right = self.expression()?;
        let start = left.source_span;
        Ok(self.node(
            operator_token,
            start,
            AstKind::Expr(Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            }),
        ))
    }

    fn final_expression(&mut self) -> ParseResult {
        if let Some(reference) = self.capture(Rule::ClassRef, Self::class_reference) {
            return Ok(Some(reference));
        }
        if let Some(call) = self.capture(Rule::FunctionCall, Self::function_call) {
            return Ok(Some(call));
        }
        Ok(self.single_token())
    }

    fn class_reference(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Word) {
            return Ok(None);
        }
        let root = self.tokens.advance();
        let instance = Box::new(self.word(root));
        let mut dereferences = Vec::new();
        while self.tokens.is_match(TokenTypeName::Dot) {
            self.tokens.advance();
            let dereference = match self.capture(Rule::FunctionCall, Self::function_call) {
                Some(call) => call,
                None => {
                    let field = self.tokens.take(TokenTypeName::Word)?;
                    self.word(field)
                }
            };
            dereferences.push(dereference);
        }
        if dereferences.is_empty() {
            return Ok(None);
        }
        let token = instance.token.clone();
        let start = instance.source_span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::ClassRef(ClassRef {
                instance,
                dereferences,
            }),
        )))
    }

    fn function_call(&mut self) -> ParseResult {
        if !self.tokens.is_match(TokenTypeName::Word)
            || self.tokens.peek(1).name() != TokenTypeName::OpenParen
        {
            return Ok(None);
        }
        let name = self.identifier()?;
        let token = self.tokens.previous().clone();
        let arguments = self.argument_list(false)?;
        let start = token.span;
        Ok(Some(self.node(
            token,
            start,
            AstKind::Invoke(FunctionInvoke { name, arguments }),
        )))
    }

    fn single_token(&mut self) -> Option<Ast> {
        let literal = match &self.tokens.current().token_type {
            TokenType::Int(value) => Expr::Literal(Literal::Int(*value)),
            TokenType::Float(value) => Expr::Literal(Literal::Float(*value)),
            TokenType::QuotedString(text) => Expr::Literal(Literal::Str(text.clone())),
            TokenType::True => Expr::Literal(Literal::Bool(true)),
            TokenType::False => Expr::Literal(Literal::Bool(false)),
            TokenType::Nil => Expr::Literal(Literal::Nil),
            TokenType::Word(name) => Expr::Identifier(name.clone()),
            _ => return None,
        };
        let token = self.tokens.advance();
        let start = token.span;
        Some(self.node(token, start, AstKind::Expr(literal)))
    }

    fn word(&mut self, token: Token) -> Ast {
        let name = token.literal_text().unwrap_or_default();
        let start = token.span;
        self.node(token, start, AstKind::Expr(Expr::Identifier(name)))
    }

    fn identifier(&mut self) -> Result<Identifier, ParserError> {
        let token = self.tokens.take(TokenTypeName::Word)?;
        Ok(Identifier {
            name: token.literal_text().unwrap_or_default(),
            source_span: token.span,
        })
    }

    fn operator(&self) -> Result<BinaryOperator, ParserError> {
        let current = self.tokens.current();
        Ok(match current.token_type {
            TokenType::Equal => BinaryOperator::Assign,
            TokenType::Plus => BinaryOperator::Plus,
            TokenType::Minus => BinaryOperator::Minus,
            TokenType::Star => BinaryOperator::Multiply,
            TokenType::Slash => BinaryOperator::Divide,
            TokenType::Caret => BinaryOperator::Xor,
            TokenType::Greater => BinaryOperator::Greater,
            TokenType::Less => BinaryOperator::Less,
            TokenType::EqualEqual => BinaryOperator::EqualTo,
            TokenType::BangEqual => BinaryOperator::NotEqualTo,
            TokenType::Ampersand => BinaryOperator::And,
            TokenType::Pipe => BinaryOperator::Or,
            TokenType::PipePipe => BinaryOperator::OrElse,
            _ => {
                return Err(ParserError::ExpectedOperator {
                    actual: current.name(),
                    found_at: current.span,
                    source_code: self.tokens.source_code().clone(),
                })
            }
        })
    }

    fn is_type_token(&self) -> bool {
        matches!(
            self.tokens.current().name(),
            TokenTypeName::Void
                | TokenTypeName::IntType
                | TokenTypeName::FloatType
                | TokenTypeName::StringType
                | TokenTypeName::BoolType
                | TokenTypeName::Var
                | TokenTypeName::Method
                | TokenTypeName::Word
        )
    }

    fn starts_declaration(&self) -> bool {
        self.is_type_token() && self.tokens.peek(1).name() == TokenTypeName::Word
    }

    fn is_operand(&self) -> bool {
        matches!(
            self.tokens.current().name(),
            TokenTypeName::Int
                | TokenTypeName::Float
                | TokenTypeName::QuotedString
                | TokenTypeName::Word
                | TokenTypeName::True
                | TokenTypeName::False
                | TokenTypeName::Nil
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Program, ParserError> {
        let source_reference = SourceReference::new("test".into(), source.into());
        let tokens = Tokenizer::tokenize(source_reference.clone()).unwrap();
        Parser::parse(tokens, source_reference)
    }

    fn render(source: &str) -> Vec<String> {
        parse(source)
            .unwrap()
            .statements()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn assignment_of_a_sum() {
        let program = parse("x = 1 + 2;").unwrap();
        let statement = &program.statements()[0];
        match &statement.kind {
            AstKind::Expr(Expr::Binary {
                left,
                operator: BinaryOperator::Assign,
                right,
            }) => {
                assert!(matches!(&left.kind, AstKind::Expr(Expr::Identifier(name)) if name == "x"));
                assert_eq!(right.token.token_type, TokenType::Plus);
                assert_eq!(right.to_string(), "(+ 1 2)");
            }
            other => panic!("expected an assignment, got {:?}", other),
        }
    }

    #[test]
    fn operators_group_to_the_right() {
        assert_eq!(
            render("(3 + ((1 + 2) + 1)); x = 1 + 2 ^ (5-7);"),
            vec!["(+ 3 (+ (+ 1 2) 1))", "(= x (+ 1 (^ 2 (- 5 7))))"]
        );
    }

    #[test]
    fn top_level_blocks_and_declarations() {
        let program = parse(
            "int z = 1;
             {
                 int y = 5 + 4;
             }
             x = 1 + 2 ^ (5-7);",
        )
        .unwrap();
        let statements = program.statements();
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0].kind, AstKind::VarDecl(_)));
        assert!(matches!(statements[1].kind, AstKind::Scope(_)));
        assert!(matches!(statements[2].kind, AstKind::Expr(_)));
    }

    #[test]
    fn stray_brace_reports_the_missing_semicolon() {
        let err = parse(
            "int z = 1;
             {
                 int y = 5 + 4{;
             }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParserError::UnexpectedToken {
                expected: TokenTypeName::Semicolon,
                actual: TokenTypeName::OpenBrace,
                ..
            }
        ));
    }

    #[test]
    fn methods_lambdas_and_nested_control_flow() {
        let program = parse(
            r#"void foo(int x, int y){
                   int x = 1;
                   var z = fun() -> {
                       zinger = "your mom!";
                       someThing(a + b) + 25 - ("test" + 5);
                   };
               }

               z = 3;

               int testFunction(){
                   var p = 23;
                   if(foo){
                       var x = 1;
                   }
                   else if(faa){
                       var y = 2;
                   }
                   else{
                       while(1 + 1){
                           var x = fun () ->{
                               test = 0;
                           };
                       }
                       for(int i = 0; i < 10; i = i + 1){
                           var x = z;
                       }
                   }
               }"#,
        )
        .unwrap();
        let statements = program.statements();
        assert_eq!(statements.len(), 3);
        assert!(matches!(&statements[0].kind, AstKind::MethodDecl(method) if method.arity() == 2));
        assert!(matches!(statements[1].kind, AstKind::Expr(_)));
        assert!(matches!(&statements[2].kind, AstKind::MethodDecl(method) if method.name.name == "testFunction"));
    }

    #[test]
    fn else_if_chains_nest_in_the_alternate() {
        let program = parse(
            "if(foo){
                 var x = 1;
             }
             else if(faa){
                 var y = 2;
                 var z = 3;
             }
             else{
             }",
        )
        .unwrap();
        let conditional = match &program.statements()[0].kind {
            AstKind::Conditional(conditional) => conditional,
            other => panic!("expected a conditional, got {:?}", other),
        };
        assert_eq!(conditional.predicate.as_ref().unwrap().to_string(), "foo");
        let alternate = match &conditional.alternate.as_ref().unwrap().kind {
            AstKind::Conditional(alternate) => alternate,
            other => panic!("expected a conditional, got {:?}", other),
        };
        assert_eq!(alternate.body.as_scope().unwrap().statements.len(), 2);
        assert!(alternate.alternate.is_some());
    }

    #[test]
    fn while_body_holds_a_lambda_declaration() {
        let program = parse(
            "while(1 + 1){
                 var x = fun () ->{
                     test = 0;
                 };
             }",
        )
        .unwrap();
        match &program.statements()[0].kind {
            AstKind::While(stmt) => {
                assert_eq!(stmt.predicate.token.token_type, TokenType::Plus);
                let body = stmt.body.as_scope().unwrap();
                assert_eq!(body.statements.len(), 1);
                assert!(matches!(
                    &body.statements[0].kind,
                    AstKind::VarDecl(VarDecl { value: Some(value), .. }) if value.as_method().is_some()
                ));
            }
            other => panic!("expected a while loop, got {:?}", other),
        }
    }

    #[test]
    fn for_loop_header_has_three_parts() {
        let program = parse("for(int i = 0; i < 10; i = i + 1){ var x = z; }").unwrap();
        match &program.statements()[0].kind {
            AstKind::For(stmt) => {
                assert!(matches!(stmt.setup.kind, AstKind::VarDecl(_)));
                assert_eq!(stmt.predicate.token.token_type, TokenType::Less);
                assert_eq!(stmt.body.as_scope().unwrap().statements.len(), 1);
            }
            other => panic!("expected a for loop, got {:?}", other),
        }
        assert!(matches!(
            parse("for(int i = 0; i < 10){ }"),
            Err(ParserError::ForLoopArity { actual: 2, .. })
        ));
    }

    #[test]
    fn dangling_else_is_rejected() {
        assert!(matches!(
            parse("else(foo){ var x = 1; }"),
            Err(ParserError::UnknownExpression {
                actual: TokenTypeName::Else,
                ..
            })
        ));
    }

    #[test]
    fn classes_links_and_references() {
        assert_eq!(
            render(
                "class anton{ int x = 1; void foo(){ print x; } }
                 anton a = new anton();
                 int y = &x;
                 a.b.c(1, 2) = nil;
                 try { print a.x; } catch { print 'oops'; }"
            ),
            vec![
                "(class anton (do (var int x 1) (fun void foo () (do (print x)))))",
                "(var anton a (new anton ()))",
                "(var int y &x)",
                "(= (. a b (call c (1 2))) nil)",
                "(try (do (print (. a x))) (do (print \"oops\")))",
            ]
        );
    }

    #[test]
    fn lambdas_get_sequential_names() {
        let program = parse("var a = fun() -> { }; var b = fun(int x) -> { return x; };").unwrap();
        let names: Vec<_> = program
            .statements()
            .iter()
            .filter_map(|statement| match &statement.kind {
                AstKind::VarDecl(VarDecl { value: Some(value), .. }) => {
                    value.as_method().map(|method| method.name.name.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["anonymous1", "anonymous2"]);
    }
}
