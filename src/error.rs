use miette::Diagnostic;
use thiserror::Error;

use crate::{
    parser::ParserError, resolver::ResolverError, source::SourceSpan,
    tokenizer::TokenizerError, tree_walk_interpreter::RuntimeError, SourceReference,
};

/// Broad classes of failure, independent of the stage that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidSyntax,
    UndefinedElement,
    RuntimeFault,
}

#[derive(Error, Diagnostic, Debug)]
pub enum LangError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolver(#[from] ResolverError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LangError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LangError::Tokenizer(_) | LangError::Parser(_) => ErrorCategory::InvalidSyntax,
            LangError::Resolver(err) => match err {
                ResolverError::UndefinedElement { .. } => ErrorCategory::UndefinedElement,
                _ => ErrorCategory::InvalidSyntax,
            },
            LangError::Runtime(err) => match err {
                RuntimeError::UnexpectedCallArity { .. }
                | RuntimeError::ArgumentTypeMismatch { .. }
                | RuntimeError::InvalidAssignmentTarget { .. } => ErrorCategory::InvalidSyntax,
                RuntimeError::UndefinedVariable { .. } | RuntimeError::UnknownField { .. } => {
                    ErrorCategory::UndefinedElement
                }
                _ => ErrorCategory::RuntimeFault,
            },
        }
    }

    /// Whether the program failed before it started running.
    pub fn is_static(&self) -> bool {
        !matches!(self, LangError::Runtime(_))
    }

    pub fn stage(&self) -> &'static str {
        match self {
            LangError::Tokenizer(_) => "TokenizerError",
            LangError::Parser(_) => "ParserError",
            LangError::Resolver(_) => "ResolverError",
            LangError::Runtime(_) => "RuntimeError",
        }
    }

    /// Variant name of the wrapped error.
    pub fn kind(&self) -> &'static str {
        match self {
            LangError::Tokenizer(err) => err.into(),
            LangError::Parser(err) => err.into(),
            LangError::Resolver(err) => err.into(),
            LangError::Runtime(err) => err.into(),
        }
    }

    pub fn found_at(&self) -> Option<SourceSpan> {
        match self {
            LangError::Tokenizer(err) => Some(err.found_at()),
            LangError::Parser(err) => Some(err.found_at()),
            LangError::Resolver(err) => Some(err.found_at()),
            LangError::Runtime(err) => err.found_at(),
        }
    }

    /// What the error is about: a symbol name, or the offending token kind.
    pub fn subject(&self) -> Option<String> {
        match self {
            LangError::Tokenizer(TokenizerError::UnexpectedCharacter { character, .. }) => {
                Some(format!("{:?}", character))
            }
            LangError::Tokenizer(TokenizerError::InvalidNumber { literal, .. }) => {
                Some(literal.clone())
            }
            LangError::Tokenizer(_) => None,
            LangError::Parser(
                ParserError::UnexpectedToken { actual, .. }
                | ParserError::UnknownExpression { actual, .. }
                | ParserError::ExpectedOperator { actual, .. },
            ) => Some(format!("{:?}", actual)),
            LangError::Parser(ParserError::ForLoopArity { actual, .. }) => {
                Some(actual.to_string())
            }
            LangError::Resolver(err) => err.name().map(str::to_string),
            LangError::Runtime(err) => err.name().map(str::to_string),
        }
    }

    /// Stable one-line rendering, e.g.
    /// `ResolverError: UndefinedElement [UndefinedElement] z line 1`.
    pub fn summary(&self, source: &SourceReference) -> String {
        let mut summary = format!("{}: {} [{:?}]", self.stage(), self.kind(), self.category());
        if let Some(subject) = self.subject() {
            summary.push(' ');
            summary.push_str(&subject);
        }
        if let Some(found_at) = self.found_at() {
            summary.push_str(&format!(
                " line {}",
                source.line_of(found_at.start().byte_offset())
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run, RunOptions};
    use pretty_assertions::assert_eq;

    fn summary(source: &str) -> String {
        let source_reference = SourceReference::new("test".into(), source.into());
        let mut output = Vec::new();
        match run(source_reference.clone(), RunOptions::default(), &mut output) {
            Ok(()) => "ok".into(),
            Err(err) => err.summary(&source_reference),
        }
    }

    #[test]
    fn summaries_name_stage_kind_and_line() {
        assert_eq!(
            summary("int x = 1;\nz = 4;"),
            "ResolverError: UndefinedElement [UndefinedElement] z line 2"
        );
        assert_eq!(
            summary("int x = 1.0;"),
            "ResolverError: TypeMismatch [InvalidSyntax] line 1"
        );
        assert_eq!(
            summary("print 'open"),
            "TokenizerError: UnterminatedString [InvalidSyntax] line 1"
        );
        assert_eq!(
            summary("class c { int x; }\nc item;\nprint item.x;"),
            "RuntimeError: NilDereference [RuntimeFault] line 3"
        );
    }

    #[test]
    fn categories() {
        let source = SourceReference::new("test".into(), String::new());
        let err = LangError::from(RuntimeError::DivisionByZero {
            found_at: 0.into(),
            source_code: source,
        });
        assert_eq!(err.category(), ErrorCategory::RuntimeFault);
        assert!(!err.is_static());
    }
}
