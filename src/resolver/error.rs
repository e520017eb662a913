use miette::Diagnostic;
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{source::SourceSpan, types::Type, SourceReference};

#[derive(Error, Diagnostic, Debug, IntoStaticStr)]
pub enum ResolverError {
    #[error("Undefined element {name}")]
    UndefinedElement {
        name: String,
        #[label("'{name}' is not declared before this point")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Expected {expected} but found {actual}")]
    TypeMismatch {
        expected: Type,
        actual: Type,
        #[label("This is {actual}")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("{name} takes {expected} arguments but got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
        #[label("On this call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Cannot return from top-level code")]
    ReturnFromTopLevel {
        #[label("Return outside of a method found here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Already a symbol named {name} in this scope")]
    AlreadyDeclared {
        name: String,
        #[label("'{name}' is declared in the same scope again here")]
        found_at: SourceSpan,
        #[label("'{name}' was first declared here")]
        first_found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget {
        #[label("Only variables and fields can be assigned to")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("{name} is not callable")]
    NotCallable {
        name: String,
        ty: Type,
        #[label("'{name}' is {ty}, not a method")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
}

impl ResolverError {
    pub fn found_at(&self) -> SourceSpan {
        match self {
            Self::UndefinedElement { found_at, .. }
            | Self::TypeMismatch { found_at, .. }
            | Self::ArgumentCount { found_at, .. }
            | Self::ReturnFromTopLevel { found_at, .. }
            | Self::AlreadyDeclared { found_at, .. }
            | Self::InvalidAssignmentTarget { found_at, .. }
            | Self::NotCallable { found_at, .. } => *found_at,
        }
    }

    /// The symbol the error is about, when there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::UndefinedElement { name, .. }
            | Self::ArgumentCount { name, .. }
            | Self::AlreadyDeclared { name, .. }
            | Self::NotCallable { name, .. } => Some(name),
            _ => None,
        }
    }
}
