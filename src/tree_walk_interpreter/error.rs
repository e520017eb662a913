use super::{ValueDescriptor, ValueType};
use crate::{source::SourceSpan, types::Type, SourceReference};
use miette::Diagnostic;
use strum::IntoStaticStr;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, IntoStaticStr)]
pub enum RuntimeError {
    #[error("Operand must be {}, but found {}", .expected_type.fmt_a(), .actual_type.fmt_a())]
    OperandTypeError {
        expected_type: ValueDescriptor,
        actual_type: ValueType,
        #[label("{} was found here", .actual_type.fmt_a())]
        operand_loc: SourceSpan,
        operator: String,
        #[label("the '{operator}' operator expected {}", .expected_type.fmt_a())]
        operator_loc: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Division by zero")]
    DivisionByZero {
        #[label("The divisor here is zero")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Undefined variable {name}")]
    UndefinedVariable {
        name: String,
        #[label("found here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Unknown field {name}")]
    UnknownField {
        name: String,
        #[label("This instance has no field or method '{name}'")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Dereferenced nil")]
    NilDereference {
        #[label("This is nil")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Only instances have fields")]
    NotAnInstance {
        actual_type: ValueType,
        #[label("Attempted to access a field on {} here", .actual_type.fmt_a())]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Can only call methods")]
    UncallableValue {
        actual_type: ValueType,
        #[label("Attempted to call {} here", .actual_type.fmt_a())]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("{name} expects {expected_arity} arguments but got {actual_arity}")]
    UnexpectedCallArity {
        name: String,
        expected_arity: usize,
        actual_arity: usize,
        #[label("On this call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Parameter {parameter} of {name} expects {expected} but got {actual}")]
    ArgumentTypeMismatch {
        name: String,
        parameter: String,
        expected: Type,
        actual: Type,
        #[label("On this call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget {
        #[label("Cannot assign to this")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Failed to write program output")]
    Output(#[source] std::io::Error),
}

impl RuntimeError {
    /// Faults a `try` block can catch. Everything else stops the program.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::OperandTypeError { .. }
                | Self::DivisionByZero { .. }
                | Self::UnknownField { .. }
                | Self::NilDereference { .. }
                | Self::NotAnInstance { .. }
                | Self::UncallableValue { .. }
        )
    }

    pub fn found_at(&self) -> Option<SourceSpan> {
        match self {
            Self::OperandTypeError { operand_loc, .. } => Some(*operand_loc),
            Self::DivisionByZero { found_at, .. }
            | Self::UndefinedVariable { found_at, .. }
            | Self::UnknownField { found_at, .. }
            | Self::NilDereference { found_at, .. }
            | Self::NotAnInstance { found_at, .. }
            | Self::UncallableValue { found_at, .. }
            | Self::UnexpectedCallArity { found_at, .. }
            | Self::ArgumentTypeMismatch { found_at, .. }
            | Self::InvalidAssignmentTarget { found_at, .. } => Some(*found_at),
            Self::Output(_) => None,
        }
    }

    /// The symbol the error is about, when there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::UndefinedVariable { name, .. }
            | Self::UnknownField { name, .. }
            | Self::UnexpectedCallArity { name, .. }
            | Self::ArgumentTypeMismatch { name, .. } => Some(name),
            _ => None,
        }
    }
}
