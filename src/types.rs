use std::fmt::Display;

use crate::tokenizer::{Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInType {
    Int,
    Float,
    String,
    Boolean,
    Void,
    Nil,
    Method,
    /// Declared with `var`, or otherwise unknown until runtime.
    Inferred,
}

/// Static type of an expression or symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    BuiltIn(BuiltInType),
    /// A class instance, by class name.
    UserDefined(String),
}

impl Type {
    pub const INT: Type = Type::BuiltIn(BuiltInType::Int);
    pub const FLOAT: Type = Type::BuiltIn(BuiltInType::Float);
    pub const STRING: Type = Type::BuiltIn(BuiltInType::String);
    pub const BOOLEAN: Type = Type::BuiltIn(BuiltInType::Boolean);
    pub const VOID: Type = Type::BuiltIn(BuiltInType::Void);
    pub const NIL: Type = Type::BuiltIn(BuiltInType::Nil);
    pub const METHOD: Type = Type::BuiltIn(BuiltInType::Method);
    pub const INFERRED: Type = Type::BuiltIn(BuiltInType::Inferred);

    /// Type named by a declaration's type token.
    pub fn from_token(token: &Token) -> Type {
        match &token.token_type {
            TokenType::IntType => Type::INT,
            TokenType::FloatType => Type::FLOAT,
            TokenType::StringType => Type::STRING,
            TokenType::BoolType => Type::BOOLEAN,
            TokenType::Void => Type::VOID,
            TokenType::Method => Type::METHOD,
            TokenType::Word(name) => Type::UserDefined(name.clone()),
            _ => Type::INFERRED,
        }
    }

    /// Method, inferred and nil values fit anywhere.
    pub fn is_universal(&self) -> bool {
        matches!(
            self,
            Type::BuiltIn(BuiltInType::Method | BuiltInType::Inferred | BuiltInType::Nil)
        )
    }

    pub fn is_inferred(&self) -> bool {
        *self == Type::INFERRED
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::BuiltIn(BuiltInType::Int | BuiltInType::Float))
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::UserDefined(name) => Some(name),
            Type::BuiltIn(_) => None,
        }
    }
}

/// Whether a value of type `actual` may be stored where `expected` is declared.
pub fn promotable(expected: &Type, actual: &Type) -> bool {
    expected == actual || expected.is_universal() || actual.is_universal()
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::BuiltIn(built_in) => f.write_str(match built_in {
                BuiltInType::Int => "int",
                BuiltInType::Float => "float",
                BuiltInType::String => "string",
                BuiltInType::Boolean => "bool",
                BuiltInType::Void => "void",
                BuiltInType::Nil => "nil",
                BuiltInType::Method => "method",
                BuiltInType::Inferred => "var",
            }),
            Type::UserDefined(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_types_promote_both_ways() {
        assert!(promotable(&Type::INT, &Type::NIL));
        assert!(promotable(&Type::METHOD, &Type::STRING));
        assert!(promotable(&Type::UserDefined("bob".into()), &Type::INFERRED));
        assert!(!promotable(&Type::INT, &Type::FLOAT));
        assert!(!promotable(&Type::INT, &Type::VOID));
        assert!(!promotable(
            &Type::UserDefined("bob".into()),
            &Type::UserDefined("anton".into())
        ));
    }
}
