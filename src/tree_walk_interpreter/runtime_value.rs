use super::{
    memory_space::MemorySpaceRef, method_value::MethodValue, RuntimeError,
};
use crate::{ast::Literal, types::Type};
use itertools::Itertools;
use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

#[derive(Clone)]
pub enum RuntimeValue {
    Int(i64),
    Float(f64),
    String(Rc<String>),
    Boolean(bool),
    Method(MethodValue),
    /// A class instance is the memory space holding its fields.
    Instance(MemorySpaceRef),
    Nil,
}

impl Debug for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => {
                f.write_str("\"")?;
                f.write_str(string.replace('\n', "\\n").replace('\"', "\\\"").as_str())?;
                f.write_str("\"")
            }
            other => Display::fmt(other, f),
        }
    }
}
impl Display for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(string) => f.write_str(string),
            Self::Boolean(b) => match b {
                true => f.write_str("true"),
                false => f.write_str("false"),
            },
            Self::Method(value) => Display::fmt(value, f),
            Self::Instance(space) => match space.borrow().class() {
                Some(class) => write!(f, "<{} instance>", class.name),
                None => f.write_str("<instance>"),
            },
            Self::Nil => f.write_str("nil"),
        }
    }
}

impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Method(a), Self::Method(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Nil, Self::Nil) => true,
            _ => false,
        }
    }
}

impl From<i64> for RuntimeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}
impl From<f64> for RuntimeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
impl From<bool> for RuntimeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<String> for RuntimeValue {
    fn from(value: String) -> Self {
        Self::String(Rc::new(value))
    }
}
impl From<MethodValue> for RuntimeValue {
    fn from(value: MethodValue) -> Self {
        Self::Method(value)
    }
}
impl From<&Literal> for RuntimeValue {
    fn from(value: &Literal) -> Self {
        match value {
            Literal::Int(value) => (*value).into(),
            Literal::Float(value) => (*value).into(),
            Literal::Str(value) => value.clone().into(),
            Literal::Bool(value) => (*value).into(),
            Literal::Nil => Self::Nil,
        }
    }
}

impl RuntimeValue {
    pub fn type_of(&self) -> ValueType {
        match self {
            RuntimeValue::Int(_) => ValueType::Int,
            RuntimeValue::Float(_) => ValueType::Float,
            RuntimeValue::String(_) => ValueType::String,
            RuntimeValue::Boolean(_) => ValueType::Boolean,
            RuntimeValue::Method(_) => ValueType::Method,
            RuntimeValue::Instance(_) => ValueType::Instance,
            RuntimeValue::Nil => ValueType::Nil,
        }
    }
    /// The declared type this value satisfies, for checks against parameter
    /// types at call time.
    pub fn static_type(&self) -> Type {
        match self {
            RuntimeValue::Int(_) => Type::INT,
            RuntimeValue::Float(_) => Type::FLOAT,
            RuntimeValue::String(_) => Type::STRING,
            RuntimeValue::Boolean(_) => Type::BOOLEAN,
            RuntimeValue::Method(_) => Type::METHOD,
            RuntimeValue::Instance(space) => space
                .borrow()
                .class()
                .map(|class| Type::UserDefined(class.name.clone()))
                .unwrap_or(Type::INFERRED),
            RuntimeValue::Nil => Type::NIL,
        }
    }
    pub fn cast_float<F: Fn(ValueDescriptor, ValueType) -> RuntimeError>(
        &self,
        make_error: F,
    ) -> Result<f64, RuntimeError> {
        match self {
            RuntimeValue::Int(value) => Ok(*value as f64),
            RuntimeValue::Float(value) => Ok(*value),
            other => Err(make_error(
                ValueDescriptor::AnyOf(vec![ValueType::Int, ValueType::Float]),
                other.type_of(),
            )),
        }
    }
    pub fn cast_boolean(&self) -> bool {
        match self {
            RuntimeValue::Boolean(val) => *val,
            RuntimeValue::Nil => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    String,
    Boolean,
    Method,
    Instance,
    Nil,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Boolean => "bool",
            ValueType::Method => "method",
            ValueType::Instance => "instance",
            ValueType::Nil => "nil",
        })
    }
}

impl ValueType {
    pub fn fmt_a(&self) -> &str {
        match self {
            ValueType::Int => "an int",
            ValueType::Float => "a float",
            ValueType::String => "a string",
            ValueType::Boolean => "a bool",
            ValueType::Method => "a method",
            ValueType::Instance => "an instance",
            ValueType::Nil => "nil",
        }
    }
}

#[derive(Debug)]
pub enum ValueDescriptor {
    Single(ValueType),
    AnyOf(Vec<ValueType>),
}
impl From<ValueType> for ValueDescriptor {
    fn from(value_type: ValueType) -> Self {
        ValueDescriptor::Single(value_type)
    }
}
impl ValueDescriptor {
    pub fn fmt_a(&self) -> String {
        match self {
            Self::Single(value_type) => value_type.fmt_a().to_string(),
            Self::AnyOf(types) => {
                Itertools::intersperse(types.iter().map(ValueType::fmt_a), " or ").collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_walk_interpreter::memory_space::{ClassTag, MemorySpace};
    use crate::scope::ScopeTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_compare_across_kinds() {
        assert_eq!(RuntimeValue::Int(2), RuntimeValue::Float(2.0));
        assert_ne!(RuntimeValue::Int(2), RuntimeValue::String(Rc::new("2".into())));
        assert_eq!(RuntimeValue::Nil, RuntimeValue::Nil);
        assert_ne!(RuntimeValue::Boolean(false), RuntimeValue::Nil);
    }

    #[test]
    fn display() {
        assert_eq!(RuntimeValue::Float(1.5).to_string(), "1.5");
        assert_eq!(RuntimeValue::Int(-3).to_string(), "-3");
        assert_eq!(format!("{:?}", RuntimeValue::from("a\"b".to_string())), "\"a\\\"b\"");
        let instance = MemorySpace::new_instance(
            MemorySpace::new().wrap(),
            ClassTag {
                name: "bob".into(),
                members: ScopeTree::GLOBAL,
            },
        )
        .wrap();
        let value = RuntimeValue::Instance(instance.clone());
        assert_eq!(value.to_string(), "<bob instance>");
        assert_eq!(value.static_type(), Type::UserDefined("bob".into()));
        assert_eq!(value, RuntimeValue::Instance(instance));
    }

    #[test]
    fn descriptors_list_alternatives() {
        let descriptor = ValueDescriptor::AnyOf(vec![ValueType::Int, ValueType::Float]);
        assert_eq!(descriptor.fmt_a(), "an int or a float");
    }
}
