use super::{RuntimeError, RuntimeValue};

/// Anything that unwinds evaluation before a statement finishes normally.
#[derive(Debug)]
pub enum AbruptCompletion {
    Return(RuntimeValue),
    Error(RuntimeError),
}

impl From<RuntimeError> for AbruptCompletion {
    fn from(err: RuntimeError) -> Self {
        AbruptCompletion::Error(err)
    }
}

pub type Completion = Result<RuntimeValue, AbruptCompletion>;

/// Finishes a method body: a `return` hands back its value, falling off the
/// end yields nil.
pub fn finish_call(completion: Completion) -> Result<RuntimeValue, RuntimeError> {
    match completion {
        Ok(_) => Ok(RuntimeValue::Nil),
        Err(AbruptCompletion::Return(value)) => Ok(value),
        Err(AbruptCompletion::Error(err)) => Err(err),
    }
}
