use super::memory_space::MemorySpaceRef;
use crate::ast::{MethodDecl, MethodKind};
use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

/// A method as a value. Lambdas carry the space they were created in; named
/// methods run in a space opened under whoever calls them.
#[derive(Clone)]
pub struct MethodValue {
    declaration: Rc<MethodDecl>,
    environment: Option<MemorySpaceRef>,
}

impl MethodValue {
    pub fn named(declaration: Rc<MethodDecl>) -> Self {
        Self {
            declaration,
            environment: None,
        }
    }
    pub fn closure(declaration: Rc<MethodDecl>, environment: MemorySpaceRef) -> Self {
        Self {
            declaration,
            environment: Some(environment),
        }
    }
    pub fn declaration(&self) -> &Rc<MethodDecl> {
        &self.declaration
    }
    pub fn environment(&self) -> Option<&MemorySpaceRef> {
        self.environment.as_ref()
    }
    pub fn name(&self) -> &str {
        &self.declaration.name.name
    }
}

impl PartialEq for MethodValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration)
            && match (&self.environment, &other.environment) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Debug for MethodValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for MethodValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.declaration.kind {
            MethodKind::Named | MethodKind::Lambda => write!(f, "<fn {}>", self.name()),
            MethodKind::Curried => write!(f, "<fn {} curried>", self.name()),
        }
    }
}
