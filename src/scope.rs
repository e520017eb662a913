use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{ClassDecl, MethodDecl},
    source::{SourceOffset, SourceSpan},
    types::Type,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Variable,
    Method(Rc<MethodDecl>),
    Class {
        declaration: Rc<ClassDecl>,
        members: ScopeId,
    },
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
    pub declared_at: SourceSpan,
    /// Variables can be referenced from the end of their declaration on.
    pub visible_from: SourceOffset,
}

impl Symbol {
    pub fn variable(name: &str, ty: Type, declared_at: SourceSpan, visible_from: SourceOffset) -> Self {
        Self {
            name: name.to_string(),
            ty,
            kind: SymbolKind::Variable,
            declared_at,
            visible_from,
        }
    }

    pub fn method(declaration: Rc<MethodDecl>) -> Self {
        Self {
            name: declaration.name.name.clone(),
            ty: Type::METHOD,
            declared_at: declaration.name.source_span,
            visible_from: SourceOffset::default(),
            kind: SymbolKind::Method(declaration),
        }
    }

    pub fn class(declaration: Rc<ClassDecl>, members: ScopeId) -> Self {
        Self {
            name: declaration.name.name.clone(),
            ty: Type::UserDefined(declaration.name.name.clone()),
            declared_at: declaration.name.source_span,
            visible_from: SourceOffset::default(),
            kind: SymbolKind::Class {
                declaration,
                members,
            },
        }
    }

    pub fn as_method(&self) -> Option<&Rc<MethodDecl>> {
        match &self.kind {
            SymbolKind::Method(declaration) => Some(declaration),
            _ => None,
        }
    }

    pub fn class_members(&self) -> Option<ScopeId> {
        match &self.kind {
            SymbolKind::Class { members, .. } => Some(*members),
            _ => None,
        }
    }

    fn is_visible_at(&self, at: SourceOffset) -> bool {
        match self.kind {
            SymbolKind::Variable => self.visible_from <= at,
            SymbolKind::Method(_) | SymbolKind::Class { .. } => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    symbols: HashMap<String, Symbol>,
    /// Class bodies let members refer to each other in any order.
    pub allows_forward_references: bool,
}

/// Arena of lexical scopes. Scopes are only ever added, so a `ScopeId` stays
/// valid for the whole run and nodes can refer to their scope by id.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn add_child(&mut self, parent: ScopeId, allows_forward_references: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            allows_forward_references,
            ..Default::default()
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Adds a symbol to `scope`, handing back the existing one when the name
    /// is already taken there.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), &Symbol> {
        let symbols = &mut self.scopes[scope.0].symbols;
        if symbols.contains_key(&symbol.name) {
            return Err(&symbols[&symbol.name]);
        }
        symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.get(scope).symbols.get(name)
    }

    pub fn symbol_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[scope.0].symbols.get_mut(name)
    }

    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| self.get(*id).parent)
    }

    /// Nearest symbol called `name`, ignoring declaration order.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.ancestors(scope)
            .find_map(|id| self.get_local(id, name).map(|symbol| (id, symbol)))
    }

    /// Nearest symbol called `name` that a reference at `at` can see. A
    /// variable declared later in an ordinary scope is skipped, so the search
    /// carries on outwards.
    pub fn lookup_visible(
        &self,
        scope: ScopeId,
        name: &str,
        at: SourceOffset,
    ) -> Option<(ScopeId, &Symbol)> {
        self.ancestors(scope).find_map(|id| {
            let candidate = self.get_local(id, name)?;
            let visible = self.get(id).allows_forward_references || candidate.is_visible_at(at);
            visible.then(|| (id, candidate))
        })
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn variable(name: &str, declared: usize) -> Symbol {
        Symbol::variable(name, Type::INT, SourceSpan::from(declared), (declared + 1).into())
    }

    #[test]
    fn later_declarations_are_skipped_in_ordinary_scopes() {
        let mut tree = ScopeTree::new();
        let block = tree.add_child(ScopeTree::GLOBAL, false);
        tree.define(ScopeTree::GLOBAL, variable("x", 0)).unwrap();
        tree.define(block, variable("x", 20)).unwrap();

        let (found_in, _) = tree.lookup_visible(block, "x", 10.into()).unwrap();
        assert_eq!(found_in, ScopeTree::GLOBAL);
        let (found_in, _) = tree.lookup_visible(block, "x", 30.into()).unwrap();
        assert_eq!(found_in, block);
        assert_eq!(tree.lookup(block, "x").map(|(id, _)| id), Some(block));
    }

    #[test]
    fn class_scopes_allow_forward_references() {
        let mut tree = ScopeTree::new();
        let class = tree.add_child(ScopeTree::GLOBAL, true);
        tree.define(class, variable("field", 50)).unwrap();
        assert!(tree.lookup_visible(class, "field", 5.into()).is_some());
        assert!(tree.lookup_visible(ScopeTree::GLOBAL, "field", 60.into()).is_none());
    }

    #[test]
    fn redefinition_returns_the_existing_symbol() {
        let mut tree = ScopeTree::new();
        tree.define(ScopeTree::GLOBAL, variable("x", 3)).unwrap();
        let existing = tree.define(ScopeTree::GLOBAL, variable("x", 9)).unwrap_err();
        assert_eq!(existing.declared_at, SourceSpan::from(3));
        assert_eq!(
            tree.get_local(ScopeTree::GLOBAL, "x").map(|symbol| symbol.declared_at),
            Some(SourceSpan::from(3))
        );
    }
}
