mod curry;
mod error;

pub use error::ResolverError;

use std::mem;

use crate::{
    ast::*,
    scope::{ScopeId, ScopeTree, Symbol, SymbolKind},
    side_table::{SideTable, UniqueIdGenerator},
    source::SourceSpan,
    types::{promotable, Type},
    SourceReference,
};

/// Everything the resolver learns about a program, keyed by node id.
#[derive(Debug, Default)]
pub struct Resolutions {
    scopes: ScopeTree,
    enclosing_scopes: SideTable<Ast, ScopeId>,
    types: SideTable<Ast, Type>,
    /// Synthesized replacements for curried calls.
    conversions: SideTable<Ast, Ast>,
}

impl Resolutions {
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scope_of(&self, node: &Ast) -> ScopeId {
        self.enclosing_scopes
            .get(node)
            .copied()
            .unwrap_or(ScopeTree::GLOBAL)
    }

    pub fn type_of(&self, node: &Ast) -> Option<&Type> {
        self.types.get(node)
    }

    pub fn conversion(&self, node: &Ast) -> Option<&Ast> {
        self.conversions.get(node)
    }

    /// The symbol `name` refers to when written at `node`.
    pub fn symbol_for(&self, node: &Ast, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.scopes
            .lookup_visible(self.scope_of(node), name, node.source_span.start())
    }
}

/// Two pass static analysis. The first pass builds the scope tree and stamps
/// every node with its enclosing scope; the second resolves and checks types
/// against that tree, so symbols declared anywhere in a scope are already
/// known when references to them are checked.
pub struct Resolver<'a> {
    resolutions: Resolutions,
    ids: &'a mut UniqueIdGenerator,
    source_reference: SourceReference,
    current_scope: ScopeId,
    return_types: Vec<Type>,
}

impl<'a> Resolver<'a> {
    pub fn resolve(program: &mut Program) -> Result<Resolutions, ResolverError> {
        let mut resolver = Resolver {
            resolutions: Resolutions::default(),
            ids: &mut program.node_ids,
            source_reference: program.source_reference.clone(),
            current_scope: ScopeTree::GLOBAL,
            return_types: Vec::new(),
        };
        let root = &program.root;

        resolver.stamp(root);
        resolver.build_statements(root)?;
        tracing::debug!(
            scopes = resolver.resolutions.scopes.len(),
            "built scope tree"
        );

        resolver.resolve_statements(root)?;
        resolver.record(root, Type::VOID);
        tracing::debug!(
            typed_nodes = resolver.resolutions.types.len(),
            conversions = resolver.resolutions.conversions.len(),
            "resolved types"
        );
        Ok(resolver.resolutions)
    }

    fn undefined(&self, name: &str, found_at: SourceSpan) -> ResolverError {
        ResolverError::UndefinedElement {
            name: name.to_string(),
            found_at,
            source_code: self.source_reference.clone(),
        }
    }

    fn expect_promotable(
        &self,
        expected: &Type,
        actual: &Type,
        found_at: SourceSpan,
    ) -> Result<(), ResolverError> {
        if promotable(expected, actual) {
            Ok(())
        } else {
            Err(ResolverError::TypeMismatch {
                expected: expected.clone(),
                actual: actual.clone(),
                found_at,
                source_code: self.source_reference.clone(),
            })
        }
    }

    // Scope building

    fn stamp(&mut self, node: &Ast) {
        if self
            .resolutions
            .enclosing_scopes
            .set_once(node, self.current_scope)
            .is_err()
        {
            tracing::trace!(node = ?node.id, "node already has a scope");
        }
    }

    fn in_scope<T>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> Result<T, ResolverError>,
    ) -> Result<T, ResolverError> {
        let enclosing = mem::replace(&mut self.current_scope, scope);
        let result = f(self);
        self.current_scope = enclosing;
        result
    }

    fn child_scope(&mut self, allows_forward_references: bool) -> ScopeId {
        self.resolutions
            .scopes
            .add_child(self.current_scope, allows_forward_references)
    }

    fn declare(&mut self, symbol: Symbol) -> Result<(), ResolverError> {
        let name = symbol.name.clone();
        let found_at = symbol.declared_at;
        let source_code = self.source_reference.clone();
        self.resolutions
            .scopes
            .define(self.current_scope, symbol)
            .map_err(|existing| ResolverError::AlreadyDeclared {
                name,
                found_at,
                first_found_at: existing.declared_at,
                source_code,
            })
    }

    fn build_all(&mut self, nodes: &[Ast]) -> Result<(), ResolverError> {
        nodes.iter().try_for_each(|node| self.build(node))
    }

    /// Builds the statements of a block directly into the current scope.
    fn build_statements(&mut self, block: &Ast) -> Result<(), ResolverError> {
        match block.as_scope() {
            Some(scope) => self.build_all(&scope.statements),
            None => self.build(block),
        }
    }

    fn build(&mut self, node: &Ast) -> Result<(), ResolverError> {
        self.stamp(node);
        match &node.kind {
            AstKind::Scope(block) => {
                let scope = self.child_scope(false);
                self.in_scope(scope, |this| this.build_all(&block.statements))
            }
            AstKind::Expr(Expr::Binary { left, right, .. }) => {
                self.build(left)?;
                self.build(right)
            }
            AstKind::Expr(_) => Ok(()),
            AstKind::VarDecl(decl) => {
                if let Some(value) = &decl.value {
                    self.build(value)?;
                }
                self.declare(Symbol::variable(
                    &decl.name.name,
                    Type::from_token(&decl.decl_type),
                    decl.name.source_span,
                    node.source_span.end(),
                ))
            }
            AstKind::MethodDecl(method) => {
                if method.kind == MethodKind::Named {
                    self.declare(Symbol::method(method.clone()))?;
                }
                let scope = self.child_scope(false);
                self.in_scope(scope, |this| {
                    this.build_all(&method.parameters)?;
                    this.build(&method.body)
                })
            }
            AstKind::Invoke(invoke) => self.build_all(&invoke.arguments),
            AstKind::Conditional(conditional) => {
                if let Some(predicate) = &conditional.predicate {
                    self.build(predicate)?;
                }
                self.build(&conditional.body)?;
                match &conditional.alternate {
                    Some(alternate) => self.build(alternate),
                    None => Ok(()),
                }
            }
            AstKind::While(stmt) => {
                self.build(&stmt.predicate)?;
                self.build(&stmt.body)
            }
            AstKind::For(stmt) => {
                let scope = self.child_scope(false);
                self.in_scope(scope, |this| {
                    this.build(&stmt.setup)?;
                    this.build(&stmt.predicate)?;
                    this.build(&stmt.update)?;
                    this.build(&stmt.body)
                })
            }
            AstKind::Return(value) => match value {
                Some(value) => self.build(value),
                None => Ok(()),
            },
            AstKind::Print(value) => self.build(value),
            AstKind::Class(class) => {
                let members = self.child_scope(true);
                self.declare(Symbol::class(class.clone(), members))?;
                self.in_scope(members, |this| {
                    this.stamp(&class.body);
                    this.build_statements(&class.body)
                })
            }
            AstKind::ClassRef(reference) => {
                self.build(&reference.instance)?;
                self.build_all(&reference.dereferences)
            }
            AstKind::New(new) => self.build_all(&new.arguments),
            AstKind::TryCatch(stmt) => {
                self.build(&stmt.try_body)?;
                self.build(&stmt.catch_body)
            }
        }
    }

    // Type resolution

    fn record(&mut self, node: &Ast, ty: Type) -> Type {
        if let Err(ty) = self.resolutions.types.set_once(node, ty.clone()) {
            tracing::trace!(node = ?node.id, %ty, "node already has a type");
        }
        ty
    }

    fn resolve_all(&mut self, nodes: &[Ast]) -> Result<Vec<Type>, ResolverError> {
        nodes.iter().map(|node| self.resolve_node(node)).collect()
    }

    fn resolve_statements(&mut self, block: &Ast) -> Result<(), ResolverError> {
        match block.as_scope() {
            Some(scope) => self.resolve_all(&scope.statements).map(|_| ()),
            None => self.resolve_node(block).map(|_| ()),
        }
    }

    fn resolve_node(&mut self, node: &Ast) -> Result<Type, ResolverError> {
        let ty = match &node.kind {
            AstKind::Scope(block) => {
                self.resolve_all(&block.statements)?;
                Type::VOID
            }
            AstKind::Expr(expr) => self.resolve_expr(node, expr)?,
            AstKind::VarDecl(decl) => self.resolve_var_decl(node, decl)?,
            AstKind::MethodDecl(method) => self.resolve_method(method)?,
            AstKind::Invoke(invoke) => self.resolve_invoke(node, invoke)?,
            AstKind::Conditional(conditional) => {
                if let Some(predicate) = &conditional.predicate {
                    self.resolve_node(predicate)?;
                }
                self.resolve_node(&conditional.body)?;
                if let Some(alternate) = &conditional.alternate {
                    self.resolve_node(alternate)?;
                }
                Type::VOID
            }
            AstKind::While(stmt) => {
                self.resolve_node(&stmt.predicate)?;
                self.resolve_node(&stmt.body)?;
                Type::VOID
            }
            AstKind::For(stmt) => {
                self.resolve_node(&stmt.setup)?;
                self.resolve_node(&stmt.predicate)?;
                self.resolve_node(&stmt.update)?;
                self.resolve_node(&stmt.body)?;
                Type::VOID
            }
            AstKind::Return(value) => self.resolve_return(node, value.as_deref())?,
            AstKind::Print(value) => {
                self.resolve_node(value)?;
                Type::VOID
            }
            AstKind::Class(class) => {
                self.resolve_statements(&class.body)?;
                self.record(&class.body, Type::VOID);
                Type::VOID
            }
            AstKind::ClassRef(reference) => self.resolve_class_ref(reference)?,
            AstKind::New(new) => self.resolve_new(node, new)?,
            AstKind::TryCatch(stmt) => {
                self.resolve_node(&stmt.try_body)?;
                self.resolve_node(&stmt.catch_body)?;
                Type::VOID
            }
        };
        Ok(self.record(node, ty))
    }

    fn lookup(&self, node: &Ast, name: &str) -> Result<&Symbol, ResolverError> {
        self.resolutions
            .symbol_for(node, name)
            .map(|(_, symbol)| symbol)
            .ok_or_else(|| self.undefined(name, node.source_span))
    }

    fn resolve_expr(&mut self, node: &Ast, expr: &Expr) -> Result<Type, ResolverError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Int(_) => Type::INT,
                Literal::Float(_) => Type::FLOAT,
                Literal::Str(_) => Type::STRING,
                Literal::Bool(_) => Type::BOOLEAN,
                Literal::Nil => Type::NIL,
            }),
            Expr::Identifier(name) | Expr::Link(name) => {
                self.lookup(node, name).map(|symbol| symbol.ty.clone())
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => self.resolve_binary(left, *operator, right),
        }
    }

    fn resolve_binary(
        &mut self,
        left: &Ast,
        operator: BinaryOperator,
        right: &Ast,
    ) -> Result<Type, ResolverError> {
        if operator == BinaryOperator::Assign && !is_assignable(left) {
            return Err(ResolverError::InvalidAssignmentTarget {
                found_at: left.source_span,
                source_code: self.source_reference.clone(),
            });
        }

        let left_type = self.resolve_node(left)?;
        let right_type = self.resolve_node(right)?;

        if operator == BinaryOperator::Assign {
            self.expect_promotable(&left_type, &right_type, right.source_span)?;
            return Ok(if left_type.is_inferred() {
                right_type
            } else {
                left_type
            });
        }
        if operator.is_comparison() || operator.is_logical() {
            return Ok(Type::BOOLEAN);
        }
        if operator == BinaryOperator::Xor {
            return Ok(if left_type == Type::BOOLEAN || right_type == Type::BOOLEAN {
                Type::BOOLEAN
            } else if left_type.is_universal() || right_type.is_universal() {
                Type::INFERRED
            } else {
                Type::INT
            });
        }
        arithmetic_type(operator, &left_type, &right_type).ok_or_else(|| {
            ResolverError::TypeMismatch {
                expected: left_type,
                actual: right_type,
                found_at: right.source_span,
                source_code: self.source_reference.clone(),
            }
        })
    }

    fn resolve_var_decl(&mut self, node: &Ast, decl: &VarDecl) -> Result<Type, ResolverError> {
        let declared = Type::from_token(&decl.decl_type);
        let value = match &decl.value {
            Some(value) => value,
            None => return Ok(declared),
        };
        let value_type = self.resolve_node(value)?;

        if declared.is_inferred() {
            let scope = self.resolutions.scope_of(node);
            if let Some(symbol) = self.resolutions.scopes.symbol_mut(scope, &decl.name.name) {
                symbol.ty = value_type.clone();
            }
            return Ok(value_type);
        }
        self.expect_promotable(&declared, &value_type, value.source_span)?;
        Ok(declared)
    }

    fn resolve_method(&mut self, method: &MethodDecl) -> Result<Type, ResolverError> {
        self.return_types.push(return_type(method));
        let result = self
            .resolve_all(&method.parameters)
            .and_then(|_| self.resolve_node(&method.body));
        self.return_types.pop();
        result.map(|_| Type::METHOD)
    }

    fn resolve_return(&mut self, node: &Ast, value: Option<&Ast>) -> Result<Type, ResolverError> {
        let expected = match self.return_types.last() {
            Some(expected) => expected.clone(),
            None => {
                return Err(ResolverError::ReturnFromTopLevel {
                    found_at: node.source_span,
                    source_code: self.source_reference.clone(),
                })
            }
        };
        let (actual, found_at) = match value {
            Some(value) => (self.resolve_node(value)?, value.source_span),
            None => (Type::NIL, node.source_span),
        };
        self.expect_promotable(&expected, &actual, found_at)?;
        Ok(actual)
    }

    fn resolve_invoke(&mut self, node: &Ast, invoke: &FunctionInvoke) -> Result<Type, ResolverError> {
        let argument_types = self.resolve_all(&invoke.arguments)?;
        let symbol = self.lookup(node, &invoke.name.name)?.clone();
        match &symbol.kind {
            SymbolKind::Method(declaration) if argument_types.len() < declaration.arity() => {
                self.check_arguments(declaration, &invoke.arguments, &argument_types)?;
                self.curry(node, invoke, declaration)
            }
            SymbolKind::Method(declaration) => self.check_call(
                declaration,
                &invoke.name.name,
                &invoke.arguments,
                &argument_types,
                node.source_span,
            ),
            _ => self.callable_variable(&symbol, node.source_span),
        }
    }

    /// Calls through method typed variables are checked when they happen.
    fn callable_variable(&self, symbol: &Symbol, found_at: SourceSpan) -> Result<Type, ResolverError> {
        match symbol.kind {
            SymbolKind::Variable if symbol.ty == Type::METHOD || symbol.ty.is_inferred() => {
                Ok(Type::INFERRED)
            }
            _ => Err(ResolverError::NotCallable {
                name: symbol.name.clone(),
                ty: symbol.ty.clone(),
                found_at,
                source_code: self.source_reference.clone(),
            }),
        }
    }

    fn check_call(
        &self,
        declaration: &MethodDecl,
        name: &str,
        arguments: &[Ast],
        argument_types: &[Type],
        found_at: SourceSpan,
    ) -> Result<Type, ResolverError> {
        if argument_types.len() != declaration.arity() {
            return Err(ResolverError::ArgumentCount {
                name: name.to_string(),
                expected: declaration.arity(),
                actual: argument_types.len(),
                found_at,
                source_code: self.source_reference.clone(),
            });
        }
        self.check_arguments(declaration, arguments, argument_types)?;
        Ok(return_type(declaration))
    }

    /// Checks the supplied arguments against the leading parameters.
    fn check_arguments(
        &self,
        declaration: &MethodDecl,
        arguments: &[Ast],
        argument_types: &[Type],
    ) -> Result<(), ResolverError> {
        declaration
            .parameter_decls()
            .zip(arguments.iter().zip(argument_types))
            .try_for_each(|(parameter, (argument, actual))| {
                self.expect_promotable(
                    &Type::from_token(&parameter.decl_type),
                    actual,
                    argument.source_span,
                )
            })
    }

    fn class_members(&self, at: &Ast, class_name: &str) -> Option<ScopeId> {
        self.resolutions
            .scopes
            .lookup(self.resolutions.scope_of(at), class_name)
            .and_then(|(_, symbol)| symbol.class_members())
    }

    fn member(&self, members: ScopeId, name: &str, found_at: SourceSpan) -> Result<&Symbol, ResolverError> {
        self.resolutions
            .scopes
            .get_local(members, name)
            .ok_or_else(|| self.undefined(name, found_at))
    }

    fn resolve_class_ref(&mut self, reference: &ClassRef) -> Result<Type, ResolverError> {
        let mut ty = self.resolve_node(&reference.instance)?;
        for dereference in &reference.dereferences {
            ty = self.resolve_dereference(&ty, dereference)?;
            self.record(dereference, ty.clone());
        }
        Ok(ty)
    }

    /// Resolves one step of a field chain inside the class of `owner`. When
    /// the owner's class is not statically known the step is left to runtime.
    fn resolve_dereference(&mut self, owner: &Type, dereference: &Ast) -> Result<Type, ResolverError> {
        let members = owner
            .class_name()
            .and_then(|class_name| self.class_members(dereference, class_name));
        match &dereference.kind {
            AstKind::Invoke(invoke) => {
                let argument_types = self.resolve_all(&invoke.arguments)?;
                let members = match members {
                    Some(members) => members,
                    None => return Ok(Type::INFERRED),
                };
                let symbol = self
                    .member(members, &invoke.name.name, invoke.name.source_span)?
                    .clone();
                match &symbol.kind {
                    SymbolKind::Method(declaration) => self.check_call(
                        declaration,
                        &invoke.name.name,
                        &invoke.arguments,
                        &argument_types,
                        dereference.source_span,
                    ),
                    _ => self.callable_variable(&symbol, dereference.source_span),
                }
            }
            AstKind::Expr(Expr::Identifier(name)) => match members {
                Some(members) => Ok(self.member(members, name, dereference.source_span)?.ty.clone()),
                None => Ok(Type::INFERRED),
            },
            _ => self.resolve_node(dereference),
        }
    }

    fn resolve_new(&mut self, node: &Ast, new: &NewInstance) -> Result<Type, ResolverError> {
        let argument_types = self.resolve_all(&new.arguments)?;
        let class_name = &new.class_name.name;
        let members = self
            .class_members(node, class_name)
            .ok_or_else(|| self.undefined(class_name, new.class_name.source_span))?;

        let init = self
            .resolutions
            .scopes
            .get_local(members, "init")
            .and_then(Symbol::as_method)
            .cloned();
        match init {
            Some(init) => {
                self.check_call(
                    &init,
                    class_name,
                    &new.arguments,
                    &argument_types,
                    node.source_span,
                )?;
            }
            None if !argument_types.is_empty() => {
                return Err(ResolverError::ArgumentCount {
                    name: class_name.clone(),
                    expected: 0,
                    actual: argument_types.len(),
                    found_at: node.source_span,
                    source_code: self.source_reference.clone(),
                })
            }
            None => {}
        }
        Ok(Type::UserDefined(class_name.clone()))
    }
}

fn return_type(method: &MethodDecl) -> Type {
    method
        .return_type
        .as_ref()
        .map_or(Type::INFERRED, Type::from_token)
}

/// Variables, and field chains that end in a field.
fn is_assignable(target: &Ast) -> bool {
    match &target.kind {
        AstKind::Expr(Expr::Identifier(_)) => true,
        AstKind::ClassRef(reference) => matches!(
            reference.dereferences.last().map(|last| &last.kind),
            Some(AstKind::Expr(Expr::Identifier(_)))
        ),
        _ => false,
    }
}

fn arithmetic_type(operator: BinaryOperator, left: &Type, right: &Type) -> Option<Type> {
    if left == right {
        Some(left.clone())
    } else if left.is_universal() || right.is_universal() {
        Some(Type::INFERRED)
    } else if operator == BinaryOperator::Plus && (*left == Type::STRING || *right == Type::STRING) {
        Some(Type::STRING)
    } else if left.is_numeric() && right.is_numeric() {
        Some(Type::FLOAT)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::Parser, tokenizer::Tokenizer};
    use pretty_assertions::assert_eq;

    fn resolve(source: &str) -> Result<(Program, Resolutions), ResolverError> {
        let source_reference = SourceReference::new("test".into(), source.into());
        let tokens = Tokenizer::tokenize(source_reference.clone()).unwrap();
        let mut program = Parser::parse(tokens, source_reference).unwrap();
        let resolutions = Resolver::resolve(&mut program)?;
        Ok((program, resolutions))
    }

    fn error_kind(source: &str) -> &'static str {
        match resolve(source) {
            Ok(_) => "ok",
            Err(err) => (&err).into(),
        }
    }

    #[test]
    fn declarations_are_visible_after_they_end() {
        assert_eq!(error_kind("int x = 1; print x;"), "ok");
        assert_eq!(error_kind("print x; int x = 1;"), "UndefinedElement");
        assert_eq!(error_kind("int x = x;"), "UndefinedElement");
        assert_eq!(error_kind("int x = 1; { print x; int y = 2; } print y;"), "UndefinedElement");
    }

    #[test]
    fn methods_and_classes_can_be_used_before_their_declaration() {
        assert_eq!(error_kind("foo(); void foo() { print 1; }"), "ok");
        assert_eq!(
            error_kind("var b = new bob(); class bob { int x = 1; }"),
            "ok"
        );
        assert_eq!(
            error_kind("class bob { void f() { print x; } int x = 1; }"),
            "ok"
        );
    }

    #[test]
    fn expression_types() {
        let (program, resolutions) =
            resolve(r#"var a = 1 + 2.0; var b = "x" + 1; var c = 1 > 2; var d = 2 ^ 3;"#).unwrap();
        let types = program
            .statements()
            .iter()
            .map(|statement| resolutions.type_of(statement).unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(types, vec!["float", "string", "bool", "int"]);
    }

    #[test]
    fn mismatched_declarations_and_returns() {
        assert_eq!(error_kind("int x = 1.0;"), "TypeMismatch");
        assert_eq!(error_kind("int x = nil;"), "ok");
        assert_eq!(
            error_kind(r#"string f() { return "s"; } int x = f();"#),
            "TypeMismatch"
        );
        assert_eq!(error_kind("int f() { return \"s\"; }"), "TypeMismatch");
        assert_eq!(error_kind("void f() { return; }"), "ok");
        assert_eq!(error_kind("return 1;"), "ReturnFromTopLevel");
    }

    #[test]
    fn call_checks() {
        assert_eq!(error_kind("void f(int a) { } f(\"s\");"), "TypeMismatch");
        assert_eq!(error_kind("void f(int a) { } f(1, 2);"), "ArgumentCount");
        assert_eq!(error_kind("int x = 1; x();"), "NotCallable");
        assert_eq!(error_kind("method m; m(1, 2);"), "ok");
        assert_eq!(error_kind("g();"), "UndefinedElement");
    }

    #[test]
    fn declarations_and_assignments() {
        assert_eq!(error_kind("int x = 1; int x = 2;"), "AlreadyDeclared");
        assert_eq!(error_kind("int x = 1; { int x = 2; }"), "ok");
        assert_eq!(error_kind("1 = 2;"), "InvalidAssignmentTarget");
        assert_eq!(error_kind("var x = 1; x = 2;"), "ok");
        assert_eq!(error_kind("int x = 1; x = \"s\";"), "TypeMismatch");
    }

    #[test]
    fn class_members_are_checked_through_chains() {
        let source = "class bob { int x = 1; int get() { return x; } } bob b = new bob();";
        assert_eq!(error_kind(&format!("{} print b.x; print b.get();", source)), "ok");
        assert_eq!(error_kind(&format!("{} print b.y;", source)), "UndefinedElement");
        assert_eq!(error_kind(&format!("{} print b.get(1);", source)), "ArgumentCount");
        assert_eq!(error_kind("var b = new nobody();"), "UndefinedElement");
        assert_eq!(error_kind("class bob { } var b = new bob(1);"), "ArgumentCount");
        assert_eq!(
            error_kind("class bob { int x; void init(int y) { x = y; } } var b = new bob(1);"),
            "ok"
        );
    }

    #[test]
    fn partial_calls_become_lambdas() {
        let (program, resolutions) =
            resolve(r#"void f(string a, int b) { print a; } var g = f("x"); g(1);"#).unwrap();
        let declaration = &program.statements()[1];
        let call = match &declaration.kind {
            AstKind::VarDecl(decl) => decl.value.as_deref().unwrap(),
            _ => panic!("expected a declaration"),
        };
        let lambda = resolutions.conversion(call).unwrap();
        assert_eq!(
            lambda.to_string(),
            r#"(fun void f ((var int b)) (do (var string a "x") (do (print a))))"#
        );
        assert_eq!(resolutions.type_of(call), Some(&Type::METHOD));
        assert_eq!(resolutions.type_of(declaration), Some(&Type::METHOD));

        assert_eq!(
            error_kind(r#"void f(string a, int b) { } var g = f(1);"#),
            "TypeMismatch"
        );
    }
}
