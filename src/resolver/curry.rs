use std::rc::Rc;

use super::{Resolver, ResolverError};
use crate::{ast::*, types::Type};

impl Resolver<'_> {
    /// Rewrites a call that leaves trailing parameters unbound.
    ///
    /// The result is a lambda over the remaining parameters whose body
    /// declares each bound parameter with its argument, followed by a copy of
    /// the original body. The lambda is scoped and typed like any other node
    /// and recorded as the call's conversion, which the interpreter evaluates
    /// in place of the call.
    pub(super) fn curry(
        &mut self,
        call: &Ast,
        invoke: &FunctionInvoke,
        declaration: &MethodDecl,
    ) -> Result<Type, ResolverError> {
        let bound_count = invoke.arguments.len();
        let mut statements = declaration
            .parameters
            .iter()
            .zip(&invoke.arguments)
            .filter_map(|(parameter, argument)| match &parameter.kind {
                AstKind::VarDecl(decl) => Some(self.bind(parameter, decl, argument)),
                _ => None,
            })
            .collect::<Vec<_>>();
        statements.push(declaration.body.duplicate(self.ids));

        let remaining = declaration.parameters[bound_count..]
            .iter()
            .map(|parameter| parameter.duplicate(self.ids))
            .collect();
        let body = Ast::new(
            self.ids.next_id(),
            declaration.body.token.clone(),
            declaration.body.source_span,
            AstKind::Scope(ScopeBlock { statements }),
        );
        let lambda = Ast::new(
            self.ids.next_id(),
            call.token.clone(),
            call.source_span,
            AstKind::MethodDecl(Rc::new(MethodDecl {
                name: declaration.name.clone(),
                return_type: declaration.return_type.clone(),
                parameters: remaining,
                body: Box::new(body),
                kind: MethodKind::Curried,
            })),
        );
        tracing::debug!(
            method = %declaration.name,
            bound = bound_count,
            remaining = declaration.arity() - bound_count,
            "curried call"
        );

        let scope = self.resolutions.scope_of(call);
        self.in_scope(scope, |this| this.build(&lambda))?;
        let ty = self.resolve_node(&lambda)?;
        if self.resolutions.conversions.set_once(call, lambda).is_err() {
            tracing::trace!(node = ?call.id, "call already converted");
        }
        Ok(ty)
    }

    /// `type name = argument` standing in for a bound parameter. It keeps the
    /// parameter's position so the copied body still sees it as declared
    /// before its own statements.
    fn bind(&mut self, parameter: &Ast, decl: &VarDecl, argument: &Ast) -> Ast {
        Ast::new(
            self.ids.next_id(),
            parameter.token.clone(),
            parameter.source_span,
            AstKind::VarDecl(VarDecl {
                decl_type: decl.decl_type.clone(),
                name: decl.name.clone(),
                value: Some(Box::new(argument.duplicate(self.ids))),
            }),
        )
    }
}
