mod completion;
mod error;
mod memory_space;
mod method_value;
mod runtime_value;

use crate::{
    ast::*,
    resolver::{Resolutions, Resolver, ResolverError},
    scope::{Symbol, SymbolKind},
    source::SourceSpan,
    types::{promotable, Type},
    SourceReference,
};
use completion::{finish_call, AbruptCompletion, Completion};
pub use error::RuntimeError;
use itertools::Itertools;
pub use memory_space::{ClassTag, Link, MemorySpace, MemorySpaceRef};
pub use method_value::MethodValue;
pub use runtime_value::*;
use std::{io::Write, mem};

#[derive(Debug, Clone)]
pub struct Ctx<'p> {
    source_code: SourceReference,
    resolutions: &'p Resolutions,
}

pub struct Interpreter<'a, Stdout: Write> {
    space: MemorySpaceRef,
    globals: MemorySpaceRef,
    stdout: &'a mut Stdout,
}

/// A program that passed static analysis, with everything the resolver
/// learned about it.
pub struct PreparedProgram {
    program: Program,
    resolutions: Resolutions,
}
impl PreparedProgram {
    pub fn program(&self) -> &Program {
        &self.program
    }
    pub fn resolutions(&self) -> &Resolutions {
        &self.resolutions
    }
}

impl<'out, Stdout: Write> Interpreter<'out, Stdout> {
    pub fn new(stdout: &'out mut Stdout) -> Self {
        let globals = MemorySpace::new().wrap();
        Self {
            space: globals.clone(),
            globals,
            stdout,
        }
    }
    pub fn prepare(&mut self, mut program: Program) -> Result<PreparedProgram, ResolverError> {
        let resolutions = Resolver::resolve(&mut program)?;
        Ok(PreparedProgram {
            program,
            resolutions,
        })
    }
    pub fn interpret(&mut self, prepared: &PreparedProgram) -> Result<RuntimeValue, RuntimeError> {
        let ctx = Ctx {
            source_code: prepared.program.source_reference.clone(),
            resolutions: &prepared.resolutions,
        };
        let result = try_for_each_and_return_last(
            prepared.program.statements(),
            RuntimeValue::Nil,
            |statement| self.eval(statement, &ctx),
        );
        match result {
            Ok(value) | Err(AbruptCompletion::Return(value)) => Ok(value),
            Err(AbruptCompletion::Error(err)) => {
                tracing::debug!(error = %err, recoverable = err.is_recoverable(), "program stopped");
                Err(err)
            }
        }
    }
    fn eval(&mut self, node: &Ast, ctx: &Ctx) -> Completion {
        if let Some(converted) = ctx.resolutions.conversion(node) {
            return self.eval(converted, ctx);
        }
        match &node.kind {
            AstKind::Scope(block) => self.run_with_space(
                MemorySpace::new_with_parent(self.space.clone()).wrap(),
                |this| this.eval_block(&block.statements, ctx),
            ),
            AstKind::Expr(expr) => self.eval_expr(node, expr, ctx),
            AstKind::VarDecl(decl) => self.eval_var_decl(decl, ctx),
            AstKind::MethodDecl(method) => Ok(match method.kind {
                MethodKind::Named => RuntimeValue::Nil,
                MethodKind::Lambda | MethodKind::Curried => {
                    MethodValue::closure(method.clone(), self.space.clone()).into()
                }
            }),
            AstKind::Invoke(invoke) => self.eval_invoke(node, invoke, ctx),
            AstKind::Conditional(conditional) => self.eval_conditional(conditional, ctx),
            AstKind::While(stmt) => self.run_with_space(
                MemorySpace::new_with_parent(self.space.clone()).wrap(),
                |this| {
                    while this.eval(&stmt.predicate, ctx)?.cast_boolean() {
                        this.eval(&stmt.body, ctx)?;
                    }
                    Ok(RuntimeValue::Nil)
                },
            ),
            AstKind::For(stmt) => self.run_with_space(
                MemorySpace::new_with_parent(self.space.clone()).wrap(),
                |this| {
                    this.eval(&stmt.setup, ctx)?;
                    while this.eval(&stmt.predicate, ctx)?.cast_boolean() {
                        this.eval(&stmt.body, ctx)?;
                        this.eval(&stmt.update, ctx)?;
                    }
                    Ok(RuntimeValue::Nil)
                },
            ),
            AstKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value, ctx)?,
                    None => RuntimeValue::Nil,
                };
                Err(AbruptCompletion::Return(value))
            }
            AstKind::Print(value) => {
                let value = self.eval(value, ctx)?;
                writeln!(self.stdout, "{}", value).map_err(RuntimeError::Output)?;
                Ok(value)
            }
            AstKind::Class(_) => Ok(RuntimeValue::Nil),
            AstKind::ClassRef(reference) => {
                self.eval_dereferences(&reference.instance, &reference.dereferences, ctx)
            }
            AstKind::New(new) => self.eval_new(node, new, ctx),
            AstKind::TryCatch(stmt) => match self.eval(&stmt.try_body, ctx) {
                Err(AbruptCompletion::Error(err)) if err.is_recoverable() => {
                    tracing::debug!(error = %err, "caught runtime fault");
                    self.eval(&stmt.catch_body, ctx)
                }
                other => other,
            },
        }
    }
    fn eval_block(&mut self, statements: &[Ast], ctx: &Ctx) -> Completion {
        try_for_each_and_return_last(statements, RuntimeValue::Nil, |statement| {
            self.eval(statement, ctx)
        })
    }
    fn eval_expr(&mut self, node: &Ast, expr: &Expr, ctx: &Ctx) -> Completion {
        match expr {
            Expr::Literal(literal) => Ok(literal.into()),
            Expr::Identifier(name) | Expr::Link(name) => Ok(self.eval_identifier(node, name, ctx)?),
            Expr::Binary {
                left,
                operator: BinaryOperator::Assign,
                right,
            } => self.eval_assignment(left, right, ctx),
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left_val = self.eval(left, ctx)?;
                let right_val = self.eval(right, ctx)?;
                Ok(eval_binary(
                    node, *operator, (left, left_val), (right, right_val), ctx,
                )?)
            }
        }
    }
    fn eval_identifier(
        &self,
        node: &Ast,
        name: &str,
        ctx: &Ctx,
    ) -> Result<RuntimeValue, RuntimeError> {
        if let Some(value) = self.space.borrow().get(name) {
            return Ok(value);
        }
        ctx.resolutions
            .symbol_for(node, name)
            .and_then(|(_, symbol)| symbol.as_method())
            .map(|declaration| MethodValue::named(declaration.clone()).into())
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                found_at: node.source_span,
                source_code: ctx.source_code.clone(),
            })
    }
    fn eval_assignment(&mut self, target: &Ast, value: &Ast, ctx: &Ctx) -> Completion {
        let value = self.eval(value, ctx)?;
        match &target.kind {
            AstKind::Expr(Expr::Identifier(name)) => {
                let assigned = self.space.borrow_mut().assign(name, value);
                Ok(assigned.ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    found_at: target.source_span,
                    source_code: ctx.source_code.clone(),
                })?)
            }
            AstKind::ClassRef(reference) => self.assign_field(target, reference, value, ctx),
            _ => Err(RuntimeError::InvalidAssignmentTarget {
                found_at: target.source_span,
                source_code: ctx.source_code.clone(),
            }
            .into()),
        }
    }
    /// `a.b.c = value` stores `c` in the instance `a.b` evaluates to.
    fn assign_field(
        &mut self,
        target: &Ast,
        reference: &ClassRef,
        value: RuntimeValue,
        ctx: &Ctx,
    ) -> Completion {
        let invalid_target = || RuntimeError::InvalidAssignmentTarget {
            found_at: target.source_span,
            source_code: ctx.source_code.clone(),
        };
        let (field, path) = reference
            .dereferences
            .split_last()
            .ok_or_else(invalid_target)?;
        let name = match &field.kind {
            AstKind::Expr(Expr::Identifier(name)) => name,
            _ => return Err(invalid_target().into()),
        };
        let owner = self.eval_dereferences(&reference.instance, path, ctx)?;
        let owner_at = path
            .last()
            .map_or(reference.instance.source_span, |last| last.source_span);
        let instance = expect_instance(owner, owner_at, ctx)?;
        let assigned = instance.borrow_mut().set_field(name, value);
        Ok(assigned.ok_or_else(|| RuntimeError::UnknownField {
            name: name.clone(),
            found_at: field.source_span,
            source_code: ctx.source_code.clone(),
        })?)
    }
    fn eval_var_decl(&mut self, decl: &VarDecl, ctx: &Ctx) -> Completion {
        let value = match decl.value.as_deref() {
            None => RuntimeValue::Nil,
            Some(Ast {
                kind: AstKind::Expr(Expr::Link(target)),
                source_span,
                ..
            }) => {
                let link = MemorySpace::resolve_slot(&self.space, target).ok_or_else(|| {
                    RuntimeError::UndefinedVariable {
                        name: target.clone(),
                        found_at: *source_span,
                        source_code: ctx.source_code.clone(),
                    }
                })?;
                self.space.borrow_mut().define_link(&decl.name.name, link);
                return Ok(RuntimeValue::Nil);
            }
            Some(value) => self.eval(value, ctx)?,
        };
        self.space
            .borrow_mut()
            .define(&decl.name.name, value.clone());
        Ok(value)
    }
    fn eval_conditional(&mut self, conditional: &Conditional, ctx: &Ctx) -> Completion {
        let taken = match &conditional.predicate {
            Some(predicate) => self.eval(predicate, ctx)?.cast_boolean(),
            None => true,
        };
        if taken {
            self.eval(&conditional.body, ctx)?;
        } else if let Some(alternate) = &conditional.alternate {
            self.eval(alternate, ctx)?;
        }
        Ok(RuntimeValue::Nil)
    }
    fn eval_invoke(&mut self, node: &Ast, invoke: &FunctionInvoke, ctx: &Ctx) -> Completion {
        let callee = self.callee(node, &invoke.name, ctx)?;
        let arguments = self.eval_arguments(&invoke.arguments, ctx)?;
        Ok(self.call(&callee, arguments, node.source_span, ctx)?)
    }
    /// Declared methods are bound statically; anything else called by name
    /// must hold a method value at runtime.
    fn callee(&self, node: &Ast, name: &Identifier, ctx: &Ctx) -> Result<MethodValue, RuntimeError> {
        let declared = ctx
            .resolutions
            .symbol_for(node, &name.name)
            .and_then(|(_, symbol)| symbol.as_method());
        if let Some(declaration) = declared {
            return Ok(MethodValue::named(declaration.clone()));
        }
        let value = self.space.borrow().get(&name.name);
        match value {
            Some(RuntimeValue::Method(method)) => Ok(method),
            Some(other) => Err(RuntimeError::UncallableValue {
                actual_type: other.type_of(),
                found_at: name.source_span,
                source_code: ctx.source_code.clone(),
            }),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.name.clone(),
                found_at: name.source_span,
                source_code: ctx.source_code.clone(),
            }),
        }
    }
    fn eval_arguments(
        &mut self,
        arguments: &[Ast],
        ctx: &Ctx,
    ) -> Result<Vec<RuntimeValue>, AbruptCompletion> {
        arguments
            .iter()
            .map(|argument| self.eval(argument, ctx))
            .collect()
    }
    fn call(
        &mut self,
        callee: &MethodValue,
        arguments: Vec<RuntimeValue>,
        found_at: SourceSpan,
        ctx: &Ctx,
    ) -> Result<RuntimeValue, RuntimeError> {
        let declaration = callee.declaration();
        if arguments.len() != declaration.arity() {
            return Err(RuntimeError::UnexpectedCallArity {
                name: callee.name().to_string(),
                expected_arity: declaration.arity(),
                actual_arity: arguments.len(),
                found_at,
                source_code: ctx.source_code.clone(),
            });
        }
        let parent = callee
            .environment()
            .cloned()
            .unwrap_or_else(|| self.space.clone());
        let mut call_space = MemorySpace::new_with_parent(parent);
        for (parameter, argument) in declaration.parameter_decls().zip_eq(arguments) {
            let expected = Type::from_token(&parameter.decl_type);
            let actual = argument.static_type();
            if !promotable(&expected, &actual) {
                return Err(RuntimeError::ArgumentTypeMismatch {
                    name: callee.name().to_string(),
                    parameter: parameter.name.name.clone(),
                    expected,
                    actual,
                    found_at,
                    source_code: ctx.source_code.clone(),
                });
            }
            call_space.define(&parameter.name.name, argument);
        }
        tracing::trace!(method = callee.name(), "call");
        finish_call(self.run_with_space(call_space.wrap(), |this| {
            this.eval(&declaration.body, ctx)
        }))
    }
    /// Walks `root.a.b(...)`. Each segment runs inside the instance the
    /// previous one produced, while call arguments are still evaluated where
    /// the chain was written.
    fn eval_dereferences(&mut self, root: &Ast, dereferences: &[Ast], ctx: &Ctx) -> Completion {
        let caller = self.space.clone();
        let mut value = self.eval(root, ctx)?;
        let mut owner_at = root.source_span;
        for dereference in dereferences {
            let instance = expect_instance(value, owner_at, ctx)?;
            value = self.dereference(&instance, dereference, &caller, ctx)?;
            owner_at = dereference.source_span;
        }
        Ok(value)
    }
    fn dereference(
        &mut self,
        instance: &MemorySpaceRef,
        dereference: &Ast,
        caller: &MemorySpaceRef,
        ctx: &Ctx,
    ) -> Completion {
        match &dereference.kind {
            AstKind::Invoke(invoke) => {
                let arguments = self.run_with_space(caller.clone(), |this| {
                    this.eval_arguments(&invoke.arguments, ctx)
                })?;
                let callee = member_method(instance, &invoke.name, ctx)?;
                Ok(self.run_with_space(instance.clone(), |this| {
                    this.call(&callee, arguments, dereference.source_span, ctx)
                })?)
            }
            kind => {
                let name = match kind {
                    AstKind::Expr(Expr::Identifier(name)) => name.clone(),
                    _ => dereference.to_string(),
                };
                let field = instance.borrow().get_field(&name);
                Ok(field.ok_or_else(|| RuntimeError::UnknownField {
                    name,
                    found_at: dereference.source_span,
                    source_code: ctx.source_code.clone(),
                })?)
            }
        }
    }
    fn eval_new(&mut self, node: &Ast, new: &NewInstance, ctx: &Ctx) -> Completion {
        let class_name = &new.class_name;
        let (declaration, members) = ctx
            .resolutions
            .scopes()
            .lookup(ctx.resolutions.scope_of(node), &class_name.name)
            .and_then(|(_, symbol)| match &symbol.kind {
                SymbolKind::Class {
                    declaration,
                    members,
                } => Some((declaration.clone(), *members)),
                _ => None,
            })
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: class_name.name.clone(),
                found_at: class_name.source_span,
                source_code: ctx.source_code.clone(),
            })?;
        let arguments = self.eval_arguments(&new.arguments, ctx)?;
        let instance = MemorySpace::new_instance(
            self.globals.clone(),
            ClassTag {
                name: class_name.name.clone(),
                members,
            },
        )
        .wrap();
        tracing::debug!(class = %class_name, "new instance");

        let statements = declaration
            .body
            .as_scope()
            .map(|block| block.statements.as_slice())
            .unwrap_or_default();
        self.run_with_space(instance.clone(), |this| this.eval_block(statements, ctx))?;

        let init = ctx
            .resolutions
            .scopes()
            .get_local(members, "init")
            .and_then(Symbol::as_method);
        match init {
            Some(init) => {
                let init = MethodValue::named(init.clone());
                self.run_with_space(instance.clone(), |this| {
                    this.call(&init, arguments, node.source_span, ctx)
                })?;
            }
            None if !arguments.is_empty() => {
                return Err(RuntimeError::UnexpectedCallArity {
                    name: format!("{}.init", class_name),
                    expected_arity: 0,
                    actual_arity: arguments.len(),
                    found_at: node.source_span,
                    source_code: ctx.source_code.clone(),
                }
                .into())
            }
            None => {}
        }
        Ok(RuntimeValue::Instance(instance))
    }
    fn run_with_space<T, F: FnOnce(&mut Self) -> T>(&mut self, space: MemorySpaceRef, run: F) -> T {
        let previous = mem::replace(&mut self.space, space);
        let result = run(self);
        self.space = previous;
        result
    }
}

fn expect_instance(
    value: RuntimeValue,
    found_at: SourceSpan,
    ctx: &Ctx,
) -> Result<MemorySpaceRef, RuntimeError> {
    match value {
        RuntimeValue::Instance(space) => Ok(space),
        RuntimeValue::Nil => Err(RuntimeError::NilDereference {
            found_at,
            source_code: ctx.source_code.clone(),
        }),
        other => Err(RuntimeError::NotAnInstance {
            actual_type: other.type_of(),
            found_at,
            source_code: ctx.source_code.clone(),
        }),
    }
}

/// Methods declared in the class body win over method values stored in
/// fields.
fn member_method(
    instance: &MemorySpaceRef,
    name: &Identifier,
    ctx: &Ctx,
) -> Result<MethodValue, RuntimeError> {
    let space = instance.borrow();
    let declared = space
        .class()
        .and_then(|class| ctx.resolutions.scopes().get_local(class.members, &name.name))
        .and_then(Symbol::as_method);
    if let Some(declaration) = declared {
        return Ok(MethodValue::named(declaration.clone()));
    }
    match space.get_field(&name.name) {
        Some(RuntimeValue::Method(method)) => Ok(method),
        Some(other) => Err(RuntimeError::UncallableValue {
            actual_type: other.type_of(),
            found_at: name.source_span,
            source_code: ctx.source_code.clone(),
        }),
        None => Err(RuntimeError::UnknownField {
            name: name.name.clone(),
            found_at: name.source_span,
            source_code: ctx.source_code.clone(),
        }),
    }
}

fn eval_binary(
    node: &Ast,
    operator: BinaryOperator,
    (left, left_val): (&Ast, RuntimeValue),
    (right, right_val): (&Ast, RuntimeValue),
    ctx: &Ctx,
) -> Result<RuntimeValue, RuntimeError> {
    let make_err = move |operand_loc: SourceSpan| {
        move |expected: ValueDescriptor, actual: ValueType| RuntimeError::OperandTypeError {
            expected_type: expected,
            actual_type: actual,
            operand_loc,
            operator: operator.to_string(),
            operator_loc: node.token.span,
            source_code: ctx.source_code.clone(),
        }
    };
    let make_left_err = make_err(left.source_span);
    let make_right_err = make_err(right.source_span);
    let numeric = |on_ints: fn(i64, i64) -> i64,
                   on_floats: fn(f64, f64) -> f64|
     -> Result<RuntimeValue, RuntimeError> {
        match (&left_val, &right_val) {
            (RuntimeValue::Int(a), RuntimeValue::Int(b)) => Ok(on_ints(*a, *b).into()),
            _ => Ok(on_floats(
                left_val.cast_float(&make_left_err)?,
                right_val.cast_float(&make_right_err)?,
            )
            .into()),
        }
    };
    match operator {
        BinaryOperator::Assign => Ok(right_val),
        BinaryOperator::Plus => match (&left_val, &right_val) {
            (RuntimeValue::String(_), _) | (_, RuntimeValue::String(_)) => {
                Ok(format!("{}{}", left_val, right_val).into())
            }
            _ => numeric(i64::wrapping_add, |a, b| a + b),
        },
        BinaryOperator::Minus => numeric(i64::wrapping_sub, |a, b| a - b),
        BinaryOperator::Multiply => numeric(i64::wrapping_mul, |a, b| a * b),
        BinaryOperator::Divide => match (&left_val, &right_val) {
            (RuntimeValue::Int(_), RuntimeValue::Int(0)) => Err(RuntimeError::DivisionByZero {
                found_at: right.source_span,
                source_code: ctx.source_code.clone(),
            }),
            _ => numeric(i64::wrapping_div, |a, b| a / b),
        },
        BinaryOperator::Xor => match (&left_val, &right_val) {
            (RuntimeValue::Int(a), RuntimeValue::Int(b)) => Ok((a ^ b).into()),
            (RuntimeValue::Boolean(a), RuntimeValue::Boolean(b)) => Ok((a ^ b).into()),
            (RuntimeValue::Int(_) | RuntimeValue::Boolean(_), other) => {
                Err(make_right_err(left_val.type_of().into(), other.type_of()))
            }
            (other, _) => Err(make_left_err(
                ValueDescriptor::AnyOf(vec![ValueType::Int, ValueType::Boolean]),
                other.type_of(),
            )),
        },
        BinaryOperator::Greater | BinaryOperator::Less => {
            let ordering = match (&left_val, &right_val) {
                (RuntimeValue::String(a), RuntimeValue::String(b)) => a.partial_cmp(b),
                _ => left_val
                    .cast_float(&make_left_err)?
                    .partial_cmp(&right_val.cast_float(&make_right_err)?),
            };
            let wanted = match operator {
                BinaryOperator::Greater => std::cmp::Ordering::Greater,
                _ => std::cmp::Ordering::Less,
            };
            Ok((ordering == Some(wanted)).into())
        }
        BinaryOperator::EqualTo => Ok((left_val == right_val).into()),
        BinaryOperator::NotEqualTo => Ok((left_val != right_val).into()),
        BinaryOperator::And => Ok((left_val.cast_boolean() && right_val.cast_boolean()).into()),
        BinaryOperator::Or | BinaryOperator::OrElse => {
            Ok((left_val.cast_boolean() || right_val.cast_boolean()).into())
        }
    }
}

fn try_for_each_and_return_last<In, F: FnMut(&In) -> Completion>(
    items: &[In],
    default: RuntimeValue,
    mut run: F,
) -> Completion {
    for item in &items[..items.len().max(1) - 1] {
        run(item)?;
    }
    match items.last() {
        Some(item) => run(item),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::Parser, tokenizer::Tokenizer};
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (String, Option<RuntimeError>) {
        let source_reference = SourceReference::new("test".into(), source.into());
        let tokens = Tokenizer::tokenize(source_reference.clone()).unwrap();
        let program = Parser::parse(tokens, source_reference).unwrap();
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let prepared = interpreter.prepare(program).unwrap();
        let error = interpreter.interpret(&prepared).err();
        (String::from_utf8(output).unwrap(), error)
    }

    fn output(source: &str) -> String {
        let (output, error) = run(source);
        assert!(error.is_none(), "unexpected error: {:?}", error);
        output
    }

    fn error_kind(source: &str) -> &'static str {
        match run(source).1 {
            Some(err) => (&err).into(),
            None => "ok",
        }
    }

    #[test]
    fn arithmetic_follows_operand_kinds() {
        assert_eq!(
            output("print 7 / 2; print 7.0 / 2; print 1 + 'a'; print 6 ^ 3; print true ^ true;"),
            "3\n3.5\n1a\n5\nfalse\n"
        );
        assert_eq!(output("print 2 + 3 * 4;"), "14\n");
    }

    #[test]
    fn logical_operators_evaluate_both_sides() {
        assert_eq!(
            output(
                "int n = 0; bool t() { n = n + 1; return true; } \
                 if (t() || t()) { print n; } if (t() & t()) { print n; }"
            ),
            "2\n4\n"
        );
    }

    #[test]
    fn lambdas_capture_their_space() {
        assert_eq!(
            output(
                "int count = 0; \
                 var counter = fun() -> { count = count + 1; return count; }; \
                 counter(); counter(); print counter();"
            ),
            "3\n"
        );
    }

    #[test]
    fn named_methods_run_in_the_callers_space() {
        assert_eq!(
            output("void show(int depth) { if (depth > 0) { show(depth - 1); } print depth; } show(2);"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn links_alias_their_target() {
        assert_eq!(
            output("int y = 1; int x = &y; x = 5; print y; y = 6; print x;"),
            "5\n6\n"
        );
    }

    #[test]
    fn links_bind_the_slot_they_were_declared_against() {
        assert_eq!(
            output("int x = 1; { int y = &x; int x = &y; print x; x = 2; } print x;"),
            "1\n2\n"
        );
        assert_eq!(
            output("int x = 1; { int y = &x; int x = 5; print y; y = 3; print x; } print x;"),
            "1\n5\n3\n"
        );
    }

    #[test]
    fn instances_keep_separate_fields() {
        assert_eq!(
            output(
                "class point { int x = 0; void bump() { x = x + 1; } } \
                 point a = new point(); point b = new point(); \
                 a.bump(); a.bump(); b.bump(); print a.x; print b.x; print a;"
            ),
            "2\n1\n<point instance>\n"
        );
    }

    #[test]
    fn try_catches_recoverable_faults_only() {
        assert_eq!(
            output("class t { int x; } t item; try { print item.x; } catch { print 'caught'; }"),
            "caught\n"
        );
        assert_eq!(
            output("try { print 1 / 0; } catch { print 'zero'; }"),
            "zero\n"
        );
        assert_eq!(
            error_kind(
                "var f = fun() -> { }; void g(method m) { m(1); } \
                 try { g(f); } catch { print 'unreachable'; }"
            ),
            "UnexpectedCallArity"
        );
    }

    #[test]
    fn argument_types_are_checked_at_call_time() {
        assert_eq!(
            error_kind("void f(int x) { } var g = fun(method m) -> { m('text'); }; g(f);"),
            "ArgumentTypeMismatch"
        );
    }

    #[test]
    fn curried_calls_bind_leading_arguments() {
        assert_eq!(
            output(
                "void greet(string who, int times) { print who; print times; } \
                 var hello = greet('anton'); hello(1); hello(2);"
            ),
            "anton\n1\nanton\n2\n"
        );
    }
}
