use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

use crate::{
    side_table::{Unique, UniqueId, UniqueIdGenerator},
    source::SourceSpan,
    tokenizer::Token,
    SourceReference,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub source_span: SourceSpan,
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Assign,
    Plus,
    Minus,
    Multiply,
    Divide,
    Xor,
    Greater,
    Less,
    EqualTo,
    NotEqualTo,
    And,
    Or,
    OrElse,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Greater | Self::Less | Self::EqualTo | Self::NotEqualTo
        )
    }
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::OrElse)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Xor => "^",
            Self::Greater => ">",
            Self::Less => "<",
            Self::EqualTo => "==",
            Self::NotEqualTo => "!=",
            Self::And => "&",
            Self::Or => "|",
            Self::OrElse => "||",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Str(value) => write!(f, "{:?}", value),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Nil => f.write_str("nil"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Binary {
        left: Box<Ast>,
        operator: BinaryOperator,
        right: Box<Ast>,
    },
    Literal(Literal),
    Identifier(String),
    /// `&name` on the right of a declaration.
    Link(String),
}

#[derive(Debug, Clone)]
pub struct ScopeBlock {
    pub statements: Vec<Ast>,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub decl_type: Token,
    pub name: Identifier,
    pub value: Option<Box<Ast>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Named,
    Lambda,
    /// Synthesized by the resolver for a call with missing trailing arguments.
    Curried,
}

#[derive(Debug)]
pub struct MethodDecl {
    pub name: Identifier,
    /// `None` for lambdas, whose return type is inferred.
    pub return_type: Option<Token>,
    /// `VarDecl` nodes without values.
    pub parameters: Vec<Ast>,
    pub body: Box<Ast>,
    pub kind: MethodKind,
}

impl MethodDecl {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
    pub fn parameter_decls(&self) -> impl Iterator<Item = &VarDecl> {
        self.parameters.iter().filter_map(|parameter| match &parameter.kind {
            AstKind::VarDecl(decl) => Some(decl),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FunctionInvoke {
    pub name: Identifier,
    pub arguments: Vec<Ast>,
}

#[derive(Debug, Clone)]
pub struct Conditional {
    /// `None` on a trailing `else`.
    pub predicate: Option<Box<Ast>>,
    pub body: Box<Ast>,
    pub alternate: Option<Box<Ast>>,
}

#[derive(Debug, Clone)]
pub struct WhileLoop {
    pub predicate: Box<Ast>,
    pub body: Box<Ast>,
}

#[derive(Debug, Clone)]
pub struct ForLoop {
    pub setup: Box<Ast>,
    pub predicate: Box<Ast>,
    pub update: Box<Ast>,
    pub body: Box<Ast>,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: Identifier,
    pub body: Box<Ast>,
}

/// `instance.a.b(...)`: a root instance followed by field reads or method
/// calls, each evaluated inside the instance produced by the previous one.
#[derive(Debug, Clone)]
pub struct ClassRef {
    pub instance: Box<Ast>,
    pub dereferences: Vec<Ast>,
}

#[derive(Debug, Clone)]
pub struct NewInstance {
    pub class_name: Identifier,
    pub arguments: Vec<Ast>,
}

#[derive(Debug, Clone)]
pub struct TryCatch {
    pub try_body: Box<Ast>,
    pub catch_body: Box<Ast>,
}

#[derive(Debug, Clone)]
pub enum AstKind {
    Scope(ScopeBlock),
    Expr(Expr),
    VarDecl(VarDecl),
    MethodDecl(Rc<MethodDecl>),
    Invoke(FunctionInvoke),
    Conditional(Conditional),
    While(WhileLoop),
    For(ForLoop),
    Return(Option<Box<Ast>>),
    Print(Box<Ast>),
    Class(Rc<ClassDecl>),
    ClassRef(ClassRef),
    New(NewInstance),
    TryCatch(TryCatch),
}

/// A syntax tree node. Resolver output (types, scopes, curry rewrites) is
/// kept in side tables keyed by `id` rather than inside the node.
#[derive(Debug, Clone)]
pub struct Ast {
    pub id: UniqueId,
    pub token: Token,
    pub source_span: SourceSpan,
    pub kind: AstKind,
}

impl Unique for Ast {
    fn id(&self) -> UniqueId {
        self.id
    }
}

impl Ast {
    pub fn new(id: UniqueId, token: Token, source_span: SourceSpan, kind: AstKind) -> Self {
        Self {
            id,
            token,
            source_span,
            kind,
        }
    }

    pub fn as_scope(&self) -> Option<&ScopeBlock> {
        match &self.kind {
            AstKind::Scope(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Rc<MethodDecl>> {
        match &self.kind {
            AstKind::MethodDecl(method) => Some(method),
            _ => None,
        }
    }

    /// Whether a block needs a `;` after this statement.
    pub fn expects_semicolon(&self) -> bool {
        !matches!(
            self.kind,
            AstKind::MethodDecl(_)
                | AstKind::Conditional(_)
                | AstKind::While(_)
                | AstKind::For(_)
                | AstKind::Class(_)
                | AstKind::TryCatch(_)
                | AstKind::Scope(_)
        )
    }

    /// Deep copy carrying fresh node ids, so the copy can be scoped and typed
    /// independently of the original.
    pub fn duplicate(&self, ids: &mut UniqueIdGenerator) -> Ast {
        let boxed = |ast: &Ast, ids: &mut UniqueIdGenerator| Box::new(ast.duplicate(ids));
        let kind = match &self.kind {
            AstKind::Scope(block) => AstKind::Scope(ScopeBlock {
                statements: duplicate_all(&block.statements, ids),
            }),
            AstKind::Expr(Expr::Binary {
                left,
                operator,
                right,
            }) => AstKind::Expr(Expr::Binary {
                left: boxed(left, ids),
                operator: *operator,
                right: boxed(right, ids),
            }),
            AstKind::Expr(expr) => AstKind::Expr(expr.clone()),
            AstKind::VarDecl(decl) => AstKind::VarDecl(VarDecl {
                decl_type: decl.decl_type.clone(),
                name: decl.name.clone(),
                value: decl.value.as_ref().map(|value| boxed(value, ids)),
            }),
            AstKind::MethodDecl(method) => AstKind::MethodDecl(Rc::new(MethodDecl {
                name: method.name.clone(),
                return_type: method.return_type.clone(),
                parameters: duplicate_all(&method.parameters, ids),
                body: boxed(&method.body, ids),
                kind: method.kind,
            })),
            AstKind::Invoke(invoke) => AstKind::Invoke(FunctionInvoke {
                name: invoke.name.clone(),
                arguments: duplicate_all(&invoke.arguments, ids),
            }),
            AstKind::Conditional(conditional) => AstKind::Conditional(Conditional {
                predicate: conditional
                    .predicate
                    .as_ref()
                    .map(|predicate| boxed(predicate, ids)),
                body: boxed(&conditional.body, ids),
                alternate: conditional
                    .alternate
                    .as_ref()
                    .map(|alternate| boxed(alternate, ids)),
            }),
            AstKind::While(stmt) => AstKind::While(WhileLoop {
                predicate: boxed(&stmt.predicate, ids),
                body: boxed(&stmt.body, ids),
            }),
            AstKind::For(stmt) => AstKind::For(ForLoop {
                setup: boxed(&stmt.setup, ids),
                predicate: boxed(&stmt.predicate, ids),
                update: boxed(&stmt.update, ids),
                body: boxed(&stmt.body, ids),
            }),
            AstKind::Return(value) => {
                AstKind::Return(value.as_ref().map(|value| boxed(value, ids)))
            }
            AstKind::Print(value) => AstKind::Print(boxed(value, ids)),
            AstKind::Class(class) => AstKind::Class(Rc::new(ClassDecl {
                name: class.name.clone(),
                body: boxed(&class.body, ids),
            })),
            AstKind::ClassRef(reference) => AstKind::ClassRef(ClassRef {
                instance: boxed(&reference.instance, ids),
                dereferences: duplicate_all(&reference.dereferences, ids),
            }),
            AstKind::New(new) => AstKind::New(NewInstance {
                class_name: new.class_name.clone(),
                arguments: duplicate_all(&new.arguments, ids),
            }),
            AstKind::TryCatch(stmt) => AstKind::TryCatch(TryCatch {
                try_body: boxed(&stmt.try_body, ids),
                catch_body: boxed(&stmt.catch_body, ids),
            }),
        };
        Ast::new(ids.next_id(), self.token.clone(), self.source_span, kind)
    }
}

fn duplicate_all(nodes: &[Ast], ids: &mut UniqueIdGenerator) -> Vec<Ast> {
    nodes.iter().map(|node| node.duplicate(ids)).collect()
}

fn write_list(f: &mut std::fmt::Formatter<'_>, nodes: &[Ast]) -> std::fmt::Result {
    f.write_str("(")?;
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", node)?;
    }
    f.write_str(")")
}

impl Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            AstKind::Scope(block) => {
                f.write_str("(do")?;
                for statement in &block.statements {
                    write!(f, " {}", statement)?;
                }
                f.write_str(")")
            }
            AstKind::Expr(Expr::Binary {
                left,
                operator,
                right,
            }) => write!(f, "({} {} {})", operator, left, right),
            AstKind::Expr(Expr::Literal(literal)) => Display::fmt(literal, f),
            AstKind::Expr(Expr::Identifier(name)) => f.write_str(name),
            AstKind::Expr(Expr::Link(name)) => write!(f, "&{}", name),
            AstKind::VarDecl(decl) => match &decl.value {
                Some(value) => write!(f, "(var {} {} {})", decl.decl_type, decl.name, value),
                None => write!(f, "(var {} {})", decl.decl_type, decl.name),
            },
            AstKind::MethodDecl(method) => {
                match &method.return_type {
                    Some(return_type) => write!(f, "(fun {} {} ", return_type, method.name)?,
                    None => write!(f, "(fun {} ", method.name)?,
                }
                write_list(f, &method.parameters)?;
                write!(f, " {})", method.body)
            }
            AstKind::Invoke(invoke) => {
                write!(f, "(call {} ", invoke.name)?;
                write_list(f, &invoke.arguments)?;
                f.write_str(")")
            }
            AstKind::Conditional(conditional) => {
                match &conditional.predicate {
                    Some(predicate) => write!(f, "(if {} {}", predicate, conditional.body)?,
                    None => write!(f, "(else {}", conditional.body)?,
                }
                if let Some(alternate) = &conditional.alternate {
                    write!(f, " {}", alternate)?;
                }
                f.write_str(")")
            }
            AstKind::While(stmt) => write!(f, "(while {} {})", stmt.predicate, stmt.body),
            AstKind::For(stmt) => write!(
                f,
                "(for {} {} {} {})",
                stmt.setup, stmt.predicate, stmt.update, stmt.body
            ),
            AstKind::Return(Some(value)) => write!(f, "(return {})", value),
            AstKind::Return(None) => f.write_str("(return)"),
            AstKind::Print(value) => write!(f, "(print {})", value),
            AstKind::Class(class) => write!(f, "(class {} {})", class.name, class.body),
            AstKind::ClassRef(reference) => {
                write!(f, "(. {}", reference.instance)?;
                for dereference in &reference.dereferences {
                    write!(f, " {}", dereference)?;
                }
                f.write_str(")")
            }
            AstKind::New(new) => {
                write!(f, "(new {} ", new.class_name)?;
                write_list(f, &new.arguments)?;
                f.write_str(")")
            }
            AstKind::TryCatch(stmt) => write!(f, "(try {} {})", stmt.try_body, stmt.catch_body),
        }
    }
}

/// A parsed program: the top level scope node plus the id generator its
/// nodes were numbered from.
pub struct Program {
    pub root: Ast,
    pub source_reference: SourceReference,
    pub node_ids: UniqueIdGenerator,
}

impl Program {
    pub fn statements(&self) -> &[Ast] {
        self.root
            .as_scope()
            .map(|block| block.statements.as_slice())
            .unwrap_or_default()
    }
}

impl Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("root", &self.root).finish()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in self.statements() {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
