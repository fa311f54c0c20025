//! Hand construction of syntax trees.
//!
//! Hosts that generate scripts programmatically, and the evaluator's own
//! tests, build trees through these helpers instead of a parser. Every node
//! gets [`Position::DUMMY`] unless built with [`at`].

use std::rc::Rc;

use crate::ast::{
    Block, CaseBranch, ClassDecl, Decl, EnumDecl, ExceptClause, ExceptHandler, Expr, ExprKind,
    FieldDecl, ForDirection, FunctionDecl, InterfaceDecl, LambdaExpr, MethodBinding,
    OperatorDecl, Param, Program, PropertyDecl, RecordDecl, RoutineKind, Stmt, StmtKind,
    TryStmt,
};
use crate::{BinaryOp, Name, OperatorSymbol, Position, TypeExpr, UnaryOp};

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Position::DUMMY)
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Position::DUMMY)
}

/// Re-position an expression.
pub fn at(mut e: Expr, line: u32, column: u32) -> Expr {
    e.pos = Position::new(line, column);
    e
}

/// Re-position a statement.
pub fn stmt_at(mut s: Stmt, line: u32, column: u32) -> Stmt {
    s.pos = Position::new(line, column);
    s
}

// Types

pub fn ty(name: &str) -> TypeExpr {
    TypeExpr::named(name)
}

pub fn array_of(element: TypeExpr) -> TypeExpr {
    TypeExpr::dynamic_array(element)
}

pub fn static_array(low: i64, high: i64, element: TypeExpr) -> TypeExpr {
    TypeExpr::static_array(low, high, element)
}

// Expressions

pub fn int(v: i64) -> Expr {
    expr(ExprKind::Int(v))
}

pub fn float(v: f64) -> Expr {
    expr(ExprKind::Float(v))
}

pub fn string(v: &str) -> Expr {
    expr(ExprKind::Str(v.to_string()))
}

pub fn boolean(v: bool) -> Expr {
    expr(ExprKind::Bool(v))
}

pub fn nil() -> Expr {
    expr(ExprKind::Nil)
}

pub fn ident(name: &str) -> Expr {
    expr(ExprKind::Ident(Name::new(name)))
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: Box::new(callee),
        args,
    })
}

/// `Name(args)`
pub fn call_fn(name: &str, args: Vec<Expr>) -> Expr {
    call(ident(name), args)
}

pub fn member(object: Expr, name: &str) -> Expr {
    expr(ExprKind::Member {
        object: Box::new(object),
        member: Name::new(name),
    })
}

/// `object.Method(args)`
pub fn method_call(object: Expr, name: &str, args: Vec<Expr>) -> Expr {
    call(member(object, name), args)
}

/// `TClass.Create(args)`
pub fn new_object(class: &str, args: Vec<Expr>) -> Expr {
    method_call(ident(class), "Create", args)
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    expr(ExprKind::Index {
        base: Box::new(base),
        index: Box::new(idx),
    })
}

/// `base[i, j, ...]`, nested left to right the way the parser emits it.
pub fn index_multi(base: Expr, indices: Vec<Expr>) -> Expr {
    indices.into_iter().fold(base, index)
}

pub fn array_lit(elements: Vec<Expr>) -> Expr {
    expr(ExprKind::ArrayLit {
        elements,
        annotation: None,
    })
}

pub fn typed_array_lit(elements: Vec<Expr>, annotation: TypeExpr) -> Expr {
    expr(ExprKind::ArrayLit {
        elements,
        annotation: Some(annotation),
    })
}

pub fn record_lit(type_name: Option<&str>, fields: Vec<(&str, Expr)>) -> Expr {
    expr(ExprKind::RecordLit {
        type_name: type_name.map(Name::new),
        fields: fields
            .into_iter()
            .map(|(n, e)| (Name::new(n), e))
            .collect(),
    })
}

pub fn lambda(params: Vec<Param>, return_type: Option<TypeExpr>, body: Vec<Stmt>) -> Expr {
    expr(ExprKind::Lambda(Rc::new(LambdaExpr {
        params,
        return_type,
        body: Block::new(body),
        pos: Position::DUMMY,
    })))
}

/// `lambda (params) => value`: a lambda whose body assigns `Result`.
pub fn lambda_expr(params: Vec<Param>, return_type: TypeExpr, value: Expr) -> Expr {
    lambda(
        params,
        Some(return_type),
        vec![assign(ident("Result"), value)],
    )
}

pub fn address_of(target: Expr) -> Expr {
    expr(ExprKind::AddressOf(Box::new(target)))
}

pub fn is_(e: Expr, type_name: &str) -> Expr {
    expr(ExprKind::Is {
        expr: Box::new(e),
        type_name: Name::new(type_name),
    })
}

pub fn as_(e: Expr, type_name: &str) -> Expr {
    expr(ExprKind::As {
        expr: Box::new(e),
        type_name: Name::new(type_name),
    })
}

pub fn implements(e: Expr, interface: &str) -> Expr {
    expr(ExprKind::Implements {
        expr: Box::new(e),
        interface: Name::new(interface),
    })
}

pub fn inherited(method: Option<&str>, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Inherited {
        method: method.map(Name::new),
        args,
    })
}

// Statements

pub fn var(name: &str, ty: Option<TypeExpr>, init: Option<Expr>) -> Stmt {
    stmt(StmtKind::Var {
        names: vec![Name::new(name)],
        ty,
        init,
    })
}

/// `var name: T;`
pub fn var_typed(name: &str, ty: TypeExpr) -> Stmt {
    var(name, Some(ty), None)
}

/// `var name := init;`
pub fn var_init(name: &str, init: Expr) -> Stmt {
    var(name, None, Some(init))
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    stmt(StmtKind::Assign { target, value })
}

/// `name := value`
pub fn set(name: &str, value: Expr) -> Stmt {
    assign(ident(name), value)
}

pub fn compound_assign(op: BinaryOp, target: Expr, value: Expr) -> Stmt {
    stmt(StmtKind::CompoundAssign { op, target, value })
}

pub fn expr_stmt(e: Expr) -> Stmt {
    stmt(StmtKind::Expr(e))
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(Block::new(stmts)))
}

pub fn if_(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    })
}

pub fn while_(cond: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::While {
        cond,
        body: Box::new(body),
    })
}

pub fn repeat(body: Vec<Stmt>, until: Expr) -> Stmt {
    stmt(StmtKind::Repeat {
        body: Block::new(body),
        until,
    })
}

pub fn for_to(var: &str, start: Expr, end: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::For {
        var: Name::new(var),
        start,
        end,
        direction: ForDirection::To,
        body: Box::new(body),
    })
}

pub fn for_downto(var: &str, start: Expr, end: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::For {
        var: Name::new(var),
        start,
        end,
        direction: ForDirection::DownTo,
        body: Box::new(body),
    })
}

pub fn for_in(var: &str, collection: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::ForIn {
        var: Name::new(var),
        collection,
        body: Box::new(body),
    })
}

pub fn case(selector: Expr, branches: Vec<(Vec<Expr>, Stmt)>, else_branch: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::Case {
        selector,
        branches: branches
            .into_iter()
            .map(|(values, body)| CaseBranch { values, body })
            .collect(),
        else_branch: else_branch.map(Block::new),
    })
}

pub fn break_() -> Stmt {
    stmt(StmtKind::Break)
}

pub fn continue_() -> Stmt {
    stmt(StmtKind::Continue)
}

pub fn exit(value: Option<Expr>) -> Stmt {
    stmt(StmtKind::Exit(value))
}

pub fn raise(e: Expr) -> Stmt {
    stmt(StmtKind::Raise(Some(e)))
}

/// Bare `raise;`
pub fn reraise() -> Stmt {
    stmt(StmtKind::Raise(None))
}

/// `on [var:] Class do body`
pub fn on(variable: Option<&str>, class_name: &str, body: Stmt) -> ExceptHandler {
    ExceptHandler {
        variable: variable.map(Name::new),
        class_name: Some(Name::new(class_name)),
        body,
    }
}

pub fn try_stmt(body: Vec<Stmt>, except: Option<ExceptClause>, finally: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::Try(TryStmt {
        body: Block::new(body),
        except,
        finally: finally.map(Block::new),
    }))
}

/// `try body except handlers [else ...] end`
pub fn try_except(body: Vec<Stmt>, handlers: Vec<ExceptHandler>, else_block: Option<Vec<Stmt>>) -> Stmt {
    try_stmt(
        body,
        Some(ExceptClause {
            handlers,
            else_block: else_block.map(Block::new),
        }),
        None,
    )
}

/// `try body except stmts end`: catches everything.
pub fn try_catch_all(body: Vec<Stmt>, handler: Vec<Stmt>) -> Stmt {
    try_except(body, Vec::new(), Some(handler))
}

pub fn try_finally(body: Vec<Stmt>, finally: Vec<Stmt>) -> Stmt {
    try_stmt(body, None, Some(finally))
}

// Routines

/// Fluent construction of a [`FunctionDecl`].
pub struct RoutineBuilder {
    decl: FunctionDecl,
}

fn routine(name: &str, kind: RoutineKind, params: Vec<Param>, return_type: Option<TypeExpr>) -> RoutineBuilder {
    RoutineBuilder {
        decl: FunctionDecl {
            name: Name::new(name),
            kind,
            params,
            return_type,
            body: None,
            is_class_method: false,
            binding: MethodBinding::Static,
            pos: Position::DUMMY,
        },
    }
}

pub fn function(name: &str, params: Vec<Param>, return_type: TypeExpr) -> RoutineBuilder {
    routine(name, RoutineKind::Function, params, Some(return_type))
}

pub fn procedure(name: &str, params: Vec<Param>) -> RoutineBuilder {
    routine(name, RoutineKind::Procedure, params, None)
}

pub fn constructor(name: &str, params: Vec<Param>) -> RoutineBuilder {
    routine(name, RoutineKind::Constructor, params, None)
}

pub fn destructor(name: &str) -> RoutineBuilder {
    routine(name, RoutineKind::Destructor, Vec::new(), None)
}

impl RoutineBuilder {
    #[must_use]
    pub fn virtual_(mut self) -> Self {
        self.decl.binding = MethodBinding::Virtual;
        self
    }

    #[must_use]
    pub fn override_(mut self) -> Self {
        self.decl.binding = MethodBinding::Override;
        self
    }

    #[must_use]
    pub fn reintroduce(mut self) -> Self {
        self.decl.binding = MethodBinding::Reintroduce;
        self
    }

    #[must_use]
    pub fn class_method(mut self) -> Self {
        self.decl.is_class_method = true;
        self
    }

    /// Finish as an abstract method (no body).
    pub fn abstract_(mut self) -> Rc<FunctionDecl> {
        self.decl.binding = MethodBinding::Abstract;
        Rc::new(self.decl)
    }

    pub fn body(mut self, stmts: Vec<Stmt>) -> Rc<FunctionDecl> {
        self.decl.body = Some(Block::new(stmts));
        Rc::new(self.decl)
    }
}

// Type declarations

/// Fluent construction of a [`ClassDecl`].
pub struct ClassBuilder {
    decl: ClassDecl,
}

pub fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        decl: ClassDecl {
            name: Name::new(name),
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            operators: Vec::new(),
            is_abstract: false,
            pos: Position::DUMMY,
        },
    }
}

impl ClassBuilder {
    #[must_use]
    pub fn parent(mut self, parent: &str) -> Self {
        self.decl.parent = Some(Name::new(parent));
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.decl.interfaces.push(Name::new(interface));
        self
    }

    #[must_use]
    pub fn field(mut self, name: &str, ty: TypeExpr) -> Self {
        self.decl.fields.push(FieldDecl {
            name: Name::new(name),
            ty,
            init: None,
        });
        self
    }

    #[must_use]
    pub fn field_init(mut self, name: &str, ty: TypeExpr, init: Expr) -> Self {
        self.decl.fields.push(FieldDecl {
            name: Name::new(name),
            ty,
            init: Some(init),
        });
        self
    }

    #[must_use]
    pub fn method(mut self, method: Rc<FunctionDecl>) -> Self {
        self.decl.methods.push(method);
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.decl.properties.push(property);
        self
    }

    #[must_use]
    pub fn operator(mut self, operator: OperatorDecl) -> Self {
        self.decl.operators.push(operator);
        self
    }

    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        self.decl.is_abstract = true;
        self
    }

    pub fn build(self) -> Decl {
        Decl::Class(self.decl)
    }
}

/// Fluent construction of a [`RecordDecl`].
pub struct RecordBuilder {
    decl: RecordDecl,
}

pub fn record(name: &str) -> RecordBuilder {
    RecordBuilder {
        decl: RecordDecl {
            name: Name::new(name),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            operators: Vec::new(),
            pos: Position::DUMMY,
        },
    }
}

impl RecordBuilder {
    #[must_use]
    pub fn field(mut self, name: &str, ty: TypeExpr) -> Self {
        self.decl.fields.push(FieldDecl {
            name: Name::new(name),
            ty,
            init: None,
        });
        self
    }

    #[must_use]
    pub fn field_init(mut self, name: &str, ty: TypeExpr, init: Expr) -> Self {
        self.decl.fields.push(FieldDecl {
            name: Name::new(name),
            ty,
            init: Some(init),
        });
        self
    }

    #[must_use]
    pub fn method(mut self, method: Rc<FunctionDecl>) -> Self {
        self.decl.methods.push(method);
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.decl.properties.push(property);
        self
    }

    #[must_use]
    pub fn operator(mut self, operator: OperatorDecl) -> Self {
        self.decl.operators.push(operator);
        self
    }

    pub fn build(self) -> Decl {
        Decl::Record(self.decl)
    }
}

/// `property name: ty read r write w;`
pub fn property(name: &str, ty: TypeExpr, read: Option<&str>, write: Option<&str>) -> PropertyDecl {
    PropertyDecl {
        name: Name::new(name),
        ty,
        index_params: Vec::new(),
        read: read.map(Name::new),
        write: write.map(Name::new),
        is_default: false,
    }
}

/// `property name[index_params]: ty read r write w; [default;]`
pub fn indexed_property(
    name: &str,
    index_params: Vec<Param>,
    ty: TypeExpr,
    read: Option<&str>,
    write: Option<&str>,
    is_default: bool,
) -> PropertyDecl {
    PropertyDecl {
        name: Name::new(name),
        ty,
        index_params,
        read: read.map(Name::new),
        write: write.map(Name::new),
        is_default,
    }
}

pub fn interface(name: &str, parent: Option<&str>, methods: &[&str]) -> Decl {
    Decl::Interface(InterfaceDecl {
        name: Name::new(name),
        parent: parent.map(Name::new),
        methods: methods.iter().map(|m| Name::new(m)).collect(),
        properties: Vec::new(),
        pos: Position::DUMMY,
    })
}

pub fn enumeration(name: &str, elements: &[&str]) -> Decl {
    Decl::Enum(EnumDecl {
        name: Name::new(name),
        elements: elements.iter().map(|e| (Name::new(e), None)).collect(),
        pos: Position::DUMMY,
    })
}

pub fn type_alias(name: &str, ty: TypeExpr) -> Decl {
    Decl::TypeAlias {
        name: Name::new(name),
        ty,
    }
}

pub fn constant(name: &str, value: Expr) -> Decl {
    Decl::Const {
        name: Name::new(name),
        ty: None,
        value,
    }
}

/// `operator <symbol> (operand_types): result uses binding;`
pub fn operator(symbol: OperatorSymbol, operand_types: Vec<TypeExpr>, result_type: Option<TypeExpr>, binding: &str) -> OperatorDecl {
    OperatorDecl {
        symbol,
        operand_types,
        result_type,
        binding: Name::new(binding),
        pos: Position::DUMMY,
    }
}

/// `operator implicit (from): to uses binding;`
pub fn implicit_conversion(from: TypeExpr, to: TypeExpr, binding: &str) -> Decl {
    Decl::Operator(operator(
        OperatorSymbol::Implicit,
        vec![from],
        Some(to),
        binding,
    ))
}

pub fn program(decls: Vec<Decl>, main: Vec<Stmt>) -> Program {
    Program {
        decls,
        main: Block::new(main),
    }
}
