//! Declaration nodes: routines, classes, records, interfaces, enums and
//! operator bindings.

use std::rc::Rc;

use super::{Block, Expr};
use crate::{Name, OperatorSymbol, Position, TypeExpr};

/// How an argument is passed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ParamMode {
    #[default]
    Value,
    Const,
    /// By reference: writes are copied back to the caller's location.
    Var,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Option<TypeExpr>,
    pub mode: ParamMode,
}

impl Param {
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Param {
            name: Name::new(name),
            ty: Some(ty),
            mode: ParamMode::Value,
        }
    }

    #[must_use]
    pub fn by_ref(mut self) -> Self {
        self.mode = ParamMode::Var;
        self
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RoutineKind {
    #[default]
    Procedure,
    Function,
    Constructor,
    Destructor,
}

/// Virtual dispatch directive of a method.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum MethodBinding {
    /// Statically bound.
    #[default]
    Static,
    Virtual,
    Override,
    /// Hides an inherited virtual method and starts a new dispatch chain.
    Reintroduce,
    /// Virtual with no body in this class.
    Abstract,
}

/// A function, procedure, method, constructor or destructor.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Name,
    pub kind: RoutineKind,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    /// `None` for abstract methods.
    pub body: Option<Block>,
    pub is_class_method: bool,
    pub binding: MethodBinding,
    pub pos: Position,
}

impl FunctionDecl {
    pub fn is_constructor(&self) -> bool {
        self.kind == RoutineKind::Constructor
    }
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeExpr,
    pub init: Option<Expr>,
}

/// `property Name[params]: T read R write W; default;`
///
/// `read`/`write` name either a field or a method; the evaluator decides
/// which when the property is accessed.
#[derive(Clone, Debug)]
pub struct PropertyDecl {
    pub name: Name,
    pub ty: TypeExpr,
    pub index_params: Vec<Param>,
    pub read: Option<Name>,
    pub write: Option<Name>,
    pub is_default: bool,
}

/// `[class] operator + (T1, T2): R uses Binding;`
#[derive(Clone, Debug)]
pub struct OperatorDecl {
    pub symbol: OperatorSymbol,
    pub operand_types: Vec<TypeExpr>,
    pub result_type: Option<TypeExpr>,
    pub binding: Name,
    pub pos: Position,
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub parent: Option<Name>,
    pub interfaces: Vec<Name>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub properties: Vec<PropertyDecl>,
    pub operators: Vec<OperatorDecl>,
    pub is_abstract: bool,
    pub pos: Position,
}

#[derive(Clone, Debug)]
pub struct RecordDecl {
    pub name: Name,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub properties: Vec<PropertyDecl>,
    pub operators: Vec<OperatorDecl>,
    pub pos: Position,
}

/// Interface method signatures are reduced to names.
#[derive(Clone, Debug)]
pub struct InterfaceDecl {
    pub name: Name,
    pub parent: Option<Name>,
    pub methods: Vec<Name>,
    pub properties: Vec<Name>,
    pub pos: Position,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: Name,
    /// Element names with optional explicit ordinal values.
    pub elements: Vec<(Name, Option<i64>)>,
    pub pos: Position,
}

#[derive(Clone, Debug)]
pub enum Decl {
    Function(Rc<FunctionDecl>),
    Class(ClassDecl),
    Record(RecordDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    /// `type TName = <type expression>;`
    TypeAlias { name: Name, ty: TypeExpr },
    /// Global (non-class) operator or implicit conversion.
    Operator(OperatorDecl),
    /// `const Name [: T] = value;`
    Const {
        name: Name,
        ty: Option<TypeExpr>,
        value: Expr,
    },
}

/// A whole script: declarations followed by the main block.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
    pub main: Block,
}
