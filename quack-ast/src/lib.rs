#![forbid(unsafe_code)]

use miette::SourceSpan;

pub mod build;

pub type Span = SourceSpan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub node: T,
}

impl<T> Spanned<T> {
    pub fn new(span: Span, node: T) -> Self {
        Self { span, node }
    }
}

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

pub type Ident = Spanned<String>;

/// Handle to a scope owned by the semantic analyzer's scope arena.
///
/// Nodes that open a scope (program, blocks, functions, labels, lambdas)
/// record it during scope injection; expressions record the scope they are
/// analyzed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Var(VarDecl),
    Fn(FnDecl),
    Blueprint(BlueprintDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Trait(TraitDecl),
    Label(LabelStmt),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Break(JumpStmt),
    Continue(JumpStmt),
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(s) => s.span,
            Stmt::Fn(s) => s.span,
            Stmt::Blueprint(s) => s.span,
            Stmt::Struct(s) => s.span,
            Stmt::Enum(s) => s.span,
            Stmt::Trait(s) => s.span,
            Stmt::Label(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => s.span,
            Stmt::Expr(e) => e.span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Let,
    Const,
    Member,
}

/// `let a = 1, b :: Number`
#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub span: Span,
    pub kind: VarKind,
    pub defs: Vec<VarDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDef {
    pub span: Span,
    pub name: Ident,
    pub sig: Option<TypeSig>,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FnDecl {
    pub span: Span,
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: Option<TypeSig>,
    pub body: Block,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub span: Span,
    pub name: Ident,
    pub sig: Option<TypeSig>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlueprintDecl {
    pub span: Span,
    pub name: Ident,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraitDecl {
    pub span: Span,
    pub name: Ident,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub span: Span,
    pub name: Ident,
    pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub span: Span,
    pub name: Ident,
    pub sig: TypeSig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub span: Span,
    pub name: Ident,
    pub variants: Vec<Ident>,
}

/// `:- name stmt`
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStmt {
    pub span: Span,
    pub name: Ident,
    pub stmt: Box<Stmt>,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub span: Span,
    pub cond: Expr,
    pub then_block: Block,
    pub elifs: Vec<ElifClause>,
    pub else_block: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElifClause {
    pub span: Span,
    pub cond: Expr,
    pub block: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub span: Span,
    pub cond: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub span: Span,
    pub value: Option<Expr>,
}

/// `break` / `continue`, optionally targeting a label.
#[derive(Clone, Debug, PartialEq)]
pub struct JumpStmt {
    pub span: Span,
    pub label: Option<Ident>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
    pub scope: Option<ScopeId>,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self {
            span,
            kind,
            scope: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Number(f64),
    String(String),
    Bool(bool),
    Name(Ident),
    /// `{a, b, c}`
    List(Vec<Expr>),
    /// `#{key: value, ...}`
    Map(Vec<(Expr, Expr)>),
    /// `#(a, b)`
    Tuple(Vec<Expr>),
    /// `left{index}`
    Access {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda(Lambda),
    /// `when cond then a else b`
    When {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `name :- value`
    Assign {
        target: Ident,
        value: Box<Expr>,
    },
}

/// `&(a, b) -> body`
#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: Box<Expr>,
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    Plus,
    Minus,
    Not,
}

impl PrefixOp {
    pub fn lexeme(self) -> &'static str {
        match self {
            PrefixOp::Plus => "+",
            PrefixOp::Minus => "-",
            PrefixOp::Not => "not",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    Concat,

    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    And,
    Or,
    Xor,
}

impl BinOp {
    pub fn lexeme(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "mod",
            BinOp::Pow => "**",
            BinOp::Concat => "++",
            BinOp::Eq => "=",
            BinOp::Ne => "<>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
        }
    }
}

/// Type signatures written in declarations (`x :: {Number}`).
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSig {
    Name(Ident),
    List {
        span: Span,
        elem: Box<TypeSig>,
    },
    Map {
        span: Span,
        key: Box<TypeSig>,
        value: Box<TypeSig>,
    },
    Tuple {
        span: Span,
        elems: Vec<TypeSig>,
    },
    Fn {
        span: Span,
        params: Vec<TypeSig>,
        ret: Box<TypeSig>,
    },
}

impl TypeSig {
    pub fn span(&self) -> Span {
        match self {
            TypeSig::Name(id) => id.span,
            TypeSig::List { span, .. }
            | TypeSig::Map { span, .. }
            | TypeSig::Tuple { span, .. }
            | TypeSig::Fn { span, .. } => *span,
        }
    }
}
