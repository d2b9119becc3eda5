#![forbid(unsafe_code)]

//! Constructors for assembling trees without going through the parser.
//!
//! Every node gets an empty span at offset 0 and no scope; callers that care
//! about positions can overwrite `span` afterwards.

use crate::{
    BinOp, Block, BlueprintDecl, ElifClause, EnumDecl, Expr, ExprKind, FieldDef, FnDecl, Ident,
    IfStmt, JumpStmt, LabelStmt, Lambda, Param, PrefixOp, Program, ReturnStmt, Span, Spanned, Stmt,
    StructDecl, TraitDecl, TypeSig, VarDecl, VarDef, VarKind, WhileStmt, span,
};

fn nowhere() -> Span {
    span(0, 0)
}

pub fn ident(name: &str) -> Ident {
    Spanned::new(nowhere(), name.to_string())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(nowhere(), kind)
}

pub fn program(stmts: Vec<Stmt>) -> Program {
    Program { stmts, scope: None }
}

// --- expressions ---

pub fn num(value: f64) -> Expr {
    expr(ExprKind::Number(value))
}

pub fn string(value: &str) -> Expr {
    expr(ExprKind::String(value.to_string()))
}

pub fn boolean(value: bool) -> Expr {
    expr(ExprKind::Bool(value))
}

pub fn name(name: &str) -> Expr {
    expr(ExprKind::Name(ident(name)))
}

pub fn list(items: Vec<Expr>) -> Expr {
    expr(ExprKind::List(items))
}

pub fn map(entries: Vec<(Expr, Expr)>) -> Expr {
    expr(ExprKind::Map(entries))
}

pub fn tuple(items: Vec<Expr>) -> Expr {
    expr(ExprKind::Tuple(items))
}

pub fn access(left: Expr, index: Expr) -> Expr {
    expr(ExprKind::Access {
        left: Box::new(left),
        index: Box::new(index),
    })
}

pub fn prefix(op: PrefixOp, right: Expr) -> Expr {
    expr(ExprKind::Prefix {
        op,
        right: Box::new(right),
    })
}

pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: Box::new(callee),
        args,
    })
}

pub fn lambda(params: &[&str], body: Expr) -> Expr {
    expr(ExprKind::Lambda(Lambda {
        params: params.iter().map(|p| param(p)).collect(),
        body: Box::new(body),
        scope: None,
    }))
}

pub fn when(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
    expr(ExprKind::When {
        cond: Box::new(cond),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

pub fn assign(target: &str, value: Expr) -> Expr {
    expr(ExprKind::Assign {
        target: ident(target),
        value: Box::new(value),
    })
}

// --- statements ---

pub fn param(name: &str) -> Param {
    Param {
        span: nowhere(),
        name: ident(name),
        sig: None,
    }
}

pub fn typed_param(name: &str, sig: TypeSig) -> Param {
    Param {
        sig: Some(sig),
        ..param(name)
    }
}

pub fn var(kind: VarKind, name: &str, sig: Option<TypeSig>, value: Option<Expr>) -> Stmt {
    Stmt::Var(VarDecl {
        span: nowhere(),
        kind,
        defs: vec![VarDef {
            span: nowhere(),
            name: ident(name),
            sig,
            value,
        }],
    })
}

pub fn let_(name: &str, value: Expr) -> Stmt {
    var(VarKind::Let, name, None, Some(value))
}

pub fn let_uninit(name: &str) -> Stmt {
    var(VarKind::Let, name, None, None)
}

pub fn const_(name: &str, value: Expr) -> Stmt {
    var(VarKind::Const, name, None, Some(value))
}

pub fn member(name: &str, value: Option<Expr>) -> Stmt {
    var(VarKind::Member, name, None, value)
}

pub fn fn_(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    fn_typed(name, params.iter().map(|p| param(p)).collect(), None, body)
}

pub fn fn_typed(name: &str, params: Vec<Param>, ret: Option<TypeSig>, body: Vec<Stmt>) -> Stmt {
    Stmt::Fn(FnDecl {
        span: nowhere(),
        name: ident(name),
        params,
        ret,
        body: block_of(body),
        scope: None,
    })
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        span: nowhere(),
        value,
    })
}

pub fn expr_stmt(e: Expr) -> Stmt {
    Stmt::Expr(e)
}

pub fn block_of(stmts: Vec<Stmt>) -> Block {
    Block {
        span: nowhere(),
        stmts,
        scope: None,
    }
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(block_of(stmts))
}

pub fn label(name: &str, stmt: Stmt) -> Stmt {
    Stmt::Label(LabelStmt {
        span: nowhere(),
        name: ident(name),
        stmt: Box::new(stmt),
        scope: None,
    })
}

pub fn if_(
    cond: Expr,
    then: Vec<Stmt>,
    elifs: Vec<(Expr, Vec<Stmt>)>,
    otherwise: Option<Vec<Stmt>>,
) -> Stmt {
    Stmt::If(IfStmt {
        span: nowhere(),
        cond,
        then_block: block_of(then),
        elifs: elifs
            .into_iter()
            .map(|(cond, stmts)| ElifClause {
                span: nowhere(),
                cond,
                block: block_of(stmts),
            })
            .collect(),
        else_block: otherwise.map(block_of),
    })
}

pub fn while_(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileStmt {
        span: nowhere(),
        cond,
        body: block_of(body),
    })
}

pub fn break_(label: Option<&str>) -> Stmt {
    Stmt::Break(JumpStmt {
        span: nowhere(),
        label: label.map(ident),
    })
}

pub fn continue_(label: Option<&str>) -> Stmt {
    Stmt::Continue(JumpStmt {
        span: nowhere(),
        label: label.map(ident),
    })
}

pub fn blueprint(name: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::Blueprint(BlueprintDecl {
        span: nowhere(),
        name: ident(name),
        body: block_of(body),
    })
}

pub fn trait_(name: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::Trait(TraitDecl {
        span: nowhere(),
        name: ident(name),
        body: block_of(body),
    })
}

pub fn struct_(name: &str, fields: Vec<(&str, TypeSig)>) -> Stmt {
    Stmt::Struct(StructDecl {
        span: nowhere(),
        name: ident(name),
        fields: fields
            .into_iter()
            .map(|(field, sig)| FieldDef {
                span: nowhere(),
                name: ident(field),
                sig,
            })
            .collect(),
    })
}

pub fn enum_(name: &str, variants: &[&str]) -> Stmt {
    Stmt::Enum(EnumDecl {
        span: nowhere(),
        name: ident(name),
        variants: variants.iter().map(|v| ident(v)).collect(),
    })
}

// --- type signatures ---

pub fn sig(name: &str) -> TypeSig {
    TypeSig::Name(ident(name))
}

pub fn sig_list(elem: TypeSig) -> TypeSig {
    TypeSig::List {
        span: nowhere(),
        elem: Box::new(elem),
    }
}

pub fn sig_map(key: TypeSig, value: TypeSig) -> TypeSig {
    TypeSig::Map {
        span: nowhere(),
        key: Box::new(key),
        value: Box::new(value),
    }
}

pub fn sig_tuple(elems: Vec<TypeSig>) -> TypeSig {
    TypeSig::Tuple {
        span: nowhere(),
        elems,
    }
}

pub fn sig_fn(params: Vec<TypeSig>, ret: TypeSig) -> TypeSig {
    TypeSig::Fn {
        span: nowhere(),
        params,
        ret: Box::new(ret),
    }
}
