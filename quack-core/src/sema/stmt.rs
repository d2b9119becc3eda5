#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::slice;

use quack_ast::{Block, FnDecl, JumpStmt, Param, Program, ScopeId, Span, Stmt, span};

use super::{Analyzer, Node, with_pinned};
use crate::binder::{bind, bind_declarations};
use crate::error::{ScopeError, SemanticError};
use crate::scope::{Symbol, SymbolKind};
use crate::types::{TyCon, TypeId};
use crate::unify::NonGeneric;

/// Insert parameters into a function or lambda scope.
pub(super) fn bind_params(
    cx: &mut Analyzer<'_>,
    scope: ScopeId,
    params: &[Param],
) -> Result<(), SemanticError> {
    for p in params {
        let symbol = Symbol::new(SymbolKind::Variable, p.name.span);
        bind(cx.scopes, scope, &p.name, symbol, cx.options)?;
    }
    Ok(())
}

fn expect_bool(
    cx: &mut Analyzer<'_>,
    ty: TypeId,
    span: Span,
) -> Result<(), SemanticError> {
    let b = cx.types.bool();
    cx.types.unify(ty, b).map_err(|e| e.at(span))?;
    Ok(())
}

impl Node for Program {
    fn inject_scope(&mut self, cx: &mut Analyzer<'_>, parent: ScopeId) -> Result<(), SemanticError> {
        self.scope = Some(parent);
        bind_declarations(cx.scopes, parent, &self.stmts, cx.options)?;
        for stmt in &mut self.stmts {
            stmt.inject_scope(cx, parent)?;
        }
        Ok(())
    }

    fn analyze(
        &self,
        cx: &mut Analyzer<'_>,
        _scope: ScopeId,
        non_generic: &NonGeneric,
    ) -> Result<TypeId, SemanticError> {
        let at = self.stmts.first().map_or_else(|| span(0, 0), Stmt::span);
        let scope = Analyzer::own_scope(self.scope, at)?;
        let types = cx.analyze_stmts(scope, &self.stmts, non_generic)?;
        Ok(types.last().copied().unwrap_or_else(|| cx.types.unit()))
    }
}

impl Node for Block {
    fn inject_scope(&mut self, cx: &mut Analyzer<'_>, parent: ScopeId) -> Result<(), SemanticError> {
        let scope = cx.scopes.create_child(parent);
        self.scope = Some(scope);
        bind_declarations(cx.scopes, scope, &self.stmts, cx.options)?;
        for stmt in &mut self.stmts {
            stmt.inject_scope(cx, scope)?;
        }
        Ok(())
    }

    fn analyze(
        &self,
        cx: &mut Analyzer<'_>,
        _scope: ScopeId,
        non_generic: &NonGeneric,
    ) -> Result<TypeId, SemanticError> {
        let scope = Analyzer::own_scope(self.scope, self.span)?;
        cx.analyze_stmts(scope, &self.stmts, non_generic)?;
        Ok(cx.types.unit())
    }
}

impl Node for Stmt {
    fn inject_scope(&mut self, cx: &mut Analyzer<'_>, parent: ScopeId) -> Result<(), SemanticError> {
        match self {
            Stmt::Var(decl) => {
                for def in &mut decl.defs {
                    if let Some(value) = &mut def.value {
                        value.inject_scope(cx, parent)?;
                    }
                }
            }
            Stmt::Fn(f) => {
                let scope = cx.scopes.create_child(parent);
                f.scope = Some(scope);
                bind_params(cx, scope, &f.params)?;
                f.body.inject_scope(cx, scope)?;
            }
            Stmt::Blueprint(b) => b.body.inject_scope(cx, parent)?,
            Stmt::Trait(t) => t.body.inject_scope(cx, parent)?,
            Stmt::Struct(_) | Stmt::Enum(_) => {}
            Stmt::Label(l) => {
                let scope = cx.scopes.create_child(parent);
                l.scope = Some(scope);
                cx.scopes
                    .insert_local(scope, &l.name.node, Symbol::new(SymbolKind::Label, l.name.span))?;
                bind_declarations(cx.scopes, scope, slice::from_ref(&*l.stmt), cx.options)?;
                l.stmt.inject_scope(cx, scope)?;
            }
            Stmt::Block(b) => b.inject_scope(cx, parent)?,
            Stmt::If(i) => {
                i.cond.inject_scope(cx, parent)?;
                i.then_block.inject_scope(cx, parent)?;
                for elif in &mut i.elifs {
                    elif.cond.inject_scope(cx, parent)?;
                    elif.block.inject_scope(cx, parent)?;
                }
                if let Some(else_block) = &mut i.else_block {
                    else_block.inject_scope(cx, parent)?;
                }
            }
            Stmt::While(w) => {
                w.cond.inject_scope(cx, parent)?;
                w.body.inject_scope(cx, parent)?;
            }
            Stmt::Return(r) => {
                if let Some(value) = &mut r.value {
                    value.inject_scope(cx, parent)?;
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Expr(e) => e.inject_scope(cx, parent)?,
        }
        Ok(())
    }

    fn analyze(
        &self,
        cx: &mut Analyzer<'_>,
        scope: ScopeId,
        non_generic: &NonGeneric,
    ) -> Result<TypeId, SemanticError> {
        match self {
            Stmt::Var(decl) => {
                for def in &decl.defs {
                    let declared = cx.declared_type(scope, &def.name);
                    if let Some(value) = &def.value {
                        let actual = value.analyze(cx, scope, non_generic)?;
                        cx.types
                            .unify(declared, actual)
                            .map_err(|e| e.at(def.span))?;
                    }
                }
                Ok(cx.types.unit())
            }
            Stmt::Fn(f) => analyze_fn(cx, scope, f, non_generic),
            Stmt::Blueprint(b) => {
                b.body.analyze(cx, scope, non_generic)?;
                Ok(cx.declared_type(scope, &b.name))
            }
            Stmt::Trait(t) => {
                t.body.analyze(cx, scope, non_generic)?;
                Ok(cx.declared_type(scope, &t.name))
            }
            Stmt::Struct(s) => {
                let mut seen = HashSet::new();
                for field in &s.fields {
                    if !seen.insert(field.name.node.as_str()) {
                        return Err(ScopeError::Duplicate {
                            kind: SymbolKind::Variable,
                            name: field.name.node.clone(),
                            span: field.name.span,
                        }
                        .into());
                    }
                    super::resolve_sig(cx, scope, &field.sig)?;
                }
                Ok(cx.declared_type(scope, &s.name))
            }
            Stmt::Enum(e) => {
                let mut seen = HashSet::new();
                for variant in &e.variants {
                    if !seen.insert(variant.node.as_str()) {
                        return Err(ScopeError::Duplicate {
                            kind: SymbolKind::Variant,
                            name: variant.node.clone(),
                            span: variant.span,
                        }
                        .into());
                    }
                }
                Ok(cx.declared_type(scope, &e.name))
            }
            Stmt::Label(l) => {
                let label_scope = Analyzer::own_scope(l.scope, l.span)?;
                let types = cx.analyze_stmts(label_scope, slice::from_ref(&*l.stmt), non_generic)?;
                Ok(types.first().copied().unwrap_or_else(|| cx.types.unit()))
            }
            Stmt::Block(b) => b.analyze(cx, scope, non_generic),
            Stmt::If(i) => {
                let cond = i.cond.analyze(cx, scope, non_generic)?;
                expect_bool(cx, cond, i.cond.span)?;
                i.then_block.analyze(cx, scope, non_generic)?;
                for elif in &i.elifs {
                    let cond = elif.cond.analyze(cx, scope, non_generic)?;
                    expect_bool(cx, cond, elif.cond.span)?;
                    elif.block.analyze(cx, scope, non_generic)?;
                }
                if let Some(else_block) = &i.else_block {
                    else_block.analyze(cx, scope, non_generic)?;
                }
                Ok(cx.types.unit())
            }
            Stmt::While(w) => {
                let cond = w.cond.analyze(cx, scope, non_generic)?;
                expect_bool(cx, cond, w.cond.span)?;
                w.body.analyze(cx, scope, non_generic)?;
                Ok(cx.types.unit())
            }
            Stmt::Return(r) => {
                let Some(expected) = cx.frames.last().map(|frame| frame.ret) else {
                    return Err(ScopeError::ReturnOutsideFunction { span: r.span }.into());
                };
                let actual = match &r.value {
                    Some(value) => value.analyze(cx, scope, non_generic)?,
                    None => cx.types.unit(),
                };
                cx.types.unify(expected, actual).map_err(|e| e.at(r.span))?;
                if let Some(frame) = cx.frames.last_mut() {
                    frame.returned = true;
                }
                Ok(cx.types.unit())
            }
            Stmt::Break(jump) | Stmt::Continue(jump) => {
                check_jump_target(cx, scope, jump)?;
                Ok(cx.types.unit())
            }
            Stmt::Expr(e) => e.analyze(cx, scope, non_generic),
        }
    }
}

fn check_jump_target(cx: &Analyzer<'_>, scope: ScopeId, jump: &JumpStmt) -> Result<(), SemanticError> {
    let Some(label) = &jump.label else {
        return Ok(());
    };
    let (_, symbol) = cx.scopes.resolve(scope, label)?;
    if symbol.kind != SymbolKind::Label {
        return Err(ScopeError::NotALabel {
            kind: symbol.kind,
            name: label.node.clone(),
            span: label.span,
        }
        .into());
    }
    Ok(())
}

fn analyze_fn(
    cx: &mut Analyzer<'_>,
    scope: ScopeId,
    f: &FnDecl,
    non_generic: &NonGeneric,
) -> Result<TypeId, SemanticError> {
    let fn_scope = Analyzer::own_scope(f.scope, f.span)?;
    let fn_ty = cx.declared_type(scope, &f.name);

    // Pre-binding assigns a skeleton; anything else means the name was
    // rebound to a non-function type.
    let skeleton = match cx.types.operator_of(fn_ty) {
        Some((TyCon::Fn, args)) if args.len() == f.params.len() + 1 => Some(args.to_vec()),
        _ => None,
    };
    let args = match skeleton {
        Some(args) => args,
        None => {
            let mut args: Vec<TypeId> = f.params.iter().map(|_| cx.types.new_var()).collect();
            let ret = cx.types.new_var();
            args.push(ret);
            let expected = cx.types.function(args[..args.len() - 1].to_vec(), ret);
            cx.types.unify(fn_ty, expected).map_err(|e| e.at(f.span))?;
            args
        }
    };
    let (ret, params) = match args.split_last() {
        Some((ret, params)) => (*ret, params),
        None => return Ok(fn_ty),
    };

    for (p, ty) in f.params.iter().zip(params) {
        cx.set_type(fn_scope, &p.name.node, *ty);
    }

    let ng = with_pinned(non_generic, [fn_ty]);
    cx.enter_fn(ret);
    let body = f.body.analyze(cx, fn_scope, &ng);
    let frame = cx.leave_fn();
    body?;

    if frame.is_some_and(|frame| !frame.returned) {
        let unit = cx.types.unit();
        cx.types.unify(ret, unit).map_err(|e| e.at(f.span))?;
    }
    Ok(fn_ty)
}
