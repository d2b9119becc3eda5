#![forbid(unsafe_code)]

use quack_ast::{BinOp, Expr, ExprKind, Ident, Lambda, PrefixOp, ScopeId, Span};

use super::{Analyzer, Node, resolve_sig, stmt::bind_params, with_pinned};
use crate::error::{ScopeError, SemanticError, TypeError};
use crate::scope::SymbolKind;
use crate::types::{TyCon, TypeId};
use crate::unify::NonGeneric;

impl Node for Expr {
    fn inject_scope(&mut self, cx: &mut Analyzer<'_>, parent: ScopeId) -> Result<(), SemanticError> {
        self.scope = Some(parent);
        match &mut self.kind {
            ExprKind::Number(_) | ExprKind::String(_) | ExprKind::Bool(_) | ExprKind::Name(_) => {}
            ExprKind::List(items) | ExprKind::Tuple(items) => {
                for item in items {
                    item.inject_scope(cx, parent)?;
                }
            }
            ExprKind::Map(entries) => {
                for (key, value) in entries {
                    key.inject_scope(cx, parent)?;
                    value.inject_scope(cx, parent)?;
                }
            }
            ExprKind::Access { left, index } => {
                left.inject_scope(cx, parent)?;
                index.inject_scope(cx, parent)?;
            }
            ExprKind::Prefix { right, .. } => right.inject_scope(cx, parent)?,
            ExprKind::Binary { left, right, .. } => {
                left.inject_scope(cx, parent)?;
                right.inject_scope(cx, parent)?;
            }
            ExprKind::Call { callee, args } => {
                callee.inject_scope(cx, parent)?;
                for arg in args {
                    arg.inject_scope(cx, parent)?;
                }
            }
            ExprKind::Lambda(lambda) => {
                let scope = cx.scopes.create_child(parent);
                lambda.scope = Some(scope);
                bind_params(cx, scope, &lambda.params)?;
                lambda.body.inject_scope(cx, scope)?;
            }
            ExprKind::When {
                cond,
                then,
                otherwise,
            } => {
                cond.inject_scope(cx, parent)?;
                then.inject_scope(cx, parent)?;
                otherwise.inject_scope(cx, parent)?;
            }
            ExprKind::Assign { value, .. } => value.inject_scope(cx, parent)?,
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
        match &self.kind {
            ExprKind::Number(_) => Ok(cx.types.number()),
            ExprKind::String(_) => Ok(cx.types.string()),
            ExprKind::Bool(_) => Ok(cx.types.bool()),
            ExprKind::Name(name) => analyze_name(cx, scope, name, non_generic),
            ExprKind::List(items) => {
                let elem = cx.types.new_var();
                for item in items {
                    let ty = item.analyze(cx, scope, non_generic)?;
                    cx.types.unify(elem, ty).map_err(|e| e.at(item.span))?;
                }
                Ok(cx.types.list(elem))
            }
            ExprKind::Map(entries) => {
                let key_ty = cx.types.new_var();
                let value_ty = cx.types.new_var();
                for (key, value) in entries {
                    let ty = key.analyze(cx, scope, non_generic)?;
                    cx.types.unify(key_ty, ty).map_err(|e| e.at(key.span))?;
                    let ty = value.analyze(cx, scope, non_generic)?;
                    cx.types.unify(value_ty, ty).map_err(|e| e.at(value.span))?;
                }
                Ok(cx.types.map(key_ty, value_ty))
            }
            ExprKind::Tuple(items) => {
                let elems = items
                    .iter()
                    .map(|item| item.analyze(cx, scope, non_generic))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(cx.types.tuple(elems))
            }
            ExprKind::Access { left, index } => {
                let left_ty = left.analyze(cx, scope, non_generic)?;
                let index_ty = index.analyze(cx, scope, non_generic)?;
                analyze_access(cx, left_ty, index_ty, index.span, self.span)
            }
            ExprKind::Prefix { op, right } => {
                let operand = right.analyze(cx, scope, non_generic)?;
                analyze_prefix(cx, *op, operand, self.span)
            }
            ExprKind::Binary { left, op, right } => {
                let left_ty = left.analyze(cx, scope, non_generic)?;
                let right_ty = right.analyze(cx, scope, non_generic)?;
                analyze_binary(cx, *op, left_ty, right_ty, self.span)
            }
            ExprKind::Call { callee, args } => {
                let callee_ty = callee.analyze(cx, scope, non_generic)?;
                let arg_tys = args
                    .iter()
                    .map(|arg| arg.analyze(cx, scope, non_generic))
                    .collect::<Result<Vec<_>, _>>()?;
                let ret = cx.types.new_var();
                let expected = cx.types.function(arg_tys, ret);
                cx.types
                    .unify(callee_ty, expected)
                    .map_err(|e| e.at(self.span))?;
                Ok(ret)
            }
            ExprKind::Lambda(lambda) => analyze_lambda(cx, lambda, self.span, non_generic),
            ExprKind::When {
                cond,
                then,
                otherwise,
            } => {
                let cond_ty = cond.analyze(cx, scope, non_generic)?;
                let b = cx.types.bool();
                cx.types.unify(cond_ty, b).map_err(|e| e.at(cond.span))?;
                let then_ty = then.analyze(cx, scope, non_generic)?;
                let else_ty = otherwise.analyze(cx, scope, non_generic)?;
                cx.types
                    .unify(then_ty, else_ty)
                    .map_err(|e| e.at(self.span))?;
                Ok(then_ty)
            }
            ExprKind::Assign { target, value } => {
                analyze_assign(cx, scope, target, value, non_generic)
            }
        }
    }
}

fn analyze_name(
    cx: &mut Analyzer<'_>,
    scope: ScopeId,
    name: &Ident,
    non_generic: &NonGeneric,
) -> Result<TypeId, SemanticError> {
    let (owner, symbol) = cx.scopes.resolve(scope, name)?;
    if symbol.kind == SymbolKind::Label || symbol.kind.is_type() {
        return Err(ScopeError::NotAValue {
            kind: symbol.kind,
            name: name.node.clone(),
            span: name.span,
        }
        .into());
    }
    let declared = symbol.ty;
    let ty = match declared {
        Some(ty) => ty,
        None => {
            let ty = cx.types.new_var();
            cx.set_type(owner, &name.node, ty);
            ty
        }
    };
    Ok(cx.types.fresh(ty, non_generic))
}

/// Indexing only inspects the two operand types; an index whose type is still
/// unknown is rejected rather than bound.
fn analyze_access(
    cx: &Analyzer<'_>,
    left: TypeId,
    index: TypeId,
    index_span: Span,
    span: Span,
) -> Result<TypeId, SemanticError> {
    let types = &*cx.types;
    if types.is_con(left, &TyCon::String) {
        return Ok(types.string());
    }
    match types.operator_of(left) {
        Some((TyCon::List, &[elem])) => {
            if !types.is_con(index, &TyCon::Number) {
                return Err(TypeError::NonNumericIndex {
                    found: types.display(index),
                    span: index_span,
                }
                .into());
            }
            Ok(elem)
        }
        Some((TyCon::Map, &[key, value])) => {
            if !types.same(index, key) {
                return Err(TypeError::IndexKeyMismatch {
                    expected: types.display(key),
                    found: types.display(index),
                    span: index_span,
                }
                .into());
            }
            Ok(value)
        }
        _ => Err(TypeError::NotIndexable {
            found: types.display(left),
            span,
        }
        .into()),
    }
}

fn analyze_prefix(
    cx: &mut Analyzer<'_>,
    op: PrefixOp,
    operand: TypeId,
    span: Span,
) -> Result<TypeId, SemanticError> {
    let shown = cx.types.display(operand);
    let expected = match op {
        PrefixOp::Plus | PrefixOp::Minus => cx.types.number(),
        PrefixOp::Not => cx.types.bool(),
    };
    if cx.types.unify(operand, expected).is_err() {
        return Err(TypeError::OperatorMismatch {
            op: op.lexeme(),
            operand: shown,
            span,
        }
        .into());
    }
    Ok(expected)
}

fn analyze_binary(
    cx: &mut Analyzer<'_>,
    op: BinOp,
    left: TypeId,
    right: TypeId,
    span: Span,
) -> Result<TypeId, SemanticError> {
    let shown = (cx.types.display(left), cx.types.display(right));
    let mismatch = |(left, right): (String, String)| -> SemanticError {
        TypeError::BinaryOperatorMismatch {
            op: op.lexeme(),
            left,
            right,
            span,
        }
        .into()
    };

    let (operand, result) = match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            (Some(cx.types.number()), cx.types.number())
        }
        BinOp::Concat => (Some(cx.types.string()), cx.types.string()),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => (Some(cx.types.number()), cx.types.bool()),
        BinOp::And | BinOp::Or | BinOp::Xor => (Some(cx.types.bool()), cx.types.bool()),
        BinOp::Eq | BinOp::Ne => (None, cx.types.bool()),
    };

    let ok = match operand {
        Some(expected) => {
            cx.types.unify(left, expected).is_ok() && cx.types.unify(right, expected).is_ok()
        }
        None => cx.types.unify(left, right).is_ok(),
    };
    if !ok {
        return Err(mismatch(shown));
    }
    Ok(result)
}

fn analyze_lambda(
    cx: &mut Analyzer<'_>,
    lambda: &Lambda,
    span: Span,
    non_generic: &NonGeneric,
) -> Result<TypeId, SemanticError> {
    let scope = Analyzer::own_scope(lambda.scope, span)?;
    let mut params = Vec::with_capacity(lambda.params.len());
    for p in &lambda.params {
        let ty = match &p.sig {
            Some(sig) => resolve_sig(cx, scope, sig)?,
            None => cx.types.new_var(),
        };
        cx.set_type(scope, &p.name.node, ty);
        params.push(ty);
    }
    let ng = with_pinned(non_generic, params.iter().copied());
    let ret = lambda.body.analyze(cx, scope, &ng)?;
    Ok(cx.types.function(params, ret))
}

fn analyze_assign(
    cx: &mut Analyzer<'_>,
    scope: ScopeId,
    target: &Ident,
    value: &Expr,
    non_generic: &NonGeneric,
) -> Result<TypeId, SemanticError> {
    let (owner, symbol) = cx.scopes.resolve(scope, target)?;
    if symbol.kind != SymbolKind::Variable {
        return Err(ScopeError::NotAValue {
            kind: symbol.kind,
            name: target.node.clone(),
            span: target.span,
        }
        .into());
    }
    if !symbol.mutable && symbol.initialized {
        return Err(ScopeError::ImmutableAssignment {
            name: target.node.clone(),
            span: target.span,
        }
        .into());
    }
    let declared = symbol.ty;

    let actual = value.analyze(cx, scope, non_generic)?;
    let declared = match declared {
        Some(ty) => ty,
        None => {
            let ty = cx.types.new_var();
            cx.set_type(owner, &target.node, ty);
            ty
        }
    };
    cx.types
        .unify(declared, actual)
        .map_err(|e| e.at(value.span))?;
    if let Some(symbol) = cx.scopes.symbol_mut(owner, &target.node) {
        symbol.initialized = true;
    }
    Ok(actual)
}
