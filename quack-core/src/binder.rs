#![forbid(unsafe_code)]

use quack_ast::{Ident, ScopeId, Stmt, VarDef, VarKind};

use crate::checker::CheckOptions;
use crate::error::ScopeError;
use crate::scope::{Scopes, Symbol, SymbolKind};

/// What a statement introduces into its block's scope.
#[derive(Clone, Copy, Debug)]
pub enum Declaration<'a> {
    Variables { kind: VarKind, defs: &'a [VarDef] },
    Function(&'a Ident),
    Type { kind: SymbolKind, name: &'a Ident },
}

pub fn declaration(stmt: &Stmt) -> Option<Declaration<'_>> {
    match stmt {
        Stmt::Var(decl) => Some(Declaration::Variables {
            kind: decl.kind,
            defs: &decl.defs,
        }),
        Stmt::Fn(f) => Some(Declaration::Function(&f.name)),
        Stmt::Blueprint(b) => Some(Declaration::Type {
            kind: SymbolKind::Blueprint,
            name: &b.name,
        }),
        Stmt::Struct(s) => Some(Declaration::Type {
            kind: SymbolKind::Struct,
            name: &s.name,
        }),
        Stmt::Enum(e) => Some(Declaration::Type {
            kind: SymbolKind::Enum,
            name: &e.name,
        }),
        Stmt::Trait(t) => Some(Declaration::Type {
            kind: SymbolKind::Trait,
            name: &t.name,
        }),
        Stmt::Label(_)
        | Stmt::Block(_)
        | Stmt::If(_)
        | Stmt::While(_)
        | Stmt::Return(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Expr(_) => None,
    }
}

/// Pre-insert every name declared by `stmts` into `scope`, so sibling
/// declarations see each other regardless of order.
pub fn bind_declarations(
    scopes: &mut Scopes,
    scope: ScopeId,
    stmts: &[Stmt],
    options: &CheckOptions,
) -> Result<(), ScopeError> {
    for stmt in stmts {
        let Some(decl) = declaration(stmt) else {
            continue;
        };
        match decl {
            Declaration::Variables { kind, defs } => {
                for def in defs {
                    let symbol = Symbol {
                        mutable: kind != VarKind::Const,
                        initialized: def.value.is_some(),
                        ..Symbol::new(SymbolKind::Variable, def.name.span)
                    };
                    bind(scopes, scope, &def.name, symbol, options)?;
                }
            }
            Declaration::Function(name) => {
                let symbol = Symbol::new(SymbolKind::Function, name.span);
                bind(scopes, scope, name, symbol, options)?;
            }
            Declaration::Type { kind, name } => {
                let symbol = Symbol::new(kind, name.span);
                bind(scopes, scope, name, symbol, options)?;
            }
        }
    }
    Ok(())
}

/// Insert one declared name, applying the strict shadowing rule.
pub(crate) fn bind(
    scopes: &mut Scopes,
    scope: ScopeId,
    name: &Ident,
    symbol: Symbol,
    options: &CheckOptions,
) -> Result<(), ScopeError> {
    if options.strict_shadowing && !symbol.kind.is_type() {
        let shadowed = scopes
            .lookup(scope, &name.node)
            .filter(|(found_in, _)| *found_in != scope);
        if let Some((_, outer)) = shadowed {
            if outer.kind.is_type() {
                return Err(ScopeError::ShadowsType {
                    name: name.node.clone(),
                    span: name.span,
                });
            }
        }
    }
    tracing::debug!(scope = scope.index(), name = %name.node, kind = %symbol.kind, "pre-bound declaration");
    scopes.insert_local(scope, &name.node, symbol)
}
