#![forbid(unsafe_code)]

//! Two-phase analysis over the syntax tree.
//!
//! Pass 1 (`inject_scope`) walks top-down: scoping nodes allocate a child
//! scope and pre-bind the declarations of their statements; every other node
//! records its parent's scope. Pass 2 (`analyze`) walks bottom-up and returns
//! a type for each node, or the first diagnostic encountered.

mod expr;
mod sig;
mod stmt;

use quack_ast::{Ident, ScopeId, Span, Stmt};

use crate::binder::{Declaration, declaration};
use crate::checker::CheckOptions;
use crate::error::{ScopeError, SemanticError};
use crate::scope::Scopes;
use crate::types::{TypeId, Types};
use crate::unify::NonGeneric;

pub use sig::resolve_sig;

pub trait Node {
    fn inject_scope(&mut self, cx: &mut Analyzer<'_>, parent: ScopeId) -> Result<(), SemanticError>;

    fn analyze(
        &self,
        cx: &mut Analyzer<'_>,
        scope: ScopeId,
        non_generic: &NonGeneric,
    ) -> Result<TypeId, SemanticError>;
}

#[derive(Clone, Copy, Debug)]
struct FnFrame {
    ret: TypeId,
    returned: bool,
}

/// Mutable state of one analysis pass.
pub struct Analyzer<'a> {
    pub types: &'a mut Types,
    pub scopes: &'a mut Scopes,
    pub options: &'a CheckOptions,
    frames: Vec<FnFrame>,
}

impl<'a> Analyzer<'a> {
    pub fn new(types: &'a mut Types, scopes: &'a mut Scopes, options: &'a CheckOptions) -> Self {
        Self {
            types,
            scopes,
            options,
            frames: Vec::new(),
        }
    }

    fn own_scope(scope: Option<ScopeId>, span: Span) -> Result<ScopeId, SemanticError> {
        scope.ok_or_else(|| ScopeError::MissingScope { span }.into())
    }

    /// Type recorded for `name` in `scope`, allocating a variable if none yet.
    fn declared_type(&mut self, scope: ScopeId, name: &Ident) -> TypeId {
        if let Some(ty) = self
            .scopes
            .get_local(scope, &name.node)
            .and_then(|symbol| symbol.ty)
        {
            return ty;
        }
        let ty = self.types.new_var();
        self.set_type(scope, &name.node, ty);
        ty
    }

    fn set_type(&mut self, scope: ScopeId, name: &str, ty: TypeId) {
        if let Some(symbol) = self.scopes.symbol_mut(scope, name) {
            symbol.ty = Some(ty);
        }
    }

    fn enter_fn(&mut self, ret: TypeId) {
        self.frames.push(FnFrame {
            ret,
            returned: false,
        });
    }

    fn leave_fn(&mut self) -> Option<FnFrame> {
        self.frames.pop()
    }

    /// Give every declaration in `stmts` a type before any statement is
    /// analyzed, then analyze them in order.
    ///
    /// Variables stay pinned for the whole block. A function's skeleton is
    /// pinned until its own body has been analyzed; later uses instantiate it.
    pub fn analyze_stmts(
        &mut self,
        scope: ScopeId,
        stmts: &[Stmt],
        non_generic: &NonGeneric,
    ) -> Result<Vec<TypeId>, SemanticError> {
        let mut pinned = Vec::new();
        let mut pending = Vec::new();

        for stmt in stmts {
            match declaration(stmt) {
                Some(Declaration::Variables { defs, .. }) => {
                    for def in defs {
                        let ty = match &def.sig {
                            Some(sig) => resolve_sig(self, scope, sig)?,
                            None => self.types.new_var(),
                        };
                        self.set_type(scope, &def.name.node, ty);
                        pinned.push(ty);
                    }
                }
                Some(Declaration::Function(name)) => {
                    let Stmt::Fn(f) = stmt else { continue };
                    let mut params = Vec::with_capacity(f.params.len());
                    for p in &f.params {
                        params.push(match &p.sig {
                            Some(sig) => resolve_sig(self, scope, sig)?,
                            None => self.types.new_var(),
                        });
                    }
                    let ret = match &f.ret {
                        Some(sig) => resolve_sig(self, scope, sig)?,
                        None => self.types.new_var(),
                    };
                    let ty = self.types.function(params, ret);
                    self.set_type(scope, &name.node, ty);
                    pending.push(ty);
                }
                Some(Declaration::Type { name, .. }) => {
                    let ty = self.types.named(&name.node, Vec::new());
                    self.set_type(scope, &name.node, ty);
                }
                None => {}
            }
        }

        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let mut ng = non_generic.clone();
            ng.extend(pinned.iter().copied());
            ng.extend(pending.iter().copied());
            out.push(stmt.analyze(self, scope, &ng)?);

            if let Stmt::Fn(f) = stmt {
                if let Some(done) = self.scopes.get_local(scope, &f.name.node).and_then(|s| s.ty) {
                    pending.retain(|ty| *ty != done);
                }
            }
        }
        Ok(out)
    }
}

fn with_pinned(non_generic: &NonGeneric, extra: impl IntoIterator<Item = TypeId>) -> NonGeneric {
    let mut ng = non_generic.clone();
    ng.extend(extra);
    ng
}
