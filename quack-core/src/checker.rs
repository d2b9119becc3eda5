#![forbid(unsafe_code)]

use quack_ast::{Program, ScopeId};

use crate::error::SemanticError;
use crate::scope::{Scopes, SymbolKind};
use crate::sema::{Analyzer, Node};
use crate::types::{TypeId, Types};
use crate::unify::NonGeneric;

/// Switches a driver can flip between submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    /// Reject a value declaration that shadows a type name from an outer scope.
    pub strict_shadowing: bool,
    /// Restore the global scope and type arena when a pass fails.
    pub rollback_on_error: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            strict_shadowing: false,
            rollback_on_error: true,
        }
    }
}

impl CheckOptions {
    pub fn with_strict_shadowing(mut self, strict: bool) -> Self {
        self.strict_shadowing = strict;
        self
    }

    pub fn with_rollback_on_error(mut self, rollback: bool) -> Self {
        self.rollback_on_error = rollback;
        self
    }
}

/// A checking session.
///
/// Owns the type arena and the scope arena. The global scope is created once
/// and accumulates the declarations of every successful submission.
#[derive(Debug)]
pub struct Checker {
    types: Types,
    scopes: Scopes,
    global: ScopeId,
    options: CheckOptions,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    pub fn new() -> Self {
        Self::with_options(CheckOptions::default())
    }

    pub fn with_options(options: CheckOptions) -> Self {
        let mut scopes = Scopes::new();
        let global = scopes.create_root();
        Self {
            types: Types::new(),
            scopes,
            global,
            options,
        }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn set_strict_shadowing(&mut self, strict: bool) {
        self.options.strict_shadowing = strict;
    }

    pub fn set_rollback_on_error(&mut self, rollback: bool) {
        self.options.rollback_on_error = rollback;
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn types(&self) -> &Types {
        &self.types
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn display(&self, ty: TypeId) -> String {
        self.types.display(ty)
    }

    /// Type of a global declaration, following bindings.
    pub fn type_of(&self, name: &str) -> Option<TypeId> {
        self.scopes
            .get_local(self.global, name)
            .and_then(|symbol| symbol.ty)
            .map(|ty| self.types.prune(ty))
    }

    /// Inject scopes into `program`, then analyze it against the global scope.
    ///
    /// Returns one type per top-level statement. The first diagnostic ends the
    /// pass.
    pub fn check_program(&mut self, program: &mut Program) -> Result<Vec<TypeId>, SemanticError> {
        tracing::debug!(stmts = program.stmts.len(), "checking program");

        let type_snapshot = self.types.snapshot();
        let scope_snapshot = self.scopes.snapshot(self.global);

        // Variables from earlier submissions stay monomorphic.
        let non_generic: NonGeneric = self
            .scopes
            .symbols(self.global)
            .filter(|(_, symbol)| symbol.kind == SymbolKind::Variable)
            .filter_map(|(_, symbol)| symbol.ty)
            .collect();

        let result = {
            let mut cx = Analyzer::new(&mut self.types, &mut self.scopes, &self.options);
            let global = self.global;
            program
                .inject_scope(&mut cx, global)
                .and_then(|()| cx.analyze_stmts(global, &program.stmts, &non_generic))
        };

        match result {
            Ok(types) => {
                self.types.commit();
                tracing::debug!(stmts = types.len(), "program checked");
                Ok(types)
            }
            Err(err) => {
                if self.options.rollback_on_error {
                    tracing::debug!(error = %err, "check failed, rolling back session");
                    self.types.rollback_to(type_snapshot);
                    self.scopes.rollback_to(scope_snapshot);
                }
                Err(err)
            }
        }
    }
}
