#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use quack_ast::Span;
use thiserror::Error;

use crate::error::TypeError;
use crate::types::{TypeId, TypeView, Types};

/// Type variables pinned in the current inference context.
///
/// Members are arbitrary types; a variable is pinned if it occurs in any of
/// them after pruning.
pub type NonGeneric = HashSet<TypeId>;

/// Unification failure before a node attaches its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnifyError {
    #[error("type mismatch: {left} != {right}")]
    Mismatch { left: String, right: String },

    #[error("recursive unification: {var} occurs in {ty}")]
    Recursive { var: String, ty: String },
}

impl UnifyError {
    pub fn at(self, span: Span) -> TypeError {
        match self {
            UnifyError::Mismatch { left, right } => TypeError::Mismatch { left, right, span },
            UnifyError::Recursive { var, ty } => TypeError::RecursiveUnification { var, ty, span },
        }
    }
}

impl Types {
    /// True if `var` is `ty` after pruning, or occurs in one of its components.
    pub fn occurs_in(&self, var: TypeId, ty: TypeId) -> bool {
        match self.view(ty) {
            TypeView::Var(v) => v == var,
            TypeView::Op(_, args) => args.iter().any(|arg| self.occurs_in(var, *arg)),
        }
    }

    pub fn is_generic(&self, var: TypeId, non_generic: &NonGeneric) -> bool {
        !non_generic
            .iter()
            .any(|pinned| self.occurs_in(var, *pinned))
    }

    /// Copy `ty`, replacing each generic variable with a new one.
    ///
    /// A variable that recurs inside `ty` maps to the same replacement.
    /// Pinned variables are shared with the original.
    pub fn fresh(&mut self, ty: TypeId, non_generic: &NonGeneric) -> TypeId {
        let mut mappings = HashMap::new();
        self.fresh_rec(ty, non_generic, &mut mappings)
    }

    fn fresh_rec(
        &mut self,
        ty: TypeId,
        non_generic: &NonGeneric,
        mappings: &mut HashMap<TypeId, TypeId>,
    ) -> TypeId {
        let pruned = self.prune(ty);
        let Some((con, args)) = self.operator_of(pruned).map(|(c, a)| (c.clone(), a.to_vec()))
        else {
            if !self.is_generic(pruned, non_generic) {
                return pruned;
            }
            if let Some(mapped) = mappings.get(&pruned) {
                return *mapped;
            }
            let mapped = self.new_var();
            mappings.insert(pruned, mapped);
            return mapped;
        };
        if args.is_empty() {
            return pruned;
        }
        let args = args
            .into_iter()
            .map(|arg| self.fresh_rec(arg, non_generic, mappings))
            .collect();
        self.operator(con, args)
    }

    /// Make `t1` and `t2` structurally identical, binding variables as needed.
    pub fn unify(&mut self, t1: TypeId, t2: TypeId) -> Result<(), UnifyError> {
        let left = self.prune(t1);
        let right = self.prune(t2);

        if self.is_var(left) {
            if left == right {
                return Ok(());
            }
            if self.occurs_in(left, right) {
                return Err(UnifyError::Recursive {
                    var: self.display(left),
                    ty: self.display(right),
                });
            }
            tracing::trace!(
                var = left.index(),
                ty = %self.display(right),
                "bound type variable"
            );
            self.bind(left, right);
            return Ok(());
        }

        if self.is_var(right) {
            return self.unify(right, left);
        }

        let (left_con, left_args, right_con, right_args) =
            match (self.view(left), self.view(right)) {
                (TypeView::Op(lc, la), TypeView::Op(rc, ra)) => {
                    (lc.clone(), la.to_vec(), rc.clone(), ra.to_vec())
                }
                _ => unreachable!("pruned non-variables are operators"),
            };

        if left_con != right_con || left_args.len() != right_args.len() {
            return Err(UnifyError::Mismatch {
                left: self.display(left),
                right: self.display(right),
            });
        }

        for (l, r) in left_args.into_iter().zip(right_args) {
            self.unify(l, r)?;
        }
        Ok(())
    }
}
