#![forbid(unsafe_code)]

mod binder;
mod checker;
mod error;
mod scope;
mod sema;
mod types;
mod unify;

pub use binder::{Declaration, bind_declarations, declaration};
pub use checker::{CheckOptions, Checker};
pub use error::{ScopeError, SemanticError, TypeError};
pub use scope::{ScopeSnapshot, Scopes, Symbol, SymbolKind};
pub use sema::{Analyzer, Node, resolve_sig};
pub use types::{TyCon, TypeId, TypeSnapshot, TypeView, Types};
pub use unify::{NonGeneric, UnifyError};
