#![forbid(unsafe_code)]

use quack_ast::{ScopeId, TypeSig};

use super::Analyzer;
use crate::error::{ScopeError, SemanticError};
use crate::types::TypeId;

/// Turn a written signature into a type, resolving user type names in `scope`.
pub fn resolve_sig(
    cx: &mut Analyzer<'_>,
    scope: ScopeId,
    sig: &TypeSig,
) -> Result<TypeId, SemanticError> {
    match sig {
        TypeSig::Name(name) => match name.node.as_str() {
            "Number" => Ok(cx.types.number()),
            "Bool" => Ok(cx.types.bool()),
            "String" => Ok(cx.types.string()),
            "Unit" => Ok(cx.types.unit()),
            other => {
                let (_, symbol) = cx.scopes.resolve(scope, name)?;
                if !symbol.kind.is_type() {
                    return Err(ScopeError::NotAType {
                        kind: symbol.kind,
                        name: other.to_string(),
                        span: name.span,
                    }
                    .into());
                }
                Ok(cx.types.named(other, Vec::new()))
            }
        },
        TypeSig::List { elem, .. } => {
            let elem = resolve_sig(cx, scope, elem)?;
            Ok(cx.types.list(elem))
        }
        TypeSig::Map { key, value, .. } => {
            let key = resolve_sig(cx, scope, key)?;
            let value = resolve_sig(cx, scope, value)?;
            Ok(cx.types.map(key, value))
        }
        TypeSig::Tuple { elems, .. } => {
            let elems = elems
                .iter()
                .map(|e| resolve_sig(cx, scope, e))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(cx.types.tuple(elems))
        }
        TypeSig::Fn { params, ret, .. } => {
            let params = params
                .iter()
                .map(|p| resolve_sig(cx, scope, p))
                .collect::<Result<Vec<_>, _>>()?;
            let ret = resolve_sig(cx, scope, ret)?;
            Ok(cx.types.function(params, ret))
        }
    }
}
