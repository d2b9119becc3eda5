#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;

use quack_ast::{Ident, ScopeId, Span};

use crate::error::ScopeError;
use crate::types::TypeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
    Blueprint,
    Struct,
    Enum,
    Trait,
    Label,
    Variant,
}

impl SymbolKind {
    /// Kinds that name a type rather than a value.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Blueprint | SymbolKind::Struct | SymbolKind::Enum | SymbolKind::Trait
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Blueprint => "blueprint",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::Label => "label",
            SymbolKind::Variant => "variant",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub mutable: bool,
    pub initialized: bool,
    /// Assigned during analysis; `None` right after pre-binding.
    pub ty: Option<TypeId>,
    pub span: Span,
}

impl Symbol {
    pub fn new(kind: SymbolKind, span: Span) -> Self {
        Self {
            kind,
            mutable: false,
            initialized: true,
            ty: None,
            span,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

/// State of the arena plus the contents of one persistent scope.
#[derive(Clone, Debug)]
pub struct ScopeSnapshot {
    len: usize,
    kept: ScopeId,
    symbols: HashMap<String, Symbol>,
}

/// Arena of scopes linked by parent index.
///
/// A child is always allocated after its parent, so parent links only point
/// backwards and every chain ends at a root.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    scopes: Vec<ScopeData>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn create_root(&mut self) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(ScopeData::default());
        id
    }

    pub fn create_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(ScopeData {
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        tracing::trace!(scope = id.index(), parent = parent.index(), "created scope");
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn has_local(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.index()].symbols.contains_key(name)
    }

    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.index()].symbols.get(name)
    }

    pub fn insert_local(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: Symbol,
    ) -> Result<(), ScopeError> {
        if self.has_local(scope, name) {
            return Err(ScopeError::Duplicate {
                kind: symbol.kind,
                name: name.to_string(),
                span: symbol.span,
            });
        }
        self.scopes[scope.index()]
            .symbols
            .insert(name.to_string(), symbol);
        Ok(())
    }

    /// Walk the parent chain; returns the scope that holds the symbol too.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.get_local(id, name) {
                return Some((id, symbol));
            }
            current = self.parent(id);
        }
        None
    }

    pub fn resolve(&self, scope: ScopeId, name: &Ident) -> Result<(ScopeId, &Symbol), ScopeError> {
        self.lookup(scope, &name.node)
            .ok_or_else(|| ScopeError::Undefined {
                name: name.node.clone(),
                span: name.span,
            })
    }

    pub fn symbol_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[scope.index()].symbols.get_mut(name)
    }

    pub fn symbols(&self, scope: ScopeId) -> impl Iterator<Item = (&str, &Symbol)> {
        self.scopes[scope.index()]
            .symbols
            .iter()
            .map(|(name, symbol)| (name.as_str(), symbol))
    }

    pub fn snapshot(&self, keep: ScopeId) -> ScopeSnapshot {
        ScopeSnapshot {
            len: self.scopes.len(),
            kept: keep,
            symbols: self.scopes[keep.index()].symbols.clone(),
        }
    }

    /// Drop scopes created after `snapshot` and restore the kept scope's symbols.
    pub fn rollback_to(&mut self, snapshot: ScopeSnapshot) {
        self.scopes.truncate(snapshot.len);
        if let Some(kept) = self.scopes.get_mut(snapshot.kept.index()) {
            kept.symbols = snapshot.symbols;
        }
    }
}
