#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use quack_ast::Span;
use miette::Diagnostic;
use thiserror::Error;

use crate::scope::SymbolKind;

/// Failures while building or resolving the scope chain.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ScopeError {
    #[error("{kind} `{name}` declared twice in the same scope")]
    #[diagnostic(code(quack::scope::duplicate))]
    Duplicate {
        kind: SymbolKind,
        name: String,
        #[label("redeclared here")]
        span: Span,
    },

    #[error("use of undefined name `{name}`")]
    #[diagnostic(code(quack::scope::undefined))]
    Undefined {
        name: String,
        #[label("not found in this scope")]
        span: Span,
    },

    #[error("{kind} `{name}` cannot be used as a value")]
    #[diagnostic(code(quack::scope::not_a_value))]
    NotAValue {
        kind: SymbolKind,
        name: String,
        #[label]
        span: Span,
    },

    #[error("{kind} `{name}` is not a type")]
    #[diagnostic(code(quack::scope::not_a_type))]
    NotAType {
        kind: SymbolKind,
        name: String,
        #[label]
        span: Span,
    },

    #[error("{kind} `{name}` is not a label")]
    #[diagnostic(code(quack::scope::not_a_label))]
    NotALabel {
        kind: SymbolKind,
        name: String,
        #[label]
        span: Span,
    },

    #[error("cannot assign to immutable `{name}`")]
    #[diagnostic(code(quack::scope::immutable))]
    ImmutableAssignment {
        name: String,
        #[label]
        span: Span,
    },

    #[error("`return` outside of a function")]
    #[diagnostic(code(quack::scope::return_outside_fn))]
    ReturnOutsideFunction {
        #[label]
        span: Span,
    },

    #[error("`{name}` shadows a type declared in an enclosing scope")]
    #[diagnostic(code(quack::scope::shadows_type))]
    ShadowsType {
        name: String,
        #[label]
        span: Span,
    },

    #[error("node was analyzed before scope injection")]
    #[diagnostic(code(quack::scope::missing))]
    MissingScope {
        #[label]
        span: Span,
    },
}

/// Failures while inferring or checking types.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum TypeError {
    #[error("type mismatch: {left} != {right}")]
    #[diagnostic(code(quack::types::mismatch))]
    Mismatch {
        left: String,
        right: String,
        #[label]
        span: Span,
    },

    #[error("recursive unification: {var} occurs in {ty}")]
    #[diagnostic(code(quack::types::recursive))]
    RecursiveUnification {
        var: String,
        ty: String,
        #[label]
        span: Span,
    },

    #[error("expected index of list to be a number, got `{found}`")]
    #[diagnostic(code(quack::types::non_numeric_index))]
    NonNumericIndex {
        found: String,
        #[label]
        span: Span,
    },

    #[error("expected index of map to be `{expected}`, got `{found}`")]
    #[diagnostic(code(quack::types::key_mismatch))]
    IndexKeyMismatch {
        expected: String,
        found: String,
        #[label]
        span: Span,
    },

    #[error("value of type `{found}` is not indexable")]
    #[diagnostic(code(quack::types::not_indexable))]
    NotIndexable {
        found: String,
        #[label]
        span: Span,
    },

    #[error("operator `{op}` cannot be applied to operand of type `{operand}`")]
    #[diagnostic(code(quack::types::operator))]
    OperatorMismatch {
        op: &'static str,
        operand: String,
        #[label]
        span: Span,
    },

    #[error("operator `{op}` cannot be applied to operands of type `{left}` and `{right}`")]
    #[diagnostic(code(quack::types::operator))]
    BinaryOperatorMismatch {
        op: &'static str,
        left: String,
        right: String,
        #[label]
        span: Span,
    },
}

/// The single failure surfaced by an analysis pass.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum SemanticError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Type(#[from] TypeError),
}

impl ScopeError {
    pub fn span(&self) -> Span {
        match self {
            ScopeError::Duplicate { span, .. }
            | ScopeError::Undefined { span, .. }
            | ScopeError::NotAValue { span, .. }
            | ScopeError::NotAType { span, .. }
            | ScopeError::NotALabel { span, .. }
            | ScopeError::ImmutableAssignment { span, .. }
            | ScopeError::ReturnOutsideFunction { span }
            | ScopeError::ShadowsType { span, .. }
            | ScopeError::MissingScope { span } => *span,
        }
    }
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::RecursiveUnification { span, .. }
            | TypeError::NonNumericIndex { span, .. }
            | TypeError::IndexKeyMismatch { span, .. }
            | TypeError::NotIndexable { span, .. }
            | TypeError::OperatorMismatch { span, .. }
            | TypeError::BinaryOperatorMismatch { span, .. } => *span,
        }
    }
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::Scope(e) => e.span(),
            SemanticError::Type(e) => e.span(),
        }
    }
}
