#![forbid(unsafe_code)]

use std::fmt;

/// Handle to a type stored in [`Types`].
///
/// Both type variables and type operators live in the same arena; a handle is
/// only meaningful for the arena that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Name of a type operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyCon {
    Number,
    Bool,
    String,
    Unit,
    /// `{elem}`
    List,
    /// `#{key: value}`
    Map,
    /// `#(a, b, ...)`; the arity is part of the name.
    Tuple(usize),
    /// `&(params...) -> ret`; components are the params followed by the result.
    Fn,
    /// User-defined blueprint/struct/enum/trait.
    Named(String),
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TyCon::Number => f.write_str("Number"),
            TyCon::Bool => f.write_str("Bool"),
            TyCon::String => f.write_str("String"),
            TyCon::Unit => f.write_str("Unit"),
            TyCon::List => f.write_str("List"),
            TyCon::Map => f.write_str("Map"),
            TyCon::Tuple(n) => write!(f, "Tuple#{n}"),
            TyCon::Fn => f.write_str("Fn"),
            TyCon::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Binding {
    Unbound,
    Bound(TypeId),
}

#[derive(Clone, Debug)]
enum TypeNode {
    Var(Binding),
    Op(TyCon, Vec<TypeId>),
}

/// A pruned type, as seen by inspection and unification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeView<'a> {
    Var(TypeId),
    Op(&'a TyCon, &'a [TypeId]),
}

/// Marks a point the arena can be rolled back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeSnapshot {
    nodes: usize,
    trail: usize,
}

/// Arena of type variables and type operators.
///
/// Variables start unbound and can be bound exactly once; `prune` follows
/// the chain of bindings to its terminal type.
#[derive(Clone, Debug)]
pub struct Types {
    nodes: Vec<TypeNode>,
    // Variables bound since creation, in binding order.
    trail: Vec<TypeId>,
    number: TypeId,
    boolean: TypeId,
    string: TypeId,
    unit: TypeId,
}

impl Types {
    pub fn new() -> Self {
        let mut types = Self {
            nodes: Vec::new(),
            trail: Vec::new(),
            number: TypeId(0),
            boolean: TypeId(0),
            string: TypeId(0),
            unit: TypeId(0),
        };
        types.number = types.operator(TyCon::Number, Vec::new());
        types.boolean = types.operator(TyCon::Bool, Vec::new());
        types.string = types.operator(TyCon::String, Vec::new());
        types.unit = types.operator(TyCon::Unit, Vec::new());
        types
    }

    fn push(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn new_var(&mut self) -> TypeId {
        self.push(TypeNode::Var(Binding::Unbound))
    }

    pub fn operator(&mut self, con: TyCon, args: Vec<TypeId>) -> TypeId {
        self.push(TypeNode::Op(con, args))
    }

    pub fn number(&self) -> TypeId {
        self.number
    }

    pub fn bool(&self) -> TypeId {
        self.boolean
    }

    pub fn string(&self) -> TypeId {
        self.string
    }

    pub fn unit(&self) -> TypeId {
        self.unit
    }

    pub fn list(&mut self, elem: TypeId) -> TypeId {
        self.operator(TyCon::List, vec![elem])
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.operator(TyCon::Map, vec![key, value])
    }

    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.operator(TyCon::Tuple(elems.len()), elems)
    }

    pub fn function(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        let mut args = params;
        args.push(ret);
        self.operator(TyCon::Fn, args)
    }

    pub fn named(&mut self, name: &str, args: Vec<TypeId>) -> TypeId {
        self.operator(TyCon::Named(name.to_string()), args)
    }

    pub fn is_var(&self, ty: TypeId) -> bool {
        matches!(self.nodes[ty.index()], TypeNode::Var(_))
    }

    /// The type `ty` has been bound to, if it is a bound variable.
    pub fn instance(&self, ty: TypeId) -> Option<TypeId> {
        match self.nodes[ty.index()] {
            TypeNode::Var(Binding::Bound(to)) => Some(to),
            _ => None,
        }
    }

    /// Follow variable bindings until an unbound variable or an operator.
    pub fn prune(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        while let Some(next) = self.instance(current) {
            current = next;
        }
        current
    }

    pub fn view(&self, ty: TypeId) -> TypeView<'_> {
        let pruned = self.prune(ty);
        match &self.nodes[pruned.index()] {
            TypeNode::Var(_) => TypeView::Var(pruned),
            TypeNode::Op(con, args) => TypeView::Op(con, args),
        }
    }

    /// Components of a pruned operator, or `None` for a variable.
    pub fn operator_of(&self, ty: TypeId) -> Option<(&TyCon, &[TypeId])> {
        match self.view(ty) {
            TypeView::Op(con, args) => Some((con, args)),
            TypeView::Var(_) => None,
        }
    }

    pub fn is_con(&self, ty: TypeId, con: &TyCon) -> bool {
        matches!(self.view(ty), TypeView::Op(c, _) if c == con)
    }

    /// Bind an unbound variable. Panics if `var` is not an unbound variable;
    /// callers go through [`Types::unify`].
    pub(crate) fn bind(&mut self, var: TypeId, to: TypeId) {
        match &mut self.nodes[var.index()] {
            TypeNode::Var(binding @ Binding::Unbound) => {
                *binding = Binding::Bound(to);
                self.trail.push(var);
            }
            node => panic!("cannot bind {var:?}: {node:?} is not an unbound variable"),
        }
    }

    /// Structural identity of two pruned types: same operator, same arity,
    /// pairwise-identical components; variables compare by identity.
    pub fn same(&self, a: TypeId, b: TypeId) -> bool {
        match (self.view(a), self.view(b)) {
            (TypeView::Var(x), TypeView::Var(y)) => x == y,
            (TypeView::Op(c1, a1), TypeView::Op(c2, a2)) => {
                c1 == c2
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2).all(|(x, y)| self.same(*x, *y))
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> TypeSnapshot {
        TypeSnapshot {
            nodes: self.nodes.len(),
            trail: self.trail.len(),
        }
    }

    /// Undo every binding and allocation made after `snapshot`.
    pub fn rollback_to(&mut self, snapshot: TypeSnapshot) {
        for var in self.trail.drain(snapshot.trail..).rev() {
            if let TypeNode::Var(binding) = &mut self.nodes[var.index()] {
                *binding = Binding::Unbound;
            }
        }
        self.nodes.truncate(snapshot.nodes);
    }

    /// Drop the bind trail. Bindings made so far can no longer be undone;
    /// take a new snapshot afterwards.
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    pub fn display(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_list(&self, out: &mut String, items: &[TypeId]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, *item);
        }
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        match self.view(ty) {
            TypeView::Var(v) => {
                out.push('?');
                out.push_str(&v.0.to_string());
            }
            TypeView::Op(con, args) => match con {
                TyCon::List => {
                    out.push('{');
                    self.write_list(out, args);
                    out.push('}');
                }
                TyCon::Map => {
                    out.push_str("#{");
                    if let [key, value] = args {
                        self.write_type(out, *key);
                        out.push_str(": ");
                        self.write_type(out, *value);
                    }
                    out.push('}');
                }
                TyCon::Tuple(_) => {
                    out.push_str("#(");
                    self.write_list(out, args);
                    out.push(')');
                }
                TyCon::Fn => {
                    let (ret, params) = args.split_last().map_or((None, args), |(r, p)| (Some(r), p));
                    out.push_str("&(");
                    self.write_list(out, params);
                    out.push_str(") -> ");
                    if let Some(ret) = ret {
                        self.write_type(out, *ret);
                    }
                }
                _ => {
                    out.push_str(&con.to_string());
                    if !args.is_empty() {
                        out.push('<');
                        self.write_list(out, args);
                        out.push('>');
                    }
                }
            },
        }
    }
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}
