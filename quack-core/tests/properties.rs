use std::collections::HashMap;

use proptest::prelude::{Just, Strategy, prop, prop_oneof};
use proptest::test_runner::{Config, TestCaseError, TestRunner};
use proptest::{prop_assert, prop_assert_eq};
use quack_core::{NonGeneric, TypeId, TypeView, Types, UnifyError};

const POOL: usize = 3;

#[derive(Clone, Debug)]
enum Shape {
    Var(usize),
    Number,
    Bool,
    Str,
    List(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Tuple(Vec<Shape>),
    Fn(Vec<Shape>, Box<Shape>),
}

/// Where the variable sits inside the wrapper built around it.
#[derive(Clone, Copy, Debug)]
enum Wrap {
    List,
    MapKey,
    MapValue,
    TupleHead,
    FnParam,
    FnRet,
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (0..POOL).prop_map(Shape::Var),
        Just(Shape::Number),
        Just(Shape::Bool),
        Just(Shape::Str),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::List(Box::new(s))),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| Shape::Map(Box::new(k), Box::new(v))),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Shape::Tuple),
            (prop::collection::vec(inner.clone(), 0..3), inner)
                .prop_map(|(params, ret)| Shape::Fn(params, Box::new(ret))),
        ]
    })
}

fn wrap() -> impl Strategy<Value = Wrap> {
    prop_oneof![
        Just(Wrap::List),
        Just(Wrap::MapKey),
        Just(Wrap::MapValue),
        Just(Wrap::TupleHead),
        Just(Wrap::FnParam),
        Just(Wrap::FnRet),
    ]
}

fn build(types: &mut Types, pool: &[TypeId], shape: &Shape) -> TypeId {
    match shape {
        Shape::Var(i) => pool[*i % pool.len()],
        Shape::Number => types.number(),
        Shape::Bool => types.bool(),
        Shape::Str => types.string(),
        Shape::List(elem) => {
            let elem = build(types, pool, elem);
            types.list(elem)
        }
        Shape::Map(key, value) => {
            let key = build(types, pool, key);
            let value = build(types, pool, value);
            types.map(key, value)
        }
        Shape::Tuple(elems) => {
            let elems = elems.iter().map(|e| build(types, pool, e)).collect();
            types.tuple(elems)
        }
        Shape::Fn(params, ret) => {
            let params = params.iter().map(|p| build(types, pool, p)).collect();
            let ret = build(types, pool, ret);
            types.function(params, ret)
        }
    }
}

fn arena() -> (Types, Vec<TypeId>) {
    let mut types = Types::new();
    let pool = (0..POOL).map(|_| types.new_var()).collect();
    (types, pool)
}

/// Walk `original` and `copy` together, recording where each variable of
/// the original went. Fails if the shapes differ or one variable is sent to
/// two places.
fn correspond(
    types: &Types,
    original: TypeId,
    copy: TypeId,
    seen: &mut HashMap<TypeId, TypeId>,
) -> Result<(), TestCaseError> {
    match (types.view(original), types.view(copy)) {
        (TypeView::Var(a), TypeView::Var(b)) => {
            let mapped = *seen.entry(a).or_insert(b);
            prop_assert_eq!(mapped, b, "variable mapped twice within one call");
            Ok(())
        }
        (TypeView::Op(c1, a1), TypeView::Op(c2, a2)) => {
            prop_assert_eq!(c1, c2);
            prop_assert_eq!(a1.len(), a2.len());
            let pairs: Vec<_> = a1.iter().copied().zip(a2.iter().copied()).collect();
            for (x, y) in pairs {
                correspond(types, x, y, seen)?;
            }
            Ok(())
        }
        _ => Err(TestCaseError::fail("fresh copy changed the shape")),
    }
}

#[test]
fn occurs_check_rejects_wrapped_variable() {
    let mut runner = TestRunner::new(Config {
        cases: 256,
        ..Config::default()
    });
    let strat = (prop::collection::vec(wrap(), 1..5), shape());

    runner
        .run(&strat, |(wraps, filler)| {
            let (mut types, pool) = arena();
            let v = types.new_var();
            let mut t = v;
            for w in &wraps {
                let other = build(&mut types, &pool, &filler);
                t = match w {
                    Wrap::List => types.list(t),
                    Wrap::MapKey => types.map(t, other),
                    Wrap::MapValue => types.map(other, t),
                    Wrap::TupleHead => types.tuple(vec![t, other]),
                    Wrap::FnParam => types.function(vec![t], other),
                    Wrap::FnRet => types.function(vec![other], t),
                };
            }

            let err = types.unify(v, t);
            prop_assert!(
                matches!(err, Err(UnifyError::Recursive { .. })),
                "expected Recursive, got {:?}",
                err
            );
            prop_assert_eq!(types.instance(v), None);

            let err = types.unify(t, v);
            prop_assert!(
                matches!(err, Err(UnifyError::Recursive { .. })),
                "expected Recursive, got {:?}",
                err
            );
            Ok(())
        })
        .expect("occurs-check property");
}

#[test]
fn unify_is_symmetric() {
    let mut runner = TestRunner::new(Config {
        cases: 256,
        ..Config::default()
    });
    let strat = (shape(), shape());

    runner
        .run(&strat, |(left, right)| {
            let (mut forward, pool) = arena();
            let a = build(&mut forward, &pool, &left);
            let b = build(&mut forward, &pool, &right);
            let there = forward.unify(a, b);

            let (mut backward, pool) = arena();
            let a2 = build(&mut backward, &pool, &left);
            let b2 = build(&mut backward, &pool, &right);
            let back = backward.unify(b2, a2);

            prop_assert_eq!(there.is_ok(), back.is_ok());
            if there.is_ok() {
                prop_assert!(forward.same(a, b));
                prop_assert!(backward.same(a2, b2));
            }
            Ok(())
        })
        .expect("symmetry property");
}

#[test]
fn fresh_renames_generic_variables_consistently() {
    let mut runner = TestRunner::new(Config {
        cases: 256,
        ..Config::default()
    });

    runner
        .run(&shape(), |source| {
            let (mut types, pool) = arena();
            let ty = build(&mut types, &pool, &source);
            let non_generic = NonGeneric::new();

            let first = types.fresh(ty, &non_generic);
            let second = types.fresh(ty, &non_generic);

            let mut one = HashMap::new();
            correspond(&types, ty, first, &mut one)?;
            let mut two = HashMap::new();
            correspond(&types, ty, second, &mut two)?;

            for (original, copy) in &one {
                prop_assert!(!pool.contains(copy), "generic variable was shared");
                prop_assert!(pool.contains(original));
                prop_assert!(two.get(original) != Some(copy), "copies share a variable");
            }
            Ok(())
        })
        .expect("fresh instantiation property");
}

#[test]
fn fresh_keeps_pinned_variables_shared() {
    let mut runner = TestRunner::new(Config {
        cases: 128,
        ..Config::default()
    });

    runner
        .run(&shape(), |source| {
            let (mut types, pool) = arena();
            let ty = build(&mut types, &pool, &source);
            let non_generic: NonGeneric = [pool[0]].into_iter().collect();

            let copy = types.fresh(ty, &non_generic);
            let mut seen = HashMap::new();
            correspond(&types, ty, copy, &mut seen)?;
            if let Some(mapped) = seen.get(&pool[0]) {
                prop_assert_eq!(*mapped, pool[0]);
            }
            Ok(())
        })
        .expect("pinned variable property");
}
