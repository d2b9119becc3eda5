use quack_ast::build::*;
use quack_ast::{Stmt, VarKind};
use quack_core::{
    Analyzer, CheckOptions, Checker, NonGeneric, Node, ScopeError, Scopes, SemanticError, SymbolKind,
    TypeId, Types,
};

fn check(stmts: Vec<Stmt>) -> Result<(Checker, Vec<TypeId>), SemanticError> {
    let mut checker = Checker::new();
    let types = checker.check_program(&mut program(stmts))?;
    Ok((checker, types))
}

#[test]
fn constant_declared_twice_in_one_block() {
    let err = check(vec![block(vec![const_("x", num(1.0)), const_("x", num(2.0))])])
        .expect_err("duplicate const");
    let SemanticError::Scope(ScopeError::Duplicate { kind, name, .. }) = &err else {
        panic!("expected duplicate, got {err:?}");
    };
    assert_eq!(*kind, SymbolKind::Variable);
    assert_eq!(name, "x");
    assert_eq!(err.to_string(), "variable `x` declared twice in the same scope");
}

#[test]
fn inner_block_may_shadow_outer_name() {
    let (checker, _) = check(vec![
        let_("x", num(1.0)),
        block(vec![
            let_("x", string("inner")),
            expr_stmt(binary(name("x"), quack_ast::BinOp::Concat, string("!"))),
        ]),
        expr_stmt(binary(name("x"), quack_ast::BinOp::Add, num(1.0))),
    ])
    .expect("shadowing");
    let x = checker.type_of("x").expect("x");
    assert_eq!(checker.display(x), "Number");
}

#[test]
fn undefined_name_is_reported() {
    let err = check(vec![expr_stmt(name("ghost"))]).expect_err("undefined");
    assert_eq!(err.to_string(), "use of undefined name `ghost`");
}

#[test]
fn later_sibling_is_visible_before_its_declaration() {
    let (checker, _) = check(vec![
        fn_("first", &[], vec![ret(Some(call(name("second"), vec![])))]),
        fn_("second", &[], vec![ret(Some(num(1.0)))]),
    ])
    .expect("forward reference");
    let first = checker.type_of("first").expect("first");
    assert_eq!(checker.display(first), "&() -> Number");
}

#[test]
fn break_targets_an_enclosing_label() {
    check(vec![label(
        "outer",
        while_(boolean(true), vec![while_(boolean(true), vec![break_(Some("outer"))])]),
    )])
    .expect("labelled break");

    check(vec![while_(boolean(true), vec![continue_(None), break_(None)])]).expect("plain jumps");
}

#[test]
fn break_to_a_variable_is_rejected() {
    let err = check(vec![
        let_("x", num(1.0)),
        while_(boolean(true), vec![break_(Some("x"))]),
    ])
    .expect_err("break x");
    assert!(matches!(
        err,
        SemanticError::Scope(ScopeError::NotALabel {
            kind: SymbolKind::Variable,
            ..
        })
    ));

    let err = check(vec![while_(boolean(true), vec![break_(Some("nowhere"))])])
        .expect_err("missing label");
    assert!(matches!(err, SemanticError::Scope(ScopeError::Undefined { .. })));
}

#[test]
fn label_is_not_a_value() {
    let err = check(vec![label("outer", expr_stmt(name("outer")))]).expect_err("label as value");
    assert!(matches!(err, SemanticError::Scope(ScopeError::NotAValue { .. })));
}

#[test]
fn label_does_not_leak_into_the_enclosing_scope() {
    let err = check(vec![
        label("outer", while_(boolean(true), vec![break_(None)])),
        while_(boolean(true), vec![break_(Some("outer"))]),
    ])
    .expect_err("label out of scope");
    assert!(matches!(err, SemanticError::Scope(ScopeError::Undefined { .. })));
}

#[test]
fn return_outside_function() {
    let err = check(vec![ret(Some(num(1.0)))]).expect_err("top-level return");
    assert!(matches!(
        err,
        SemanticError::Scope(ScopeError::ReturnOutsideFunction { .. })
    ));
}

#[test]
fn constants_cannot_be_reassigned() {
    let err = check(vec![
        const_("limit", num(10.0)),
        expr_stmt(assign("limit", num(11.0))),
    ])
    .expect_err("assign const");
    assert_eq!(err.to_string(), "cannot assign to immutable `limit`");

    check(vec![
        var(VarKind::Const, "late", None, None),
        expr_stmt(assign("late", num(1.0))),
    ])
    .expect("first assignment initializes");

    let err = check(vec![
        var(VarKind::Const, "late", None, None),
        expr_stmt(assign("late", num(1.0))),
        expr_stmt(assign("late", num(2.0))),
    ])
    .expect_err("second assignment");
    assert!(matches!(
        err,
        SemanticError::Scope(ScopeError::ImmutableAssignment { .. })
    ));
}

#[test]
fn assignment_keeps_the_declared_type() {
    let (_, types) = check(vec![let_("n", num(1.0)), expr_stmt(assign("n", num(2.0)))])
        .expect("reassign");
    assert_eq!(types.len(), 2);

    let err = check(vec![let_("n", num(1.0)), expr_stmt(assign("n", string("two")))])
        .expect_err("retype");
    assert_eq!(err.to_string(), "type mismatch: Number != String");
}

#[test]
fn functions_are_not_assignable() {
    let err = check(vec![fn_("f", &[], vec![]), expr_stmt(assign("f", num(1.0)))])
        .expect_err("assign to fn");
    assert!(matches!(err, SemanticError::Scope(ScopeError::NotAValue { .. })));
}

#[test]
fn signatures_resolve_user_types() {
    let (checker, _) = check(vec![
        struct_("Point", vec![("x", sig("Number")), ("y", sig("Number"))]),
        var(VarKind::Let, "origin", Some(sig("Point")), None),
        var(
            VarKind::Let,
            "names",
            Some(sig_map(sig("String"), sig_list(sig("Point")))),
            Some(map(vec![])),
        ),
    ])
    .expect("sema");
    let origin = checker.type_of("origin").expect("origin");
    assert_eq!(checker.display(origin), "Point");
    let names = checker.type_of("names").expect("names");
    assert_eq!(checker.display(names), "#{String: {Point}}");
}

#[test]
fn value_in_signature_is_not_a_type() {
    let err = check(vec![
        let_("x", num(1.0)),
        var(VarKind::Let, "y", Some(sig("x")), None),
    ])
    .expect_err("value as type");
    assert!(matches!(err, SemanticError::Scope(ScopeError::NotAType { .. })));
}

#[test]
fn struct_fields_and_enum_variants_must_be_distinct() {
    let err = check(vec![struct_("P", vec![("x", sig("Number")), ("x", sig("Bool"))])])
        .expect_err("field twice");
    assert!(matches!(err, SemanticError::Scope(ScopeError::Duplicate { .. })));

    let err = check(vec![enum_("Color", &["Red", "Red"])]).expect_err("variant twice");
    assert_eq!(err.to_string(), "variant `Red` declared twice in the same scope");
}

#[test]
fn blueprint_members_live_in_their_own_scope() {
    let (checker, types) = check(vec![
        blueprint(
            "Duck",
            vec![member("name", Some(string("Donald"))), fn_("speak", &[], vec![ret(Some(string("quack")))])],
        ),
        trait_("Swims", vec![fn_("swim", &[], vec![])]),
    ])
    .expect("sema");
    assert_eq!(checker.display(types[0]), "Duck");
    assert_eq!(checker.display(types[1]), "Swims");
    assert!(checker.type_of("name").is_none());
    assert!(checker.type_of("speak").is_none());
}

#[test]
fn strict_shadowing_forbids_values_over_types() {
    let stmts = || {
        vec![
            struct_("Point", vec![]),
            fn_("make", &[], vec![let_("Point", num(0.0))]),
        ]
    };

    check(stmts()).expect("unrestricted by default");

    let mut checker = Checker::with_options(CheckOptions::default().with_strict_shadowing(true));
    let err = checker
        .check_program(&mut program(stmts()))
        .expect_err("strict");
    assert!(matches!(err, SemanticError::Scope(ScopeError::ShadowsType { .. })));
}

#[test]
fn strict_shadowing_covers_parameters() {
    let strict = || Checker::with_options(CheckOptions::default().with_strict_shadowing(true));

    let err = strict()
        .check_program(&mut program(vec![
            struct_("Point", vec![]),
            fn_("f", &["Point"], vec![]),
        ]))
        .expect_err("function parameter");
    assert!(matches!(err, SemanticError::Scope(ScopeError::ShadowsType { .. })));

    let err = strict()
        .check_program(&mut program(vec![
            enum_("Color", &["Red"]),
            let_("paint", lambda(&["Color"], num(0.0))),
        ]))
        .expect_err("lambda parameter");
    assert_eq!(
        err.to_string(),
        "`Color` shadows a type declared in an enclosing scope"
    );

    check(vec![struct_("Point", vec![]), fn_("f", &["Point"], vec![])])
        .expect("parameters shadow freely by default");
}

#[test]
fn type_names_are_not_values() {
    let err = check(vec![struct_("Point", vec![]), let_("p", name("Point"))])
        .expect_err("struct as value");
    assert_eq!(err.to_string(), "struct `Point` cannot be used as a value");

    let err = check(vec![
        trait_("Swims", vec![]),
        expr_stmt(call(name("Swims"), vec![])),
    ])
    .expect_err("trait as value");
    assert!(matches!(
        err,
        SemanticError::Scope(ScopeError::NotAValue {
            kind: SymbolKind::Trait,
            ..
        })
    ));
}

#[test]
fn analysis_requires_injected_scopes() {
    let mut types = Types::new();
    let mut scopes = Scopes::new();
    let root = scopes.create_root();
    let options = CheckOptions::default();
    let mut cx = Analyzer::new(&mut types, &mut scopes, &options);
    let non_generic = NonGeneric::new();

    let err = num(1.0)
        .analyze(&mut cx, root, &non_generic)
        .expect_err("uninjected expression");
    assert!(matches!(err, SemanticError::Scope(ScopeError::MissingScope { .. })));

    let err = block_of(vec![expr_stmt(num(1.0))])
        .analyze(&mut cx, root, &non_generic)
        .expect_err("uninjected block");
    assert_eq!(err.to_string(), "node was analyzed before scope injection");

    let err = program(vec![expr_stmt(num(1.0))])
        .analyze(&mut cx, root, &non_generic)
        .expect_err("uninjected program");
    assert!(matches!(err, SemanticError::Scope(ScopeError::MissingScope { .. })));

    let mut injected = program(vec![expr_stmt(num(1.0))]);
    injected.inject_scope(&mut cx, root).expect("inject");
    let ty = injected.analyze(&mut cx, root, &non_generic).expect("analyze");
    assert_eq!(cx.types.display(ty), "Number");
}
