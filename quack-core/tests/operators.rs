use quack_ast::build::*;
use quack_ast::{BinOp, PrefixOp, Stmt};
use quack_core::{Checker, SemanticError, TypeError, TypeId};

fn check(stmts: Vec<Stmt>) -> Result<(Checker, Vec<TypeId>), SemanticError> {
    let mut checker = Checker::new();
    let types = checker.check_program(&mut program(stmts))?;
    Ok((checker, types))
}

fn display_of(stmts: Vec<Stmt>) -> String {
    let (checker, types) = check(stmts).expect("sema");
    let last = *types.last().expect("at least one statement");
    checker.display(last)
}

#[test]
fn not_on_number_names_the_operator() {
    let err = check(vec![expr_stmt(prefix(PrefixOp::Not, num(1.0)))]).expect_err("not 1");
    assert!(matches!(
        err,
        SemanticError::Type(TypeError::OperatorMismatch { op: "not", .. })
    ));
    assert_eq!(
        err.to_string(),
        "operator `not` cannot be applied to operand of type `Number`"
    );
}

#[test]
fn minus_on_number_is_number() {
    assert_eq!(display_of(vec![expr_stmt(prefix(PrefixOp::Minus, num(3.0)))]), "Number");
    assert_eq!(display_of(vec![expr_stmt(prefix(PrefixOp::Plus, num(3.0)))]), "Number");
    assert_eq!(display_of(vec![expr_stmt(prefix(PrefixOp::Not, boolean(false)))]), "Bool");
}

#[test]
fn minus_on_string_is_rejected() {
    let err = check(vec![
        let_("s", string("x")),
        expr_stmt(prefix(PrefixOp::Minus, name("s"))),
    ])
    .expect_err("-s");
    assert_eq!(
        err.to_string(),
        "operator `-` cannot be applied to operand of type `String`"
    );
}

#[test]
fn prefix_constrains_an_unknown_operand() {
    let (checker, _) = check(vec![
        let_uninit("n"),
        expr_stmt(prefix(PrefixOp::Minus, name("n"))),
    ])
    .expect("sema");
    let n = checker.type_of("n").expect("n");
    assert_eq!(checker.display(n), "Number");
}

#[test]
fn binary_operator_families() {
    let cases = [
        (binary(num(1.0), BinOp::Add, num(2.0)), "Number"),
        (binary(num(1.0), BinOp::Pow, num(2.0)), "Number"),
        (binary(string("a"), BinOp::Concat, string("b")), "String"),
        (binary(num(1.0), BinOp::Le, num(2.0)), "Bool"),
        (binary(string("a"), BinOp::Eq, string("b")), "Bool"),
        (binary(boolean(true), BinOp::Xor, boolean(false)), "Bool"),
    ];
    for (expr, expected) in cases {
        assert_eq!(display_of(vec![expr_stmt(expr)]), expected);
    }
}

#[test]
fn binary_mismatch_reports_both_operands() {
    let err = check(vec![expr_stmt(binary(num(1.0), BinOp::Add, string("a")))])
        .expect_err("1 + \"a\"");
    assert_eq!(
        err.to_string(),
        "operator `+` cannot be applied to operands of type `Number` and `String`"
    );

    let err = check(vec![expr_stmt(binary(num(1.0), BinOp::Ne, boolean(true)))])
        .expect_err("1 <> true");
    assert!(matches!(
        err,
        SemanticError::Type(TypeError::BinaryOperatorMismatch { op: "<>", .. })
    ));
}

#[test]
fn lambda_call_and_when() {
    let (checker, types) = check(vec![
        let_("inc", lambda(&["x"], binary(name("x"), BinOp::Add, num(1.0)))),
        expr_stmt(call(name("inc"), vec![num(2.0)])),
        expr_stmt(when(boolean(true), string("yes"), string("no"))),
    ])
    .expect("sema");
    let inc = checker.type_of("inc").expect("inc");
    assert_eq!(checker.display(inc), "&(Number) -> Number");
    assert_eq!(checker.display(types[1]), "Number");
    assert_eq!(checker.display(types[2]), "String");
}

#[test]
fn when_requires_bool_condition_and_matching_branches() {
    let err = check(vec![expr_stmt(when(num(1.0), num(1.0), num(2.0)))]).expect_err("cond");
    assert_eq!(err.to_string(), "type mismatch: Number != Bool");

    let err = check(vec![expr_stmt(when(boolean(true), num(1.0), string("a")))])
        .expect_err("branches");
    assert!(matches!(err, SemanticError::Type(TypeError::Mismatch { .. })));
}

#[test]
fn calling_a_non_function_fails() {
    let err = check(vec![expr_stmt(call(num(1.0), vec![]))]).expect_err("call number");
    assert!(matches!(err, SemanticError::Type(TypeError::Mismatch { .. })));
}

#[test]
fn call_arity_must_match() {
    let err = check(vec![
        fn_("pair", &["a", "b"], vec![ret(Some(tuple(vec![name("a"), name("b")])))]),
        expr_stmt(call(name("pair"), vec![num(1.0)])),
    ])
    .expect_err("arity");
    assert!(matches!(err, SemanticError::Type(TypeError::Mismatch { .. })));
}

#[test]
fn list_items_share_one_type() {
    assert_eq!(display_of(vec![expr_stmt(list(vec![num(1.0), num(2.0)]))]), "{Number}");
    let err = check(vec![expr_stmt(list(vec![num(1.0), string("a")]))]).expect_err("mixed");
    assert_eq!(err.to_string(), "type mismatch: Number != String");
}
