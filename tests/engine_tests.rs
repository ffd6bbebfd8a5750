// ABOUTME: End-to-end scenarios driven entirely through the public `Engine` API.

use num_bigint::BigInt;
use ragnarok::value::Value;
use ragnarok::Engine;
use ragnarok::RagnarokError;

fn eval_display(engine: &mut Engine, src: &str) -> String {
    match engine.eval(src) {
        Ok(outcome) => outcome.value().map(|v| v.to_string()).unwrap_or_default(),
        Err(e) => panic!("unexpected error evaluating `{}`: {}", src, e),
    }
}

#[test]
fn single_symbol_def_form_binds_a_plain_value() {
    let mut engine = Engine::new();
    engine.eval("(def answer (* 6 7))").unwrap();
    assert_eq!(eval_display(&mut engine, "answer"), "42");
    // it is mutable, like `var`
    engine.root().update("ANSWER", Value::Number(BigInt::from(0)));
    assert_eq!(eval_display(&mut engine, "answer"), "0");
}

#[test]
fn recursive_factorial_of_ten_is_3628800() {
    let mut engine = Engine::new();
    engine.eval("(def (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))").unwrap();
    assert_eq!(eval_display(&mut engine, "(fact 10)"), "3628800");
}

#[test]
fn let_star_threads_bindings_through_a_chain() {
    let mut engine = Engine::new();
    assert_eq!(
        eval_display(&mut engine, "(let* ((a 2) (b (* a 3)) (c (+ a b))) (list a b c))"),
        "(2 6 8)"
    );
}

#[test]
fn and_or_short_circuit_including_empty_forms() {
    let mut engine = Engine::new();
    assert_eq!(eval_display(&mut engine, "(and)"), "#T");
    assert_eq!(eval_display(&mut engine, "(or)"), "#F");
    assert_eq!(eval_display(&mut engine, "(and 1 2 3)"), "3");
    assert_eq!(eval_display(&mut engine, "(and 1 #f 3)"), "#F");
    assert_eq!(eval_display(&mut engine, "(or #f #f 5)"), "5");
    assert_eq!(eval_display(&mut engine, "(or #f #f)"), "#F");
}

#[test]
fn named_let_loop_sums_one_to_ten() {
    let mut engine = Engine::new();
    assert_eq!(
        eval_display(&mut engine, "(let loop ((n 10) (s 0)) (if (= n 0) s (loop (- n 1) (+ s n))))"),
        "55"
    );
}

#[test]
fn user_defined_unless_macro_behaves_like_its_expansion() {
    let mut engine = Engine::new();
    engine.eval("(macro (unless c e) (if c (quote nil) e))").unwrap();
    assert_eq!(eval_display(&mut engine, "(unless #f 42)"), "42");
    assert_eq!(eval_display(&mut engine, "(unless #t 42)"), "NIL");
}

#[test]
fn fnrec_computes_fibonacci() {
    let mut engine = Engine::new();
    assert_eq!(
        eval_display(
            &mut engine,
            "((fnrec fib (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))) 10)"
        ),
        "55"
    );
}

#[test]
fn closures_capture_their_defining_environment() {
    let mut engine = Engine::new();
    engine.eval("(def (make-adder n) (fn (x) (+ x n)))").unwrap();
    engine.eval("(def add5 (make-adder 5))").unwrap();
    assert_eq!(eval_display(&mut engine, "(add5 10)"), "15");
}

#[test]
fn dict_round_trips_through_literal_syntax_and_make_dict() {
    let mut engine = Engine::new();
    assert_eq!(
        eval_display(&mut engine, "(dict-get (dict (\"x\" 1) (\"y\" 2)) \"y\")"),
        "2"
    );
    assert_eq!(
        eval_display(&mut engine, "(dict-get #dict((\"a\" 10)) \"a\")"),
        "10"
    );
}

#[test]
fn mutable_reference_cells_are_visible_across_shared_bindings() {
    let mut engine = Engine::new();
    engine.eval("(var counter (ref 0))").unwrap();
    engine.eval("(def (bump!) (ref-set counter (+ (ref-get counter) 1)))").unwrap();
    engine.eval("(bump!)").unwrap();
    engine.eval("(bump!)").unwrap();
    assert_eq!(eval_display(&mut engine, "(ref-get counter)"), "2");
}

#[test]
fn map_filter_fold_compose_over_a_list() {
    let mut engine = Engine::new();
    engine.eval("(def (square x) (* x x))").unwrap();
    // squares of 1..5 are (1 4 9 16 25); keep those over 10; sum them.
    assert_eq!(
        eval_display(
            &mut engine,
            "(foldl + 0 (filter (fn (x) (> x 10)) (map square (list 1 2 3 4 5))))"
        ),
        "41"
    );
}

#[test]
fn tail_recursive_loop_of_one_hundred_thousand_does_not_overflow() {
    let mut engine = Engine::new();
    engine
        .eval("(def (count-down n) (if (= n 0) 0 (count-down (- n 1))))")
        .unwrap();
    assert_eq!(eval_display(&mut engine, "(count-down 100000)"), "0");
}

#[test]
fn unbound_symbol_and_wrong_arg_count_are_reported_with_their_kind() {
    let mut engine = Engine::new();
    let err = engine.eval("undefined-name").unwrap_err();
    assert!(matches!(err, RagnarokError::UnboundSymbol(_)));
    assert!(err.report().starts_with(";; UNBOUND-SYMBOL"));

    let err = engine.eval("(cons 1)").unwrap_err();
    assert!(matches!(err, RagnarokError::WrongArgCount { .. }));
}

#[test]
fn strict_read_rejects_garbage_after_one_expression() {
    let engine = Engine::new();
    assert!(engine.read("(+ 1 2) (+ 3 4)", true).is_err());
}

#[test]
fn quote_suppresses_evaluation_of_its_argument() {
    let mut engine = Engine::new();
    assert_eq!(eval_display(&mut engine, "(quote (+ 1 2))"), "(+ 1 2)");
    assert_eq!(eval_display(&mut engine, "'(a b c)"), "(A B C)");
}

#[test]
fn var_binding_is_reassignable_through_the_environment() {
    let mut engine = Engine::new();
    engine.eval("(var x 1)").unwrap();
    assert_eq!(eval_display(&mut engine, "x"), "1");
    engine.root().update("X", Value::Number(BigInt::from(99)));
    assert_eq!(eval_display(&mut engine, "x"), "99");
}
