//! End-to-end compile-and-run tests.

use elin_engine::{Engine, Error, emitter};

fn run(source: &str) -> Result<Vec<i64>, Error> {
    Engine::new().run(source)
}

#[test]
fn test_assignment_and_print() {
    assert_eq!(run("let x = 10\nprint x").unwrap(), vec![10]);
}

#[test]
fn test_print_literal() {
    assert_eq!(run("print 7").unwrap(), vec![7]);
}

#[test]
fn test_precedence() {
    assert_eq!(run("let x = 2 + 3 * 4\nprint x").unwrap(), vec![14]);
    assert_eq!(run("let x = ( 2 + 3 ) * 4\nprint x").unwrap(), vec![20]);
}

#[test]
fn test_division_and_subtraction() {
    assert_eq!(run("let x = 20 / 4 - 2\nprint x").unwrap(), vec![3]);
}

#[test]
fn test_comparison_result_is_flag() {
    let source = "let a = 2\nlet b = 3\nlet flag = a < b\nprint flag";
    assert_eq!(run(source).unwrap(), vec![1]);
}

#[test]
fn test_branch_taken() {
    let source = "let a = 5\nif a > 3\nprint a\nelse\nprint 0\nend";
    assert_eq!(run(source).unwrap(), vec![5]);
}

#[test]
fn test_else_branch_taken() {
    let source = "let a = 2\nif a > 3\nprint a\nelse\nprint 0\nend";
    assert_eq!(run(source).unwrap(), vec![0]);
}

#[test]
fn test_conditional_without_else_falls_through() {
    let source = "let a = 2\nif a > 3\nprint a\nend\nprint 1";
    assert_eq!(run(source).unwrap(), vec![1]);
}

#[test]
fn test_loop_runs_three_iterations() {
    let source = "let y = 0\nwhile y < 3\nlet y = y + 1\nwend\nprint y";
    assert_eq!(run(source).unwrap(), vec![3]);
}

#[test]
fn test_loop_body_prints_each_iteration() {
    let source = "let n = 3\nwhile n > 0\nprint n\nlet n = n - 1\nwend";
    assert_eq!(run(source).unwrap(), vec![3, 2, 1]);
}

#[test]
fn test_loop_with_false_condition_skips_body() {
    let source = "let y = 5\nwhile y < 3\nlet y = y + 1\nwend\nprint y";
    assert_eq!(run(source).unwrap(), vec![5]);
}

#[test]
fn test_nested_loops_multiply_by_repeated_addition() {
    let source = "\
let total = 0
let i = 0
while i < 3
let j = 0
while j < 4
let total = total + 1
let j = j + 1
wend
let i = i + 1
wend
print total";
    assert_eq!(run(source).unwrap(), vec![12]);
}

#[test]
fn test_conditional_inside_loop() {
    let source = "\
let n = 0
while n < 5
let n = n + 1
let rem = n - n / 2 * 2
if rem == 1
print n
end
wend";
    assert_eq!(run(source).unwrap(), vec![1, 3, 5]);
}

#[test]
fn test_comments_and_blank_lines_ignored() {
    let source = "# a program\n\nlet x = 1\n// say it\nprint x\n";
    assert_eq!(run(source).unwrap(), vec![1]);
}

#[test]
fn test_unused_variable_fails() {
    let result = run("let x = 10");
    assert_eq!(result, Err(Error::UnusedVariables(vec!["x".into()])));
}

#[test]
fn test_undefined_variable_fails() {
    let result = run("print missing");
    assert_eq!(result, Err(Error::UndefinedVariable("missing".into())));
}

#[test]
fn test_division_by_zero_is_fatal() {
    let source = "let a = 1\nlet b = 0\nlet c = a / b\nprint c";
    assert_eq!(run(source), Err(Error::DivisionByZero));
}

#[test]
fn test_image_round_trip_preserves_behavior() {
    let engine = Engine::new();
    let source = "let n = 3\nwhile n > 0\nprint n\nlet n = n - 1\nwend";
    let program = engine.compile(source).unwrap();

    let image = emitter::serialize(&program, "countdown");
    let loaded = emitter::parse(&image).unwrap();
    assert_eq!(loaded, program);

    let output = elin_engine::Vm::new().run(&loaded).unwrap();
    assert_eq!(output, vec![3, 2, 1]);
}
