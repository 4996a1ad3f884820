//! Unit tests for the formula compiler

use gradus_formula::{compile, CompileOptions, Error, Rational, WeightSolver};

fn entities(formula: &str) -> Vec<(String, u64)> {
    compile(formula, &CompileOptions::default())
        .unwrap()
        .entities
        .iter()
        .map(|e| (e.name().to_string(), e.weighting()))
        .collect()
}

fn compile_err(formula: &str) -> Error {
    compile(formula, &CompileOptions::default()).unwrap_err()
}

fn names(formula: &str) -> Vec<String> {
    entities(formula).into_iter().map(|(n, _)| n).collect()
}

#[test]
fn test_nested_formula_weightings() {
    let result = entities("(SE1 + 5((SE2 + SE3)/2) + SE4)/7");
    assert_eq!(
        result,
        vec![
            ("SE1".to_string(), 2),
            ("SE2".to_string(), 5),
            ("SE3".to_string(), 5),
            ("SE4".to_string(), 2),
        ]
    );
}

#[test]
fn test_nested_formula_average_matches_fractions() {
    let formula = "(SE1 + 5((SE2 + SE3)/2) + SE4)/7";
    let mut solver = WeightSolver::from_formula(formula, &CompileOptions::default()).unwrap();
    let (se1, se2, se3, se4) = (9.1, 7.7, 8.25, 6.0);
    solver.set_value("SE1", se1).unwrap();
    solver.set_value("SE2", se2).unwrap();
    solver.set_value("SE3", se3).unwrap();
    solver.set_value("SE4", se4).unwrap();

    let direct = (se1 + 5.0 * ((se2 + se3) / 2.0) + se4) / 7.0;
    assert!((solver.average() - direct).abs() < 1e-9);
}

#[test]
fn test_weighting_conservation() {
    assert_eq!(
        entities("(a + 2b)/3"),
        vec![("a".to_string(), 1), ("b".to_string(), 2)]
    );
    let compiled = compile("(a + 2b + 4c)/7", &CompileOptions::default()).unwrap();
    assert_eq!(compiled.total_weight, Rational::ONE);
    let total: u64 = compiled.entities.iter().map(|e| e.weighting()).sum();
    assert_eq!(total, 7);
}

#[test]
fn test_source_order_preserved() {
    assert_eq!(names("z + 2(y + x) + w"), vec!["z", "y", "x", "w"]);
}

#[test]
fn test_idempotent_parse() {
    let formula = "(g1 + 5((g2+g3)/2) + g4)/7";
    let first = compile(formula, &CompileOptions::default()).unwrap();
    let second = compile(formula, &CompileOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_whitespace_insensitive() {
    assert_eq!(entities("( a+2 b )/3"), entities("(a + 2b) / 3"));
}

#[test]
fn test_decimal_multipliers() {
    assert_eq!(
        entities("0.5a + 1.5b"),
        vec![("a".to_string(), 1), ("b".to_string(), 3)]
    );
}

#[test]
fn test_multiplier_before_identifier_starting_with_e() {
    assert_eq!(
        entities("5exam + essay"),
        vec![("exam".to_string(), 5), ("essay".to_string(), 1)]
    );
}

#[test]
fn test_numeric_terms_are_not_entities() {
    assert_eq!(names("a + 3 + b"), vec!["a", "b"]);
}

#[test]
fn test_root_call() {
    assert_eq!(names("root(a) + b"), vec!["a", "b"]);
    assert_eq!(names("root(a, 2) + b"), vec!["a", "b"]);
    assert_eq!(names("2root((a + b)/2)"), vec!["a", "b"]);
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        compile_err("sqrt(a) + b"),
        Error::UnknownFunction("sqrt".to_string())
    );
}

#[test]
fn test_arity_out_of_range() {
    assert_eq!(
        compile_err("root(a, b, c)"),
        Error::ArityOutOfRange {
            function: "root",
            min: 1,
            max: 2,
            got: 3
        }
    );
}

#[test]
fn test_missing_closing_paren() {
    assert_eq!(
        compile_err("(a + b"),
        Error::ExpectedChar {
            expected: ')',
            pos: 6
        }
    );
}

#[test]
fn test_variable_required() {
    assert_eq!(compile_err(""), Error::VariableRequired { pos: 0 });
    assert_eq!(compile_err("a + "), Error::VariableRequired { pos: 4 });
    assert!(matches!(compile_err("a + ()"), Error::VariableRequired { .. }));
}

#[test]
fn test_star_needs_a_term() {
    assert_eq!(compile_err("a + 5*"), Error::VariableRequired { pos: 4 });
    assert_eq!(compile_err("5*"), Error::VariableRequired { pos: 0 });
    assert_eq!(compile_err("5 * / 2 + a"), Error::VariableRequired { pos: 0 });
    // a bare number without `*` is still a term
    assert_eq!(entities("a + 5"), vec![("a".to_string(), 1)]);
}

#[test]
fn test_unexpected_character() {
    assert_eq!(
        compile_err("a - b"),
        Error::UnexpectedChar { found: '-', pos: 2 }
    );
    assert_eq!(
        compile_err("a + #"),
        Error::UnexpectedChar { found: '#', pos: 4 }
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(compile_err("(a + b)/0"), Error::DivisionByZero);
}

#[test]
fn test_missing_divisor() {
    assert_eq!(compile_err("a/"), Error::ExpectedNumber { pos: 2 });
}

#[test]
fn test_non_positive_weight() {
    assert_eq!(
        compile_err("0a + b"),
        Error::InvalidWeight {
            name: "a".to_string()
        }
    );
}

#[test]
fn test_literal_errors_surface() {
    assert_eq!(compile_err("1.2.3a"), Error::MultipleDots { pos: 3 });
}
