use icss_core::ast::{BodyItem, ExprKind, Literal, NodeRef};
use icss_core::{compile_with, parser, CompileError, Evaluator, Options, Prelude};
use pretty_assertions::assert_eq;

use crate::common::{check_messages, compile_ok};

mod common;

#[test]
fn scalar_times_pixel_end_to_end() {
    assert_eq!(compile_ok("a { width: 2 * 10px; }"), "a{\n  width: 20px;\n}\n");
}

#[test]
fn wrong_color_type_aborts_before_evaluation() {
    assert_eq!(
        check_messages("a { color: 10px; }"),
        ["Only color expressions are allowed for color"]
    );
}

#[test]
fn percentages_add() {
    assert_eq!(
        compile_ok("div { width: 10% + 20%; }"),
        "div{\n  width: 30%;\n}\n"
    );
}

#[test]
fn pixel_plus_percentage_never_reaches_folding() {
    assert_eq!(
        check_messages("div { width: 10px + 20%; }"),
        ["Operands must be of the same type"]
    );
}

#[test]
fn full_stylesheet_matches_expected_output() {
    let src = include_str!("fixtures/level3.icss");
    let expected = include_str!("fixtures/level3.css");
    assert_eq!(compile_ok(src), expected);
}

#[test]
fn evaluated_tree_has_only_literal_declarations() {
    let mut ast = parser::parse(include_str!("fixtures/level3.icss")).expect("parse");
    Evaluator::new().apply(&mut ast).expect("evaluate");

    for node in ast.nodes() {
        match node {
            NodeRef::Assignment(_) | NodeRef::If(_) | NodeRef::Else(_) => {
                panic!("unexpected node left after evaluation: {:?}", node)
            }
            NodeRef::Expression(expr) => {
                assert!(matches!(expr.kind, ExprKind::Literal(_)), "{}", expr)
            }
            _ => {}
        }
    }
}

#[test]
fn splicing_preserves_surrounding_order() {
    let src = "
        On := true;
        a {
            width: 1px;
            if [On] { height: 2px; color: #111111; }
            background-color: #222222;
        }";
    let mut ast = parser::parse(src).expect("parse");
    Evaluator::new().apply(&mut ast).expect("evaluate");
    let rule = ast.root.rules().next().expect("rule");
    let properties: Vec<&str> = rule
        .body
        .iter()
        .map(|item| match item {
            BodyItem::Declaration(decl) => decl.property.as_str(),
            other => panic!("unexpected body item {:?}", other),
        })
        .collect();
    assert_eq!(properties, ["width", "height", "color", "background-color"]);
}

#[test]
fn checker_errors_are_collected_across_rules() {
    let src = "
        a { if [1px] { width: 1px; } }
        b { height: Missing; }
        c { width: #ffffff * 2; }";
    assert_eq!(
        check_messages(src),
        [
            "If condition must be a boolean expression",
            "Variable Missing is not defined",
            "Color literals are not allowed in operations",
        ]
    );
}

#[test]
fn diagnostics_carry_source_positions() {
    let err = icss_core::compile("a {\n  color: 10px;\n}").unwrap_err();
    let CompileError::Check(diagnostics) = err else {
        panic!("expected check errors");
    };
    assert_eq!(diagnostics[0].to_string(), "2:3: Only color expressions are allowed for color");
}

#[test]
fn parse_errors_are_reported_as_such() {
    let err = icss_core::compile("a { width 1px; }").unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn prelude_variables_are_available() {
    let mut prelude = Prelude::new();
    prelude
        .define("Brand", Literal::Color("#336699".into()))
        .expect("define");
    prelude.define("Gutter", Literal::Pixel(8)).expect("define");
    let options = Options { prelude };

    let css = compile_with("a { color: Brand; width: Gutter * 3; }", &options).expect("compile");
    assert_eq!(css, "a{\n  color: #336699;\n  width: 24px;\n}\n");
}

#[test]
fn stylesheet_variables_shadow_prelude() {
    let mut prelude = Prelude::new();
    prelude.define("Gutter", Literal::Pixel(8)).expect("define");
    let options = Options { prelude };

    let css = compile_with("Gutter := 50%; a { width: Gutter; }", &options).expect("compile");
    assert_eq!(css, "a{\n  width: 50%;\n}\n");
}

#[test]
fn rule_scoped_variables_do_not_leak_to_next_rule() {
    assert_eq!(
        check_messages("a { W := 1px; width: W; } b { width: W; }"),
        ["Variable W is not defined"]
    );
}

#[test]
fn evaluating_output_again_is_a_no_op() {
    let mut ast = parser::parse(include_str!("fixtures/level3.icss")).expect("parse");
    Evaluator::new().apply(&mut ast).expect("first pass");
    let once = ast.clone();
    Evaluator::new().apply(&mut ast).expect("second pass");
    assert_eq!(ast, once);
}

#[test]
fn ast_serializes_to_json() {
    let ast = parser::parse("a { width: 1px; }").expect("parse");
    let json = serde_json::to_value(&ast).expect("serialize");
    assert_eq!(json["root"]["members"][0]["type"], "Rule");
    assert_eq!(
        json["root"]["members"][0]["body"][0]["value"]["kind"]["value"]["type"],
        "Pixel"
    );
}

#[test]
fn else_body_can_read_if_body_variables() {
    assert_eq!(
        compile_ok("a { if [true] { L := 4px; } else { height: L; } }"),
        "a{\n}\n"
    );
}

#[test]
fn comment_ending_in_double_star_is_skipped() {
    assert_eq!(
        compile_ok("/* note **/ a { width: 1px; }"),
        "a{\n  width: 1px;\n}\n"
    );
}
