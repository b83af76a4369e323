use crate::ast::{Declaration, Stylerule, Stylesheet};

/// Render an evaluated stylesheet as plain CSS.
///
/// Rules are separated by a blank line. Values are written as stored; any
/// expression the evaluator did not fold is printed in source form.
pub fn emit_css(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();

    for (i, rule) in stylesheet.rules().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        emit_rule(rule, &mut out);
    }
    out
}

fn emit_rule(rule: &Stylerule, out: &mut String) {
    // Selectors are joined without separators: `a.menu` stays `a.menu`.
    for selector in &rule.selectors {
        out.push_str(selector.text());
    }
    out.push_str("{\n");

    for decl in rule.declarations() {
        emit_declaration(decl, out);
    }
    out.push_str("}\n");
}

fn emit_declaration(decl: &Declaration, out: &mut String) {
    out.push_str("  ");
    out.push_str(&decl.property);
    out.push_str(": ");
    out.push_str(&decl.value.to_string());
    out.push_str(";\n");
}
