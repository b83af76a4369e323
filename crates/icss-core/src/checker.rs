use crate::ast::{
    Ast, BodyItem, Declaration, ElseClause, ExprKind, Expression, IfClause, Literal, Member,
    Operator, Stylerule, Stylesheet, VariableAssignment,
};
use crate::error::SemanticError;
use crate::scope::ScopeStack;
use std::fmt;

/// Static type of an expression as seen by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    /// Result of an expression that already carries an error.
    Undefined,
    Bool,
    Color,
    Pixel,
    Percentage,
    Scalar,
}

impl ExpressionType {
    pub fn of(literal: &Literal) -> Self {
        match literal {
            Literal::Bool(_) => ExpressionType::Bool,
            Literal::Color(_) => ExpressionType::Color,
            Literal::Pixel(_) => ExpressionType::Pixel,
            Literal::Percentage(_) => ExpressionType::Percentage,
            Literal::Scalar(_) => ExpressionType::Scalar,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionType::Undefined => "undefined",
            ExpressionType::Bool => "boolean",
            ExpressionType::Color => "color",
            ExpressionType::Pixel => "pixel",
            ExpressionType::Percentage => "percentage",
            ExpressionType::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

/// Recognized properties and the expression types each one accepts.
const PROPERTIES: &[(&str, &[ExpressionType], &str)] = &[
    ("background-color", &[ExpressionType::Color], "color"),
    ("color", &[ExpressionType::Color], "color"),
    (
        "width",
        &[ExpressionType::Pixel, ExpressionType::Percentage],
        "pixel and percentage",
    ),
    ("height", &[ExpressionType::Pixel], "pixel"),
];

/// Validates an AST and attaches errors to offending nodes.
///
/// Checking never stops early: every problem found is recorded on its node
/// and traversal continues. Use [`Ast::diagnostics`] afterwards to collect
/// the results.
#[derive(Debug, Default)]
pub struct Checker {
    scopes: ScopeStack<ExpressionType>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checker whose outermost frame already holds `globals`.
    pub fn with_globals<'a>(globals: impl IntoIterator<Item = (&'a str, &'a Literal)>) -> Self {
        let mut scopes = ScopeStack::new();
        scopes.push();
        for (name, literal) in globals {
            scopes.declare(name, ExpressionType::of(literal));
        }
        Self { scopes }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn check(&mut self, ast: &mut Ast) {
        let depth = self.scopes.depth();
        self.check_stylesheet(&mut ast.root);
        debug_assert_eq!(depth, self.scopes.depth(), "scope frame leaked");
        tracing::debug!(errors = ast.diagnostics().len(), "check finished");
    }

    fn check_stylesheet(&mut self, sheet: &mut Stylesheet) {
        self.scopes.push();
        for member in &mut sheet.members {
            match member {
                Member::Rule(rule) => self.check_stylerule(rule),
                Member::Assignment(assignment) => self.check_assignment(assignment),
            }
        }
        self.scopes.pop();
    }

    fn check_stylerule(&mut self, rule: &mut Stylerule) {
        self.scopes.push();
        self.check_body(&mut rule.body);
        self.scopes.pop();
    }

    fn check_body(&mut self, body: &mut [BodyItem]) {
        for item in body {
            match item {
                BodyItem::Declaration(decl) => self.check_declaration(decl),
                BodyItem::Assignment(assignment) => self.check_assignment(assignment),
                BodyItem::If(clause) => self.check_if_clause(clause),
            }
        }
    }

    fn check_declaration(&mut self, decl: &mut Declaration) {
        let ty = self.check_expression(&mut decl.value);

        let Some(&(_, allowed, description)) = PROPERTIES
            .iter()
            .find(|(name, _, _)| *name == decl.property)
        else {
            decl.error = Some(SemanticError::UnknownProperty {
                property: decl.property.clone(),
            });
            return;
        };

        // The expression already carries its own error.
        if ty == ExpressionType::Undefined {
            return;
        }
        if !allowed.contains(&ty) {
            decl.error = Some(SemanticError::PropertyType {
                property: decl.property.clone(),
                allowed: description,
            });
        }
    }

    fn check_if_clause(&mut self, clause: &mut IfClause) {
        self.scopes.push();

        let ty = self.check_expression(&mut clause.condition);
        if ty != ExpressionType::Bool && ty != ExpressionType::Undefined {
            clause.condition.error = Some(SemanticError::ConditionNotBoolean);
        }

        self.check_body(&mut clause.body);
        // The else clause is the last child of the if clause and nests
        // inside its frame.
        if let Some(else_clause) = &mut clause.else_clause {
            self.check_else_clause(else_clause);
        }

        self.scopes.pop();
    }

    fn check_else_clause(&mut self, clause: &mut ElseClause) {
        self.scopes.push();
        self.check_body(&mut clause.body);
        self.scopes.pop();
    }

    fn check_assignment(&mut self, assignment: &mut VariableAssignment) {
        let ty = self.check_expression(&mut assignment.value);
        tracing::trace!(name = %assignment.name, %ty, "bind variable type");
        self.scopes.declare(assignment.name.clone(), ty);
    }

    fn check_expression(&mut self, expr: &mut Expression) -> ExpressionType {
        match &mut expr.kind {
            ExprKind::Literal(literal) => ExpressionType::of(literal),
            ExprKind::Variable(name) => match self.scopes.lookup(name) {
                Some(&ty) => ty,
                None => {
                    expr.error = Some(SemanticError::UndefinedVariable { name: name.clone() });
                    ExpressionType::Undefined
                }
            },
            ExprKind::Operation(op) => {
                for operand in [&mut op.lhs, &mut op.rhs] {
                    if let Some(error) = literal_operand_error(operand) {
                        operand.error = Some(error);
                        return ExpressionType::Undefined;
                    }
                }

                let lhs = self.check_expression(&mut op.lhs);
                let rhs = self.check_expression(&mut op.rhs);
                let (ty, error) = operation_type(op.operator, lhs, rhs);
                if error.is_some() {
                    expr.error = error;
                }
                ty
            }
        }
    }
}

fn literal_operand_error(operand: &Expression) -> Option<SemanticError> {
    match operand.as_literal()? {
        Literal::Color(_) => Some(SemanticError::ColorOperand),
        Literal::Bool(_) => Some(SemanticError::BoolOperand),
        Literal::Pixel(_) | Literal::Percentage(_) | Literal::Scalar(_) => None,
    }
}

/// Result type of `lhs <operator> rhs`, plus the error to attach to the
/// operation node if the combination is invalid.
fn operation_type(
    operator: Operator,
    lhs: ExpressionType,
    rhs: ExpressionType,
) -> (ExpressionType, Option<SemanticError>) {
    use ExpressionType::{Bool, Color, Scalar, Undefined};

    if lhs == Undefined || rhs == Undefined {
        return (Undefined, None);
    }
    // Color or boolean values that arrive through variables.
    if lhs == Color || rhs == Color {
        return (Undefined, Some(SemanticError::ColorOperand));
    }
    if lhs == Bool || rhs == Bool {
        return (Undefined, Some(SemanticError::BoolOperand));
    }

    match operator {
        Operator::Add | Operator::Subtract => {
            if lhs == rhs {
                (lhs, None)
            } else {
                (Undefined, Some(SemanticError::OperandMismatch))
            }
        }
        Operator::Multiply => match (lhs, rhs) {
            (Scalar, other) | (other, Scalar) => (other, None),
            _ => (Undefined, Some(SemanticError::MultiplyWithoutScalar)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn messages(src: &str) -> Vec<String> {
        let mut ast = parse(src).expect("parse");
        Checker::new().check(&mut ast);
        ast.diagnostics()
            .into_iter()
            .map(|diagnostic| diagnostic.message)
            .collect()
    }

    #[test]
    fn accepts_scalar_times_pixel() {
        assert!(messages("a { width: 2 * 10px; }").is_empty());
    }

    #[test]
    fn rejects_wrong_type_for_color() {
        assert_eq!(
            messages("a { color: 10px; }"),
            ["Only color expressions are allowed for color"]
        );
    }

    #[test]
    fn width_accepts_pixel_and_percentage_but_not_color() {
        assert!(messages("a { width: 10px; width: 50%; }").is_empty());
        assert_eq!(
            messages("a { width: #ff0000; }"),
            ["Only pixel and percentage expressions are allowed for width"]
        );
    }

    #[test]
    fn height_rejects_percentage() {
        assert_eq!(
            messages("a { height: 50%; }"),
            ["Only pixel expressions are allowed for height"]
        );
    }

    #[test]
    fn unknown_property_is_reported() {
        assert_eq!(
            messages("a { margin: 10px; }"),
            ["Unknown property: margin"]
        );
    }

    #[test]
    fn undefined_variable_does_not_cascade() {
        assert_eq!(
            messages("a { width: Missing + 10px; }"),
            ["Variable Missing is not defined"]
        );
    }

    #[test]
    fn mixed_add_is_a_type_mismatch() {
        assert_eq!(
            messages("a { width: 10px + 10%; }"),
            ["Operands must be of the same type"]
        );
    }

    #[test]
    fn multiply_needs_a_scalar() {
        assert_eq!(
            messages("a { width: 10px * 10px; }"),
            ["Multiply operation can only be used with an expression of type scalar and an expression of another type"]
        );
    }

    #[test]
    fn literal_color_and_bool_operands_are_rejected() {
        assert_eq!(
            messages("a { width: #ffffff + 10px; }"),
            ["Color literals are not allowed in operations"]
        );
        assert_eq!(
            messages("a { width: 10px * true; }"),
            ["Boolean literals are not allowed in operations"]
        );
    }

    #[test]
    fn color_variables_are_rejected_in_operations() {
        assert_eq!(
            messages("C := #ffffff; a { color: C + C; }"),
            ["Color literals are not allowed in operations"]
        );
    }

    #[test]
    fn condition_must_be_boolean() {
        assert_eq!(
            messages("a { if [10px] { width: 1px; } }"),
            ["If condition must be a boolean expression"]
        );
    }

    #[test]
    fn variables_do_not_escape_their_block() {
        let src = "a { if [true] { W := 10px; } width: W; }";
        assert_eq!(messages(src), ["Variable W is not defined"]);
    }

    #[test]
    fn inner_shadowing_does_not_change_outer_type() {
        let src = "
            W := 10px;
            a {
                if [true] { W := #ff0000; color: W; }
                width: W;
            }";
        assert!(messages(src).is_empty());
    }

    #[test]
    fn collects_every_error_in_one_pass() {
        let src = "
            a { color: 1px; height: 5%; }
            b { size: 1px; width: Nope; }";
        assert_eq!(
            messages(src),
            [
                "Only color expressions are allowed for color",
                "Only pixel expressions are allowed for height",
                "Unknown property: size",
                "Variable Nope is not defined",
            ]
        );
    }

    #[test]
    fn else_body_sees_if_body_variables() {
        let src = "
            a {
                if [true] { L := 4px; } else { height: L; }
                height: L;
            }";
        // Visible inside the else frame, gone once the if clause closes.
        assert_eq!(messages(src), ["Variable L is not defined"]);
    }

    #[test]
    fn else_body_uses_if_body_type_of_shadowed_variable() {
        let src = "
            H := 1px;
            a { if [false] { H := #000000; } else { height: H; } }";
        assert_eq!(
            messages(src),
            ["Only pixel expressions are allowed for height"]
        );
    }

    #[test]
    fn globals_form_the_outermost_frame() {
        let mut ast = parse("a { color: Brand; }").expect("parse");
        let brand = Literal::Color("#112233".into());
        Checker::with_globals([("Brand", &brand)]).check(&mut ast);
        assert!(!ast.has_errors());
    }

    #[test]
    fn operation_type_rules() {
        use ExpressionType::*;
        assert_eq!(operation_type(Operator::Multiply, Scalar, Scalar), (Scalar, None));
        assert_eq!(operation_type(Operator::Multiply, Percentage, Scalar), (Percentage, None));
        assert_eq!(operation_type(Operator::Subtract, Pixel, Pixel), (Pixel, None));
        assert_eq!(operation_type(Operator::Add, Undefined, Pixel), (Undefined, None));
    }
}
