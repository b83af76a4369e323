use crate::ast::{
    Ast, BodyItem, ExprKind, Expression, IfClause, Literal, Member, Operator, Stylerule,
};
use crate::error::EvalError;
use crate::scope::ScopeStack;

/// Rewrites a checked AST into a flat one.
///
/// Afterwards the tree holds no variable assignments and no if/else
/// clauses, and every declaration value is a literal. The input must have
/// passed the [`Checker`](crate::checker::Checker); anything it would have
/// rejected surfaces here as an [`EvalError`].
#[derive(Debug, Default)]
pub struct Evaluator {
    scopes: ScopeStack<Literal>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator whose outermost frame already holds `globals`.
    pub fn with_globals<'a>(globals: impl IntoIterator<Item = (&'a str, &'a Literal)>) -> Self {
        let mut scopes = ScopeStack::new();
        scopes.push();
        for (name, literal) in globals {
            scopes.declare(name, literal.clone());
        }
        Self { scopes }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn apply(&mut self, ast: &mut Ast) -> Result<(), EvalError> {
        self.scopes.push();
        let result = self.apply_stylesheet(ast);
        self.scopes.pop();

        if result.is_ok() {
            tracing::debug!(rules = ast.root.members.len(), "evaluation finished");
        }
        result
    }

    /// The rewritten members replace the originals only once every rule
    /// has evaluated, so a failure leaves `ast` as it was.
    fn apply_stylesheet(&mut self, ast: &mut Ast) -> Result<(), EvalError> {
        let mut kept = Vec::with_capacity(ast.root.members.len());

        for member in &ast.root.members {
            match member {
                Member::Rule(rule) => {
                    let body = self.scoped_body(rule.body.clone())?;
                    let rule = Stylerule::new(rule.selectors.clone(), body, rule.span);
                    kept.push(Member::Rule(rule));
                }
                Member::Assignment(assignment) => {
                    let value = self.evaluate(&assignment.value)?;
                    tracing::trace!(name = %assignment.name, %value, "bind variable");
                    self.scopes.declare(assignment.name.clone(), value);
                }
            }
        }

        ast.root.members = kept;
        Ok(())
    }

    /// Evaluate `body` inside a fresh frame.
    fn scoped_body(&mut self, body: Vec<BodyItem>) -> Result<Vec<BodyItem>, EvalError> {
        self.scopes.push();
        let result = self.apply_body(body);
        self.scopes.pop();
        result
    }

    /// Build the rewritten body: declarations folded, assignments dropped,
    /// if clauses replaced in place by the contents of the live branch.
    fn apply_body(&mut self, body: Vec<BodyItem>) -> Result<Vec<BodyItem>, EvalError> {
        let mut out = Vec::with_capacity(body.len());

        for item in body {
            match item {
                BodyItem::Declaration(mut decl) => {
                    let value = self.evaluate(&decl.value)?;
                    decl.value = Expression::literal(value, decl.value.span);
                    out.push(BodyItem::Declaration(decl));
                }
                BodyItem::Assignment(assignment) => {
                    let value = self.evaluate(&assignment.value)?;
                    tracing::trace!(name = %assignment.name, %value, "bind variable");
                    self.scopes.declare(assignment.name, value);
                }
                BodyItem::If(clause) => {
                    let branch = self.apply_if_clause(clause)?;
                    out.extend(branch);
                }
            }
        }

        Ok(out)
    }

    fn apply_if_clause(&mut self, clause: IfClause) -> Result<Vec<BodyItem>, EvalError> {
        let live = match self.evaluate(&clause.condition)? {
            Literal::Bool(value) => value,
            other => {
                return Err(EvalError::NonBooleanCondition {
                    found: other.to_string(),
                })
            }
        };

        if live {
            self.scoped_body(clause.body)
        } else if let Some(else_clause) = clause.else_clause {
            self.scoped_body(else_clause.body)
        } else {
            Ok(Vec::new())
        }
    }

    /// Fold `expr` down to a single literal.
    pub fn evaluate(&self, expr: &Expression) -> Result<Literal, EvalError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal.clone()),
            ExprKind::Variable(name) => {
                self.scopes
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() })
            }
            ExprKind::Operation(op) => {
                let lhs = self.evaluate(&op.lhs)?;
                let rhs = self.evaluate(&op.rhs)?;
                combine(op.operator, lhs, rhs)
            }
        }
    }
}

fn combine(operator: Operator, lhs: Literal, rhs: Literal) -> Result<Literal, EvalError> {
    match operator {
        Operator::Multiply => multiply(lhs, rhs),
        Operator::Add => add_subtract(operator, lhs, rhs, i64::checked_add),
        Operator::Subtract => add_subtract(operator, lhs, rhs, i64::checked_sub),
    }
}

fn multiply(lhs: Literal, rhs: Literal) -> Result<Literal, EvalError> {
    // Put the scalar, if any, on the right as the multiplier.
    let (value, multiplier) = match (lhs, rhs) {
        (Literal::Scalar(a), other) if !matches!(other, Literal::Scalar(_)) => {
            (other, Literal::Scalar(a))
        }
        pair => pair,
    };

    let Literal::Scalar(factor) = multiplier else {
        return Err(invalid(Operator::Multiply, &value, &multiplier));
    };
    let product = |n: i64| {
        n.checked_mul(factor).ok_or_else(|| EvalError::Overflow {
            operator: Operator::Multiply.symbol(),
            lhs: value.to_string(),
            rhs: factor.to_string(),
        })
    };

    match &value {
        Literal::Scalar(n) => product(*n).map(Literal::Scalar),
        Literal::Pixel(n) => product(*n).map(Literal::Pixel),
        Literal::Percentage(n) => product(*n).map(Literal::Percentage),
        Literal::Bool(_) | Literal::Color(_) => {
            Err(invalid(Operator::Multiply, &value, &Literal::Scalar(factor)))
        }
    }
}

fn add_subtract(
    operator: Operator,
    lhs: Literal,
    rhs: Literal,
    apply: fn(i64, i64) -> Option<i64>,
) -> Result<Literal, EvalError> {
    let overflow = || EvalError::Overflow {
        operator: operator.symbol(),
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    };

    match (&lhs, &rhs) {
        (Literal::Pixel(a), Literal::Pixel(b)) => {
            apply(*a, *b).map(Literal::Pixel).ok_or_else(overflow)
        }
        (Literal::Percentage(a), Literal::Percentage(b)) => {
            apply(*a, *b).map(Literal::Percentage).ok_or_else(overflow)
        }
        (Literal::Scalar(a), Literal::Scalar(b)) => {
            apply(*a, *b).map(Literal::Scalar).ok_or_else(overflow)
        }
        _ => Err(invalid(operator, &lhs, &rhs)),
    }
}

fn invalid(operator: Operator, lhs: &Literal, rhs: &Literal) -> EvalError {
    EvalError::InvalidOperands {
        operator: operator.symbol(),
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    }
}
