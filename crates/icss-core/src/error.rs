use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Placeholder for nodes that were not produced from source text.
    pub const fn dummy() -> Self {
        Self { line: 0, column: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 && self.column == 0 {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// A problem the checker attaches to a node.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SemanticError {
    #[error("Variable {name} is not defined")]
    UndefinedVariable { name: String },

    #[error("Unknown property: {property}")]
    UnknownProperty { property: String },

    #[error("Only {allowed} expressions are allowed for {property}")]
    PropertyType {
        property: String,
        allowed: &'static str,
    },

    #[error("If condition must be a boolean expression")]
    ConditionNotBoolean,

    #[error("Color literals are not allowed in operations")]
    ColorOperand,

    #[error("Boolean literals are not allowed in operations")]
    BoolOperand,

    #[error("Operands must be of the same type")]
    OperandMismatch,

    #[error(
        "Multiply operation can only be used with an expression of type scalar and an expression of another type"
    )]
    MultiplyWithoutScalar,
}

/// An attached error together with the location of the node carrying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn new(span: Span, error: SemanticError) -> Self {
        Self {
            span,
            message: error.to_string(),
            error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{span}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Raised by the evaluator on a tree the checker would have rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("internal error: variable {name} has no value in scope")]
    UnboundVariable { name: String },

    #[error("internal error: cannot apply {operator} to {lhs} and {rhs}")]
    InvalidOperands {
        operator: &'static str,
        lhs: String,
        rhs: String,
    },

    #[error("internal error: if condition evaluated to {found}, expected a boolean")]
    NonBooleanCondition { found: String },

    #[error("internal error: arithmetic overflow in {lhs} {operator} {rhs}")]
    Overflow {
        operator: &'static str,
        lhs: String,
        rhs: String,
    },
}

#[derive(Debug, Error)]
pub enum PreludeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Prelude variable '{name}' must start with an uppercase letter")]
    InvalidName { name: String },

    #[error("Prelude variable '{name}' has an invalid value: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),

    #[error("{} semantic error(s) found", .0.len())]
    Check(Vec<Diagnostic>),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Prelude(#[from] PreludeError),
}
