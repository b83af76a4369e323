use crate::error::{Diagnostic, SemanticError, Span};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ast {
    pub root: Stylesheet,
}

impl Ast {
    pub fn new(root: Stylesheet) -> Self {
        Self { root }
    }

    /// Pre-order iterator over every node in the tree.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![NodeRef::Stylesheet(&self.root)],
        }
    }

    /// Collect every attached error, in document order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.nodes()
            .filter_map(|node| {
                node.error()
                    .map(|error| Diagnostic::new(node.span(), error.clone()))
            })
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.nodes().any(|node| node.error().is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stylesheet {
    pub members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl Stylesheet {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            error: None,
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &Stylerule> {
        self.members.iter().filter_map(|member| match member {
            Member::Rule(rule) => Some(rule),
            Member::Assignment(_) => None,
        })
    }
}

/// Top-level item of a stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Member {
    Rule(Stylerule),
    Assignment(VariableAssignment),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stylerule {
    pub selectors: Vec<Selector>,
    pub body: Vec<BodyItem>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl Stylerule {
    pub fn new(selectors: Vec<Selector>, body: Vec<BodyItem>, span: Span) -> Self {
        Self {
            selectors,
            body,
            span,
            error: None,
        }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

/// Selector token text is kept verbatim, including the `.` or `#` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text")]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
}

impl Selector {
    pub fn text(&self) -> &str {
        match self {
            Selector::Tag(text) | Selector::Class(text) | Selector::Id(text) => text,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Item allowed inside a rule, if or else body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BodyItem {
    Declaration(Declaration),
    Assignment(VariableAssignment),
    If(IfClause),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub property: String,
    pub value: Expression,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: Expression, span: Span) -> Self {
        Self {
            property: property.into(),
            value,
            span,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableAssignment {
    pub name: String,
    pub value: Expression,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl VariableAssignment {
    pub fn new(name: impl Into<String>, value: Expression, span: Span) -> Self {
        Self {
            name: name.into(),
            value,
            span,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfClause {
    pub condition: Expression,
    pub body: Vec<BodyItem>,
    pub else_clause: Option<ElseClause>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl IfClause {
    pub fn new(
        condition: Expression,
        body: Vec<BodyItem>,
        else_clause: Option<ElseClause>,
        span: Span,
    ) -> Self {
        Self {
            condition,
            body,
            else_clause,
            span,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseClause {
    pub body: Vec<BodyItem>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl ElseClause {
    pub fn new(body: Vec<BodyItem>, span: Span) -> Self {
        Self {
            body,
            span,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SemanticError>,
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            error: None,
        }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(ExprKind::Literal(literal), span)
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Variable(name.into()), span)
    }

    pub fn operation(operator: Operator, lhs: Expression, rhs: Expression, span: Span) -> Self {
        Self::new(
            ExprKind::Operation(Box::new(Operation { operator, lhs, rhs })),
            span,
        )
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{}", literal),
            ExprKind::Variable(name) => f.write_str(name),
            ExprKind::Operation(op) => {
                write!(f, "{} {} {}", op.lhs, op.operator.symbol(), op.rhs)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Operation(Box<Operation>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operator: Operator,
    pub lhs: Expression,
    pub rhs: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Literal {
    Bool(bool),
    /// Stored as written, `#` included.
    Color(String),
    Pixel(i64),
    Percentage(i64),
    Scalar(i64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{}", value),
            Literal::Color(value) => f.write_str(value),
            Literal::Pixel(value) => write!(f, "{}px", value),
            Literal::Percentage(value) => write!(f, "{}%", value),
            Literal::Scalar(value) => write!(f, "{}", value),
        }
    }
}

/// Borrowed view of any node, used for generic traversal.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stylesheet(&'a Stylesheet),
    Stylerule(&'a Stylerule),
    Selector(&'a Selector),
    Declaration(&'a Declaration),
    Assignment(&'a VariableAssignment),
    If(&'a IfClause),
    Else(&'a ElseClause),
    Expression(&'a Expression),
}

impl<'a> NodeRef<'a> {
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Stylesheet(sheet) => sheet.members.iter().map(NodeRef::from).collect(),
            NodeRef::Stylerule(rule) => rule
                .selectors
                .iter()
                .map(NodeRef::Selector)
                .chain(rule.body.iter().map(NodeRef::from))
                .collect(),
            NodeRef::Selector(_) => Vec::new(),
            NodeRef::Declaration(decl) => vec![NodeRef::Expression(&decl.value)],
            NodeRef::Assignment(assignment) => vec![NodeRef::Expression(&assignment.value)],
            NodeRef::If(clause) => std::iter::once(NodeRef::Expression(&clause.condition))
                .chain(clause.body.iter().map(NodeRef::from))
                .chain(clause.else_clause.iter().map(NodeRef::Else))
                .collect(),
            NodeRef::Else(clause) => clause.body.iter().map(NodeRef::from).collect(),
            NodeRef::Expression(expr) => match &expr.kind {
                ExprKind::Operation(op) => {
                    vec![NodeRef::Expression(&op.lhs), NodeRef::Expression(&op.rhs)]
                }
                ExprKind::Literal(_) | ExprKind::Variable(_) => Vec::new(),
            },
        }
    }

    pub fn error(&self) -> Option<&'a SemanticError> {
        match *self {
            NodeRef::Stylesheet(sheet) => sheet.error.as_ref(),
            NodeRef::Stylerule(rule) => rule.error.as_ref(),
            NodeRef::Selector(_) => None,
            NodeRef::Declaration(decl) => decl.error.as_ref(),
            NodeRef::Assignment(assignment) => assignment.error.as_ref(),
            NodeRef::If(clause) => clause.error.as_ref(),
            NodeRef::Else(clause) => clause.error.as_ref(),
            NodeRef::Expression(expr) => expr.error.as_ref(),
        }
    }

    pub fn span(&self) -> Span {
        match *self {
            NodeRef::Stylesheet(_) | NodeRef::Selector(_) => Span::dummy(),
            NodeRef::Stylerule(rule) => rule.span,
            NodeRef::Declaration(decl) => decl.span,
            NodeRef::Assignment(assignment) => assignment.span,
            NodeRef::If(clause) => clause.span,
            NodeRef::Else(clause) => clause.span,
            NodeRef::Expression(expr) => expr.span,
        }
    }
}

impl<'a> From<&'a Member> for NodeRef<'a> {
    fn from(member: &'a Member) -> Self {
        match member {
            Member::Rule(rule) => NodeRef::Stylerule(rule),
            Member::Assignment(assignment) => NodeRef::Assignment(assignment),
        }
    }
}

impl<'a> From<&'a BodyItem> for NodeRef<'a> {
    fn from(item: &'a BodyItem) -> Self {
        match item {
            BodyItem::Declaration(decl) => NodeRef::Declaration(decl),
            BodyItem::Assignment(assignment) => NodeRef::Assignment(assignment),
            BodyItem::If(clause) => NodeRef::If(clause),
        }
    }
}

pub struct Nodes<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}
