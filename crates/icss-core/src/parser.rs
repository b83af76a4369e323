use crate::ast::{
    Ast, BodyItem, Declaration, ElseClause, Expression, IfClause, Literal, Member, Operator,
    Selector, Stylerule, Stylesheet, VariableAssignment,
};
use crate::error::{ParseError, Span};
use crate::lexer::{tokenize, Token};

pub fn parse(input: &str) -> Result<Ast, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let root = parser.parse_stylesheet()?;
    tracing::debug!(members = root.members.len(), "parsed stylesheet");
    Ok(Ast::new(root))
}

/// Parse a single literal such as `10px`, `50%`, `#ff0000` or `true`.
pub fn parse_literal(input: &str) -> Result<Literal, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let (literal, _) = parser.parse_literal()?;
    parser.expect_end()?;
    Ok(literal)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => self
                .tokens
                .last()
                .map(|(_, span)| *span)
                .unwrap_or_default(),
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        let span = self.span();
        if self.eat(&expected) {
            Ok(span)
        } else {
            Err(self.unexpected(&format!("{}", expected)))
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::new(
                format!("Expected {}, found {}", wanted, found),
                self.span(),
            ),
            None => ParseError::new(
                format!("Expected {}, found end of input", wanted),
                self.span(),
            ),
        }
    }

    fn parse_stylesheet(&mut self) -> Result<Stylesheet, ParseError> {
        let mut members = Vec::new();
        while let Some(token) = self.peek() {
            let member = match token {
                Token::CapitalIdent(_) => Member::Assignment(self.parse_assignment()?),
                _ => Member::Rule(self.parse_stylerule()?),
            };
            members.push(member);
        }
        Ok(Stylesheet::new(members))
    }

    fn parse_stylerule(&mut self) -> Result<Stylerule, ParseError> {
        let span = self.span();
        let mut selectors = Vec::new();
        loop {
            let selector = match self.peek() {
                Some(Token::LowerIdent(name)) => Selector::Tag(name.clone()),
                Some(Token::ClassIdent(name)) => Selector::Class(name.clone()),
                // `#beaded` is a valid id that also reads as a color.
                Some(Token::IdIdent(name) | Token::Color(name)) => Selector::Id(name.clone()),
                _ => break,
            };
            self.pos += 1;
            selectors.push(selector);
        }
        if selectors.is_empty() {
            return Err(self.unexpected("selector"));
        }

        self.expect(Token::OpenBrace)?;
        let body = self.parse_body()?;
        self.expect(Token::CloseBrace)?;

        Ok(Stylerule::new(selectors, body, span))
    }

    /// Items up to (not including) the closing brace.
    fn parse_body(&mut self) -> Result<Vec<BodyItem>, ParseError> {
        let mut body = Vec::new();
        loop {
            let item = match self.peek() {
                Some(Token::CloseBrace) | None => break,
                Some(Token::LowerIdent(_)) => BodyItem::Declaration(self.parse_declaration()?),
                Some(Token::CapitalIdent(_)) => BodyItem::Assignment(self.parse_assignment()?),
                Some(Token::If) => BodyItem::If(self.parse_if_clause()?),
                Some(_) => {
                    return Err(self.unexpected("declaration, variable assignment or if-clause"))
                }
            };
            body.push(item);
        }
        Ok(body)
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let span = self.span();
        let property = match self.advance() {
            Some((Token::LowerIdent(name), _)) => name,
            _ => return Err(ParseError::new("Expected property name", span)),
        };
        self.expect(Token::Colon)?;
        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Declaration::new(property, value, span))
    }

    fn parse_assignment(&mut self) -> Result<VariableAssignment, ParseError> {
        let span = self.span();
        let name = match self.advance() {
            Some((Token::CapitalIdent(name), _)) => name,
            _ => return Err(ParseError::new("Expected variable name", span)),
        };
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        Ok(VariableAssignment::new(name, value, span))
    }

    fn parse_if_clause(&mut self) -> Result<IfClause, ParseError> {
        let span = self.expect(Token::If)?;
        self.expect(Token::OpenBracket)?;
        let condition = self.parse_expression()?;
        self.expect(Token::CloseBracket)?;
        self.expect(Token::OpenBrace)?;
        let body = self.parse_body()?;
        self.expect(Token::CloseBrace)?;

        let else_clause = if self.peek() == Some(&Token::Else) {
            let else_span = self.expect(Token::Else)?;
            self.expect(Token::OpenBrace)?;
            let else_body = self.parse_body()?;
            self.expect(Token::CloseBrace)?;
            Some(ElseClause::new(else_body, else_span))
        } else {
            None
        };

        Ok(IfClause::new(condition, body, else_clause, span))
    }

    /// `term (('+' | '-') term)*`
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let operator = match self.peek() {
                Some(Token::Plus) => Operator::Add,
                Some(Token::Minus) => Operator::Subtract,
                _ => break,
            };
            let span = self.span();
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expression::operation(operator, lhs, rhs, span);
        }
        Ok(lhs)
    }

    /// `primary ('*' primary)*`
    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_primary()?;
        while self.peek() == Some(&Token::Star) {
            let span = self.span();
            self.pos += 1;
            let rhs = self.parse_primary()?;
            lhs = Expression::operation(Operator::Multiply, lhs, rhs, span);
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        if let Some(Token::CapitalIdent(name)) = self.peek() {
            let expr = Expression::variable(name.clone(), self.span());
            self.pos += 1;
            return Ok(expr);
        }
        let (literal, span) = self.parse_literal()?;
        Ok(Expression::literal(literal, span))
    }

    fn parse_literal(&mut self) -> Result<(Literal, Span), ParseError> {
        let span = self.span();
        let literal = match self.peek() {
            Some(Token::True) => Literal::Bool(true),
            Some(Token::False) => Literal::Bool(false),
            Some(Token::Color(text)) => Literal::Color(text.clone()),
            Some(Token::Pixel(n)) => Literal::Pixel(*n),
            Some(Token::Percentage(n)) => Literal::Percentage(*n),
            Some(Token::Scalar(n)) => Literal::Scalar(*n),
            _ => return Err(self.unexpected("expression")),
        };
        self.pos += 1;
        Ok((literal, span))
    }
}
