use crate::error::{ParseError, Span};
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
pub enum Token {
    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[regex("#[0-9a-fA-F]{6}", |lex| lex.slice().to_string(), priority = 6)]
    Color(String),

    #[regex(r"#[a-z0-9\-]+", |lex| lex.slice().to_string(), priority = 3)]
    IdIdent(String),

    #[regex(r"\.[a-z0-9\-]+", |lex| lex.slice().to_string())]
    ClassIdent(String),

    #[regex("[0-9]+px", |lex| lex.slice().trim_end_matches("px").parse::<i64>().ok())]
    Pixel(i64),

    #[regex("[0-9]+%", |lex| lex.slice().trim_end_matches('%').parse::<i64>().ok())]
    Percentage(i64),

    #[regex("[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Scalar(i64),

    #[regex("[A-Z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    CapitalIdent(String),

    #[regex(r"[a-z][a-z0-9\-]*", |lex| lex.slice().to_string())]
    LowerIdent(String),

    #[token(":=")]
    Assign,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::If => write!(f, "'if'"),
            Token::Else => write!(f, "'else'"),
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::Color(text) => write!(f, "color {}", text),
            Token::IdIdent(text) | Token::ClassIdent(text) => write!(f, "selector {}", text),
            Token::Pixel(n) => write!(f, "pixel size {}px", n),
            Token::Percentage(n) => write!(f, "percentage {}%", n),
            Token::Scalar(n) => write!(f, "scalar {}", n),
            Token::CapitalIdent(name) => write!(f, "variable {}", name),
            Token::LowerIdent(name) => write!(f, "identifier {}", name),
            Token::Assign => write!(f, "':='"),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::OpenBrace => write!(f, "'{{'"),
            Token::CloseBrace => write!(f, "'}}'"),
            Token::OpenBracket => write!(f, "'['"),
            Token::CloseBracket => write!(f, "']'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
        }
    }
}

/// Maps byte offsets to 1-based line/column spans.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn span(&self, offset: usize) -> Span {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Span::new(line + 1, offset - self.starts[line] + 1)
    }
}

pub fn tokenize(src: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let index = LineIndex::new(src);
    let mut tokens = Vec::new();

    for (token, range) in Token::lexer(src).spanned() {
        let span = index.span(range.start);
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::new(
                    format!("Unexpected input '{}'", &src[range]),
                    span,
                ))
            }
        }
    }

    Ok(tokens)
}
