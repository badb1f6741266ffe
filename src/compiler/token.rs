use crate::common::span::Spanned;

/// A numeric literal, integer or floating-point depending on whether the
/// source literal contained a decimal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Reserved words. Any identifier that isn't one of these lexes as a
/// `Token::Ident` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    Lambda,
    For,
    True,
    False,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Keyword> {
        Some(match s {
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "lambda" => Keyword::Lambda,
            "for" => Keyword::For,
            "true" => Keyword::True,
            "false" => Keyword::False,
            _ => return None,
        })
    }
}

/// A single token, tagged by kind. Each token's position is tracked
/// separately via `Spanned<Token>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Number),
    Ident(String),
    Keyword(Keyword),
    /// One of `, ; ( ) { } [ ]`.
    Punct(char),
    /// A maximal run of operator characters, e.g. `==`, `<=`, `//`.
    Op(String),
}

pub type SpannedToken = Spanned<Token>;
