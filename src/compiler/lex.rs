use log::trace;

use crate::common::cursor::Cursor;
use crate::common::source::Source;
use crate::common::span::{Span, Spanned};
use crate::compiler::syntax::Syntax;
use crate::compiler::token::{Keyword, Number, Token};
use std::rc::Rc;

const OPERATOR_CHARS: &str = "+-*/%=&|<>!";
const PUNCTUATION_CHARS: &str = ",;(){}[]";

/// The legal operator lexemes: the precedence table's keys, plus `=`.
const LEGAL_OPERATORS: &[&str] = &[
    "=", "||", "&&", "<", ">", "<=", ">=", "==", "!=", "+", "-", "*", "/", "%", "//",
];

/// Converts a source into a lazy stream of tokens, one token of lookahead
/// at a time. Grounded on passerine's `compiler::lex::Lexer`, which walks a
/// `Source` and greedily finds the next token.
pub struct Lexer {
    cursor: Cursor,
    peeked: Option<Option<Spanned<Token>>>,
}

impl Lexer {
    pub fn new(source: Rc<Source>) -> Lexer {
        Lexer { cursor: Cursor::new(source), peeked: None }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Spanned<Token>>, Syntax> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_next()?);
        }
        Ok(self.peeked.as_ref().unwrap().as_ref())
    }

    /// Returns the next token, consuming it.
    pub fn advance(&mut self) -> Result<Option<Spanned<Token>>, Syntax> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.read_next(),
        }
    }

    /// A zero-width span at the cursor's current position, for "unexpected
    /// end of input" diagnostics.
    pub fn eof_span(&self) -> Span {
        self.cursor.here()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                    self.cursor.advance();
                }
                Some('#') => {
                    while let Some(c) = self.cursor.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_next(&mut self) -> Result<Option<Spanned<Token>>, Syntax> {
        self.skip_trivia();

        let start_line = self.cursor.line();
        let start_column = self.cursor.column();
        let start_offset = 0; // byte offsets aren't needed for diagnostics here

        let ch = match self.cursor.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let (token, length) = if ch.is_ascii_digit() {
            self.read_number()?
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.read_ident()
        } else if PUNCTUATION_CHARS.contains(ch) {
            self.cursor.advance();
            (Token::Punct(ch), 1)
        } else if OPERATOR_CHARS.contains(ch) {
            self.read_operator()?
        } else {
            return Err(Syntax::error(
                format!("unexpected character '{}'", ch),
                self.cursor.here(),
            ));
        };

        let span = Span::new(
            self.cursor.source(),
            start_offset,
            length,
            start_line,
            start_column,
        );
        trace!("lexed {:?} at {}", token, span);
        Ok(Some(Spanned::new(token, span)))
    }

    fn read_number(&mut self) -> Result<(Token, usize), Syntax> {
        let mut text = String::new();
        let mut has_dot = false;

        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.cursor.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let len = text.chars().count();
        let number = if has_dot {
            let value: f64 = text.parse().map_err(|_| {
                Syntax::error(format!("malformed number literal '{}'", text), self.cursor.here())
            })?;
            Number::Float(value)
        } else {
            let value: i64 = text.parse().map_err(|_| {
                Syntax::error(format!("malformed number literal '{}'", text), self.cursor.here())
            })?;
            Number::Int(value)
        };

        Ok((Token::Number(number), len))
    }

    fn read_ident(&mut self) -> (Token, usize) {
        let mut text = String::new();

        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let len = text.chars().count();
        let token = match Keyword::from_str(&text) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Ident(text),
        };
        (token, len)
    }

    fn read_operator(&mut self) -> Result<(Token, usize), Syntax> {
        let start = self.cursor.here();
        let mut text = String::new();

        while let Some(c) = self.cursor.peek() {
            if OPERATOR_CHARS.contains(c) {
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        if !LEGAL_OPERATORS.contains(&text.as_str()) {
            return Err(Syntax::error(format!("illegal operator '{}'", text), start));
        }

        let len = text.chars().count();
        Ok((Token::Op(text), len))
    }
}

/// Eagerly lexes an entire source into a vector of tokens, for callers that
/// don't need the lazy one-token-lookahead interface directly (tests,
/// snapshotting).
pub fn lex(source: Rc<Source>) -> Result<Vec<Spanned<Token>>, Syntax> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.advance()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_non_negative_integer_lexes_back_to_itself(n in 0i64..1_000_000_000) {
            let tokens = lex(Source::inline(n.to_string())).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].item.clone(), Token::Number(Number::Int(n)));
        }
    }

    fn kinds(src: &str) -> Vec<Token> {
        lex(Source::inline(src)).unwrap().into_iter().map(|t| t.item).collect()
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("42"), vec![Token::Number(Number::Int(42))]);
        assert_eq!(kinds("3.14"), vec![Token::Number(Number::Float(3.14))]);
    }

    #[test]
    fn second_dot_ends_the_number() {
        // "1.2" is consumed as a float; the lone '.' that follows isn't a
        // valid token on its own, so lexing the remainder fails.
        assert!(lex(Source::inline("1.2.3")).is_err());
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(kinds("pixels"), vec![Token::Ident("pixels".to_string())]);
        assert_eq!(kinds("if"), vec![Token::Keyword(Keyword::If)]);
        assert_eq!(kinds("for"), vec![Token::Keyword(Keyword::For)]);
        assert_eq!(kinds("true false"), vec![
            Token::Keyword(Keyword::True),
            Token::Keyword(Keyword::False),
        ]);
    }

    #[test]
    fn operators_maximal_munch() {
        assert_eq!(kinds("<="), vec![Token::Op("<=".to_string())]);
        assert_eq!(kinds("//"), vec![Token::Op("//".to_string())]);
        assert_eq!(
            kinds("a==b"),
            vec![
                Token::Ident("a".to_string()),
                Token::Op("==".to_string()),
                Token::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn illegal_operator_run_errors() {
        assert!(lex(Source::inline("a <>< b")).is_err());
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("1 # a comment\n+ 2"),
            vec![
                Token::Number(Number::Int(1)),
                Token::Op("+".to_string()),
                Token::Number(Number::Int(2)),
            ]
        );
    }

    #[test]
    fn unknown_character_errors() {
        assert!(lex(Source::inline("$")).is_err());
    }

    #[test]
    fn non_ascii_letters_are_not_identifier_characters() {
        assert!(lex(Source::inline("π")).is_err());
        assert!(lex(Source::inline("naïve")).is_err());
    }
}
