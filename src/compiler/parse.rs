use log::trace;
use std::rc::Rc;

use crate::common::source::Source;
use crate::common::span::Span;
use crate::compiler::ast::{BinOp, Expr, ExprKind};
use crate::compiler::lex::Lexer;
use crate::compiler::syntax::Syntax;
use crate::compiler::token::{Keyword, Token};

fn precedence(lexeme: &str) -> Option<u8> {
    Some(match lexeme {
        "=" => 1,
        "||" => 2,
        "&&" => 3,
        "<" | ">" | "<=" | ">=" | "==" | "!=" => 7,
        "+" | "-" => 10,
        "*" | "/" | "%" | "//" => 20,
        _ => return None,
    })
}

/// A Pratt-style operator-precedence parser producing a single `Expr`
/// (program) from a lexer's token stream. Grounded on passerine's
/// `compiler::parse`, generalizing the original `Parser.maybeBinary`
/// precedence-climbing scheme this language's grammar was distilled from.
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new(source: Rc<Source>) -> Parser {
        Parser { lexer: Lexer::new(source) }
    }

    pub fn parse(source: Rc<Source>) -> Result<Expr, Syntax> {
        let mut parser = Parser::new(source);
        let program = parser.parse_program()?;
        if let Some(extra) = parser.lexer.peek()? {
            return Err(Syntax::error(
                format!("unexpected token after end of program: {:?}", extra.item),
                extra.span.clone(),
            ));
        }
        Ok(program)
    }

    // -- token helpers --------------------------------------------------

    fn peek(&mut self) -> Result<Option<Token>, Syntax> {
        Ok(self.lexer.peek()?.map(|t| t.item.clone()))
    }

    fn peek_span(&mut self) -> Result<Option<Span>, Syntax> {
        Ok(self.lexer.peek()?.map(|t| t.span.clone()))
    }

    fn advance(&mut self) -> Result<Option<(Token, Span)>, Syntax> {
        Ok(self.lexer.advance()?.map(|t| (t.item, t.span)))
    }

    fn expect_punct(&mut self, ch: char) -> Result<Span, Syntax> {
        match self.advance()? {
            Some((Token::Punct(c), span)) if c == ch => Ok(span),
            Some((other, span)) => Err(Syntax::error(
                format!("expected '{}', found {:?}", ch, other),
                span,
            )),
            None => Err(self.eof_error(&format!("'{}'", ch))),
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Span, Syntax> {
        match self.advance()? {
            Some((Token::Keyword(k), span)) if k == kw => Ok(span),
            Some((other, span)) => Err(Syntax::error(
                format!("expected keyword {:?}, found {:?}", kw, other),
                span,
            )),
            None => Err(self.eof_error(&format!("keyword {:?}", kw))),
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), Syntax> {
        match self.advance()? {
            Some((Token::Ident(name), span)) => Ok((name, span)),
            Some((other, span)) => {
                Err(Syntax::error(format!("expected a variable name, found {:?}", other), span))
            }
            None => Err(self.eof_error("a variable name")),
        }
    }

    fn is_punct(&mut self, ch: char) -> Result<bool, Syntax> {
        Ok(matches!(self.peek()?, Some(Token::Punct(c)) if c == ch))
    }

    fn is_keyword(&mut self, kw: Keyword) -> Result<bool, Syntax> {
        Ok(matches!(self.peek()?, Some(Token::Keyword(k)) if k == kw))
    }

    fn eof_error(&mut self, expected: &str) -> Syntax {
        Syntax::error(
            format!("unexpected end of input, expected {}", expected),
            self.lexer.eof_span(),
        )
    }

    // -- grammar ----------------------------------------------------------

    /// Top level: a `;`-separated sequence of expressions, producing a
    /// `Prog`. A trailing `;` is tolerated.
    fn parse_program(&mut self) -> Result<Expr, Syntax> {
        let mut statements = Vec::new();
        let mut spans = Vec::new();

        self.skip_separators()?;
        while self.peek()?.is_some() {
            let expr = self.parse_expr(0)?;
            spans.push(expr.span.clone());
            statements.push(expr);
            if !self.skip_separators()? {
                break;
            }
        }

        let span = if spans.is_empty() {
            self.eof_error("").span
        } else {
            Span::join(&spans)
        };
        Ok(Expr::new(ExprKind::Prog(statements), span))
    }

    /// Consumes zero or more `;` separators, returning whether at least one
    /// was consumed.
    fn skip_separators(&mut self) -> Result<bool, Syntax> {
        let mut any = false;
        while self.is_punct(';')? {
            self.advance()?;
            any = true;
        }
        Ok(any)
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, Syntax> {
        let atom = self.parse_postfix_atom()?;
        let climbed = self.maybe_binary(atom, min_prec)?;
        self.maybe_wrap_postfix(climbed)
    }

    /// Implements precedence climbing in the style of the original
    /// `maybeBinary`: if the next token is an operator whose precedence
    /// exceeds `prec`, fold it in and keep climbing; `=` recurses on the
    /// right at the same tier (right-associative), everything else
    /// recurses with its own precedence as the new threshold
    /// (left-associative).
    fn maybe_binary(&mut self, left: Expr, prec: u8) -> Result<Expr, Syntax> {
        let lexeme = match self.peek()? {
            Some(Token::Op(op)) => op,
            _ => return Ok(left),
        };

        let op_prec = match precedence(&lexeme) {
            Some(p) => p,
            None => return Ok(left),
        };

        if op_prec <= prec {
            return Ok(left);
        }

        self.advance()?;
        let right_atom = self.parse_postfix_atom()?;
        let right_threshold = if lexeme == "=" { op_prec - 1 } else { op_prec };
        let right = self.maybe_binary(right_atom, right_threshold)?;

        let span = Span::combine(&left.span, &right.span);
        let combined = if lexeme == "=" {
            Expr::new(
                ExprKind::Assign { target: Box::new(left), value: Box::new(right) },
                span,
            )
        } else {
            let op = BinOp::from_lexeme(&lexeme).expect("precedence table and BinOp agree");
            Expr::new(
                ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                span,
            )
        };

        self.maybe_binary(combined, prec)
    }

    /// One postfix wrap (call or index), applied at both atom-parse sites
    /// and after a full expression parse — not recursive, but the two wrap
    /// sites compose to parse `f(x)[y]`-style chains.
    fn maybe_wrap_postfix(&mut self, expr: Expr) -> Result<Expr, Syntax> {
        if self.is_punct('(')? {
            let args = self.delimited('(', ')', ',', Self::parse_expr0)?;
            let span = Span::combine(&expr.span, &args.1);
            return Ok(Expr::new(
                ExprKind::Call { callee: Box::new(expr), args: args.0 },
                span,
            ));
        }

        if self.is_punct('[')? {
            let indices = self.delimited('[', ']', ',', Self::parse_expr0)?;
            let span = Span::combine(&expr.span, &indices.1);
            return Ok(Expr::new(
                ExprKind::Index { receiver: Box::new(expr), indices: indices.0 },
                span,
            ));
        }

        Ok(expr)
    }

    fn parse_expr0(&mut self) -> Result<Expr, Syntax> {
        self.parse_expr(0)
    }

    /// `delimited(open, close, sep, item)` — tolerates a trailing separator
    /// before `close`; empty lists are legal.
    fn delimited<T>(
        &mut self,
        open: char,
        close: char,
        sep: char,
        mut item: impl FnMut(&mut Self) -> Result<T, Syntax>,
    ) -> Result<(Vec<T>, Span), Syntax> {
        let open_span = self.expect_punct(open)?;
        let mut items = Vec::new();
        let mut first = true;

        loop {
            if self.is_punct(close)? {
                break;
            }
            if !first {
                self.expect_punct(sep)?;
                if self.is_punct(close)? {
                    break;
                }
            }
            first = false;
            items.push(item(self)?);
        }

        let close_span = self.expect_punct(close)?;
        Ok((items, Span::combine(&open_span, &close_span)))
    }

    fn parse_postfix_atom(&mut self) -> Result<Expr, Syntax> {
        let atom = self.parse_atom()?;
        self.maybe_wrap_postfix(atom)
    }

    /// *Atom*: `(` expr `)` | block | `if` | `lambda` expr | `for` |
    /// `true`/`false` | variable | number.
    fn parse_atom(&mut self) -> Result<Expr, Syntax> {
        match self.peek()? {
            Some(Token::Punct('(')) => {
                let open = self.expect_punct('(')?;
                let inner = self.parse_expr(0)?;
                let close = self.expect_punct(')')?;
                let _ = open;
                let _ = close;
                Ok(inner)
            }
            Some(Token::Punct('{')) => self.parse_block(),
            Some(Token::Keyword(Keyword::If)) => self.parse_if(),
            Some(Token::Keyword(Keyword::Lambda)) => self.parse_lambda(),
            Some(Token::Keyword(Keyword::For)) => self.parse_for(),
            Some(Token::Keyword(Keyword::True)) => {
                let (_, span) = self.advance()?.unwrap();
                Ok(Expr::new(ExprKind::Bool(true), span))
            }
            Some(Token::Keyword(Keyword::False)) => {
                let (_, span) = self.advance()?.unwrap();
                Ok(Expr::new(ExprKind::Bool(false), span))
            }
            Some(Token::Ident(_)) => {
                let (name, span) = self.expect_ident()?;
                Ok(Expr::new(ExprKind::Var(name), span))
            }
            Some(Token::Number(n)) => {
                let (token, span) = self.advance()?.unwrap();
                match token {
                    Token::Number(n2) => {
                        debug_assert_eq!(n, n2);
                        Ok(Expr::new(ExprKind::Num(n2), span))
                    }
                    _ => unreachable!(),
                }
            }
            Some(other) => {
                let span = self.peek_span()?.unwrap();
                Err(Syntax::error(format!("unexpected token {:?}", other), span))
            }
            None => Err(self.eof_error("an expression")),
        }
    }

    /// *Block*: `{ expr (; expr)* }`. Empty -> `Bool(false)`; one statement
    /// unwraps to that statement; otherwise `Prog`. A block does NOT
    /// introduce a new scope (only `for` and lambda bodies do).
    fn parse_block(&mut self) -> Result<Expr, Syntax> {
        let open = self.expect_punct('{')?;
        self.skip_separators()?;

        let mut statements = Vec::new();
        while !self.is_punct('}')? {
            statements.push(self.parse_expr(0)?);
            if !self.skip_separators()? {
                break;
            }
        }

        let close = self.expect_punct('}')?;
        let span = Span::combine(&open, &close);

        Ok(match statements.len() {
            0 => Expr::new(ExprKind::Bool(false), span),
            1 => {
                let mut only = statements;
                let inner = only.remove(0);
                Expr::new(inner.kind, span)
            }
            _ => Expr::new(ExprKind::Prog(statements), span),
        })
    }

    /// *If*: `if` expr expr (`else` expr)? — no `then` keyword.
    fn parse_if(&mut self) -> Result<Expr, Syntax> {
        let start = self.expect_keyword(Keyword::If)?;
        let cond = self.parse_expr(0)?;
        let then_branch = self.parse_expr(0)?;

        let (else_branch, end_span) = if self.is_keyword(Keyword::Else)? {
            self.advance()?;
            let e = self.parse_expr(0)?;
            let span = e.span.clone();
            (Some(Box::new(e)), span)
        } else {
            (None, then_branch.span.clone())
        };

        let span = Span::combine(&start, &end_span);
        Ok(Expr::new(
            ExprKind::If { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch },
            span,
        ))
    }

    /// *Lambda*: `lambda ( name (, name)* ) expr`. Zero parameters allowed.
    fn parse_lambda(&mut self) -> Result<Expr, Syntax> {
        let start = self.expect_keyword(Keyword::Lambda)?;
        let (params, _) = self.delimited('(', ')', ',', |p| Ok(p.expect_ident()?.0))?;
        let body = self.parse_expr(0)?;
        let span = Span::combine(&start, &body.span);
        Ok(Expr::new(ExprKind::Lambda { params, body: std::rc::Rc::new(body) }, span))
    }

    /// *For*: `for ( init ; cond ; incr ) body` where body is a block.
    fn parse_for(&mut self) -> Result<Expr, Syntax> {
        let start = self.expect_keyword(Keyword::For)?;
        self.expect_punct('(')?;
        let init = self.parse_expr(0)?;
        self.expect_punct(';')?;
        let cond = self.parse_expr(0)?;
        self.expect_punct(';')?;
        let incr = self.parse_expr(0)?;
        self.expect_punct(')')?;
        let body = self.parse_block()?;
        let span = Span::combine(&start, &body.span);

        trace!("parsed for-loop at {}", span);
        Ok(Expr::new(
            ExprKind::For {
                init: Box::new(init),
                cond: Box::new(cond),
                incr: Box::new(incr),
                body: Box::new(body),
            },
            span,
        ))
    }
}

pub fn parse(source: Rc<Source>) -> Result<Expr, Syntax> {
    Parser::parse(source)
}
