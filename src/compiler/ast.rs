use std::rc::Rc;

use crate::common::span::Span;
use crate::compiler::token::Number;

/// Binary and comparison operators. `=` is not a variant here: the parser
/// rewrites a `=`-headed binary parse into a dedicated `Assign` node at
/// construction time (spec.md §4.3 "Assignment is encoded as a Binary with
/// op `=` at the parser level but rewritten at construction time").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn from_lexeme(lexeme: &str) -> Option<BinOp> {
        Some(match lexeme {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "//" => BinOp::FloorDiv,
            "%" => BinOp::Mod,
            "<" => BinOp::Lt,
            ">" => BinOp::Gt,
            "<=" => BinOp::Le,
            ">=" => BinOp::Ge,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            _ => return None,
        })
    }
}

/// A single AST node. One variant per node kind, a tagged sum rather than a
/// class hierarchy — the shape passerine's `construct::tree`/`compiler::ast`
/// use for their own syntax trees.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Num(Number),
    Bool(bool),
    Var(String),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    /// `body` is `Rc`-wrapped so evaluating a `Lambda` node into a closure
    /// (which happens every time control passes over it, e.g. once per
    /// loop iteration) is an `Rc` clone rather than a deep tree clone.
    Lambda {
        params: Vec<String>,
        body: Rc<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `receiver` is constrained (and checked) by the parser to always be a
    /// `Var` node, per spec.md §3.
    Index {
        receiver: Box<Expr>,
        indices: Vec<Expr>,
    },
    For {
        init: Box<Expr>,
        cond: Box<Expr>,
        incr: Box<Expr>,
        body: Box<Expr>,
    },
    Prog(Vec<Expr>),
}

/// An AST node, tagged with the span of source it was parsed from — every
/// node is immutable after construction, and owns its children exclusively
/// (the AST is a tree, never a DAG).
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Expr {
        Expr { kind, span }
    }
}
