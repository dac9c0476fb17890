use std::fmt;

use crate::tokenizer::Position;

/// A whole translation unit: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<'s> {
    pub body: Box<[Stmt<'s>]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt<'s> {
    pub kind: StmtKind<'s>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind<'s> {
    Declaration {
        name: &'s str,
        init: Option<Expr<'s>>,
    },
    Assignment {
        name: &'s str,
        value: Expr<'s>,
    },
    Print(Expr<'s>),
    Block(Box<[Stmt<'s>]>),
    If {
        cond: Expr<'s>,
        on_true: Box<Stmt<'s>>,
        on_false: Option<Box<Stmt<'s>>>,
    },
    While {
        cond: Expr<'s>,
        body: Box<Stmt<'s>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr<'s> {
    pub kind: ExprKind<'s>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind<'s> {
    Integer(i64),
    Ident(&'s str),
    BinOp {
        op: BinOp,
        lhs: Box<Expr<'s>>,
        rhs: Box<Expr<'s>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        })
    }
}
