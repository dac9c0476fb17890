use thiserror::Error;
use tracing::debug;

use crate::tokenizer::{Position, Token, TokenKind, TokenizationError, Tokens};

mod ast;
mod preds;

pub use ast::*;
use preds::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError<'s> {
    #[error("unexpected token '{found}' at {pos}, expected {expected}")]
    Unexpected {
        found: &'s str,
        expected: &'static str,
        pos: Position,
    },
    #[error("nesting deeper than {MAX_DEPTH} levels at {pos}")]
    TooDeep { pos: Position },
    #[error(transparent)]
    Tokenization(#[from] TokenizationError),
}

/// How deep statements, parentheses and operator chains may nest, combined.
///
/// Every later pass walks the tree recursively, so the parser refuses anything deeper.
pub const MAX_DEPTH: usize = 256;

impl<'s> ParseError<'s> {
    fn unexpected(token: &Token<'s>, expected: &'static str) -> ParseError<'s> {
        ParseError::Unexpected {
            found: token.describe(),
            expected,
            pos: token.pos,
        }
    }
}

type Result<'s, T> = std::result::Result<T, ParseError<'s>>;

/// Parses a whole program, pulling tokens from `tokens` one at a time.
pub fn parse(tokens: Tokens<'_>) -> Result<'_, Program<'_>> {
    Parser { tokens, depth: 0 }.parse()
}

struct Parser<'s> {
    tokens: Tokens<'s>,
    depth: usize,
}

impl<'s> Parser<'s> {
    fn parse(mut self) -> Result<'s, Program<'s>> {
        let mut body = Vec::new();
        while !self.has_peek(bpred!(TokenKind::End))? {
            body.push(self.statement()?);
        }

        debug!(statements = body.len(), "parsed program");
        Ok(Program { body: body.into() })
    }

    fn statement(&mut self) -> Result<'s, Stmt<'s>> {
        let token = *self.tokens.peek()?;
        self.nest(token.pos)?;
        let stmt = match token.kind {
            TokenKind::Int => self.declaration(),
            TokenKind::Name(_) => self.assignment(),
            TokenKind::Print => self.print(),
            TokenKind::If => self.branch(),
            TokenKind::While => self.repeat(),
            TokenKind::OpenBrace => self.block(),
            _ => Err(ParseError::unexpected(&token, "statement")),
        };
        self.depth -= 1;
        stmt
    }

    fn declaration(&mut self) -> Result<'s, Stmt<'s>> {
        let pos = self.require("'int'", vpred!(:t: TokenKind::Int => t.pos))?;
        let name = self.require("identifier", vpred!(TokenKind::Name(n) => n))?;
        let init = if self.eat(bpred!(TokenKind::Equal))?.is_some() {
            Some(self.expr()?)
        } else {
            None
        };
        self.require("';'", bpred!(TokenKind::Semicolon))?;

        Ok(Stmt {
            kind: StmtKind::Declaration { name, init },
            pos,
        })
    }

    fn assignment(&mut self) -> Result<'s, Stmt<'s>> {
        let (pos, name) =
            self.require("identifier", vpred!(:t: TokenKind::Name(n) => (t.pos, n)))?;
        self.require("'='", bpred!(TokenKind::Equal))?;
        let value = self.expr()?;
        self.require("';'", bpred!(TokenKind::Semicolon))?;

        Ok(Stmt {
            kind: StmtKind::Assignment { name, value },
            pos,
        })
    }

    fn print(&mut self) -> Result<'s, Stmt<'s>> {
        let pos = self.require("'print'", vpred!(:t: TokenKind::Print => t.pos))?;
        self.require("'('", bpred!(TokenKind::OpenParen))?;
        let value = self.expr()?;
        self.require("')'", bpred!(TokenKind::CloseParen))?;
        self.require("';'", bpred!(TokenKind::Semicolon))?;

        Ok(Stmt {
            kind: StmtKind::Print(value),
            pos,
        })
    }

    fn branch(&mut self) -> Result<'s, Stmt<'s>> {
        let pos = self.require("'if'", vpred!(:t: TokenKind::If => t.pos))?;
        let cond = self.condition()?;
        let on_true = Box::new(self.statement()?);
        // an `else` always binds to the innermost open `if`
        let on_false = if self.eat(bpred!(TokenKind::Else))?.is_some() {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                on_true,
                on_false,
            },
            pos,
        })
    }

    fn repeat(&mut self) -> Result<'s, Stmt<'s>> {
        let pos = self.require("'while'", vpred!(:t: TokenKind::While => t.pos))?;
        let cond = self.condition()?;
        let body = Box::new(self.statement()?);

        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            pos,
        })
    }

    fn block(&mut self) -> Result<'s, Stmt<'s>> {
        let pos = self.require("'{'", vpred!(:t: TokenKind::OpenBrace => t.pos))?;
        let mut body = Vec::new();
        while self.eat(bpred!(TokenKind::CloseBrace))?.is_none() {
            body.push(self.statement()?);
        }

        Ok(Stmt {
            kind: StmtKind::Block(body.into()),
            pos,
        })
    }

    /// A parenthesized `if`/`while` condition.
    fn condition(&mut self) -> Result<'s, Expr<'s>> {
        self.require("'('", bpred!(TokenKind::OpenParen))?;
        let cond = self.expr()?;
        self.require("')'", bpred!(TokenKind::CloseParen))?;
        Ok(cond)
    }

    fn expr(&mut self) -> Result<'s, Expr<'s>> {
        self.bin_op(
            Self::term,
            vpred! {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
            },
        )
    }

    fn term(&mut self) -> Result<'s, Expr<'s>> {
        self.bin_op(
            Self::factor,
            vpred! {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
            },
        )
    }

    fn factor(&mut self) -> Result<'s, Expr<'s>> {
        if let Some(pos) = self.eat(vpred!(:t: TokenKind::OpenParen => t.pos))? {
            self.nest(pos)?;
            let inner = self.expr()?;
            self.require("')'", bpred!(TokenKind::CloseParen))?;
            self.depth -= 1;
            return Ok(inner);
        }

        if let Some((pos, kind)) = self.eat(vpred! {
            :t: TokenKind::Integer(i) => (t.pos, ExprKind::Integer(i)),
            :t: TokenKind::Name(n) => (t.pos, ExprKind::Ident(n)),
        })? {
            return Ok(Expr { kind, pos });
        }

        let token = *self.tokens.peek()?;
        Err(ParseError::unexpected(&token, "expression"))
    }

    /// Left-associative chain of `next` separated by operators matched by `pred`.
    fn bin_op(
        &mut self,
        next: impl Fn(&mut Self) -> Result<'s, Expr<'s>>,
        pred: impl Fn(&Token<'s>) -> Option<BinOp>,
    ) -> Result<'s, Expr<'s>> {
        let mut a = next(self)?;
        let depth = self.depth;

        // each operator in a chain adds one level to the left spine
        while let Some(op) = self.eat(&pred)? {
            let b = next(self)?;
            let pos = a.pos;
            self.nest(b.pos)?;

            a = Expr {
                kind: ExprKind::BinOp {
                    op,
                    lhs: Box::new(a),
                    rhs: Box::new(b),
                },
                pos,
            }
        }

        self.depth = depth;
        Ok(a)
    }

    /// Enters one more level of nesting, failing at `pos` once [`MAX_DEPTH`] is exceeded.
    fn nest(&mut self, pos: Position) -> Result<'s, ()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { pos });
        }
        Ok(())
    }

    /// Returns `true` if the current token peek satisfies `pred`.
    fn has_peek(&mut self, pred: impl Fn(&Token<'s>) -> Option<()>) -> Result<'s, bool> {
        Ok(pred(self.tokens.peek()?).is_some())
    }

    /// Requires that the next token satisfies `pred` and errors otherwise, naming `expected`.
    ///
    /// Does not consume the token if it does not satisfy `pred`.
    fn require<T>(
        &mut self,
        expected: &'static str,
        pred: impl Fn(&Token<'s>) -> Option<T>,
    ) -> Result<'s, T> {
        let token = self.tokens.peek()?;
        if let Some(t) = pred(token) {
            self.tokens.next()?;
            Ok(t)
        } else {
            Err(ParseError::unexpected(token, expected))
        }
    }

    /// Consumes the next token if it satisfies `pred` and returns None otherwise.
    fn eat<T>(&mut self, pred: impl Fn(&Token<'s>) -> Option<T>) -> Result<'s, Option<T>> {
        if let Some(t) = pred(self.tokens.peek()?) {
            self.tokens.next()?;
            Ok(Some(t))
        } else {
            Ok(None)
        }
    }
}
