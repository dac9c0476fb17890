//! Checks declarations and lowers the AST to three-address code in a single traversal.

use thiserror::Error;
use tracing::debug;

use crate::{
    parser::{Expr, ExprKind, Program, Stmt, StmtKind},
    tokenizer::Position,
};

mod symbols;
mod tac;

pub use symbols::*;
pub use tac::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LowerError<'s> {
    #[error("redeclaration of '{name}' at {pos}")]
    DuplicateSymbol { name: &'s str, pos: Position },
    #[error("use of undeclared variable '{name}' at {pos}")]
    UndeclaredSymbol { name: &'s str, pos: Position },
}

type Result<'s, T> = std::result::Result<T, LowerError<'s>>;

/// Lowers `program` with a fresh builder and symbol table.
pub fn lower<'s>(program: &Program<'s>) -> Result<'s, Tac<'s>> {
    let mut builder = TacBuilder::new();
    let mut symbols = SymbolTable::new();
    lower_into(program, &mut builder, &mut symbols)?;

    debug!(
        insns = builder.insns().len(),
        symbols = symbols.len(),
        "lowered program"
    );
    Ok(builder.finish())
}

/// Lowers `program` by appending to `builder` and declaring into `symbols`.
///
/// Stops at the first error; whatever was appended to `builder` before it is not meaningful.
pub fn lower_into<'s>(
    program: &Program<'s>,
    builder: &mut TacBuilder<'s>,
    symbols: &mut SymbolTable<'s>,
) -> Result<'s, ()> {
    let mut lowerer = Lowerer { builder, symbols };
    for stmt in &*program.body {
        lowerer.stmt(stmt)?;
    }
    Ok(())
}

struct Lowerer<'a, 's> {
    builder: &'a mut TacBuilder<'s>,
    symbols: &'a mut SymbolTable<'s>,
}

impl<'a, 's> Lowerer<'a, 's> {
    fn stmt(&mut self, stmt: &Stmt<'s>) -> Result<'s, ()> {
        match &stmt.kind {
            StmtKind::Declaration { name, init } => {
                let name = *name;
                if !self.symbols.declare(name, Type::Integer) {
                    return Err(LowerError::DuplicateSymbol {
                        name,
                        pos: stmt.pos,
                    });
                }

                if let Some(init) = init {
                    self.store(name, init)?;
                }
            }
            StmtKind::Assignment { name, value } => {
                let name = *name;
                if self.symbols.lookup(name).is_none() {
                    return Err(LowerError::UndeclaredSymbol {
                        name,
                        pos: stmt.pos,
                    });
                }

                self.store(name, value)?;
            }
            StmtKind::Print(value) => {
                let value = self.expr(value)?;
                self.builder.emit(Insn::Print(value.into()));
            }
            StmtKind::Block(body) => {
                for stmt in &**body {
                    self.stmt(stmt)?;
                }
            }
            StmtKind::If {
                cond,
                on_true,
                on_false,
            } => {
                let cond = self.expr(cond)?;
                let else_lab = self.builder.new_label();
                let end_lab = self.builder.new_label();

                if let Some(on_false) = on_false {
                    self.builder.emit(Insn::JumpIfZero(cond.into(), else_lab));
                    self.stmt(on_true)?;
                    self.builder.emit(Insn::Jump(end_lab));
                    self.builder.emit(Insn::Label(else_lab));
                    self.stmt(on_false)?;
                } else {
                    // the else label is allocated but never placed
                    self.builder.emit(Insn::JumpIfZero(cond.into(), end_lab));
                    self.stmt(on_true)?;
                }

                self.builder.emit(Insn::Label(end_lab));
            }
            StmtKind::While { cond, body } => {
                let start_lab = self.builder.new_label();
                let end_lab = self.builder.new_label();

                self.builder.emit(Insn::Label(start_lab));
                let cond = self.expr(cond)?;
                self.builder.emit(Insn::JumpIfZero(cond.into(), end_lab));
                self.stmt(body)?;
                self.builder.emit(Insn::Jump(start_lab));
                self.builder.emit(Insn::Label(end_lab));
            }
        }

        Ok(())
    }

    /// Evaluates `value` and copies it into the storage of the declared variable `name`.
    fn store(&mut self, name: &'s str, value: &Expr<'s>) -> Result<'s, ()> {
        let value = self.expr(value)?;
        self.builder.emit(Insn::Copy {
            dst: Operand::Var(name),
            src: value.into(),
        });
        self.symbols.mark_initialized(name);
        Ok(())
    }

    /// Materializes `expr` into a fresh temporary and returns it.
    fn expr(&mut self, expr: &Expr<'s>) -> Result<'s, Temp> {
        let src = match &expr.kind {
            ExprKind::Integer(value) => Operand::Const(*value),
            ExprKind::Ident(name) => {
                let name = *name;
                if self.symbols.lookup(name).is_none() {
                    return Err(LowerError::UndeclaredSymbol {
                        name,
                        pos: expr.pos,
                    });
                }
                Operand::Var(name)
            }
            ExprKind::BinOp { op, lhs, rhs } => {
                // both operands are stored to temps before they are combined
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                let dst = self.builder.new_temp();
                self.builder.emit(Insn::Binary {
                    op: *op,
                    lhs: lhs.into(),
                    rhs: rhs.into(),
                    dst: dst.into(),
                });
                return Ok(dst);
            }
        };

        let dst = self.builder.new_temp();
        self.builder.emit(Insn::Copy {
            dst: dst.into(),
            src,
        });
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BinOp;

    const AT: Position = Position { line: 1, col: 1 };

    fn int(value: i64) -> Expr<'static> {
        Expr {
            kind: ExprKind::Integer(value),
            pos: AT,
        }
    }

    fn var(name: &'static str) -> Expr<'static> {
        Expr {
            kind: ExprKind::Ident(name),
            pos: AT,
        }
    }

    fn stmt(kind: StmtKind<'static>) -> Stmt<'static> {
        Stmt { kind, pos: AT }
    }

    fn program(body: Vec<Stmt<'static>>) -> Program<'static> {
        Program { body: body.into() }
    }

    fn labels(tac: &Tac<'_>) -> Vec<String> {
        tac.insns
            .iter()
            .filter_map(|insn| match insn {
                Insn::Label(label) => Some(label.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hand_built_tree_lowers_without_parser() {
        let tree = program(vec![
            stmt(StmtKind::Declaration {
                name: "a",
                init: Some(Expr {
                    kind: ExprKind::BinOp {
                        op: BinOp::Sub,
                        lhs: Box::new(int(9)),
                        rhs: Box::new(int(4)),
                    },
                    pos: AT,
                }),
            }),
            stmt(StmtKind::Print(var("a"))),
        ]);

        let tac = lower(&tree).unwrap();
        assert_eq!(
            tac.to_string(),
            "    t1 = 9\n    t2 = 4\n    t3 = t1 - t2\n    a = t3\n    t4 = a\n    print t4\n"
        );
    }

    #[test]
    fn while_places_test_at_top() {
        let tree = program(vec![
            stmt(StmtKind::Declaration {
                name: "n",
                init: Some(int(3)),
            }),
            stmt(StmtKind::While {
                cond: var("n"),
                body: Box::new(stmt(StmtKind::Assignment {
                    name: "n",
                    value: var("n"),
                })),
            }),
        ]);

        let tac = lower(&tree).unwrap();
        assert_eq!(
            tac.to_string(),
            "    t1 = 3\n    n = t1\nL1:\n    t2 = n\n    ifz t2 goto L2\n    t3 = n\n    n = t3\n    goto L1\nL2:\n"
        );
    }

    #[test]
    fn if_without_else_skips_first_label() {
        let tree = program(vec![stmt(StmtKind::If {
            cond: int(0),
            on_true: Box::new(stmt(StmtKind::Print(int(5)))),
            on_false: None,
        })]);

        let tac = lower(&tree).unwrap();
        assert_eq!(
            tac.to_string(),
            "    t1 = 0\n    ifz t1 goto L2\n    t2 = 5\n    print t2\nL2:\n"
        );
    }

    #[test]
    fn labels_follow_source_order() {
        let inner_if = stmt(StmtKind::If {
            cond: int(1),
            on_true: Box::new(stmt(StmtKind::Print(int(1)))),
            on_false: Some(Box::new(stmt(StmtKind::Print(int(2))))),
        });
        let tree = program(vec![
            stmt(StmtKind::While {
                cond: int(1),
                body: Box::new(inner_if),
            }),
            stmt(StmtKind::If {
                cond: int(1),
                on_true: Box::new(stmt(StmtKind::Block(Box::new([])))),
                on_false: None,
            }),
        ]);

        let tac = lower(&tree).unwrap();
        // while: L1/L2, nested if: L3/L4, trailing if: L5 unused, L6
        assert_eq!(labels(&tac), vec!["L1", "L3", "L4", "L2", "L6"]);
    }

    #[test]
    fn blocks_share_one_namespace() {
        let tree = program(vec![
            stmt(StmtKind::Block(Box::new([stmt(StmtKind::Declaration {
                name: "x",
                init: None,
            })]))),
            stmt(StmtKind::Declaration {
                name: "x",
                init: None,
            }),
        ]);

        assert_eq!(
            lower(&tree),
            Err(LowerError::DuplicateSymbol { name: "x", pos: AT })
        );
    }

    #[test]
    fn reading_an_undeclared_variable_fails() {
        let tree = program(vec![stmt(StmtKind::Print(var("ghost")))]);
        assert_eq!(
            lower(&tree),
            Err(LowerError::UndeclaredSymbol {
                name: "ghost",
                pos: AT
            })
        );
    }

    #[test]
    fn reading_before_initialization_is_allowed() {
        let tree = program(vec![
            stmt(StmtKind::Declaration {
                name: "x",
                init: None,
            }),
            stmt(StmtKind::Print(var("x"))),
        ]);
        assert!(lower(&tree).is_ok());
    }

    #[test]
    fn caller_supplied_state_is_reused() {
        let mut builder = TacBuilder::new();
        let mut symbols = SymbolTable::new();

        let first = program(vec![stmt(StmtKind::Declaration {
            name: "x",
            init: Some(int(1)),
        })]);
        lower_into(&first, &mut builder, &mut symbols).unwrap();
        assert!(symbols.lookup("x").unwrap().initialized);

        let second = program(vec![stmt(StmtKind::Assignment {
            name: "x",
            value: int(2),
        })]);
        lower_into(&second, &mut builder, &mut symbols).unwrap();

        // temps keep counting across both calls
        assert_eq!(
            builder.finish().to_string(),
            "    t1 = 1\n    x = t1\n    t2 = 2\n    x = t2\n"
        );
    }
}
