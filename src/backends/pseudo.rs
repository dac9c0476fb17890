//! Lowering of three-address code to a fixed pseudo-assembly text form.
//!
//! This is a direct per-instruction pattern match with no allocation step: every binary
//! operation goes through the one scratch register `R1`. That is sound only because the
//! lowerer stores both operands of a binary operation into temps before combining them,
//! so no two binary results ever need `R1` at the same time. Nothing here re-checks that.
//! Labels are assumed to be defined exactly once, as they are in any stream produced by
//! [`crate::lowerer`].

use std::fmt;

use tracing::debug;

use crate::{
    lowerer::{Insn, Label, Operand, Tac},
    parser::BinOp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    R1,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::R1 => f.write_str("R1"),
        }
    }
}

/// The register every arithmetic instruction is computed in.
pub const SCRATCH: Reg = Reg::R1;

/// A `MOV` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc<'s> {
    Reg(Reg),
    Mem(Operand<'s>),
}

impl fmt::Display for Loc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loc::Reg(reg) => write!(f, "{reg}"),
            Loc::Mem(operand) => write!(f, "{operand}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmInsn<'s> {
    Mov(Loc<'s>, Loc<'s>),
    Alu(BinOp, Reg, Operand<'s>),
    Print(Operand<'s>),
    Label(Label),
    Jmp(Label),
    /// Compare against zero.
    Cmp(Operand<'s>),
    Je(Label),
}

impl fmt::Display for AsmInsn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInsn::Mov(dst, src) => write!(f, "MOV {dst}, {src}"),
            AsmInsn::Alu(op, reg, rhs) => {
                let mnemonic = match op {
                    BinOp::Add => "ADD",
                    BinOp::Sub => "SUB",
                    BinOp::Mul => "MUL",
                    BinOp::Div => "DIV",
                };
                write!(f, "{mnemonic} {reg}, {rhs}")
            }
            AsmInsn::Print(operand) => write!(f, "PRINT {operand}"),
            AsmInsn::Label(label) => write!(f, "{label}:"),
            AsmInsn::Jmp(label) => write!(f, "JMP {label}"),
            AsmInsn::Cmp(operand) => write!(f, "CMP {operand}, 0"),
            AsmInsn::Je(label) => write!(f, "JE {label}"),
        }
    }
}

pub fn lower<'s>(tac: &Tac<'s>) -> Vec<AsmInsn<'s>> {
    let mut out = Vec::with_capacity(tac.insns.len() * 2);

    for insn in &*tac.insns {
        match *insn {
            Insn::Copy { dst, src } => out.push(AsmInsn::Mov(Loc::Mem(dst), Loc::Mem(src))),
            Insn::Print(value) => out.push(AsmInsn::Print(value)),
            Insn::Label(label) => out.push(AsmInsn::Label(label)),
            Insn::Jump(label) => out.push(AsmInsn::Jmp(label)),
            Insn::JumpIfZero(cond, label) => {
                out.push(AsmInsn::Cmp(cond));
                out.push(AsmInsn::Je(label));
            }
            Insn::Binary { op, lhs, rhs, dst } => {
                out.push(AsmInsn::Mov(Loc::Reg(SCRATCH), Loc::Mem(lhs)));
                out.push(AsmInsn::Alu(op, SCRATCH, rhs));
                out.push(AsmInsn::Mov(Loc::Mem(dst), Loc::Reg(SCRATCH)));
            }
        }
    }

    debug!(tac = tac.insns.len(), asm = out.len(), "lowered to pseudo assembly");
    out
}
