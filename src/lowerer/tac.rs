use std::fmt;

use tracing::trace;

use crate::parser::BinOp;

/// A compiler-generated storage location, printed as `t<n>`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Temp(pub(super) usize);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A jump target, printed as `L<n>`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Label(pub(super) usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operand<'s> {
    Const(i64),
    Temp(Temp),
    Var(&'s str),
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(value) => write!(f, "{value}"),
            Operand::Temp(temp) => write!(f, "{temp}"),
            Operand::Var(name) => f.write_str(name),
        }
    }
}

impl From<Temp> for Operand<'_> {
    fn from(temp: Temp) -> Self {
        Operand::Temp(temp)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Insn<'s> {
    Copy {
        dst: Operand<'s>,
        src: Operand<'s>,
    },
    Binary {
        op: BinOp,
        lhs: Operand<'s>,
        rhs: Operand<'s>,
        dst: Operand<'s>,
    },
    Label(Label),
    Jump(Label),
    /// Branches to the label when the operand is zero and falls through otherwise.
    JumpIfZero(Operand<'s>, Label),
    Print(Operand<'s>),
}

impl fmt::Display for Insn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::Label(label) => write!(f, "{label}:"),
            Insn::Jump(label) => write!(f, "    goto {label}"),
            Insn::JumpIfZero(cond, label) => write!(f, "    ifz {cond} goto {label}"),
            Insn::Copy { dst, src } => write!(f, "    {dst} = {src}"),
            Insn::Print(value) => write!(f, "    print {value}"),
            Insn::Binary { op, lhs, rhs, dst } => write!(f, "    {dst} = {lhs} {op} {rhs}"),
        }
    }
}

/// A finished instruction stream for one translation unit.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Tac<'s> {
    pub insns: Box<[Insn<'s>]>,
}

impl fmt::Display for Tac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for insn in &*self.insns {
            writeln!(f, "{insn}")?;
        }
        Ok(())
    }
}

/// Append-only instruction list plus the temp and label counters for one compilation.
///
/// Counters start at 1 and are never reset or reused, so every temp and label handed out
/// by a builder is unique within its stream.
#[derive(Debug, Default)]
pub struct TacBuilder<'s> {
    insns: Vec<Insn<'s>>,
    temp_counter: usize,
    label_counter: usize,
}

impl<'s> TacBuilder<'s> {
    pub fn new() -> TacBuilder<'s> {
        TacBuilder::default()
    }

    pub fn new_temp(&mut self) -> Temp {
        self.temp_counter += 1;
        Temp(self.temp_counter)
    }

    pub fn new_label(&mut self) -> Label {
        self.label_counter += 1;
        Label(self.label_counter)
    }

    pub fn emit(&mut self, insn: Insn<'s>) {
        trace!(%insn, "emit");
        self.insns.push(insn);
    }

    pub fn insns(&self) -> &[Insn<'s>] {
        &self.insns
    }

    pub fn finish(self) -> Tac<'s> {
        Tac {
            insns: self.insns.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_and_start_at_one() {
        let mut builder = TacBuilder::new();
        assert_eq!(builder.new_temp().to_string(), "t1");
        assert_eq!(builder.new_label().to_string(), "L1");
        assert_eq!(builder.new_temp().to_string(), "t2");
        assert_eq!(builder.new_temp().to_string(), "t3");
        assert_eq!(builder.new_label().to_string(), "L2");
    }

    #[test]
    fn instruction_text_format() {
        let mut builder = TacBuilder::new();
        let (t1, t2, t3) = (builder.new_temp(), builder.new_temp(), builder.new_temp());
        let l1 = builder.new_label();

        builder.emit(Insn::Copy {
            dst: t1.into(),
            src: Operand::Const(7),
        });
        builder.emit(Insn::Copy {
            dst: t2.into(),
            src: Operand::Var("y"),
        });
        builder.emit(Insn::Binary {
            op: BinOp::Div,
            lhs: t1.into(),
            rhs: t2.into(),
            dst: t3.into(),
        });
        builder.emit(Insn::Label(l1));
        builder.emit(Insn::JumpIfZero(t3.into(), l1));
        builder.emit(Insn::Jump(l1));
        builder.emit(Insn::Print(t3.into()));
        builder.emit(Insn::Copy {
            dst: Operand::Var("x"),
            src: t3.into(),
        });

        assert_eq!(
            builder.finish().to_string(),
            "    t1 = 7\n    t2 = y\n    t3 = t1 / t2\nL1:\n    ifz t3 goto L1\n    goto L1\n    print t3\n    x = t3\n"
        );
    }
}
