//! A single-pass compiler front end for a small imperative language.
//!
//! Source text flows through [`tokenizer`] → [`parser`] → [`lowerer`], which checks
//! declarations while it emits three-address code. [`backends::pseudo`] optionally lowers
//! that code to pseudo-assembly. [`grammar`] is an unrelated grammar-analysis toolkit that
//! ships in the same binary.

pub mod backends;
pub mod errors;
pub mod grammar;
pub mod lowerer;
pub mod parser;
pub mod tokenizer;

pub use errors::{CompilationError, CompilationErrorKind};
pub use lowerer::Tac;

pub const TAC_HEADER: &str = "=== TAC ===";
pub const ASM_HEADER: &str = "=== PSEUDO ASSEMBLY CODE ===";

/// Tokenizes, parses and lowers `src`, stopping at the first error.
pub fn compile(src: &str) -> Result<Tac<'_>, CompilationError> {
    let program = parser::parse(tokenizer::Tokens::of(src))?;
    Ok(lowerer::lower(&program)?)
}

/// The header line followed by one line per instruction.
pub fn render_tac(tac: &Tac<'_>) -> String {
    format!("{TAC_HEADER}\n{tac}")
}

/// The header line followed by the pseudo-assembly lowering of `tac`, one line per instruction.
pub fn render_asm(tac: &Tac<'_>) -> String {
    let mut out = format!("{ASM_HEADER}\n");
    for insn in backends::pseudo::lower(tac) {
        out.push_str(&format!("{insn}\n"));
    }
    out
}
