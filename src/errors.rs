use thiserror::Error;

use crate::{
    lowerer::LowerError,
    parser::ParseError,
    tokenizer::{Position, TokenizationError},
};

/// The first error hit anywhere in the pipeline. Compilation never continues past one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CompilationError {
    pub kind: CompilationErrorKind,
    pub pos: Option<Position>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationErrorKind {
    Lex,
    Parse,
    DuplicateSymbol,
    UndeclaredSymbol,
}

impl From<TokenizationError> for CompilationError {
    fn from(err: TokenizationError) -> Self {
        CompilationError {
            kind: CompilationErrorKind::Lex,
            pos: Some(err.pos),
            message: err.to_string(),
        }
    }
}

impl<'s> From<ParseError<'s>> for CompilationError {
    fn from(err: ParseError<'s>) -> Self {
        match err {
            ParseError::Tokenization(err) => err.into(),
            ParseError::Unexpected { pos, .. } | ParseError::TooDeep { pos } => CompilationError {
                kind: CompilationErrorKind::Parse,
                pos: Some(pos),
                message: err.to_string(),
            },
        }
    }
}

impl<'s> From<LowerError<'s>> for CompilationError {
    fn from(err: LowerError<'s>) -> Self {
        let (kind, pos) = match err {
            LowerError::DuplicateSymbol { pos, .. } => (CompilationErrorKind::DuplicateSymbol, pos),
            LowerError::UndeclaredSymbol { pos, .. } => {
                (CompilationErrorKind::UndeclaredSymbol, pos)
            }
        };

        CompilationError {
            kind,
            pos: Some(pos),
            message: err.to_string(),
        }
    }
}
