//! The predicate macros used by the parser to make it easy to consume input.
//!
//! Each macro expands to a closure over a [`Token`](crate::tokenizer::Token) that returns
//! `Some(..)` when the token matches one of the given `TokenKind` patterns.

/// Matches without producing a value.
macro_rules! bpred {
    ($($($pattern:pat_param)|+ $(if $guard:expr)?),* $(,)?) => {
        |t| match t.kind {
            $($($pattern)|+ $(if $guard)? => Some(()),)*
            _ => None,
        }
    };
}

/// Matches and produces an arbitrary value; `:t:` binds the token for use in the value.
macro_rules! vpred {
    ($($(:$t:ident:)? $($pattern:pat_param)|+ $(if $guard:expr)? => $val:expr),* $(,)?) => {
        |t| match t.kind {
            $($($pattern)|+ $(if $guard)? => {$(let $t = t;)? Some($val)})*
            _ => None,
        }
    };
}

pub(super) use {bpred, vpred};
