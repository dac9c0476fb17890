use std::{fmt, iter::Peekable, str::CharIndices};

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at {pos}")]
pub struct TokenizationError {
    pub kind: TokenizationErrorKind,
    pub pos: Position,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizationErrorKind {
    #[error("unknown character '{0}'")]
    Unexpected(char),
    #[error("integer literal '{0}' out of range")]
    IntegerOverflow(Box<str>),
}

type Result<T> = std::result::Result<T, TokenizationError>;

/// 1-based line and column of the first character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind<'s>,
    pub lexeme: &'s str,
    pub pos: Position,
}

impl<'s> Token<'s> {
    /// Text used when the token shows up in a diagnostic.
    pub fn describe(&self) -> &'s str {
        match self.kind {
            TokenKind::End => "end of input",
            _ => self.lexeme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'s> {
    End,

    /* Keywords */
    Int,
    If,
    Else,
    While,
    Print,

    /* Punctuation */
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,

    Integer(i64),
    Name(&'s str),
}

/// Lazy token source over a fully buffered program text.
///
/// Tokens are produced on demand; at most one token is held back by [`Tokens::peek`].
pub struct Tokens<'s> {
    src: &'s str,
    chars: Peekable<CharIndices<'s>>,
    line: u32,
    col: u32,
    peek: Option<Token<'s>>,
}

impl<'s> Tokens<'s> {
    pub fn of(src: &'s str) -> Tokens<'s> {
        Tokens {
            src,
            chars: src.char_indices().peekable(),
            line: 1,
            col: 1,
            peek: None,
        }
    }

    /// Reads the next token from the input. Once the input is exhausted every call yields
    /// [`TokenKind::End`].
    pub fn next(&mut self) -> Result<Token<'s>> {
        if let Some(peek) = self.peek.take() {
            return Ok(peek);
        }

        let token = self.scan()?;
        trace!(kind = ?token.kind, pos = %token.pos, "token");
        Ok(token)
    }

    pub fn peek(&mut self) -> Result<&Token<'s>> {
        let token = match self.peek.take() {
            Some(peek) => peek,
            None => self.next()?,
        };

        Ok(self.peek.insert(token))
    }

    fn scan(&mut self) -> Result<Token<'s>> {
        while let Some(&(_, ch)) = self.chars.peek() {
            // space, \t, \n, \v, \f and \r
            if !matches!(ch, ' ' | '\t'..='\r') {
                break;
            }
            self.bump();
        }

        let pos = self.pos();
        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::End,
                lexeme: "",
                pos,
            });
        };

        match ch {
            _ if ch.is_ascii_digit() => self.number(start, pos),
            _ if ch.is_ascii_alphabetic() || ch == '_' => Ok(self.name(start, pos)),
            '+' => Ok(self.single(TokenKind::Plus, start, pos)),
            '-' => Ok(self.single(TokenKind::Minus, start, pos)),
            '*' => Ok(self.single(TokenKind::Star, start, pos)),
            '/' => Ok(self.single(TokenKind::Slash, start, pos)),
            '=' => Ok(self.single(TokenKind::Equal, start, pos)),
            '(' => Ok(self.single(TokenKind::OpenParen, start, pos)),
            ')' => Ok(self.single(TokenKind::CloseParen, start, pos)),
            '{' => Ok(self.single(TokenKind::OpenBrace, start, pos)),
            '}' => Ok(self.single(TokenKind::CloseBrace, start, pos)),
            ';' => Ok(self.single(TokenKind::Semicolon, start, pos)),
            _ => Err(TokenizationError {
                kind: TokenizationErrorKind::Unexpected(ch),
                pos,
            }),
        }
    }

    fn number(&mut self, start: usize, pos: Position) -> Result<Token<'s>> {
        let end = self.take_while(|ch| ch.is_ascii_digit());
        let lexeme = &self.src[start..end];

        let Ok(value) = lexeme.parse::<i64>() else {
            return Err(TokenizationError {
                kind: TokenizationErrorKind::IntegerOverflow(lexeme.into()),
                pos,
            });
        };

        Ok(Token {
            kind: TokenKind::Integer(value),
            lexeme,
            pos,
        })
    }

    fn name(&mut self, start: usize, pos: Position) -> Token<'s> {
        let end = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let lexeme = &self.src[start..end];

        Token {
            kind: match lexeme {
                "int" => TokenKind::Int,
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "while" => TokenKind::While,
                "print" => TokenKind::Print,
                _ => TokenKind::Name(lexeme),
            },
            lexeme,
            pos,
        }
    }

    fn single(&mut self, kind: TokenKind<'s>, start: usize, pos: Position) -> Token<'s> {
        self.bump();
        Token {
            kind,
            lexeme: &self.src[start..start + 1],
            pos,
        }
    }

    /// Consumes characters while `pred` holds and returns the byte offset just past them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }

        match self.chars.peek() {
            Some(&(idx, _)) => idx,
            None => self.src.len(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn pos(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }
}
