//! Token Data Structure

use std::fmt;

use crate::error::Source;

/// Reserved words of Lua 5.1 through 5.4, `goto` excluded since it is only
/// a keyword where a statement can start.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for",
    "function", "if", "in", "local", "nil", "not", "or", "repeat",
    "return", "then", "true", "until", "while",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokKind {
    Name,
    Keyword,
    Number,
    Str,
    Op,
    Eof,
}

#[derive(Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokKind,
    pub line: u32,
    pub col: u32,
    pub text: &'a str,
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokKind::Eof => write!(f, "<eof>"),
            _ => write!(f, "<{}>", self.text.escape_default().collect::<String>()),
        }
    }
}

impl<'a> fmt::Debug for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.kind, self)
    }
}

impl<'a> Token<'a> {
    pub fn new(kind: TokKind, line: u32, col: u32, text: &'a str) -> Token<'a> {
        Token { kind, line, col, text }
    }

    /// Is this the keyword or operator `text`?
    #[inline]
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokKind::Keyword | TokKind::Op) && self.text == text
    }

    #[inline]
    pub fn is_name(&self) -> bool {
        self.kind == TokKind::Name
    }

    pub fn source(&self) -> Source {
        Source::new(self.line, self.col, None)
    }
}
