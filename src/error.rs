//! Structured Errors

use std::borrow::Cow;
use std::error;
use std::fmt::{self, Display};
use std::io;
use std::mem::{discriminant, replace};
use std::path::Path;

pub type SourceFileName = Option<Cow<'static, str>>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub file: SourceFileName,
    pub line: u32,
    pub col: u32,
}

impl Source {
    pub fn new(line: u32, col: u32, file: SourceFileName) -> Source {
        Source { file, line, col }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Copy)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn into_source(self, file: SourceFileName) -> Source {
        Source { file, line: self.line, col: self.col }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Meta {
    SourceFile(Cow<'static, str>),
    Source(LineCol),
    Hint(String),
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct MetaSet {
    meta: Vec<Meta>,
}

macro_rules! get_inner_meta {
    ($name:ident, $meta_name:ident, $inner_t:ty) => {
        #[allow(dead_code)]
        fn $name(&self) -> Option<$inner_t> {
            self.meta.iter().find_map(|m| if let Meta::$meta_name(name) = m {
                Some(name)
            } else {
                None
            }).cloned()
        }
    }
}

impl MetaSet {
    /// Add metadata which should replace previous metadata of the same type.
    ///
    /// # Returns
    /// Returns the previous metadata, if it exists.
    fn amend(&mut self, data: Meta) -> Option<Meta> {
        let pos = self.meta.iter()
                           .position(|m| discriminant(m) == discriminant(&data));
        if let Some(idx) = pos {
            Some(replace(&mut self.meta[idx], data))
        } else {
            self.meta.push(data);
            None
        }
    }

    /// Add metadata which should function as a fallback, but should not replace
    /// metadata of the same kind if it exists.
    fn fallback(&mut self, data: Meta) {
        if !self.meta.iter().any(|m| discriminant(m) == discriminant(&data)) {
            self.meta.push(data);
        }
    }

    get_inner_meta!(src_line_col, Source, LineCol);
    get_inner_meta!(src_file, SourceFile, Cow<'static, str>);
    get_inner_meta!(hint, Hint, String);

    pub fn src(&self) -> Option<Source> {
        let line_col = self.src_line_col()?;
        let file = self.src_file();
        Some(Source {
            file,
            line: line_col.line,
            col: line_col.col,
        })
    }
}

/// Which stage of a run an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Transform,
    Write,
}

#[derive(Clone, PartialEq)]
pub enum ErrorKind {
    ReadError { path: String, reason: String },
    WriteError { path: String, reason: String },
    UnterminatedString,
    UnterminatedLongBracket { what: &'static str },
    MalformedNumber { text: String },
    UnexpectedChar { chr: char },
    InvalidLongBracket,
    UnexpectedToken { expect: String, got: String },
    SyntaxErrorMsg { msg: String },
    InvalidOutput { cause: Box<Error> },
}

/// Structural Error Type
#[derive(Clone, PartialEq)]
pub struct Error {
    inner: Box<ErrorInner>
}

#[derive(Clone, PartialEq)]
struct ErrorInner {
    meta: MetaSet,
    ty: ErrorKind,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_error(self, f)
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_error(&Error::new(self.clone()), f)
    }
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            inner: Box::new(ErrorInner { meta: Default::default(),
                                         ty: kind })
        }
    }

    pub fn read(path: &Path, err: &io::Error) -> Error {
        Error::new(ErrorKind::ReadError { path: path.display().to_string(),
                                          reason: err.to_string() })
    }

    pub fn write(path: &Path, err: &io::Error) -> Error {
        Error::new(ErrorKind::WriteError { path: path.display().to_string(),
                                           reason: err.to_string() })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.inner.ty
    }

    pub fn meta(&self) -> &MetaSet {
        &self.inner.meta
    }

    pub fn stage(&self) -> Stage {
        match self.kind() {
            ErrorKind::ReadError { .. } => Stage::Read,
            ErrorKind::WriteError { .. } => Stage::Write,
            _ => Stage::Transform,
        }
    }

    /// Process exit status for this error, distinct per stage.
    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            Stage::Read => 2,
            Stage::Transform => 3,
            Stage::Write => 4,
        }
    }

    pub fn src(mut self, src: Source) -> Error {
        self.inner.meta.amend(Meta::Source(LineCol {
            line: src.line,
            col: src.col
        }));
        if let Some(file) = src.file {
            self.inner.meta.amend(Meta::SourceFile(file));
        }
        self
    }

    pub fn amend(mut self, meta: Meta) -> Self {
        self.inner.meta.amend(meta);
        self
    }

    pub fn fallback(mut self, meta: Meta) -> Self {
        self.inner.meta.fallback(meta);
        self
    }
}

fn fmt_error(err: &Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use ErrorKind::*;

    let meta = err.meta();
    match err.kind() {
        ReadError { path, reason } =>
            write!(f, "Read Error: could not read `{path}': {reason}")?,
        WriteError { path, reason } =>
            write!(f, "Write Error: could not write `{path}': {reason}")?,
        UnterminatedString =>
            write!(f, "Syntax Error: Unterminated string")?,
        UnterminatedLongBracket { what } =>
            write!(f, "Syntax Error: Unterminated long {what}")?,
        MalformedNumber { text } =>
            write!(f, "Syntax Error: Malformed number near `{text}'")?,
        UnexpectedChar { chr } =>
            write!(f, "Syntax Error: Unexpected character {chr:?}")?,
        InvalidLongBracket =>
            write!(f, "Syntax Error: Invalid long string delimiter")?,
        UnexpectedToken { expect, got } =>
            write!(f, "Syntax Error: Expected {expect} but got {got}")?,
        SyntaxErrorMsg { msg } =>
            write!(f, "Syntax Error: {msg}")?,
        InvalidOutput { cause } =>
            write!(f, "Invalid Output: minified text does not parse: {cause}")?,
    }

    write!(f, "{}", SourceDisplayHack(" ", meta, ""))?;

    if let Some(hint) = meta.hint() {
        write!(f, " (hint: {hint})")?;
    }

    Ok(())
}

struct SourceDisplayHack<'a>(&'static str, &'a MetaSet, &'static str);

impl Display for SourceDisplayHack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(src) = self.1.src() {
            write!(f, "{}{}{}", self.0, src, self.2)
        } else if let Some(srcf) = self.1.src_file() {
            write!(f, "{}[{}]{}", self.0, srcf, self.2)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_error(&Error::new(self.clone()), f)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.line == 0 {
            write!(f, "unknown")?;
        } else {
            if let Some(file) = &self.file {
                write!(f, "{} ", file)?;
            }
            write!(f, "{}:{}", self.line, self.col)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_error(self, f)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::InvalidOutput { cause } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

macro_rules! error_src {
    ($src:expr, $kind:ident, $($init:tt)* ) => {
        crate::error::Error::new(
            (crate::error::ErrorKind::$kind { $($init)* }),
        ).src($src)
    };
}
