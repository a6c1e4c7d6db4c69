//! Lua Tokenizer

use crate::error::{Error, ErrorKind, LineCol, Result};
use crate::tok::*;
use std::io;

#[derive(Hash, PartialEq, Eq, Debug, Clone)]
pub struct Fragment {
    end: bool,
    c: char,
    choices: Vec<Fragment>
}

/**
 * The result of an advancement on a token fragment tree.
 *
 * - `Advance`: The next node to follow.
 * - `Valid`: Means that the tree cannot progress using the given
 *            branch-character, *but* the current node is an end-node
 *            so it represents a valid operator. The character given
 *            to advance() when `Valid` is returned is *not* a part of
 *            the operator.
 * - `Invalid`: The input does not match any token in the tree, this means that
 *              you should backtrack.
*/
enum AdvanceResult<'a> {
    Advance(&'a Fragment),
    Valid,
    Invalid
}

/**
 * A fragment is a part of an operator lookup tree. To get a feel for how it
 * works, run `tokenize --dot > ops.dot` and then
 *
 *    dot -Tsvg ops.dot > tree.svg
 *
 * Then open that svg file in your favorite browser to see the structure.
*/
impl Fragment {
    pub fn root() -> Fragment {
        Fragment { c: 'ε',
                   choices: Vec::new(),
                   end: false }
    }

    pub fn insert(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            self.end = true;
            return
        };
        let rest = &text[first.len_utf8()..];
        if let Some(sub) = self.find_mut(first) {
            sub.insert(rest);
        } else {
            let mut sub = Fragment { c: first,
                                     choices: Default::default(),
                                     end: false };
            sub.insert(rest);
            self.choices.push(sub);
        }
    }

    fn find_mut(&mut self, first: char) -> Option<&mut Fragment> {
        self.choices
            .iter_mut()
            .find(|Fragment { c, .. }| *c == first)
    }

    pub fn is_valid(&self) -> bool {
        self.end
    }

    /**
     * Advance forward to the next node in the tree, see the documentation for
     * AdvanceResult for more information.
     *
     * # Arguments
     *
     * - `nc` : Which character to branch on.
     */
    fn advance(&self, nc: char) -> AdvanceResult<'_> {
        use AdvanceResult::*;
        self.choices.iter()
                    .find(|Fragment { c, .. }| *c == nc)
                    .map(Advance)
                    .or(if self.end {
                        Some(Valid)
                    } else {
                        None
                    }).unwrap_or(Invalid)
    }

    /**
     * Length in bytes of the longest operator that `text` starts with, zero
     * if it does not start with an operator.
     */
    pub fn longest_match(&self, text: &str) -> usize {
        let mut node = self;
        let mut best = 0;
        for (i, c) in text.char_indices() {
            match node.advance(c) {
                AdvanceResult::Advance(next) => {
                    node = next;
                    if node.is_valid() {
                        best = i + c.len_utf8();
                    }
                }
                AdvanceResult::Valid | AdvanceResult::Invalid => break,
            }
        }
        best
    }

    /**
     * Print out the token fragment tree in the GraphViz dot [1] format.
     *
     * [1]: https://www.graphviz.org/documentation/
     *
     * # Arguments
     *
     * - `stream` : Output.
     */
    pub fn print_dot(&self, stream: &mut dyn io::Write) -> io::Result<()> {
        let mut cnt = 0;
        let mut roots = vec![(cnt, self)];
        writeln!(stream, "digraph tokens {{")?;
        writeln!(stream, r#"    end [label="end", shape=box, style=filled]"#)?;
        while let Some((id, root)) = roots.pop() {
            writeln!(stream, "    N{} [label={:?}];", id,
                   &[root.c].iter().collect::<String>())?;
            if root.end {
                writeln!(stream, "    N{} -> end;", id)?;
            }
            for sub in root.choices.iter() {
                cnt += 1;
                writeln!(stream, "    N{} -> N{};", id, cnt)?;
                roots.push((cnt, sub));
            }
        }
        writeln!(stream, "}}")
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq)]
struct Span {
    beg: usize,
    end: usize
}

impl Span {
    #[inline]
    pub fn new(beg: usize, end: usize) -> Span {
        Span { beg, end }
    }

    #[inline]
    pub fn make_tok<'a>(&self, kind: TokKind, start: LineTracker, src: &'a str) -> Token<'a> {
        let (line, col) = start.get();
        Token { kind, line, col, text: &src[self.beg..self.end] }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct LineTracker {
    line: u32,
    col: u32
}

impl Default for LineTracker {
    fn default() -> Self {
        Self { line: 1,
               col: Default::default() }
    }
}

impl LineTracker {
    #[inline]
    pub fn step(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
    }

    #[inline]
    pub fn get(&self) -> (u32, u32) {
        (self.line, self.col)
    }
}

impl From<LineTracker> for LineCol {
    fn from(v: LineTracker) -> Self {
        LineCol { line: v.line, col: v.col }
    }
}

const BOM: char = '\u{feff}';

const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "//", "%", "^", "#", "&", "~", "|", "<<", ">>",
    "==", "~=", "<=", ">=", "<", ">", "=", "(", ")", "{", "}", "[", "]",
    "::", ";", ":", ",", ".", "..", "...",
];

pub fn lua_tok_tree() -> Fragment {
    let mut tree = Fragment::root();
    for tok in OPERATORS {
        tree.insert(tok);
    }
    tree
}

lazy_static! {
    pub static ref LUA_OPERATORS: Fragment = lua_tok_tree();
}

#[inline]
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

#[inline]
pub fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[inline]
pub fn is_hex_prefixed(text: &str) -> bool {
    text.starts_with("0x") || text.starts_with("0X")
}

/**
 * Check that `text` is a well-formed Lua numeral: decimal or hexadecimal,
 * with an optional fraction and an optional exponent (`e` for decimal, `p`
 * for hexadecimal).
 */
pub fn is_numeral(text: &str) -> bool {
    let bytes = text.as_bytes();
    let hex = is_hex_prefixed(text);
    let digits: fn(&u8) -> bool = if hex { u8::is_ascii_hexdigit } else { u8::is_ascii_digit };
    let exp = if hex { b'p' } else { b'e' };
    let mut i = if hex { 2 } else { 0 };
    let mut mantissa = 0;
    while i < bytes.len() && digits(&bytes[i]) {
        i += 1;
        mantissa += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && digits(&bytes[i]) {
            i += 1;
            mantissa += 1;
        }
    }
    if mantissa == 0 {
        return false;
    }
    if i < bytes.len() && bytes[i].to_ascii_lowercase() == exp {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

pub struct Toker<'a, 'b> {
    line_tracker: LineTracker,
    text: &'a str,
    pos: usize,
    frags: &'b Fragment,
    done: bool,
    err: Option<Error>,
    /// Block comments seen since the last token.
    trailing: Vec<&'a str>,
}

impl<'a> Toker<'a, '_> {
    pub fn new<'b>(text: &'a str, frags: &'b Fragment) -> Toker<'a, 'b> {
        Toker { line_tracker: LineTracker::default(),
                text,
                pos: 0,
                frags,
                done: false,
                err: None,
                trailing: Vec::new() }
    }

    pub fn check_error(&mut self) -> Result<()> {
        self.err.take().map(Err).unwrap_or(Ok(()))
    }

    /// Skip a UTF-8 byte order mark at the start of the text.
    pub fn skip_bom(&mut self) {
        if self.pos == 0 && self.text.starts_with(BOM) {
            self.pos = BOM.len_utf8();
        }
    }

    /// Consume a leading `#` line, which the Lua loader skips.
    pub fn shebang(&mut self) -> Option<&'a str> {
        let at_start = self.text[..self.pos].trim_start_matches(BOM).is_empty();
        if !at_start || !self.text[self.pos..].starts_with('#') {
            return None;
        }
        let beg = self.pos;
        let end = self.text[beg..].find('\n').map(|i| beg + i).unwrap_or(self.text.len());
        while self.pos < end {
            self.bump();
        }
        Some(self.text[beg..end].trim_end_matches('\r'))
    }

    /// Block comments after the last token, e.g a license notice.
    pub fn take_trailing(&mut self) -> Vec<&'a str> {
        std::mem::take(&mut self.trailing)
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        self.line_tracker.step(c);
        Some(c)
    }

    fn fail(&self, kind: ErrorKind, at: LineTracker) -> Error {
        let lc: LineCol = at.into();
        Error::new(kind).src(lc.into_source(None))
    }

    /// Level of the long bracket opening at the cursor, if there is one.
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.text[self.pos..].as_bytes();
        if rest.first() != Some(&b'[') {
            return None;
        }
        let level = rest[1..].iter().take_while(|&&b| b == b'=').count();
        (rest.get(level + 1) == Some(&b'[')).then_some(level)
    }

    fn read_long_bracket(&mut self, level: usize, what: &'static str) -> Result<()> {
        let start = self.line_tracker;
        for _ in 0..level + 2 {
            self.bump();
        }
        let close = format!("]{}]", "=".repeat(level));
        let Some(off) = self.text[self.pos..].find(&close) else {
            return Err(self.fail(ErrorKind::UnterminatedLongBracket { what }, start));
        };
        let end = self.pos + off + close.len();
        while self.pos < end {
            self.bump();
        }
        Ok(())
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if is_space(c) => {
                    self.bump();
                }
                Some('-') if self.peek_nth(1) == Some('-') => {
                    let beg = self.pos;
                    self.bump();
                    self.bump();
                    if let Some(level) = self.long_bracket_level() {
                        self.read_long_bracket(level, "comment")?;
                        let text = self.text;
                        self.trailing.push(&text[beg..self.pos]);
                        continue;
                    }
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<()> {
        const ESCAPE_CHAR: char = '\\';
        let start = self.line_tracker;
        let unterminated = |s: &Self| s.fail(ErrorKind::UnterminatedString, start);
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => return Err(unterminated(self)),
                Some(ESCAPE_CHAR) => match self.bump() {
                    None => return Err(unterminated(self)),
                    Some('\r') if self.peek() == Some('\n') => {
                        self.bump();
                    }
                    Some('z') => {
                        while self.peek().map(is_space).unwrap_or(false) {
                            self.bump();
                        }
                    }
                    Some(_) => (),
                },
                Some(c) if c == quote => return Ok(()),
                Some(_) => (),
            }
        }
    }

    fn read_number(&mut self) -> Result<()> {
        let start = self.line_tracker;
        let beg = self.pos;
        let hex = is_hex_prefixed(&self.text[beg..]);
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent = if hex { 'p' } else { 'e' };
            let sign_after_exponent = matches!(c, '+' | '-')
                && prev.to_ascii_lowercase() == exponent;
            if !(is_word_char(c) || c == '.' || sign_after_exponent) {
                break;
            }
            prev = c;
            self.bump();
        }
        let text = &self.text[beg..self.pos];
        if is_numeral(text) {
            Ok(())
        } else {
            Err(self.fail(ErrorKind::MalformedNumber { text: text.to_string() }, start))
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        self.skip_trivia()?;
        let start = self.line_tracker;
        let beg = self.pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        self.trailing.clear();
        let kind = match c {
            '"' | '\'' => {
                self.read_string(c)?;
                TokKind::Str
            }
            '[' => match self.long_bracket_level() {
                Some(level) => {
                    self.read_long_bracket(level, "string")?;
                    TokKind::Str
                }
                None if self.peek_nth(1) == Some('=') =>
                    return Err(self.fail(ErrorKind::InvalidLongBracket, start)),
                None => {
                    self.bump();
                    TokKind::Op
                }
            },
            c if c.is_ascii_digit() => {
                self.read_number()?;
                TokKind::Number
            }
            '.' if self.peek_nth(1).map(|d| d.is_ascii_digit()).unwrap_or(false) => {
                self.read_number()?;
                TokKind::Number
            }
            c if is_word_start(c) => {
                while self.peek().map(is_word_char).unwrap_or(false) {
                    self.bump();
                }
                if is_keyword(&self.text[beg..self.pos]) {
                    TokKind::Keyword
                } else {
                    TokKind::Name
                }
            }
            c => {
                let len = self.frags.longest_match(&self.text[self.pos..]);
                if len == 0 {
                    return Err(self.fail(ErrorKind::UnexpectedChar { chr: c }, start));
                }
                while self.pos < beg + len {
                    self.bump();
                }
                TokKind::Op
            }
        };
        Ok(Some(Span::new(beg, self.pos).make_tok(kind, start, self.text)))
    }

    /// The end-of-input token, positioned after the last character.
    pub fn eof(&self) -> Token<'a> {
        Span::new(self.text.len(), self.text.len())
            .make_tok(TokKind::Eof, self.line_tracker, self.text)
    }
}

impl<'a, 'b> Iterator for Toker<'a, 'b> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(tok)) => Some(tok),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.err = Some(e);
                self.done = true;
                None
            }
        }
    }
}

/// Tokenized chunk: the skipped `#` line, every token with `Eof` last, and
/// the block comments that follow the last token.
#[derive(Debug)]
pub struct Lexed<'a> {
    pub shebang: Option<&'a str>,
    pub toks: Vec<Token<'a>>,
    pub trailer: Vec<&'a str>,
}

pub fn tokenize(text: &str) -> Result<Lexed<'_>> {
    let mut toker = Toker::new(text, &LUA_OPERATORS);
    toker.skip_bom();
    let shebang = toker.shebang();
    let mut toks: Vec<Token<'_>> = toker.by_ref().collect();
    toker.check_error()?;
    toks.push(toker.eof());
    let trailer = toker.take_trailing();
    Ok(Lexed { shebang, toks, trailer })
}
