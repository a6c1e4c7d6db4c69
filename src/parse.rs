//! Lua Parser
//!
//! A recursive-descent parser for Lua 5.1 through 5.4 which builds no tree.
//! While it walks the grammar it binds every variable name to its
//! declaration, notes which `;` tokens can go, and records the constant
//! numeric sub-expressions that can be replaced by their value.

use ahash::AHashSet;

use crate::error::{Error, Meta, Result};
use crate::opt::{self, ArithOp, Num};
use crate::scope::{Binding, Resolution, Scopes};
use crate::tok::{TokKind, Token};
use crate::tokit::tokenize;

/// Replace the tokens `start..end` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug)]
pub struct Chunk<'a> {
    pub shebang: Option<&'a str>,
    /// Every token of the chunk, `Eof` last.
    pub toks: Vec<Token<'a>>,
    pub scope: Resolution<'a>,
    /// Non-overlapping folds, sorted by position.
    pub folds: Vec<Fold>,
    /// Statement separators that the emitter may leave out.
    pub droppable: AHashSet<usize>,
    /// Block comments after the last token, kept in the output.
    pub trailer: Vec<&'a str>,
}

/// Token range of an expression, and its value if it is a numeric constant.
#[derive(Debug, Clone, Copy)]
struct Expr {
    start: usize,
    end: usize,
    value: Option<Num>,
}

#[derive(Debug, Clone, Copy)]
enum Suffixed<'a> {
    Name { name: &'a str, binding: Binding },
    Index,
    Call,
    Paren,
}

const UNARY_PRIORITY: u8 = 12;

/// Nesting allowed for statements and expressions, as in the reference
/// interpreter.
const MAX_SYNTAX_LEVELS: usize = 200;

/// Left and right priority of a binary operator.
fn binary_priority(tok: &Token) -> Option<(u8, u8)> {
    if !matches!(tok.kind, TokKind::Op | TokKind::Keyword) {
        return None;
    }
    Some(match tok.text {
        "or" => (1, 1),
        "and" => (2, 2),
        "<" | ">" | "<=" | ">=" | "~=" | "==" => (3, 3),
        "|" => (4, 4),
        "~" => (5, 5),
        "&" => (6, 6),
        "<<" | ">>" => (7, 7),
        ".." => (9, 8),
        "+" | "-" => (10, 10),
        "*" | "/" | "//" | "%" => (11, 11),
        "^" => (14, 13),
        _ => return None,
    })
}

fn is_unary(tok: &Token) -> bool {
    match tok.kind {
        TokKind::Op => matches!(tok.text, "-" | "#" | "~"),
        TokKind::Keyword => tok.text == "not",
        _ => false,
    }
}

pub struct Parser<'a> {
    toks: Vec<Token<'a>>,
    pos: usize,
    scopes: Scopes<'a>,
    /// Whether each enclosing function accepts `...`.
    vararg: Vec<bool>,
    fold: bool,
    folds: Vec<Fold>,
    droppable: AHashSet<usize>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// `toks` must end with an `Eof` token.
    pub fn new(toks: Vec<Token<'a>>, fold: bool) -> Parser<'a> {
        Parser { toks,
                 pos: 0,
                 scopes: Scopes::new(),
                 vararg: vec![true],
                 fold,
                 folds: Vec::new(),
                 droppable: AHashSet::new(),
                 depth: 0 }
    }

    #[inline]
    fn peek(&self) -> &Token<'a> {
        &self.toks[self.pos]
    }

    #[inline]
    fn peek_at(&self, n: usize) -> &Token<'a> {
        &self.toks[(self.pos + n).min(self.toks.len() - 1)]
    }

    fn next(&mut self) -> Token<'a> {
        let tok = self.toks[self.pos];
        if tok.kind != TokKind::Eof {
            self.pos += 1;
        }
        tok
    }

    #[inline]
    fn check(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn accept(&mut self, text: &str) -> bool {
        let found = self.check(text);
        if found {
            self.next();
        }
        found
    }

    fn unexpected(&self, expect: impl Into<String>) -> Error {
        let tok = self.peek();
        error_src!(tok.source(), UnexpectedToken,
                   expect: expect.into(),
                   got: tok.to_string())
    }

    fn syntax_error(&self, msg: String) -> Error {
        error_src!(self.peek().source(), SyntaxErrorMsg, msg)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_SYNTAX_LEVELS {
            return Err(self.syntax_error(
                format!("Chunk has too many syntax levels (limit is {MAX_SYNTAX_LEVELS})")));
        }
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect(&mut self, text: &str) -> Result<Token<'a>> {
        if self.check(text) {
            Ok(self.next())
        } else {
            Err(self.unexpected(format!("`{text}'")))
        }
    }

    /// Expect the token closing `who`, which was opened on `line`.
    fn expect_match(&mut self, what: &str, who: &str, line: u32) -> Result<Token<'a>> {
        if self.check(what) {
            return Ok(self.next());
        }
        let err = self.unexpected(format!("`{what}'"));
        if self.peek().line == line {
            Err(err)
        } else {
            Err(err.amend(Meta::Hint(format!("to close `{who}' at line {line}"))))
        }
    }

    fn name(&mut self) -> Result<(usize, &'a str)> {
        if self.peek().is_name() {
            let idx = self.pos;
            Ok((idx, self.next().text))
        } else {
            Err(self.unexpected("name"))
        }
    }

    fn block_follow(&self, with_until: bool) -> bool {
        let tok = self.peek();
        match tok.kind {
            TokKind::Eof => true,
            TokKind::Keyword => matches!(tok.text, "else" | "elseif" | "end")
                || (with_until && tok.text == "until"),
            _ => false,
        }
    }

    pub fn chunk(&mut self) -> Result<()> {
        self.scopes.open();
        self.statlist()?;
        if self.peek().kind != TokKind::Eof {
            return Err(self.unexpected("<eof>"));
        }
        self.scopes.close();
        Ok(())
    }

    fn statlist(&mut self) -> Result<()> {
        while !self.block_follow(true) {
            if self.check("return") {
                return self.retstat();
            }
            self.statement()?;
        }
        Ok(())
    }

    /// A statement list in a scope of its own.
    fn block(&mut self) -> Result<()> {
        self.scopes.open();
        self.statlist()?;
        self.scopes.close();
        Ok(())
    }

    fn retstat(&mut self) -> Result<()> {
        self.next();
        if !self.block_follow(true) && !self.check(";") {
            self.explist()?;
        }
        if self.check(";") {
            self.droppable.insert(self.pos);
            self.next();
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<()> {
        self.enter()?;
        let tok = *self.peek();
        let line = tok.line;
        match tok.kind {
            TokKind::Op if tok.text == ";" => {
                self.droppable.insert(self.pos);
                self.next();
            }
            TokKind::Op if tok.text == "::" => {
                self.next();
                self.name()?;
                self.expect("::")?;
            }
            TokKind::Keyword => match tok.text {
                "if" => self.ifstat(line)?,
                "while" => {
                    self.next();
                    self.expr()?;
                    self.expect("do")?;
                    self.block()?;
                    self.expect_match("end", "while", line)?;
                }
                "do" => {
                    self.next();
                    self.block()?;
                    self.expect_match("end", "do", line)?;
                }
                "for" => self.forstat(line)?,
                "repeat" => {
                    self.next();
                    self.scopes.open();
                    self.statlist()?;
                    self.expect_match("until", "repeat", line)?;
                    self.expr()?;
                    self.scopes.close();
                }
                "function" => self.funcstat(line)?,
                "local" => {
                    self.next();
                    if self.accept("function") {
                        self.localfunc(line)?;
                    } else {
                        self.localstat()?;
                    }
                }
                "break" => {
                    self.next();
                }
                _ => self.exprstat()?,
            },
            TokKind::Name if tok.text == "goto" && self.peek_at(1).is_name() => {
                self.next();
                self.name()?;
            }
            _ => self.exprstat()?,
        }
        self.leave();
        Ok(())
    }

    fn ifstat(&mut self, line: u32) -> Result<()> {
        self.next();
        self.expr()?;
        self.expect("then")?;
        self.block()?;
        loop {
            if self.accept("elseif") {
                self.expr()?;
                self.expect("then")?;
                self.block()?;
            } else {
                if self.accept("else") {
                    self.block()?;
                }
                self.expect_match("end", "if", line)?;
                return Ok(());
            }
        }
    }

    fn forstat(&mut self, line: u32) -> Result<()> {
        self.next();
        let mut vars = vec![self.name()?];
        if self.accept("=") {
            self.expr()?;
            self.expect(",")?;
            self.expr()?;
            if self.accept(",") {
                self.expr()?;
            }
        } else {
            while self.accept(",") {
                vars.push(self.name()?);
            }
            self.expect("in")?;
            self.explist()?;
        }
        self.expect("do")?;
        self.scopes.open();
        for (tok, name) in vars {
            self.scopes.declare(name, Some(tok), false);
        }
        self.statlist()?;
        self.scopes.close();
        self.expect_match("end", "for", line)?;
        Ok(())
    }

    fn funcstat(&mut self, line: u32) -> Result<()> {
        self.next();
        let (tok, name) = self.name()?;
        let binding = self.scopes.reference(name, tok);
        let mut plain = true;
        let mut is_method = false;
        while self.accept(".") {
            self.name()?;
            plain = false;
        }
        if self.accept(":") {
            self.name()?;
            plain = false;
            is_method = true;
        }
        if plain {
            self.scopes.assign(name, binding);
        } else {
            self.scopes.read(name, binding);
        }
        self.funcbody(is_method, line)
    }

    fn localfunc(&mut self, line: u32) -> Result<()> {
        let (tok, name) = self.name()?;
        self.scopes.declare(name, Some(tok), false);
        self.funcbody(false, line)
    }

    fn localstat(&mut self) -> Result<()> {
        let mut vars = Vec::new();
        loop {
            vars.push(self.name()?);
            if self.accept("<") {
                let (_, attrib) = self.name()?;
                if !matches!(attrib, "const" | "close") {
                    return Err(self.syntax_error(format!("Unknown attribute `{attrib}'")));
                }
                self.expect(">")?;
            }
            if !self.accept(",") {
                break;
            }
        }
        if self.accept("=") {
            self.explist()?;
        }
        for (tok, name) in vars {
            self.scopes.declare(name, Some(tok), false);
        }
        Ok(())
    }

    fn funcbody(&mut self, is_method: bool, line: u32) -> Result<()> {
        self.scopes.open();
        if is_method {
            self.scopes.declare("self", None, true);
        }
        self.expect("(")?;
        let mut vararg = false;
        if !self.check(")") {
            loop {
                if self.accept("...") {
                    vararg = true;
                    break;
                }
                let (tok, name) = self.name()?;
                self.scopes.declare(name, Some(tok), false);
                if !self.accept(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        self.vararg.push(vararg);
        self.statlist()?;
        self.vararg.pop();
        self.expect_match("end", "function", line)?;
        self.scopes.close();
        Ok(())
    }

    fn exprstat(&mut self) -> Result<()> {
        let (_, target) = self.suffixedexp()?;
        if self.check("=") || self.check(",") {
            let mut targets = vec![self.assignment_target(target)?];
            while self.accept(",") {
                let (_, target) = self.suffixedexp()?;
                targets.push(self.assignment_target(target)?);
            }
            self.expect("=")?;
            self.explist()?;
            // The values are evaluated before any variable is written
            for (name, binding) in targets.into_iter().flatten() {
                self.scopes.assign(name, binding);
            }
        } else if !matches!(target, Suffixed::Call) {
            return Err(self.syntax_error(format!("Unexpected {} after expression, \
                                                  a statement must be a call or an assignment",
                                                 self.peek())));
        }
        Ok(())
    }

    /// The variable written by an assignment target, if it is a plain name.
    fn assignment_target(&self, target: Suffixed<'a>) -> Result<Option<(&'a str, Binding)>> {
        match target {
            Suffixed::Name { name, binding } => Ok(Some((name, binding))),
            Suffixed::Index => Ok(None),
            Suffixed::Call | Suffixed::Paren =>
                Err(self.syntax_error("Cannot assign to this expression".to_string())),
        }
    }

    fn explist(&mut self) -> Result<()> {
        self.expr()?;
        while self.accept(",") {
            self.expr()?;
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr> {
        self.subexpr(0)
    }

    fn subexpr(&mut self, limit: u8) -> Result<Expr> {
        self.enter()?;
        let start = self.pos;
        let tok = *self.peek();
        let mut lhs = if is_unary(&tok) {
            self.next();
            let operand = self.subexpr(UNARY_PRIORITY)?;
            let value = if tok.text == "-" {
                operand.value.and_then(Num::neg)
            } else {
                None
            };
            let e = Expr { start, end: operand.end, value };
            self.try_fold(e);
            e
        } else {
            self.simpleexp()?
        };
        while let Some((left, right)) = binary_priority(self.peek()) {
            if left <= limit {
                break;
            }
            let op = self.next();
            let rhs = self.subexpr(right)?;
            let value = match (ArithOp::from_op(op.text), lhs.value, rhs.value) {
                (Some(op), Some(a), Some(b)) => a.arith(op, b),
                _ => None,
            };
            lhs = Expr { start, end: rhs.end, value };
            self.try_fold(lhs);
        }
        self.leave();
        Ok(lhs)
    }

    fn simpleexp(&mut self) -> Result<Expr> {
        let start = self.pos;
        let tok = *self.peek();
        let mut paren = false;
        let value = match tok.kind {
            TokKind::Number => {
                self.next();
                opt::parse_number(tok.text)
            }
            TokKind::Str => {
                self.next();
                None
            }
            TokKind::Keyword if matches!(tok.text, "nil" | "true" | "false") => {
                self.next();
                None
            }
            TokKind::Keyword if tok.text == "function" => {
                self.next();
                self.funcbody(false, tok.line)?;
                None
            }
            TokKind::Op if tok.text == "..." => {
                if !self.vararg.last().copied().unwrap_or(false) {
                    return Err(self.syntax_error(
                        "Cannot use `...' outside a vararg function".to_string()));
                }
                self.next();
                None
            }
            TokKind::Op if tok.text == "{" => {
                self.constructor()?;
                None
            }
            _ => {
                let (value, kind) = self.suffixedexp()?;
                if let Suffixed::Name { name, binding } = kind {
                    self.scopes.read(name, binding);
                }
                paren = matches!(kind, Suffixed::Paren);
                value
            }
        };
        let e = Expr { start, end: self.pos, value };
        if paren {
            self.try_fold(e);
        }
        Ok(e)
    }

    fn primaryexp(&mut self) -> Result<(Option<Num>, Suffixed<'a>)> {
        let tok = *self.peek();
        if tok.is_name() {
            let idx = self.pos;
            self.next();
            let binding = self.scopes.reference(tok.text, idx);
            Ok((None, Suffixed::Name { name: tok.text, binding }))
        } else if tok.is("(") {
            self.next();
            let inner = self.expr()?;
            self.expect_match(")", "(", tok.line)?;
            Ok((inner.value, Suffixed::Paren))
        } else {
            Err(self.syntax_error(format!("Unexpected symbol {tok}")))
        }
    }

    fn suffixedexp(&mut self) -> Result<(Option<Num>, Suffixed<'a>)> {
        let (mut value, mut kind) = self.primaryexp()?;
        if let Suffixed::Name { name, binding } = kind {
            if self.starts_suffix() {
                self.scopes.read(name, binding);
            }
        }
        loop {
            let tok = *self.peek();
            match tok.kind {
                TokKind::Op if tok.text == "." => {
                    self.next();
                    self.name()?;
                    kind = Suffixed::Index;
                }
                TokKind::Op if tok.text == "[" => {
                    self.next();
                    self.expr()?;
                    self.expect("]")?;
                    kind = Suffixed::Index;
                }
                TokKind::Op if tok.text == ":" => {
                    self.next();
                    self.name()?;
                    self.funcargs()?;
                    kind = Suffixed::Call;
                }
                TokKind::Op if matches!(tok.text, "(" | "{") => {
                    self.funcargs()?;
                    kind = Suffixed::Call;
                }
                TokKind::Str => {
                    self.funcargs()?;
                    kind = Suffixed::Call;
                }
                _ => return Ok((value, kind)),
            }
            value = None;
        }
    }

    fn starts_suffix(&self) -> bool {
        let tok = self.peek();
        match tok.kind {
            TokKind::Str => true,
            TokKind::Op => matches!(tok.text, "." | "[" | ":" | "(" | "{"),
            _ => false,
        }
    }

    fn funcargs(&mut self) -> Result<()> {
        let tok = *self.peek();
        match tok.kind {
            TokKind::Str => {
                self.next();
            }
            TokKind::Op if tok.text == "{" => self.constructor()?,
            TokKind::Op if tok.text == "(" => {
                self.next();
                if !self.check(")") {
                    self.explist()?;
                }
                self.expect_match(")", "(", tok.line)?;
            }
            _ => return Err(self.unexpected("function arguments")),
        }
        Ok(())
    }

    fn constructor(&mut self) -> Result<()> {
        let open = self.expect("{")?;
        while !self.check("}") {
            if self.accept("[") {
                self.expr()?;
                self.expect("]")?;
                self.expect("=")?;
                self.expr()?;
            } else if self.peek().is_name() && self.peek_at(1).is("=") {
                self.next();
                self.next();
                self.expr()?;
            } else {
                self.expr()?;
            }
            if !(self.accept(",") || self.accept(";")) {
                break;
            }
        }
        self.expect_match("}", "{", open.line)?;
        Ok(())
    }

    /// Length of the range `start..end` once the folds inside it are applied.
    fn folded_len(&self, start: usize, end: usize) -> usize {
        let text_len = |a: usize, b: usize| -> usize {
            self.toks[a..b].iter().map(|t| t.text.len()).sum()
        };
        self.folds.iter()
                  .filter(|f| f.start >= start && f.end <= end)
                  .fold(text_len(start, end), |len, f| {
                      len - text_len(f.start, f.end) + f.text.len()
                  })
    }

    fn try_fold(&mut self, e: Expr) {
        if !self.fold {
            return;
        }
        let Some(value) = e.value else { return };
        let text = opt::fold_text(value);
        if text.len() >= self.folded_len(e.start, e.end) {
            return;
        }
        self.folds.retain(|f| f.start < e.start || f.end > e.end);
        self.folds.push(Fold { start: e.start, end: e.end, text });
    }
}

/// Tokenize and parse `text`, resolving every name.
pub fn parse(text: &str, fold: bool) -> Result<Chunk<'_>> {
    let lexed = tokenize(text)?;
    let mut parser = Parser::new(lexed.toks, fold);
    parser.chunk()?;
    let Parser { toks, scopes, mut folds, droppable, .. } = parser;
    folds.sort_by_key(|f| f.start);
    log::trace!("parsed {} tokens, {} folds", toks.len(), folds.len());
    Ok(Chunk { shebang: lexed.shebang,
               toks,
               scope: scopes.finish(),
               folds,
               droppable,
               trailer: lexed.trailer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// (token text, binding) for every resolved name, in source order.
    fn bindings(src: &str) -> Vec<(String, Binding)> {
        let chunk = parse(src, false).unwrap();
        let mut refs = chunk.scope.refs.clone();
        refs.sort_by_key(|(idx, _)| *idx);
        refs.into_iter()
            .map(|(idx, b)| (chunk.toks[idx].text.to_string(), b))
            .collect()
    }

    fn folds(src: &str) -> Vec<String> {
        parse(src, true).unwrap().folds.into_iter().map(|f| f.text).collect()
    }

    use Binding::*;

    #[test]
    fn local_and_global() {
        assert_eq!(bindings("local x = 10\nprint(x)\n"),
                   [("x".to_string(), Local(0)),
                    ("print".to_string(), Global),
                    ("x".to_string(), Local(0))]);
    }

    #[test]
    fn local_initializer_sees_outer_name() {
        let b = bindings("local x = 1 local x = x + 1 return x");
        assert_eq!(b[1], ("x".to_string(), Local(1)));
        assert_eq!(b[2], ("x".to_string(), Local(0)));
        assert_eq!(b[3], ("x".to_string(), Local(1)));
    }

    #[test]
    fn local_function_is_recursive() {
        let b = bindings("local function f(n) return f(n - 1) end");
        assert_eq!(b, [("f".to_string(), Local(0)),
                       ("n".to_string(), Local(1)),
                       ("f".to_string(), Local(0)),
                       ("n".to_string(), Local(1))]);
        let b = bindings("local f = function() return f end");
        assert_eq!(b[0], ("f".to_string(), Local(0)));
        assert_eq!(b[1], ("f".to_string(), Global));
    }

    #[test]
    fn repeat_condition_sees_body() {
        let b = bindings("repeat local done = true until done");
        assert_eq!(b[1], ("done".to_string(), Local(0)));
    }

    #[test]
    fn loop_variables_are_scoped_to_body() {
        let b = bindings("for i = 1, 10 do print(i) end print(i)");
        assert_eq!(b[0], ("i".to_string(), Local(0)));
        assert_eq!(b[2], ("i".to_string(), Local(0)));
        assert_eq!(b[4], ("i".to_string(), Global));
        let b = bindings("for k, v in pairs(t) do t[k] = v end");
        assert_eq!(b.iter().filter(|(_, b)| *b == Global).count(), 3);
    }

    #[test]
    fn method_has_implicit_self() {
        let chunk = parse("function obj:get() return self.value end", false).unwrap();
        assert!(chunk.scope.locals[0].pinned);
        assert_eq!(chunk.scope.locals[0].name, "self");
        assert!(!chunk.scope.assigned_globals.contains("obj"));
        let b = bindings("function obj:get() return self.value end");
        assert_eq!(b, [("obj".to_string(), Global), ("self".to_string(), Local(0))]);
    }

    #[test]
    fn fields_and_labels_are_not_names() {
        let b = bindings("local t = {a = 1, [b] = 2} t.c = t:d() ::top:: goto top");
        let names: Vec<&str> = b.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["t", "b", "t", "t"]);
    }

    #[test]
    fn goto_as_identifier() {
        let b = bindings("local goto = 1 print(goto)");
        assert_eq!(b[0], ("goto".to_string(), Local(0)));
        assert_eq!(b[2], ("goto".to_string(), Local(0)));
    }

    #[test]
    fn assigned_globals() {
        let chunk = parse("x = 1 function f() end a.b = 2 print(y)", false).unwrap();
        assert!(chunk.scope.assigned_globals.contains("x"));
        assert!(chunk.scope.assigned_globals.contains("f"));
        assert!(!chunk.scope.assigned_globals.contains("a"));
        assert!(!chunk.scope.assigned_globals.contains("y"));
        assert_eq!(chunk.scope.globals, ["x", "f", "a", "print", "y"]);
    }

    #[test]
    fn reads_before_assignment() {
        let chunk = parse("local old = print print = function() old() end", false).unwrap();
        assert!(chunk.scope.read_before_assign.contains("print"));
        let chunk = parse("M = M or {} x = 1 y = x", false).unwrap();
        assert!(chunk.scope.read_before_assign.contains("M"));
        assert!(!chunk.scope.read_before_assign.contains("x"));
        let chunk = parse("string.pad = 1 function table.f() end", false).unwrap();
        assert!(chunk.scope.read_before_assign.contains("string"));
        assert!(chunk.scope.read_before_assign.contains("table"));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("x = {}1{}", "(".repeat(5000), ")".repeat(5000));
        let err = parse(&deep, false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
        assert!(err.to_string().contains("too many syntax levels"));
        let shallow = format!("x = {}1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&shallow, false).is_ok());
        let blocks = format!("{}{}", "do ".repeat(1000), "end ".repeat(1000));
        assert!(parse(&blocks, false).is_err());
        let tables = format!("x = {}{}", "{".repeat(1000), "}".repeat(1000));
        assert!(parse(&tables, false).is_err());
    }

    #[test]
    fn attribs() {
        let b = bindings("local x <const> = 5 local y <close> = nil");
        assert_eq!(b.len(), 2);
        let err = parse("local x <mut> = 5", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
    }

    #[test]
    fn droppable_separators() {
        let chunk = parse("a = 1; b = {1; 2}; return a;", false).unwrap();
        let mut dropped: Vec<usize> = chunk.droppable.iter().copied().collect();
        dropped.sort();
        let texts: Vec<&str> = dropped.iter().map(|i| chunk.toks[*i].text).collect();
        assert_eq!(texts, [";", ";", ";"]);
        assert!(!dropped.contains(&8));
    }

    #[test]
    fn folding() {
        assert_eq!(folds("x = 1 + 2 * 3"), ["7"]);
        assert_eq!(folds("x = (1 + 2)"), ["3"]);
        assert_eq!(folds("x = a * 2 + 3"), Vec::<String>::new());
        assert_eq!(folds("x = 2 ^ 2"), Vec::<String>::new());
        assert_eq!(folds("x = 10 / 4"), ["2.5"]);
        assert_eq!(folds("x = 1 - 10 * 10"), ["100"]);
        assert_eq!(folds("x = -2 * 3 - 4"), ["(-10)"]);
        assert_eq!(folds("x = -(1000000 + 1000000)"), ["2000000"]);
        assert_eq!(folds("x = 1 // 0"), Vec::<String>::new());
        assert!(parse("x = 1 + 2", false).unwrap().folds.is_empty());
    }

    #[test]
    fn vararg_only_in_vararg_functions() {
        assert!(parse("local a = ... function f(...) return ... end", false).is_ok());
        let err = parse("function f() return ... end", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
    }

    #[test]
    fn syntax_errors() {
        let err = parse("x = ", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
        let err = parse("if x then\n  y()\n", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.to_string(),
                   "Syntax Error: Expected `end' but got <eof> [3:0] (hint: to close `if' at line 1)");
        let err = parse("x", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
        let err = parse("f() = 1", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SyntaxErrorMsg { .. }));
        let err = parse("return 1 x = 2", false).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn operators_and_precedence_parse() {
        parse("x = a or b and c < d | e ~ f & g << h .. i + j * k ^ -l // m % n", false).unwrap();
        parse("x = not #t == ~y", false).unwrap();
        parse("f{1, 2, 3} f'str' f[[long]] a.b.c:d(e)(g)[h] = 1", false)
            .map(|_| ())
            .unwrap_or_else(|e| panic!("{e}"));
    }
}
