//! Minified Output

use ahash::AHashMap;

use crate::parse::Chunk;
use crate::tok::TokKind;
use crate::tokit::{is_word_char, LUA_OPERATORS};

/// Kind of the previously written token, as far as spacing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Nothing,
    Number,
    Op,
    Other,
}

/// Writes tokens on a single line, with a space only where two tokens would
/// otherwise lex differently.
struct Emitter {
    out: String,
    last_start: usize,
    last: Last,
}

impl Emitter {
    fn new() -> Emitter {
        Emitter { out: String::new(), last_start: 0, last: Last::Nothing }
    }

    fn needs_space(&self, next: &str) -> bool {
        let prev = &self.out[self.last_start..];
        let (Some(p), Some(n)) = (prev.chars().last(), next.chars().next()) else {
            return false;
        };
        match self.last {
            Last::Nothing => false,
            // `3 .. x`, `3. end` and `0x1 e` would all merge into the numeral
            Last::Number if is_word_char(n) || n == '.' => true,
            Last::Op if LUA_OPERATORS.longest_match(&format!("{prev}{n}")) > prev.len() => true,
            // `- -x` would start a comment, `[ [` a long string
            Last::Op if (p == '-' && n == '-') || (p == '[' && (n == '[' || n == '=')) => true,
            _ => is_word_char(p) && is_word_char(n),
        }
    }

    fn push(&mut self, text: &str, kind: Last) {
        if self.needs_space(text) {
            self.out.push(' ');
        }
        self.last_start = self.out.len();
        self.out.push_str(text);
        self.last = kind;
    }
}

fn last_of(kind: TokKind) -> Last {
    match kind {
        TokKind::Number => Last::Number,
        TokKind::Op => Last::Op,
        _ => Last::Other,
    }
}

/**
 * Print `chunk` with `names` substituted for the name tokens they key, its
 * folds applied, comments and layout dropped. Block comments after the last
 * token, like a license notice, are kept on lines of their own.
 */
pub fn emit(chunk: &Chunk, names: &AHashMap<usize, String>) -> String {
    let toks = &chunk.toks;
    let mut em = Emitter::new();
    if let Some(shebang) = chunk.shebang {
        em.out.push_str(shebang);
        em.out.push('\n');
        em.last_start = em.out.len();
    }
    let mut folds = chunk.folds.iter().peekable();
    let mut i = 0;
    while i < toks.len() {
        let tok = &toks[i];
        if tok.kind == TokKind::Eof {
            break;
        }
        if let Some(fold) = folds.next_if(|f| f.start == i) {
            let kind = if fold.text.starts_with('(') { Last::Op } else { Last::Number };
            em.push(&fold.text, kind);
            i = fold.end;
            continue;
        }
        if chunk.droppable.contains(&i) {
            // `a=f;(g)()` must keep its separator, `a=f(g)()` is one call
            if !toks[i + 1].is("(") {
                i += 1;
                continue;
            }
        }
        let text = names.get(&i).map(String::as_str).unwrap_or(tok.text);
        em.push(text, last_of(tok.kind));
        i += 1;
    }
    for comment in chunk.trailer.iter() {
        if !em.out.is_empty() {
            em.out.push('\n');
        }
        em.out.push_str(comment);
    }
    em.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinifyConfig;
    use crate::parse::parse;
    use crate::rename::assign_names;

    fn min(src: &str, config: MinifyConfig) -> String {
        let chunk = parse(src, config.fold_constants).unwrap();
        let names = assign_names(&chunk.scope, &chunk.toks, &config);
        emit(&chunk, &names)
    }

    fn strip(src: &str) -> String {
        min(src, MinifyConfig::whitespace_only())
    }

    #[test]
    fn local_print() {
        assert_eq!(min("local x = 10\nprint(x)\n", MinifyConfig::default()),
                   "local a=10 print(a)");
    }

    #[test]
    fn comments_and_layout_dropped() {
        let src = "-- header\n--[[ block\ncomment ]]\nlocal t = { 1, 2, --[==[x]==] 3 }\n";
        assert_eq!(strip(src), "local t={1,2,3}");
    }

    #[test]
    fn numerals_next_to_words() {
        assert_eq!(strip("if x then return 1 end"), "if x then return 1 end");
        assert_eq!(strip("for i = 1, 10 do end"), "for i=1,10 do end");
        assert_eq!(strip("x = 3. .. y"), "x=3. ..y");
        assert_eq!(strip("x = 1 .. 2"), "x=1 ..2");
        assert_eq!(strip("x = 0x10 and y"), "x=0x10 and y");
    }

    #[test]
    fn operators_that_would_merge() {
        assert_eq!(strip("x = a - -b"), "x=a- -b");
        assert_eq!(strip("x = a .. .5"), "x=a.. .5");
        assert_eq!(strip("x = t[ [[s]] ]"), "x=t[ [[s]]]");
        assert_eq!(strip("x = a - - - b"), "x=a- - -b");
        assert_eq!(strip("local c <const> = 1"), "local c<const> =1");
        assert_eq!(strip("x = a < b or a <= b"), "x=a<b or a<=b");
        assert_eq!(strip("x = a ~= b"), "x=a~=b");
    }

    #[test]
    fn labels_stay_apart() {
        assert_eq!(strip("::a:: ::b:: goto a"), "::a::::b::goto a");
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(strip("print( 'it\\'s' , \"a  b\" , [[x\n  y]] )"),
                   "print('it\\'s',\"a  b\",[[x\n  y]])");
    }

    #[test]
    fn separators() {
        assert_eq!(strip("a = 1; b = 2;"), "a=1 b=2");
        assert_eq!(strip("local f = g;(h)()"), "local f=g;(h)()");
        assert_eq!(strip("local f = g;;(h)()"), "local f=g;(h)()");
        assert_eq!(strip("x = { 1; 2 }"), "x={1;2}");
    }

    #[test]
    fn shebang_kept() {
        assert_eq!(strip("#!/usr/bin/lua\nprint( 1 )\n"), "#!/usr/bin/lua\nprint(1)");
    }

    #[test]
    fn folding() {
        let fold = MinifyConfig { fold_constants: true, ..MinifyConfig::whitespace_only() };
        assert_eq!(min("x = 2 * 3 + 1", fold), "x=7");
        assert_eq!(min("x = 1 - 4 - y", fold), "x=1-4-y");
        assert_eq!(min("x = 100 - 4000 - y", fold), "x=(-3900)-y");
        assert_eq!(min("x = y - (2 * 3)", fold), "x=y-6");
        assert_eq!(min("do return 2 * 3 end", fold), "do return 6 end");
    }

    #[test]
    fn folding_keeps_lua51_values() {
        let fold = MinifyConfig { fold_constants: true, ..MinifyConfig::whitespace_only() };
        assert_eq!(min("x = 1 / -0", fold), "x=1/-0");
        assert_eq!(min("x = 1 / (0 * -1)", fold), "x=1/(0*-1)");
        assert_eq!(min("x = 9007199254740993 - 1", fold), "x=9007199254740993-1");
    }

    #[test]
    fn license_trailer_kept() {
        let src = "print( 1 ) -- done\n--[[\nLICENSE:\nMIT\n]]\n";
        let out = strip(src);
        assert_eq!(out, "print(1)\n--[[\nLICENSE:\nMIT\n]]");
        assert_eq!(strip(&out), out);
        assert_eq!(strip("--[[ a ]] x = 1 --[[ b ]]\n--[=[ c ]=]"), "x=1\n--[[ b ]]\n--[=[ c ]=]");
        assert_eq!(strip("--[[ only ]]"), "--[[ only ]]");
    }

    #[test]
    fn byte_order_mark_dropped() {
        assert_eq!(strip("\u{feff}print( 1 )"), "print(1)");
    }

    #[test]
    fn empty_chunk() {
        assert_eq!(strip(""), "");
        assert_eq!(strip("-- only a comment\n"), "");
    }
}
