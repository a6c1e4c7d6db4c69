//! Constant Folding

use std::fmt;

use crate::tokit::is_hex_prefixed;

/// Integers beyond this magnitude are not folded, a Lua 5.1 build would
/// round them to a different double than a 5.3 build keeps as an integer.
const MAX_EXACT_INT: i64 = 1 << 53;

/// A numeric constant with Lua's integer/float subtypes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl ArithOp {
    pub fn from_op(text: &str) -> Option<ArithOp> {
        Some(match text {
            "+" => ArithOp::Add,
            "-" => ArithOp::Sub,
            "*" => ArithOp::Mul,
            "/" => ArithOp::Div,
            "//" => ArithOp::IDiv,
            "%" => ArithOp::Mod,
            "^" => ArithOp::Pow,
            _ => return None,
        })
    }
}

/// Value of a numeral token, `None` where folding it would not be exact.
/// Integer literals past 2^53 are left alone, Lua 5.1 rounds them on load.
pub fn parse_number(text: &str) -> Option<Num> {
    if is_hex_prefixed(text) {
        let digits = &text[2..];
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return i64::from_str_radix(digits, 16).ok().and_then(exact);
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return match text.parse::<i64>() {
            Ok(x) => exact(x),
            Err(_) => text.parse::<f64>().ok().map(Num::Float),
        };
    }
    text.parse::<f64>().ok().filter(|x| x.is_finite()).map(Num::Float)
}

fn exact(x: i64) -> Option<Num> {
    (-MAX_EXACT_INT..=MAX_EXACT_INT).contains(&x).then_some(Num::Int(x))
}

fn finite(x: f64) -> Option<Num> {
    x.is_finite().then_some(Num::Float(x))
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(x) => x as f64,
            Num::Float(x) => x,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            Num::Int(x) => x < 0,
            Num::Float(x) => x.is_sign_negative(),
        }
    }

    /// Negation, except of integer zero: Lua 5.1 has no integers and
    /// gives `-0`, which 5.3 would print back as `0`.
    pub fn neg(self) -> Option<Num> {
        match self {
            Num::Int(0) => None,
            Num::Int(x) => x.checked_neg().and_then(exact),
            Num::Float(x) => finite(-x),
        }
    }

    /// Apply `op` with Lua 5.3 semantics, `None` when the result should be
    /// left for the interpreter to compute.
    pub fn arith(self, op: ArithOp, rhs: Num) -> Option<Num> {
        use ArithOp::*;
        match (op, self, rhs) {
            (Add, Num::Int(a), Num::Int(b)) => a.checked_add(b).and_then(exact),
            (Sub, Num::Int(a), Num::Int(b)) => a.checked_sub(b).and_then(exact),
            // `-1 * 0` is `-0` under Lua 5.1
            (Mul, Num::Int(a), Num::Int(b)) if a.checked_mul(b) == Some(0) && (a < 0 || b < 0) => None,
            (Mul, Num::Int(a), Num::Int(b)) => a.checked_mul(b).and_then(exact),
            (IDiv, Num::Int(a), Num::Int(b)) => {
                let q = a.checked_div(b)?;
                let q = if (a % b != 0) && ((a < 0) != (b < 0)) { q - 1 } else { q };
                exact(q)
            }
            (Mod, Num::Int(a), Num::Int(b)) => {
                let r = a.checked_rem(b)?;
                let r = if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r };
                exact(r)
            }
            (Add, a, b) => finite(a.as_f64() + b.as_f64()),
            (Sub, a, b) => finite(a.as_f64() - b.as_f64()),
            (Mul, a, b) => finite(a.as_f64() * b.as_f64()),
            (Div, a, b) => finite(a.as_f64() / b.as_f64()),
            (Pow, a, b) => finite(a.as_f64().powf(b.as_f64())),
            (IDiv, a, b) => finite((a.as_f64() / b.as_f64()).floor()),
            (Mod, a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                let m = a % b;
                finite(if m != 0.0 && (m < 0.0) != (b < 0.0) { m + b } else { m })
            }
        }
    }
}

/// Prints a numeral Lua reads back as the same value and subtype.
impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(x) => write!(f, "{x}"),
            Num::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Text replacing a folded expression; negative results are parenthesised
/// so that they stay a single operand wherever they land.
pub fn fold_text(num: Num) -> String {
    if num.is_negative() {
        format!("({num})")
    } else {
        num.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ArithOp::*;

    fn int(x: i64) -> Num { Num::Int(x) }
    fn flt(x: f64) -> Num { Num::Float(x) }

    #[test]
    fn parse_literals() {
        assert_eq!(parse_number("10"), Some(int(10)));
        assert_eq!(parse_number("0x1F"), Some(int(31)));
        assert_eq!(parse_number("1.5"), Some(flt(1.5)));
        assert_eq!(parse_number(".5"), Some(flt(0.5)));
        assert_eq!(parse_number("3."), Some(flt(3.0)));
        assert_eq!(parse_number("1e3"), Some(flt(1000.0)));
        assert_eq!(parse_number("99999999999999999999"), Some(flt(1e20)));
        assert_eq!(parse_number("0x1p4"), None);
        assert_eq!(parse_number("0xFFFFFFFFFFFFFFFF"), None);
    }

    #[test]
    fn literals_past_exact_range() {
        assert_eq!(parse_number("9007199254740992"), Some(int(MAX_EXACT_INT)));
        assert_eq!(parse_number("9007199254740993"), None);
        assert_eq!(parse_number("0x20000000000001"), None);
        assert_eq!(parse_number("9007199254740993.0"), Some(flt(9007199254740992.0)));
    }

    #[test]
    fn negative_zero_not_folded() {
        assert_eq!(int(0).neg(), None);
        assert_eq!(flt(0.0).neg(), Some(flt(-0.0)));
        assert_eq!(int(-1).arith(Mul, int(0)), None);
        assert_eq!(int(0).arith(Mul, int(-5)), None);
        assert_eq!(int(0).arith(Mul, int(5)), Some(int(0)));
        assert_eq!(int(3).arith(Sub, int(3)), Some(int(0)));
    }

    #[test]
    fn integer_arith() {
        assert_eq!(int(1).arith(Add, int(2)), Some(int(3)));
        assert_eq!(int(2).arith(Sub, int(5)), Some(int(-3)));
        assert_eq!(int(6).arith(Mul, int(7)), Some(int(42)));
        assert_eq!(int(7).arith(IDiv, int(2)), Some(int(3)));
        assert_eq!(int(-7).arith(IDiv, int(2)), Some(int(-4)));
        assert_eq!(int(-7).arith(Mod, int(3)), Some(int(2)));
        assert_eq!(int(7).arith(Mod, int(-3)), Some(int(-2)));
        assert_eq!(int(1).arith(IDiv, int(0)), None);
        assert_eq!(int(1).arith(Mod, int(0)), None);
        assert_eq!(int(MAX_EXACT_INT).arith(Add, int(1)), None);
    }

    #[test]
    fn float_arith() {
        assert_eq!(int(3).arith(Div, int(2)), Some(flt(1.5)));
        assert_eq!(int(4).arith(Div, int(2)), Some(flt(2.0)));
        assert_eq!(int(2).arith(Pow, int(10)), Some(flt(1024.0)));
        assert_eq!(flt(0.5).arith(Add, int(1)), Some(flt(1.5)));
        assert_eq!(flt(-7.5).arith(Mod, int(2)), Some(flt(0.5)));
        assert_eq!(flt(7.5).arith(IDiv, int(2)), Some(flt(3.0)));
        assert_eq!(int(1).arith(Div, int(0)), None);
    }

    #[test]
    fn printing() {
        assert_eq!(fold_text(int(3)), "3");
        assert_eq!(fold_text(int(-3)), "(-3)");
        assert_eq!(fold_text(flt(2.0)), "2.0");
        assert_eq!(fold_text(flt(0.25)), "0.25");
        assert_eq!(fold_text(flt(-0.5)), "(-0.5)");
        assert_eq!(int(5).neg(), Some(int(-5)));
    }
}
