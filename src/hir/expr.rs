//! Lowered expressions.
//!
//! HIR expressions drop trivia and syntax nodes; they render back to
//! Kconfig syntax through `Display`, which is also what semantic
//! fingerprints hash.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smol_str::SmolStr;

use super::types::Tristate;
use crate::parser::{self, SyntaxKind, unquote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    fn from_kind(kind: SyntaxKind) -> Option<CmpOp> {
        Some(match kind {
            SyntaxKind::EQ => CmpOp::Eq,
            SyntaxKind::BANG_EQ => CmpOp::NotEq,
            SyntaxKind::LT => CmpOp::Lt,
            SyntaxKind::LT_EQ => CmpOp::LtEq,
            SyntaxKind::GT => CmpOp::Gt,
            SyntaxKind::GT_EQ => CmpOp::GtEq,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }

    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Eq => ordering == Equal,
            CmpOp::NotEq => ordering != Equal,
            CmpOp::Lt => ordering == Less,
            CmpOp::LtEq => ordering != Greater,
            CmpOp::Gt => ordering == Greater,
            CmpOp::GtEq => ordering != Less,
        }
    }
}

/// A constant that is not a tristate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Quoted string (already unescaped), or unexpanded `$(...)` macro.
    Str(SmolStr),
    /// Number as written: `42`, `-1`, `0x1f`.
    Number(SmolStr),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(Tristate),
    Literal(Literal),
    Symbol(SmolStr),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn yes() -> Expr {
        Expr::Const(Tristate::Yes)
    }

    pub fn symbol(name: impl Into<SmolStr>) -> Expr {
        Expr::Symbol(name.into())
    }

    /// `self && other`, dropping `y` operands.
    pub fn and(self, other: Expr) -> Expr {
        match (self, other) {
            (Expr::Const(Tristate::Yes), e) | (e, Expr::Const(Tristate::Yes)) => e,
            (a, b) => Expr::And(Box::new(a), Box::new(b)),
        }
    }

    /// `self || other`, dropping `n` operands.
    pub fn or(self, other: Expr) -> Expr {
        match (self, other) {
            (Expr::Const(Tristate::No), e) | (e, Expr::Const(Tristate::No)) => e,
            (a, b) => Expr::Or(Box::new(a), Box::new(b)),
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Expr::Const(Tristate::Yes))
    }

    /// Names of all symbols referenced, in order of appearance.
    pub fn symbols(&self) -> Vec<SmolStr> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut Vec<SmolStr>) {
        match self {
            Expr::Const(_) | Expr::Literal(_) => {}
            Expr::Symbol(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Not(e) => e.collect_symbols(out),
            Expr::And(a, b) | Expr::Or(a, b) | Expr::Compare(_, a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    /// Lower a syntax expression. Missing operands become `n`.
    pub fn lower(expr: &parser::Expr) -> Expr {
        let missing = || Expr::Const(Tristate::No);
        let lower_opt =
            |e: Option<parser::Expr>| e.map(|e| Expr::lower(&e)).unwrap_or_else(missing);
        match expr {
            parser::Expr::Or(bin) => Expr::Or(
                Box::new(lower_opt(bin.lhs())),
                Box::new(lower_opt(bin.rhs())),
            ),
            parser::Expr::And(bin) => Expr::And(
                Box::new(lower_opt(bin.lhs())),
                Box::new(lower_opt(bin.rhs())),
            ),
            parser::Expr::Not(not) => Expr::Not(Box::new(lower_opt(not.operand()))),
            parser::Expr::Compare(cmp) => {
                let op = cmp.op().and_then(CmpOp::from_kind).unwrap_or(CmpOp::Eq);
                Expr::Compare(
                    op,
                    Box::new(lower_opt(cmp.lhs())),
                    Box::new(lower_opt(cmp.rhs())),
                )
            }
            parser::Expr::Paren(paren) => lower_opt(paren.inner()),
            parser::Expr::Symbol(sym) => {
                let name = sym.name();
                match name.as_str() {
                    "y" => Expr::Const(Tristate::Yes),
                    "m" => Expr::Const(Tristate::Module),
                    "n" => Expr::Const(Tristate::No),
                    _ => Expr::Symbol(name.into()),
                }
            }
            parser::Expr::Literal(lit) => match lit.token() {
                Some(token) => match token.kind() {
                    SyntaxKind::INT_NUMBER | SyntaxKind::HEX_NUMBER => {
                        Expr::Literal(Literal::Number(token.text().into()))
                    }
                    SyntaxKind::STRING => Expr::Literal(Literal::Str(unquote(token.text()).into())),
                    _ => Expr::Literal(Literal::Str(token.text().into())),
                },
                None => missing(),
            },
        }
    }

    /// Hash of the rendered expression: equal for semantically equal text
    /// regardless of formatting.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.to_string().hash(&mut hasher);
        hasher.finish()
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) => 3,
            Expr::Compare(..) => 4,
            _ => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(t) => write!(f, "{t}"),
            Expr::Literal(Literal::Number(n)) => f.write_str(n),
            Expr::Literal(Literal::Str(s)) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Expr::Symbol(name) => f.write_str(name),
            Expr::Not(e) => {
                f.write_str("!")?;
                e.fmt_operand(f, 3)
            }
            Expr::And(a, b) => {
                a.fmt_operand(f, 2)?;
                f.write_str(" && ")?;
                b.fmt_operand(f, 3)
            }
            Expr::Or(a, b) => {
                a.fmt_operand(f, 1)?;
                f.write_str(" || ")?;
                b.fmt_operand(f, 2)
            }
            Expr::Compare(op, a, b) => {
                a.fmt_operand(f, 5)?;
                write!(f, " {} ", op.as_str())?;
                b.fmt_operand(f, 5)
            }
        }
    }
}
