//! Expression evaluation over an assignment environment.
//!
//! Evaluation is pure: the result depends only on the expression and the
//! [`Environment`]. Problems found along the way are returned as
//! [`EvalIssue`]s for the caller to attach a location to.

use std::cmp::Ordering;

use super::diagnostics::codes;
use super::expr::{CmpOp, Expr, Literal};
use super::types::{SymbolType, Tristate, Value, parse_hex, parse_number};

/// Symbol lookups an expression needs.
pub trait Environment {
    /// Declared type, `None` for implicit symbols.
    fn symbol_type(&self, name: &str) -> Option<SymbolType>;
    /// Current value, `None` when unknown.
    fn symbol_value(&self, name: &str) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalIssue {
    pub code: &'static str,
    pub message: String,
}

/// A value plus the problems met computing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluated<T> {
    pub value: T,
    pub issues: Vec<EvalIssue>,
}

/// Evaluate an expression in the tristate domain.
pub fn evaluate(expr: &Expr, env: &dyn Environment) -> Evaluated<Tristate> {
    let mut issues = Vec::new();
    let value = tristate(expr, env, &mut issues);
    Evaluated { value, issues }
}

/// Evaluate a `default` or `range` expression for a symbol of type `ty`.
///
/// `None` means the expression has no value in that type.
pub fn evaluate_value(
    expr: &Expr,
    ty: SymbolType,
    env: &dyn Environment,
) -> Evaluated<Option<Value>> {
    let mut issues = Vec::new();
    let value = match ty {
        SymbolType::Bool | SymbolType::Tristate => {
            Some(Value::Tristate(tristate(expr, env, &mut issues)))
        }
        SymbolType::String => Some(Value::String(string_value(expr, env, &mut issues))),
        SymbolType::Int | SymbolType::Hex => {
            let number = numeric_value(expr, ty, env);
            let value = number.and_then(|n| match ty {
                SymbolType::Int => i64::try_from(n).ok().map(Value::Int),
                _ => u64::try_from(n).ok().map(Value::Hex),
            });
            if value.is_none() {
                issues.push(EvalIssue {
                    code: codes::INVALID_VALUE,
                    message: format!("`{expr}` is not a valid {ty} value"),
                });
            }
            value
        }
    };
    Evaluated { value, issues }
}

fn tristate(expr: &Expr, env: &dyn Environment, issues: &mut Vec<EvalIssue>) -> Tristate {
    match expr {
        Expr::Const(t) => *t,
        Expr::Symbol(name) => symbol_tristate(name, env),
        Expr::Literal(Literal::Str(s)) => match s.as_str() {
            "y" => Tristate::Yes,
            "m" => Tristate::Module,
            _ => Tristate::No,
        },
        Expr::Literal(Literal::Number(_)) => Tristate::No,
        Expr::Not(e) => tristate(e, env, issues).not(),
        Expr::And(a, b) => {
            let lhs = tristate(a, env, issues);
            let rhs = tristate(b, env, issues);
            lhs.and(rhs)
        }
        Expr::Or(a, b) => {
            let lhs = tristate(a, env, issues);
            let rhs = tristate(b, env, issues);
            lhs.or(rhs)
        }
        Expr::Compare(op, a, b) => compare(*op, a, b, env, issues),
    }
}

/// Only bool and tristate symbols have a truth value.
fn symbol_tristate(name: &str, env: &dyn Environment) -> Tristate {
    match env.symbol_type(name) {
        Some(SymbolType::Bool | SymbolType::Tristate) => env
            .symbol_value(name)
            .and_then(|v| v.as_tristate())
            .unwrap_or(Tristate::No),
        _ => Tristate::No,
    }
}

// ----------------------------------------------------------------------------
// Comparisons
// ----------------------------------------------------------------------------

/// One side of a comparison.
#[derive(Debug, Clone)]
enum Operand {
    /// A typed symbol's current value.
    Typed(SymbolType, Value),
    /// A number written in the source.
    Number(String),
    /// Quoted text, `y`/`m`/`n`, or an implicit symbol (text `n`).
    Text(String),
}

fn operand(expr: &Expr, env: &dyn Environment, issues: &mut Vec<EvalIssue>) -> Operand {
    match expr {
        Expr::Symbol(name) => match env.symbol_type(name) {
            Some(ty) => Operand::Typed(
                ty,
                env.symbol_value(name).unwrap_or_else(|| Value::zero(ty)),
            ),
            None => Operand::Text("n".to_string()),
        },
        Expr::Literal(Literal::Number(n)) => Operand::Number(n.to_string()),
        Expr::Literal(Literal::Str(s)) => Operand::Text(s.to_string()),
        Expr::Const(t) => Operand::Text(t.as_str().to_string()),
        other => Operand::Text(tristate(other, env, issues).as_str().to_string()),
    }
}

enum Key {
    Rank(Tristate),
    Number(i128),
    Text(String),
}

impl Key {
    fn cmp(&self, other: &Key) -> Option<Ordering> {
        match (self, other) {
            (Key::Rank(a), Key::Rank(b)) => Some(a.cmp(b)),
            (Key::Number(a), Key::Number(b)) => Some(a.cmp(b)),
            (Key::Text(a), Key::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn literal_text(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Number(s) | Operand::Text(s) => Some(s),
        Operand::Typed(..) => None,
    }
}

/// Coerce a literal into a typed symbol's domain.
fn coerce(ty: SymbolType, literal: &Operand) -> Option<Key> {
    let text = literal_text(literal)?;
    match ty {
        SymbolType::Bool | SymbolType::Tristate => match literal {
            Operand::Text(_) => tristate_text(text).map(Key::Rank),
            _ => None,
        },
        SymbolType::Int => parse_number(text).map(Key::Number),
        SymbolType::Hex => parse_number(text)
            .or_else(|| parse_hex(text.trim()).map(i128::from))
            .map(Key::Number),
        SymbolType::String => match literal {
            Operand::Text(_) => Some(Key::Text(text.to_string())),
            _ => None,
        },
    }
}

fn tristate_text(text: &str) -> Option<Tristate> {
    match text {
        "y" => Some(Tristate::Yes),
        "m" => Some(Tristate::Module),
        "n" => Some(Tristate::No),
        _ => None,
    }
}

fn typed_key(ty: SymbolType, value: &Value) -> Key {
    match ty {
        SymbolType::Bool | SymbolType::Tristate => {
            Key::Rank(value.as_tristate().unwrap_or(Tristate::No))
        }
        SymbolType::Int | SymbolType::Hex => Key::Number(value.as_number().unwrap_or(0)),
        SymbolType::String => Key::Text(value.to_string()),
    }
}

fn same_domain(a: SymbolType, b: SymbolType) -> bool {
    (a.is_boolean() && b.is_boolean())
        || (a.is_numeric() && b.is_numeric())
        || (a == SymbolType::String && b == SymbolType::String)
}

fn keys(lhs: &Operand, rhs: &Operand) -> Option<(Key, Key)> {
    match (lhs, rhs) {
        (Operand::Typed(a, va), Operand::Typed(b, vb)) => {
            same_domain(*a, *b).then(|| (typed_key(*a, va), typed_key(*b, vb)))
        }
        (Operand::Typed(ty, value), literal) => {
            Some((typed_key(*ty, value), coerce(*ty, literal)?))
        }
        (literal, Operand::Typed(ty, value)) => {
            Some((coerce(*ty, literal)?, typed_key(*ty, value)))
        }
        (a, b) => {
            let (ta, tb) = (literal_text(a)?, literal_text(b)?);
            match (numeric_literal(a), numeric_literal(b)) {
                (Some(x), Some(y)) => Some((Key::Number(x), Key::Number(y))),
                _ => Some((Key::Text(ta.to_string()), Key::Text(tb.to_string()))),
            }
        }
    }
}

fn numeric_literal(operand: &Operand) -> Option<i128> {
    match operand {
        Operand::Number(s) => parse_number(s),
        Operand::Text(s) => parse_number(s),
        Operand::Typed(..) => None,
    }
}

fn describe(operand: &Operand) -> String {
    match operand {
        Operand::Typed(ty, value) => format!("{ty} `{value}`"),
        Operand::Number(n) => format!("number `{n}`"),
        Operand::Text(s) => format!("`{s}`"),
    }
}

fn compare(
    op: CmpOp,
    a: &Expr,
    b: &Expr,
    env: &dyn Environment,
    issues: &mut Vec<EvalIssue>,
) -> Tristate {
    let lhs = operand(a, env, issues);
    let rhs = operand(b, env, issues);
    let ordering = keys(&lhs, &rhs).and_then(|(x, y)| x.cmp(&y));
    match ordering {
        Some(ordering) if op.holds(ordering) => Tristate::Yes,
        Some(_) => Tristate::No,
        None => {
            issues.push(EvalIssue {
                code: codes::COMPARISON_MISMATCH,
                message: format!(
                    "cannot compare {} with {} in `{a} {} {b}`",
                    describe(&lhs),
                    describe(&rhs),
                    op.as_str()
                ),
            });
            Tristate::No
        }
    }
}

// ----------------------------------------------------------------------------
// Typed values
// ----------------------------------------------------------------------------

fn string_value(expr: &Expr, env: &dyn Environment, issues: &mut Vec<EvalIssue>) -> String {
    match expr {
        Expr::Literal(Literal::Str(s)) | Expr::Literal(Literal::Number(s)) => s.to_string(),
        Expr::Const(t) => t.as_str().to_string(),
        Expr::Symbol(name) => match env.symbol_type(name) {
            Some(ty) => env
                .symbol_value(name)
                .unwrap_or_else(|| Value::zero(ty))
                .to_string(),
            None => "n".to_string(),
        },
        other => tristate(other, env, issues).as_str().to_string(),
    }
}

fn numeric_value(expr: &Expr, ty: SymbolType, env: &dyn Environment) -> Option<i128> {
    let from_text = |text: &str| match ty {
        SymbolType::Hex => parse_number(text).or_else(|| parse_hex(text.trim()).map(i128::from)),
        _ => parse_number(text),
    };
    match expr {
        Expr::Literal(Literal::Number(n)) => from_text(n),
        Expr::Literal(Literal::Str(s)) => from_text(s),
        Expr::Symbol(name) => match env.symbol_type(name)? {
            SymbolType::Int | SymbolType::Hex => Some(
                env.symbol_value(name)
                    .and_then(|v| v.as_number())
                    .unwrap_or(0),
            ),
            SymbolType::String => from_text(&env.symbol_value(name)?.to_string()),
            _ => None,
        },
        _ => None,
    }
}
