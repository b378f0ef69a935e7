//! Value domains: the tristate lattice, symbol types, and typed values.

use std::fmt;

/// Three-valued logic `n < m < y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tristate {
    #[default]
    No,
    Module,
    Yes,
}

impl Tristate {
    /// `&&` is the lattice meet.
    pub fn and(self, other: Tristate) -> Tristate {
        self.min(other)
    }

    /// `||` is the lattice join.
    pub fn or(self, other: Tristate) -> Tristate {
        self.max(other)
    }

    /// `!x` is `y - x`, so `!m = m`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Tristate {
        match self {
            Tristate::No => Tristate::Yes,
            Tristate::Module => Tristate::Module,
            Tristate::Yes => Tristate::No,
        }
    }

    pub fn is_on(self) -> bool {
        self != Tristate::No
    }

    pub fn parse(text: &str) -> Option<Tristate> {
        match text {
            "n" | "N" => Some(Tristate::No),
            "m" | "M" => Some(Tristate::Module),
            "y" | "Y" => Some(Tristate::Yes),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tristate::No => "n",
            Tristate::Module => "m",
            Tristate::Yes => "y",
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Bool,
    Tristate,
    String,
    Int,
    Hex,
}

impl SymbolType {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolType::Bool => "bool",
            SymbolType::Tristate => "tristate",
            SymbolType::String => "string",
            SymbolType::Int => "int",
            SymbolType::Hex => "hex",
        }
    }

    /// bool or tristate.
    pub fn is_boolean(self) -> bool {
        matches!(self, SymbolType::Bool | SymbolType::Tristate)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SymbolType::Int | SymbolType::Hex)
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed symbol value. Bool symbols use `Tristate` restricted to n/y.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Tristate(Tristate),
    String(String),
    Int(i64),
    Hex(u64),
}

impl Value {
    /// The value a symbol of this type has when nothing sets it.
    pub fn zero(ty: SymbolType) -> Value {
        match ty {
            SymbolType::Bool | SymbolType::Tristate => Value::Tristate(Tristate::No),
            SymbolType::String => Value::String(String::new()),
            SymbolType::Int => Value::Int(0),
            SymbolType::Hex => Value::Hex(0),
        }
    }

    /// Parse user-facing text for a type.
    ///
    /// Bool accepts `y|n`, tristate `y|m|n`, int a decimal, hex digits with
    /// or without `0x`. Any text is a valid string.
    pub fn parse(ty: SymbolType, raw: &str) -> Option<Value> {
        if ty == SymbolType::String {
            return Some(Value::String(raw.to_string()));
        }
        let raw = raw.trim();
        match ty {
            SymbolType::Bool => match Tristate::parse(raw)? {
                Tristate::Module => None,
                t => Some(Value::Tristate(t)),
            },
            SymbolType::Tristate => Tristate::parse(raw).map(Value::Tristate),
            SymbolType::String => None,
            SymbolType::Int => raw.parse::<i64>().ok().map(Value::Int),
            SymbolType::Hex => parse_hex(raw).map(Value::Hex),
        }
    }

    pub fn as_tristate(&self) -> Option<Tristate> {
        match self {
            Value::Tristate(t) => Some(*t),
            _ => None,
        }
    }

    /// Value as a signed number if it is numeric.
    pub fn as_number(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(*v as i128),
            Value::Hex(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Whether this value belongs to the domain of `ty`.
    pub fn fits(&self, ty: SymbolType) -> bool {
        match (self, ty) {
            (Value::Tristate(Tristate::Module), SymbolType::Bool) => false,
            (Value::Tristate(_), SymbolType::Bool | SymbolType::Tristate) => true,
            (Value::String(_), SymbolType::String) => true,
            (Value::Int(_), SymbolType::Int) => true,
            (Value::Hex(_), SymbolType::Hex) => true,
            _ => false,
        }
    }

    /// The value as it is written in `.config` files: strings are quoted.
    pub fn to_config_string(&self) -> String {
        match self {
            Value::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
            other => other.to_string(),
        }
    }
}

/// Unquoted text form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Tristate(t) => write!(f, "{t}"),
            Value::String(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Hex(v) => write!(f, "0x{v:x}"),
        }
    }
}

/// Parse hex digits with an optional `0x`/`0X` prefix.
pub fn parse_hex(raw: &str) -> Option<u64> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Parse a numeric literal: decimal, negative decimal, or `0x` hex.
pub fn parse_number(raw: &str) -> Option<i128> {
    let raw = raw.trim();
    if raw.starts_with("0x") || raw.starts_with("0X") {
        return parse_hex(raw).map(i128::from);
    }
    raw.parse::<i64>().ok().map(i128::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Tristate::No, Tristate::Yes, Tristate::No, Tristate::Yes)]
    #[case(Tristate::Module, Tristate::Yes, Tristate::Module, Tristate::Yes)]
    #[case(Tristate::Module, Tristate::No, Tristate::No, Tristate::Module)]
    #[case(Tristate::Yes, Tristate::Yes, Tristate::Yes, Tristate::Yes)]
    fn test_lattice(
        #[case] a: Tristate,
        #[case] b: Tristate,
        #[case] and: Tristate,
        #[case] or: Tristate,
    ) {
        assert_eq!(a.and(b), and);
        assert_eq!(a.or(b), or);
        assert_eq!(b.and(a), and);
        assert_eq!(b.or(a), or);
    }

    #[test]
    fn test_not() {
        assert_eq!(Tristate::No.not(), Tristate::Yes);
        assert_eq!(Tristate::Module.not(), Tristate::Module);
        assert_eq!(Tristate::Yes.not(), Tristate::No);
    }

    #[rstest]
    #[case(SymbolType::Bool, "y", Some(Value::Tristate(Tristate::Yes)))]
    #[case(SymbolType::Bool, "m", None)]
    #[case(SymbolType::Tristate, "m", Some(Value::Tristate(Tristate::Module)))]
    #[case(SymbolType::Int, "-42", Some(Value::Int(-42)))]
    #[case(SymbolType::Int, "0x10", None)]
    #[case(SymbolType::Hex, "0x1F", Some(Value::Hex(0x1f)))]
    #[case(SymbolType::Hex, "ff", Some(Value::Hex(0xff)))]
    #[case(SymbolType::Hex, "0x", None)]
    #[case(SymbolType::String, "any text", Some(Value::String("any text".into())))]
    fn test_value_parse(
        #[case] ty: SymbolType,
        #[case] raw: &str,
        #[case] expected: Option<Value>,
    ) {
        assert_eq!(Value::parse(ty, raw), expected);
    }

    #[test]
    fn test_config_string_escapes() {
        let value = Value::String(r#"say "hi" \o/"#.to_string());
        assert_eq!(value.to_config_string(), r#""say \"hi\" \\o/""#);
        assert_eq!(Value::Hex(255).to_config_string(), "0xff");
        assert_eq!(Value::zero(SymbolType::Hex).to_string(), "0x0");
    }
}
