//! The flat `.config` format: `CONFIG_NAME=value`, one per line.

use std::fmt::Write as _;

use smol_str::SmolStr;

use super::ConfigModel;
use crate::base::{FileId, FileRange, TextRange, TextSize};
use crate::hir::{Diagnostic, codes};
use crate::parser::unquote;

/// Render every typed, active symbol with a known value.
pub fn export_config(model: &ConfigModel, prefix: &str, title: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("#\n# Automatically generated file; DO NOT EDIT.\n");
    if let Some(title) = title {
        let _ = writeln!(out, "# {title}");
    }
    out.push_str("#\n");
    for entry in model.iter() {
        if entry.ty.is_none() || !entry.active {
            continue;
        }
        if let Some(value) = &entry.value {
            let _ = writeln!(out, "{prefix}{}={}", entry.name, value.to_config_string());
        }
    }
    out
}

/// One assignment read from a `.config` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    pub name: SmolStr,
    /// Raw value text, strings already unquoted.
    pub value: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub lines: Vec<ConfigLine>,
    /// `W0007` for lines that are not assignments.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `.config` text. The prefix is stripped when present.
pub fn parse_config(file: FileId, text: &str, prefix: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }
        let range = TextRange::at(
            TextSize::new(start as u32),
            TextSize::new(content.len() as u32),
        );

        if let Some(comment) = trimmed.strip_prefix('#') {
            if let Some(name) = comment
                .trim()
                .strip_suffix(" is not set")
                .map(|n| strip_prefix(n.trim(), prefix))
                .filter(|n| is_symbol_name(n))
            {
                parsed.lines.push(ConfigLine {
                    name: name.into(),
                    value: "n".to_string(),
                    range,
                });
            }
            continue;
        }

        match parse_assignment(trimmed, prefix) {
            Some((name, value)) => parsed.lines.push(ConfigLine {
                name: name.into(),
                value,
                range,
            }),
            None => parsed.diagnostics.push(Diagnostic::warning(
                FileRange::new(file, range),
                codes::INVALID_CONFIG_LINE,
                format!("cannot understand configuration line `{trimmed}`"),
            )),
        }
    }
    parsed
}

fn parse_assignment<'a>(line: &'a str, prefix: &str) -> Option<(&'a str, String)> {
    let (name, value) = line.split_once('=')?;
    let name = strip_prefix(name.trim(), prefix);
    if !is_symbol_name(name) {
        return None;
    }
    let value = value.trim();
    let value = if value.starts_with('"') {
        if !is_terminated(value) {
            return None;
        }
        unquote(value)
    } else {
        value.to_string()
    };
    Some((name, value))
}

/// The opening quote is closed by the last character.
fn is_terminated(quoted: &str) -> bool {
    let mut escaped = false;
    let mut closed_at = None;
    for (i, c) in quoted.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                closed_at = Some(i);
                break;
            }
            _ => {}
        }
    }
    closed_at == Some(quoted.len() - 1)
}

fn strip_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return name;
    }
    name.strip_prefix(prefix).unwrap_or(name)
}

fn is_symbol_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::new(7)
    }

    #[test]
    fn test_parse_assignments_and_not_set() {
        let text =
            "# header\nCONFIG_A=y\n\n# CONFIG_B is not set\nC=\"x \\\"q\\\"\"\nCONFIG_N=0x10\n";
        let parsed = parse_config(file(), text, "CONFIG_");
        let pairs: Vec<_> = parsed
            .lines
            .iter()
            .map(|l| (l.name.as_str(), l.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("A", "y"), ("B", "n"), ("C", "x \"q\""), ("N", "0x10")]
        );
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_lines_are_reported() {
        let parsed = parse_config(file(), "CONFIG_A=y\nthis is junk\nCONFIG_S=\"open\n", "CONFIG_");
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed
            .diagnostics
            .iter()
            .all(|d| d.code == codes::INVALID_CONFIG_LINE && d.file == file()));
        assert_eq!(parsed.diagnostics[0].range.start(), TextSize::new(11));
    }
}
