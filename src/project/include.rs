//! Resolution of `source` directive paths.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use super::config::ProjectConfig;

/// A `source` path after variable expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPath {
    pub path: String,
    /// Variables referenced by the path that have no value.
    pub undefined: Vec<String>,
}

/// Expand `$(VAR)`, `${VAR}` and `$VAR` references.
///
/// Undefined variables expand to the empty string and are reported.
pub fn expand_variables(raw: &str, env: &IndexMap<String, String>) -> ExpandedPath {
    let mut path = String::with_capacity(raw.len());
    let mut undefined = Vec::new();
    let mut rest = raw;

    while let Some(idx) = rest.find('$') {
        path.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let (name, consumed) = match after.chars().next() {
            Some(open @ ('(' | '{')) => {
                let close = if open == '(' { ')' } else { '}' };
                match after.find(close) {
                    Some(end) => (&after[1..end], end + 1),
                    None => ("", 0),
                }
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
            _ => ("", 0),
        };

        if name.is_empty() {
            path.push('$');
            rest = after;
            continue;
        }
        match env.get(name) {
            Some(value) => path.push_str(value),
            None => {
                if !undefined.iter().any(|u| u == name) {
                    undefined.push(name.to_string());
                }
            }
        }
        rest = &after[consumed..];
    }
    path.push_str(rest);

    ExpandedPath { path, undefined }
}

/// Lexically normalize a path: drop `.` components and fold `..`.
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Turns `source` arguments into candidate file paths.
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    search_roots: Vec<PathBuf>,
    env: IndexMap<String, String>,
}

impl IncludeResolver {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            search_roots: config.search_roots.clone(),
            env: config.env.clone(),
        }
    }

    pub fn expand(&self, raw: &str) -> ExpandedPath {
        expand_variables(raw, &self.env)
    }

    /// Candidate paths for an include, in lookup order.
    ///
    /// `including` is the file containing the directive. Relative includes
    /// only look next to it; plain includes fall back to the search roots.
    pub fn candidates(&self, including: &Path, path: &str, relative: bool) -> Vec<PathBuf> {
        let target = Path::new(path);
        if target.is_absolute() {
            return vec![normalize_path(target)];
        }

        let base = including.parent().unwrap_or_else(|| Path::new(""));
        let mut candidates = vec![normalize_path(&base.join(target))];
        if !relative {
            for root in &self.search_roots {
                let candidate = normalize_path(&root.join(target));
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn env() -> IndexMap<String, String> {
        let mut env = IndexMap::new();
        env.insert("ARCH".to_string(), "arm".to_string());
        env.insert("SRCARCH".to_string(), "arm64".to_string());
        env
    }

    #[rstest]
    #[case("arch/$(ARCH)/Kconfig", "arch/arm/Kconfig")]
    #[case("arch/${SRCARCH}/Kconfig", "arch/arm64/Kconfig")]
    #[case("arch/$ARCH/Kconfig", "arch/arm/Kconfig")]
    #[case("cost/$5", "cost/$5")]
    #[case("plain/Kconfig", "plain/Kconfig")]
    fn test_expand_variables(#[case] raw: &str, #[case] expected: &str) {
        let expanded = expand_variables(raw, &env());
        assert_eq!(expanded.path, expected);
        assert!(expanded.undefined.is_empty());
    }

    #[test]
    fn test_undefined_variable_is_reported_once() {
        let expanded = expand_variables("$(BOARD)/$(BOARD)/Kconfig", &env());
        assert_eq!(expanded.path, "//Kconfig");
        assert_eq!(expanded.undefined, vec!["BOARD".to_string()]);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./Kconfig")),
            PathBuf::from("/a/c/Kconfig")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_candidates_fall_back_to_search_roots() {
        let config = ProjectConfig::default().with_search_root("/zephyr");
        let resolver = IncludeResolver::new(&config);
        let including = Path::new("/app/Kconfig");

        assert_eq!(
            resolver.candidates(including, "drivers/Kconfig", false),
            vec![
                PathBuf::from("/app/drivers/Kconfig"),
                PathBuf::from("/zephyr/drivers/Kconfig")
            ]
        );
        assert_eq!(
            resolver.candidates(including, "drivers/Kconfig", true),
            vec![PathBuf::from("/app/drivers/Kconfig")]
        );
    }
}
