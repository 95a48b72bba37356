// src/naming.rs

//! Private ↔ upstream formula naming
//!
//! Private formulae live under a namespace prefix (`gov-abseil`) and may
//! carry an `@` suffix. Upstream publishes separate formulae for pinned
//! major or major.minor versions (`python@3.12`), so a numeric suffix of
//! that shape is part of the upstream name. Any other suffix is private
//! fork metadata and is dropped before lookup.

use crate::config::{Config, NameOverrideTable};

/// Maps private formula names to upstream names and class identifiers
#[derive(Debug, Clone)]
pub struct NameResolver {
    prefix: String,
    class_prefix: String,
    overrides: NameOverrideTable,
}

impl NameResolver {
    pub fn new(
        prefix: impl Into<String>,
        class_prefix: impl Into<String>,
        overrides: NameOverrideTable,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            class_prefix: class_prefix.into(),
            overrides,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.private_prefix.clone(),
            config.class_prefix.clone(),
            config.overrides.clone(),
        )
    }

    /// Strip the private namespace prefix, if present
    pub fn strip_prefix<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.prefix.as_str()).unwrap_or(name)
    }

    /// Upstream formula name for a private formula name
    ///
    /// - "gov-foo" → "foo"
    /// - "gov-foo@2" → "foo@2"
    /// - "gov-foo@1.2" → "foo@1.2"
    /// - "gov-foo@1.2.3" → "foo"
    /// - "gov-foo@bananas" → "foo"
    ///
    /// An override entry wins regardless of suffix shape.
    pub fn resolve(&self, private_name: &str) -> String {
        if let Some(upstream) = self.overrides.get(private_name) {
            return upstream.clone();
        }

        let name = self.strip_prefix(private_name);
        match name.rsplit_once('@') {
            Some((base, suffix)) => {
                if is_major_or_major_minor(suffix) {
                    name.to_string()
                } else {
                    base.to_string()
                }
            }
            None => name.to_string(),
        }
    }

    /// Class identifier for a private formula name
    ///
    /// "gov-abseil" → "GovAbseil", "gov-git-filter-repo" → "GovGitFilterRepo".
    /// Inside a segment `@` becomes `AT`, `.` is dropped and `+` becomes `x`,
    /// so "gov-foo@1.2" → "GovFooAT12".
    pub fn class_name(&self, private_name: &str) -> String {
        let mut out = self.class_prefix.clone();

        for part in self.strip_prefix(private_name).split('-') {
            let mut chars = part.chars();
            let Some(first) = chars.next() else {
                continue;
            };
            out.extend(first.to_uppercase());
            for c in chars {
                match c {
                    '@' => out.push_str("AT"),
                    '.' => {}
                    '+' => out.push('x'),
                    other => out.push(other),
                }
            }
        }

        out
    }
}

fn is_major_or_major_minor(suffix: &str) -> bool {
    let parts: Vec<&str> = suffix.split('.').collect();
    matches!(parts.len(), 1 | 2) && parts.iter().all(|p| all_digits(p))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> NameResolver {
        NameResolver::from_config(&Config::default())
    }

    #[test]
    fn test_resolve_strips_prefix() {
        assert_eq!(resolver().resolve("gov-foo"), "foo");
        assert_eq!(resolver().resolve("gov-abseil"), "abseil");
    }

    #[test]
    fn test_resolve_keeps_numeric_pin() {
        assert_eq!(resolver().resolve("gov-foo@2"), "foo@2");
        assert_eq!(resolver().resolve("gov-python@3.12"), "python@3.12");
    }

    #[test]
    fn test_resolve_drops_other_suffixes() {
        assert_eq!(resolver().resolve("gov-foo@bananas"), "foo");
        assert_eq!(resolver().resolve("gov-llvm@13.0.4"), "llvm");
        assert_eq!(resolver().resolve("gov-foo@"), "foo");
        assert_eq!(resolver().resolve("gov-foo@2a"), "foo");
    }

    #[test]
    fn test_resolve_without_prefix() {
        assert_eq!(resolver().resolve("wget"), "wget");
    }

    #[test]
    fn test_override_always_wins() {
        let mut overrides = NameOverrideTable::new();
        overrides.insert("gov-foo@bananas".to_string(), "foo-ng".to_string());
        overrides.insert("gov-bar@2".to_string(), "baz".to_string());
        let r = NameResolver::new("gov-", "Gov", overrides);

        assert_eq!(r.resolve("gov-foo@bananas"), "foo-ng");
        assert_eq!(r.resolve("gov-bar@2"), "baz");
        assert_eq!(resolver().resolve("gov-md2man"), "go-md2man");
    }

    #[test]
    fn test_class_name() {
        let r = resolver();
        assert_eq!(r.class_name("gov-abseil"), "GovAbseil");
        assert_eq!(r.class_name("gov-foo-bar"), "GovFooBar");
        assert_eq!(r.class_name("gov-git-filter-repo"), "GovGitFilterRepo");
        assert_eq!(r.class_name("gov-foo@1.2"), "GovFooAT12");
        assert_eq!(r.class_name("gov-libxml++"), "GovLibxmlxx");
        assert_eq!(r.class_name("gov-a--b"), "GovAB");
    }
}
