// src/formula/transform.rs

//! Class-line rewriting for upstream formula text

use crate::naming::NameResolver;
use std::sync::LazyLock;

static CLASS_LINE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?m)^[ \t]*class[ \t]+\w+[ \t]+<[ \t]+Formula\b.*$").unwrap()
});

/// Result of rewriting upstream formula text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// False when no class declaration was found; `text` is then the input unchanged
    pub replaced: bool,
}

/// Canonical class declaration for a class identifier
pub fn declaration_line(class_name: &str) -> String {
    format!("class {} < Formula", class_name)
}

/// Renames upstream formula text into the private namespace
#[derive(Debug, Clone)]
pub struct FormulaTransformer {
    names: NameResolver,
}

impl FormulaTransformer {
    pub fn new(names: NameResolver) -> Self {
        Self { names }
    }

    /// Declaration line a rewritten formula for `private_name` must contain
    pub fn expected_line(&self, private_name: &str) -> String {
        declaration_line(&self.names.class_name(private_name))
    }

    /// Rewrite the class declaration of `upstream_text` for `private_name`
    ///
    /// "gov-abseil" turns `class Abseil < Formula` into
    /// `class GovAbseil < Formula`.
    pub fn rewrite(&self, upstream_text: &str, private_name: &str) -> Rewrite {
        replace_class_line(upstream_text, &self.names.class_name(private_name))
    }
}

/// Replace the formula class declaration with one for `class_name`
///
/// The first `class <Name> < Formula ...` line is replaced as a whole,
/// trailing modifiers included. All other lines are kept verbatim.
pub fn replace_class_line(upstream_text: &str, class_name: &str) -> Rewrite {
    let Some(m) = CLASS_LINE_RE.find(upstream_text) else {
        return Rewrite {
            text: upstream_text.to_string(),
            replaced: false,
        };
    };

    let mut text = String::with_capacity(upstream_text.len() + class_name.len());
    text.push_str(&upstream_text[..m.start()]);
    text.push_str(&declaration_line(class_name));
    text.push_str(&upstream_text[m.end()..]);

    Rewrite {
        text,
        replaced: true,
    }
}
