// src/version/mod.rs

//! Best-effort ordering of loosely formatted formula versions
//!
//! Formula versions come from hand-written `version` lines, archive file
//! names and registry JSON, so they are only loosely structured. Both sides
//! of a comparison are normalized first (trim, one leading `v` dropped, `_`
//! and `,` read as `.`) and then parsed as dotted numeric releases with an
//! optional pre-release tag and build metadata:
//!
//! - "1.2.3" → segments [1, 2, 3]
//! - "v2.0-rc.1" → segments [2, 0], pre-release "rc.1"
//! - "1.0beta2" → segments [1, 0], pre-release "beta2"
//! - "3.1+build.7" → segments [3, 1], metadata ignored for ordering
//! - "20240101" → no dot, not a structured release
//!
//! If either side fails to parse, the comparison falls back to plain
//! lexicographic order of the *original* strings. That fallback is known to
//! misorder numbers of different digit lengths ("9" sorts after "10") and is
//! kept as is. [`FallbackOrdering::Natural`] is an opt-in alternative.

use semver::Prerelease;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(concat!(
        r"^v?([0-9]+(?:\.[0-9]+)+)",
        r"(?:-([0-9A-Za-z\-~]+(?:\.[0-9A-Za-z\-~]+)*)",
        r"|([A-Za-z\-~]+[0-9A-Za-z\-~]*(?:\.[0-9A-Za-z\-~]+)*))?",
        r"(?:\+([0-9A-Za-z\-~]+(?:\.[0-9A-Za-z\-~]+)*))?$",
    ))
    .unwrap()
});

/// How to order two versions when at least one of them does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackOrdering {
    /// Byte-wise comparison of the original strings
    #[default]
    Lexical,
    /// Digit runs compared numerically, everything else byte-wise
    Natural,
}

/// Normalize a raw version string before structured parsing
pub fn normalize(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('v').unwrap_or(s);
    s.replace(['_', ','], ".")
}

/// A structurally parsed version
#[derive(Debug, Clone)]
pub struct VersionToken {
    segments: Vec<u64>,
    prerelease: Option<String>,
    metadata: Option<String>,
}

impl VersionToken {
    /// Normalize and parse a raw version string
    ///
    /// Returns `None` when the normalized string is not a dotted numeric
    /// release with an optional pre-release and metadata.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize(raw);
        let caps = VERSION_RE.captures(&normalized)?;

        let segments = caps[1]
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        let prerelease = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string());
        let metadata = caps.get(4).map(|m| m.as_str().to_string());

        Some(Self {
            segments,
            prerelease,
            metadata,
        })
    }

    /// Release segments, e.g. [1, 2, 3] for "1.2.3"
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    fn compare_segments(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

/// Order two pre-release tags
///
/// Tags that are valid semver identifiers follow semver precedence
/// ("rc.2" < "rc.10"); anything else falls back to string order.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (Prerelease::new(a), Prerelease::new(b)) {
        (Ok(pa), Ok(pb)) => pa.cmp(&pb),
        _ => a.cmp(b),
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.compare_segments(other) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // A release orders after any of its pre-releases
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionToken {}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref meta) = self.metadata {
            write!(f, "+{}", meta)?;
        }
        Ok(())
    }
}

/// Compare two strings with digit runs ordered numerically
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.char_indices().peekable();
    let mut bi = b.char_indices().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((sa, ca)), Some((sb, cb))) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let mut ea = sa;
                    while let Some(&(i, c)) = ai.peek() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        ea = i + c.len_utf8();
                        ai.next();
                    }
                    let mut eb = sb;
                    while let Some(&(i, c)) = bi.peek() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        eb = i + c.len_utf8();
                        bi.next();
                    }
                    let na = a[sa..ea].trim_start_matches('0');
                    let nb = b[sb..eb].trim_start_matches('0');
                    match na.len().cmp(&nb.len()).then_with(|| na.cmp(nb)) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                } else {
                    match ca.cmp(&cb) {
                        Ordering::Equal => {
                            ai.next();
                            bi.next();
                        }
                        ord => return ord,
                    }
                }
            }
        }
    }
}

/// Compare two raw versions, falling back as configured when either side does not parse
pub fn compare_with(local: &str, upstream: &str, fallback: FallbackOrdering) -> Ordering {
    match (VersionToken::parse(local), VersionToken::parse(upstream)) {
        (Some(l), Some(u)) => l.cmp(&u),
        _ => match fallback {
            FallbackOrdering::Lexical => local.cmp(upstream),
            FallbackOrdering::Natural => natural_cmp(local, upstream),
        },
    }
}

/// Whether `local` is strictly older than `upstream`, with the lexical fallback
pub fn is_behind(local: &str, upstream: &str) -> bool {
    is_behind_with(local, upstream, FallbackOrdering::Lexical)
}

/// Whether `local` is strictly older than `upstream`
pub fn is_behind_with(local: &str, upstream: &str, fallback: FallbackOrdering) -> bool {
    compare_with(local, upstream, fallback) == Ordering::Less
}
