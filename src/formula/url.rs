// src/formula/url.rs

//! Version inference from source archive URLs

use std::sync::LazyLock;

/// Archive extensions, longest first so ".tar.gz" wins over ".gz"
const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".zip", ".gz", ".bz2", ".xz", ".tar",
];

static VERSION_TOKEN_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"v?(\d+(?:\.\d+)+[A-Za-z0-9._-]*)").unwrap());

/// Strip a known archive extension, or else the last `.`-suffix
///
/// A leading dot is not treated as a suffix separator.
pub fn strip_archive_extension(segment: &str) -> &str {
    for ext in ARCHIVE_EXTENSIONS {
        if let Some(stripped) = segment.strip_suffix(ext) {
            return stripped;
        }
    }
    match segment.rfind('.') {
        Some(i) if i > 0 => &segment[..i],
        _ => segment,
    }
}

fn find_version_token(s: &str) -> Option<String> {
    VERSION_TOKEN_RE.captures(s).map(|caps| {
        let token = &caps[1];
        token.strip_prefix('v').unwrap_or(token).to_string()
    })
}

/// Infer a formula version from its source URL
///
/// The file name is tried first (as-is, then without a `<name>-`, `<name>_`
/// or `<name>v` prefix), then the whole URL:
///
/// - ".../abseil-cpp/archive/refs/tags/20260107.0.tar.gz" → "20260107.0"
/// - ".../jq-1.7.1.tar.gz" with name "jq" → "1.7.1"
/// - ".../v2.4.0/tool.tar.gz" → "2.4.0" (from the full URL)
pub fn infer_version_from_url(url: &str, name: &str) -> Option<String> {
    let url = url.trim();
    let last_segment = url.rsplit('/').next().unwrap_or(url);
    let base = strip_archive_extension(last_segment);

    let dash = format!("{}-", name);
    let underscore = format!("{}_", name);
    let v = format!("{}v", name);

    let candidates = [
        base,
        base.strip_prefix(dash.as_str()).unwrap_or(base),
        base.strip_prefix(underscore.as_str()).unwrap_or(base),
        base.strip_prefix(v.as_str()).unwrap_or(base),
    ];

    candidates
        .iter()
        .find_map(|c| find_version_token(c))
        .or_else(|| find_version_token(url))
}
