//! Chapter file name slugs.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-]").expect("valid regex"));

/// Convert a chapter title to a URL-friendly slug.
///
/// Lowercases, turns every whitespace run into a single `-` and drops any
/// character that is neither a word character nor `-`. Runs of hyphens are
/// kept as they are, so `"A - B"` becomes `"a---b"`.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    NON_WORD.replace_all(&hyphenated, "").into_owned()
}
