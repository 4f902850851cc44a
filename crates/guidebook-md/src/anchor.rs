//! Heading anchors.
//!
//! The guidelines source marks headings with inline HTML anchors
//! (`# <a name="S-introduction"></a>Introduction`). MkDocs prefers heading
//! attributes (`# Introduction {#S-introduction}`), so chapter headings are
//! rewritten into that form.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;

static ANCHORED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(#{1,6}\s+)(<a\s+name="([^"]+)"></a>)(.*)"#).expect("valid regex")
});
static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.*)").expect("valid regex"));
static HEADING_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{#.*\}$").expect("valid regex"));
static HTML_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s+(?:name|id)="([^"]+)"\s*>"#).expect("valid regex")
});

/// Rewrite a heading carrying an HTML anchor into heading-attribute form.
///
/// `# <a name="S-intro"></a>Introduction` becomes `# Introduction {#S-intro}`.
/// When nothing visible follows the anchor the anchor name doubles as the
/// heading text. Any other line is returned untouched.
pub fn process_heading_line(line: &str) -> Cow<'_, str> {
    let Some(caps) = ANCHORED_HEADING.captures(line) else {
        return Cow::Borrowed(line);
    };

    let prefix = &caps[1];
    let name = &caps[3];
    let rest = caps[4].trim();
    let text = if rest.is_empty() { name } else { rest };

    Cow::Owned(format!("{prefix}{text} {{#{name}}}"))
}

/// Visible title of an ATX heading line, without a trailing `{#id}`.
pub fn heading_title(line: &str) -> Option<String> {
    let caps = ATX_HEADING.captures(line)?;
    let full = caps[1].trim();
    Some(HEADING_ATTRIBUTE.replace(full, "").trim().to_string())
}

/// Collect every anchor id a page defines.
///
/// Both `{#id}` heading attributes and `<a name="id">` HTML anchors count.
/// Ids are returned in document order without duplicates.
pub fn collect_anchor_ids(markdown: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    let parser = Parser::new_ext(markdown, Options::ENABLE_HEADING_ATTRIBUTES);
    for event in parser {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            if seen.insert(id.to_string()) {
                ids.push(id.to_string());
            }
        }
    }

    for caps in HTML_ANCHOR.captures_iter(markdown) {
        let id = caps[1].to_string();
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }

    ids
}
