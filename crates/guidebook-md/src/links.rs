//! Link and image rewriting.
//!
//! Pages move from the repository root into the docs directory, so relative
//! image paths and root-anchored links have to be adjusted.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use regex::{Captures, Regex};

use crate::anchor::collect_anchor_ids;
use crate::splitter::Chapter;

static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!\[[^\]]*\]\()([^\s\)]+)([^\)]*\))").expect("valid regex")
});
static ROOT_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*/#").expect("valid regex"));
static RELATIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\./|\.\./)+").expect("valid regex"));

/// An inline link found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Byte range of the whole link, `[text](dest)`
    pub range: Range<usize>,
    /// Destination as parsed
    pub dest: String,
}

/// Every inline link of a page, in document order.
///
/// Link syntax inside code spans and code blocks is not a link and is not
/// returned.
pub fn link_targets(markdown: &str) -> Vec<LinkTarget> {
    Parser::new_ext(markdown, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url,
                ..
            }) => Some(LinkTarget {
                range,
                dest: dest_url.to_string(),
            }),
            _ => None,
        })
        .collect()
}

/// Whether an image path points somewhere we must not touch.
fn is_external(path: &str) -> bool {
    path.starts_with("http") || path.starts_with('/')
}

/// Rewrite the target of every relative Markdown image.
///
/// `resolve` receives the raw path of each relative image and returns the
/// replacement path, or `None` to leave the image as written. Alt text and
/// titles are preserved.
pub fn rewrite_image_links<F>(content: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    IMAGE_LINK
        .replace_all(content, |caps: &Captures<'_>| {
            let path = caps[2].trim();
            if is_external(path) {
                return caps[0].to_string();
            }

            match resolve(path) {
                Some(new_path) => format!("{}{}{}", &caps[1], new_path, &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Strip leading `./` and `../` segments from a relative path.
pub fn normalize_image_path(path: &str) -> &str {
    match RELATIVE_PREFIX.find(path) {
        Some(m) => &path[m.end()..],
        None => path,
    }
}

/// Turn root-anchored links `(/#id)` into page-local `(#id)` links.
pub fn fix_root_anchors(content: &str) -> String {
    ROOT_ANCHOR.replace_all(content, "(#").into_owned()
}

/// Point `](#id)` links at the chapter that actually defines `id`.
///
/// After splitting, a link to an anchor living in another chapter would
/// resolve against the current page and break. Such links become
/// `](file.md#id)`. Links to ids defined on the same page or nowhere at all
/// are left as they are. Returns the number of rewritten links.
pub fn resolve_cross_page_anchors(chapters: &mut [Chapter]) -> usize {
    let mut owners: HashMap<String, String> = HashMap::new();
    for chapter in chapters.iter() {
        for id in collect_anchor_ids(&chapter.body) {
            owners.entry(id).or_insert_with(|| chapter.file_name.clone());
        }
    }

    let mut rewritten = 0;
    for chapter in chapters.iter_mut() {
        let mut body = String::with_capacity(chapter.body.len());
        let mut last = 0;

        for link in link_targets(&chapter.body) {
            let Some(id) = link.dest.strip_prefix('#') else {
                continue;
            };
            let Some(owner) = owners.get(id).filter(|o| **o != chapter.file_name) else {
                continue;
            };

            // The destination is the last `#id` inside the link source
            let source = &chapter.body[link.range.clone()];
            let Some(at) = source.rfind(link.dest.as_str()) else {
                continue;
            };
            let dest_start = link.range.start + at;
            body.push_str(&chapter.body[last..dest_start]);
            body.push_str(owner);
            last = dest_start;
            rewritten += 1;
        }

        if last > 0 {
            body.push_str(&chapter.body[last..]);
            chapter.body = body;
        }
    }

    rewritten
}
