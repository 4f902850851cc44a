//! Chapter splitting.

use std::collections::HashMap;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::anchor::{heading_title, process_heading_line};
use crate::slug::slugify;

/// File name of the home page.
pub const HOME_FILE: &str = "index.md";

/// Slugs that would collide with files the pipeline writes itself.
const RESERVED_SLUGS: &[&str] = &["index", "notice"];

/// One page of the split document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    /// Heading text without anchor attribute
    pub title: String,

    /// Slug the file name was derived from
    pub slug: String,

    /// Output file name, relative to the docs directory
    pub file_name: String,

    /// Page Markdown, trimmed, first heading rewritten
    pub body: String,

    /// Whether this is the home page
    pub is_home: bool,
}

/// Split a document into chapters along level-1 headings.
///
/// A boundary is an ATX `# ` heading at the start of a line; headings inside
/// code fences are ignored. The first non-empty piece becomes the home page
/// (written to [`HOME_FILE`]), every later piece a chapter named after the
/// slug of its title.
pub fn split_chapters(content: &str) -> Vec<Chapter> {
    let mut bounds = chapter_boundaries(content);
    if bounds.first() != Some(&0) {
        bounds.insert(0, 0);
    }
    bounds.push(content.len());

    let mut chapters = Vec::new();
    let mut used: HashMap<String, usize> = RESERVED_SLUGS
        .iter()
        .map(|s| (s.to_string(), 1))
        .collect();

    for window in bounds.windows(2) {
        let piece = content[window[0]..window[1]].trim();
        if piece.is_empty() {
            continue;
        }

        let mut lines = piece.lines();
        let first = process_heading_line(lines.next().unwrap_or_default()).into_owned();
        let title = heading_title(&first).unwrap_or_else(|| "Untitled".to_string());
        let body = std::iter::once(first.as_str())
            .chain(lines)
            .collect::<Vec<_>>()
            .join("\n");

        if chapters.is_empty() {
            chapters.push(Chapter {
                title,
                slug: "index".to_string(),
                file_name: HOME_FILE.to_string(),
                body,
                is_home: true,
            });
            continue;
        }

        let slug = unique_slug(&title, chapters.len(), &mut used);
        chapters.push(Chapter {
            title,
            file_name: format!("{slug}.md"),
            slug,
            body,
            is_home: false,
        });
    }

    chapters
}

/// Byte offsets of the level-1 headings that start a chapter.
fn chapter_boundaries(content: &str) -> Vec<usize> {
    let bytes = content.as_bytes();
    let mut bounds = Vec::new();

    for (event, range) in Parser::new_ext(content, Options::empty()).into_offset_iter() {
        let Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            ..
        }) = event
        else {
            continue;
        };

        let start = range.start;
        let at_line_start = start == 0 || bytes[start - 1] == b'\n';
        if at_line_start && is_atx_h1(&content[start..]) {
            bounds.push(start);
        }
    }

    bounds
}

/// `#` followed by whitespace.
fn is_atx_h1(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('#') && chars.next().is_some_and(char::is_whitespace)
}

/// Slug for the `ordinal`-th chapter, made unique among those already used.
fn unique_slug(title: &str, ordinal: usize, used: &mut HashMap<String, usize>) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        base = format!("chapter-{ordinal}");
    }

    let count = used.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        return base;
    }

    // A suffixed slug may already be taken by a title that slugs to it
    let mut n = *count;
    let mut candidate = format!("{base}-{n}");
    while used.contains_key(&candidate) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    used.insert(base, n);
    used.insert(candidate.clone(), 1);
    candidate
}
