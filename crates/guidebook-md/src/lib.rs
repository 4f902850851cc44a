//! Markdown processing for the guidelines document.
//!
//! Pure text transformations: splitting one monolithic document into chapter
//! pages, converting heading anchors, and rewriting links so they keep
//! working once the pages live in a docs directory. Nothing in this crate
//! touches the filesystem.

pub mod anchor;
pub mod links;
pub mod slug;
pub mod splitter;
pub mod toc;

pub use anchor::{collect_anchor_ids, heading_title, process_heading_line};
pub use links::{
    fix_root_anchors, link_targets, normalize_image_path, resolve_cross_page_anchors,
    rewrite_image_links, LinkTarget,
};
pub use slug::slugify;
pub use splitter::{split_chapters, Chapter, HOME_FILE};
pub use toc::{extract_headings, Heading};
