//! Consistency checks over a generated docs directory.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use guidebook_md::{collect_anchor_ids, extract_headings, link_targets};

use crate::mkdocs::{nav_pages, ConfigError};

static TOC_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static TOC_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// A link whose anchor does not exist on the target page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BrokenAnchor {
    /// Page containing the link
    pub page: String,
    /// Link target as written (`file.md#id` or `#id`)
    pub target: String,
}

/// Findings of a site check.
#[derive(Debug, Default, PartialEq)]
pub struct CheckReport {
    /// Pages listed in the navigation that do not exist
    pub missing_pages: Vec<String>,
    /// Markdown files not reachable from the navigation
    pub orphan_pages: Vec<String>,
    /// Anchor links pointing nowhere
    pub broken_anchors: Vec<BrokenAnchor>,
}

impl CheckReport {
    pub fn problems(&self) -> usize {
        self.missing_pages.len() + self.orphan_pages.len() + self.broken_anchors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.problems() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Docs directory not found: {0}")]
    DocsNotFound(PathBuf),

    #[error("Failed to read {0}")]
    ReadError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Heading id as generated by the MkDocs `toc` extension.
fn toc_slug(title: &str) -> String {
    let ascii: String = title.chars().filter(char::is_ascii).collect();
    let stripped = TOC_STRIP.replace_all(&ascii, "");
    let lowered = stripped.trim().to_lowercase();
    TOC_SEPARATORS.replace_all(&lowered, "-").into_owned()
}

/// Every id a page can be linked to: explicit anchors and generated heading ids.
fn page_ids(markdown: &str) -> HashSet<String> {
    let mut ids: HashSet<String> = collect_anchor_ids(markdown).into_iter().collect();
    for heading in extract_headings(markdown) {
        if heading.id.is_none() {
            ids.insert(toc_slug(&heading.title));
        }
    }
    ids
}

/// Join a relative link onto the directory of `page`, resolving `.` and `..`.
fn resolve_page(page: &str, link: &str) -> String {
    let mut parts: Vec<&str> = page.split('/').collect();
    parts.pop();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Compare the docs directory with the navigation of `mkdocs_config`.
pub fn check_site(docs_dir: &Path, mkdocs_config: &Path) -> Result<CheckReport, CheckError> {
    if !docs_dir.is_dir() {
        return Err(CheckError::DocsNotFound(docs_dir.to_path_buf()));
    }

    let mut pages: HashMap<String, String> = HashMap::new();
    for entry in WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }

        let relative = path
            .strip_prefix(docs_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read_to_string(path)
            .map_err(|e| CheckError::ReadError(format!("{}: {}", path.display(), e)))?;
        pages.insert(relative, content);
    }

    let nav: BTreeSet<String> = nav_pages(mkdocs_config)?.into_iter().collect();
    let mut report = CheckReport::default();

    for page in &nav {
        if !pages.contains_key(page) {
            report.missing_pages.push(page.clone());
        }
    }

    let mut orphans: Vec<String> = pages.keys().filter(|p| !nav.contains(*p)).cloned().collect();
    orphans.sort();
    report.orphan_pages = orphans;

    let ids: HashMap<&str, HashSet<String>> = pages
        .iter()
        .map(|(page, content)| (page.as_str(), page_ids(content)))
        .collect();

    for (page, content) in &pages {
        for link in link_targets(content) {
            let Some((file, id)) = link.dest.split_once('#') else {
                continue;
            };
            if id.is_empty() || file.contains("://") || file.starts_with("mailto:") {
                continue;
            }

            let target_page = if file.is_empty() {
                page.clone()
            } else {
                resolve_page(page, file)
            };

            let found = ids
                .get(target_page.as_str())
                .is_some_and(|known| known.contains(id));
            if !found {
                report.broken_anchors.push(BrokenAnchor {
                    page: page.clone(),
                    target: format!("{file}#{id}"),
                });
            }
        }
    }
    report.broken_anchors.sort();

    tracing::debug!(
        "Checked {} pages: {} problems",
        pages.len(),
        report.problems()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn generates_toc_slugs() {
        assert_eq!(toc_slug("P.1: Express ideas directly"), "p1-express-ideas-directly");
        assert_eq!(toc_slug("Bibliography"), "bibliography");
    }

    #[test]
    fn resolves_relative_pages() {
        assert_eq!(resolve_page("index.md", "intro.md"), "intro.md");
        assert_eq!(resolve_page("a/b.md", "../c.md"), "c.md");
        assert_eq!(resolve_page("a/b.md", "./d.md"), "a/d.md");
    }

    #[test]
    fn reports_clean_site() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        write(&docs, "index.md", "# Home {#main}\n\nSee [intro](intro.md#S-intro).\n");
        write(&docs, "intro.md", "# Intro {#S-intro}\n\n## Details\n\n[up](#details) [home](index.md#main)\n");
        write(
            temp.path(),
            "mkdocs.yml",
            "site_name: X\nnav:\n  - Home: index.md\n  - Intro: intro.md\n",
        );

        let report = check_site(&docs, &temp.path().join("mkdocs.yml")).unwrap();

        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn reports_problems() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        write(&docs, "index.md", "# Home\n\n[gone](#nothing) [elsewhere](intro.md#S-missing)\n");
        write(&docs, "stray.md", "# Stray\n");
        write(
            temp.path(),
            "mkdocs.yml",
            "site_name: X\nnav:\n  - Home: index.md\n  - Intro: intro.md\n  - Web: https://isocpp.org\n",
        );

        let report = check_site(&docs, &temp.path().join("mkdocs.yml")).unwrap();

        assert_eq!(report.missing_pages, vec!["intro.md"]);
        assert_eq!(report.orphan_pages, vec!["stray.md"]);
        assert_eq!(
            report.broken_anchors,
            vec![
                BrokenAnchor {
                    page: "index.md".to_string(),
                    target: "#nothing".to_string(),
                },
                BrokenAnchor {
                    page: "index.md".to_string(),
                    target: "intro.md#S-missing".to_string(),
                },
            ]
        );
        assert_eq!(report.problems(), 4);
    }

    #[test]
    fn ignores_links_in_code_samples() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        write(
            &docs,
            "index.md",
            "# Home\n\n```markdown\n[example](#not-here)\n```\n\nUse `[x](other.md#y)` syntax.\n",
        );
        write(temp.path(), "mkdocs.yml", "site_name: X\nnav:\n  - Home: index.md\n");

        let report = check_site(&docs, &temp.path().join("mkdocs.yml")).unwrap();

        assert!(report.broken_anchors.is_empty(), "{report:?}");
    }

    #[test]
    fn missing_docs_dir_is_an_error() {
        let temp = tempdir().unwrap();
        let result = check_site(&temp.path().join("docs"), &temp.path().join("mkdocs.yml"));
        assert!(matches!(result, Err(CheckError::DocsNotFound(_))));
    }
}
