//! Image assets referenced by the source document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use guidebook_md::normalize_image_path;

/// Copies relative images next to the generated pages.
///
/// Used as the resolver for [`guidebook_md::rewrite_image_links`]: each
/// relative image is looked up under the source directory, copied flat into
/// `<docs_dir>/<assets_dir>/` and the link is pointed at the copy. Images
/// that are missing or fail to copy keep their original link. Copies are
/// keyed by file name, so a second image with the same name from another
/// directory is linked to the first copy and reported.
#[derive(Debug)]
pub struct AssetCopier {
    source_dir: PathBuf,
    target_dir: PathBuf,
    link_prefix: String,
    /// File name of each copy and the source it came from
    copied: BTreeMap<String, PathBuf>,
}

impl AssetCopier {
    /// Create a copier reading from `source_dir` and writing to
    /// `docs_dir/assets_dir`.
    pub fn new(source_dir: &Path, docs_dir: &Path, assets_dir: &str) -> Self {
        let assets_dir = assets_dir.trim_matches('/');
        Self {
            source_dir: source_dir.to_path_buf(),
            target_dir: docs_dir.join(assets_dir),
            link_prefix: assets_dir.to_string(),
            copied: BTreeMap::new(),
        }
    }

    /// Copy the image at `path` and return its new link.
    pub fn resolve(&mut self, path: &str) -> Option<String> {
        let normalized = normalize_image_path(path);
        let source = self.source_dir.join(normalized);
        if !source.is_file() {
            tracing::warn!("Image file '{}' not found", source.display());
            return None;
        }

        let file_name = source.file_name()?.to_string_lossy().into_owned();
        let link = format!("{}/{}", self.link_prefix, file_name);
        let source = fs::canonicalize(&source).unwrap_or(source);
        if let Some(first) = self.copied.get(&file_name) {
            if *first != source {
                tracing::warn!(
                    "Image '{}' has the same name as '{}' and is linked to its copy",
                    source.display(),
                    first.display()
                );
            }
            return Some(link);
        }

        if let Err(e) = fs::create_dir_all(&self.target_dir) {
            tracing::warn!(
                "Failed to create asset directory {}: {}",
                self.target_dir.display(),
                e
            );
            return None;
        }

        let dest = self.target_dir.join(&file_name);
        if let Err(e) = fs::copy(&source, &dest) {
            tracing::warn!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest.display(),
                e
            );
            return None;
        }

        tracing::debug!("Copied image {} -> {}", source.display(), dest.display());
        self.copied.insert(file_name, source);
        Some(link)
    }

    /// Number of distinct images copied so far.
    pub fn copied(&self) -> usize {
        self.copied.len()
    }
}
