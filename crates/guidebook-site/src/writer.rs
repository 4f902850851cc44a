//! Writing pages into the docs directory.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use guidebook_md::{Chapter, HOME_FILE};

use crate::builder::BuildError;
use crate::templates::TemplateEngine;

/// File name of the notice page.
pub const NOTICE_FILE: &str = "NOTICE.md";

/// Write every chapter (home page included) into `docs_dir`.
///
/// Files are written in parallel; each page ends with a single newline.
pub fn write_chapters(docs_dir: &Path, chapters: &[Chapter]) -> Result<usize, BuildError> {
    fs::create_dir_all(docs_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

    let results: Vec<Result<(), BuildError>> = chapters
        .par_iter()
        .map(|chapter| {
            let path = docs_dir.join(&chapter.file_name);
            fs::write(&path, format!("{}\n", chapter.body))
                .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))?;

            if chapter.is_home {
                tracing::info!("Created Home page: {} -> {}", chapter.title, path.display());
            } else {
                tracing::info!("Created chapter: {} -> {}", chapter.title, path.display());
            }
            Ok(())
        })
        .collect();

    for result in results {
        result?;
    }

    Ok(chapters.len())
}

/// Make sure the home page starts with `# {heading}`.
///
/// An existing page without that heading gets it prepended; a missing page is
/// created from the placeholder template.
pub fn ensure_home_heading(
    docs_dir: &Path,
    heading: &str,
    templates: &TemplateEngine,
) -> Result<(), BuildError> {
    let path = docs_dir.join(HOME_FILE);
    let title_line = format!("# {heading}");

    if path.exists() {
        let content = fs::read_to_string(&path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
        if content.trim_start().starts_with(&title_line) {
            return Ok(());
        }

        fs::write(&path, format!("{title_line}\n\n{content}"))
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        tracing::info!("Added heading '{}' to {}", heading, path.display());
    } else {
        let home = templates
            .render_home(heading)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        fs::write(&path, home).map_err(|e| BuildError::WriteError(e.to_string()))?;
        tracing::info!("Created {} with heading '{}'", path.display(), heading);
    }

    Ok(())
}

/// Create the notice page unless it already exists.
///
/// Returns whether a file was written.
pub fn write_notice(docs_dir: &Path, templates: &TemplateEngine) -> Result<bool, BuildError> {
    let path = docs_dir.join(NOTICE_FILE);
    if path.exists() {
        tracing::info!("NOTICE file already exists at {}. Skipping creation.", path.display());
        return Ok(false);
    }

    let notice = templates
        .render_notice()
        .map_err(|e| BuildError::TemplateError(e.to_string()))?;
    fs::write(&path, notice).map_err(|e| BuildError::WriteError(e.to_string()))?;
    tracing::info!("Created NOTICE file at {}", path.display());

    Ok(true)
}
