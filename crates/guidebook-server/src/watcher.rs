//! File watching for rebuilds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Markdown source was modified
    SourceModified(PathBuf),

    /// A YAML or TOML configuration file was modified
    ConfigModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Generic modification
    Modified(PathBuf),
}

impl WatchEvent {
    /// Path the event is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::SourceModified(p)
            | Self::ConfigModified(p)
            | Self::Created(p)
            | Self::Deleted(p)
            | Self::Modified(p) => p,
        }
    }
}

/// Which paths events are reported for.
#[derive(Debug, Default)]
struct WatchSet {
    /// Individually watched files
    files: HashSet<PathBuf>,
    /// Directories watched recursively
    dirs: Vec<PathBuf>,
}

impl WatchSet {
    fn covers(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.iter().any(|d| path.starts_with(d))
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given files and directories.
    ///
    /// Files are watched through their parent directory so editors that
    /// replace a file on save keep triggering events. Paths that do not exist
    /// are ignored. Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let mut set = WatchSet::default();
        for path in paths {
            if !path.exists() {
                tracing::debug!("Not watching missing path {}", path.display());
                continue;
            }

            let path = path.canonicalize()?;
            if path.is_dir() {
                watcher
                    .watch(&path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
                set.dirs.push(path);
            } else {
                let parent = path.parent().unwrap_or(Path::new("/")).to_path_buf();
                watcher
                    .watch(&parent, RecursiveMode::NonRecursive)
                    .map_err(std::io::Error::other)?;
                set.files.insert(path);
            }
        }

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Debounce rapid events
                let now = Instant::now();
                if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                    continue;
                }

                for path in event.paths {
                    if !set.covers(&path) {
                        continue;
                    }
                    if let Some(e) = classify_event(&path, &event.kind) {
                        last_event_time = Some(now);
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => match ext {
            "md" | "markdown" => Some(WatchEvent::SourceModified(path.to_path_buf())),
            "yml" | "yaml" | "toml" => Some(WatchEvent::ConfigModified(path.to_path_buf())),
            _ => Some(WatchEvent::Modified(path.to_path_buf())),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_events() {
        let modify = notify::EventKind::Modify(ModifyKind::Any);

        assert_eq!(
            classify_event(Path::new("/g/CppCoreGuidelines.md"), &modify),
            Some(WatchEvent::SourceModified(PathBuf::from("/g/CppCoreGuidelines.md")))
        );
        assert_eq!(
            classify_event(Path::new("/g/mkdocs.yml"), &modify),
            Some(WatchEvent::ConfigModified(PathBuf::from("/g/mkdocs.yml")))
        );
        assert_eq!(
            classify_event(
                Path::new("/g/a.png"),
                &notify::EventKind::Create(CreateKind::File)
            ),
            Some(WatchEvent::Created(PathBuf::from("/g/a.png")))
        );
        assert_eq!(
            classify_event(Path::new("/g/a.md"), &notify::EventKind::Any),
            None
        );
    }

    #[test]
    fn watch_set_filters_unrelated_paths() {
        let set = WatchSet {
            files: HashSet::from([PathBuf::from("/g/source.md")]),
            dirs: vec![PathBuf::from("/g/img")],
        };

        assert!(set.covers(Path::new("/g/source.md")));
        assert!(set.covers(Path::new("/g/img/a.png")));
        assert!(!set.covers(Path::new("/g/docs/index.md")));
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.md");
        fs::write(&source, "# Start").unwrap();

        let (watcher, mut rx) = FileWatcher::new(&[source.clone()]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&source, "# Changed").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert_eq!(event.path(), source.canonicalize().unwrap());
    }
}
