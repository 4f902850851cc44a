//! Merge the upstream guidelines into the working copy.

use std::path::Path;
use std::process::Output;

use anyhow::{anyhow, Context, Result};
use tokio::process::Command;

use crate::config::{Config, SyncConfig};

/// Run the sync command in the current directory.
pub async fn run(config: &Config) -> Result<()> {
    sync_upstream(Path::new("."), &config.sync).await
}

/// Fetch `sync.branch` from the upstream remote and merge it.
///
/// The remote is added when missing. A merge that does not apply cleanly is
/// aborted so the working copy is left as it was.
pub async fn sync_upstream(repo: &Path, sync: &SyncConfig) -> Result<()> {
    let url = ensure_remote(repo, sync).await?;

    tracing::info!("Fetching {} {} from {}", sync.remote, sync.branch, url);
    git(repo, ["fetch", &sync.remote, &sync.branch])
        .await
        .with_context(|| format!("fetch from {} failed", url))?;

    let upstream = format!("{}/{}", sync.remote, sync.branch);
    let merge = git_output(repo, ["merge", "--no-edit", &upstream]).await?;
    if !merge.status.success() {
        // best-effort: there is nothing to abort when the merge never started
        git(repo, ["merge", "--abort"]).await.ok();
        return Err(anyhow!(
            "merging {} failed, the merge was aborted and the working copy is unchanged:\n{}{}",
            upstream,
            String::from_utf8_lossy(&merge.stdout),
            String::from_utf8_lossy(&merge.stderr)
        ));
    }

    let summary = String::from_utf8_lossy(&merge.stdout);
    tracing::info!(
        "Merged {}: {}",
        upstream,
        summary.lines().next().unwrap_or("done")
    );
    Ok(())
}

/// Add the upstream remote unless it is already configured.
///
/// Returns the URL the remote fetches from, which is the configured one only
/// when the remote did not exist yet.
async fn ensure_remote(repo: &Path, sync: &SyncConfig) -> Result<String> {
    let existing = git_output(repo, ["remote", "get-url", &sync.remote]).await?;
    if existing.status.success() {
        let url = String::from_utf8_lossy(&existing.stdout).trim().to_string();
        if url != sync.url {
            tracing::warn!(
                "Remote {} points at {}, not {}; fetching from {}",
                sync.remote,
                url,
                sync.url,
                url
            );
        }
        return Ok(url);
    }

    tracing::info!("Adding remote {} ({})", sync.remote, sync.url);
    git(repo, ["remote", "add", &sync.remote, &sync.url]).await?;
    Ok(sync.url.clone())
}

async fn git<I, S>(repo: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let output = git_output(repo, args).await?;
    if !output.status.success() {
        return Err(anyhow!(
            "git exited with {}: {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(())
}

async fn git_output<I, S>(repo: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cmd = Command::new("git");
    cmd.current_dir(repo);
    for arg in args {
        cmd.arg(arg.as_ref());
    }
    let output = cmd
        .output()
        .await
        .with_context(|| format!("failed to run git {:?}", cmd))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;
    use tempfile::tempdir;

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn run_git(dir: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    fn commit(dir: &Path, file: &str, content: &str, message: &str) {
        fs::write(dir.join(file), content).unwrap();
        run_git(dir, &["add", file]);
        run_git(dir, &["commit", "-m", message]);
    }

    #[tokio::test]
    async fn merges_new_upstream_commits() {
        if !git_available() {
            return;
        }

        let temp = tempdir().unwrap();
        let upstream = temp.path().join("upstream");
        let local = temp.path().join("local");
        fs::create_dir_all(&upstream).unwrap();

        run_git(&upstream, &["init", "-b", "master"]);
        commit(&upstream, "CppCoreGuidelines.md", "# Intro\n", "first");
        run_git(
            temp.path(),
            &["clone", upstream.to_str().unwrap(), local.to_str().unwrap()],
        );
        commit(
            &upstream,
            "CppCoreGuidelines.md",
            "# Intro\n\n# Philosophy\n",
            "second",
        );

        let sync = SyncConfig {
            remote: "upstream".to_string(),
            url: upstream.to_string_lossy().into_owned(),
            branch: "master".to_string(),
        };
        sync_upstream(&local, &sync).await.unwrap();

        assert_eq!(
            fs::read_to_string(local.join("CppCoreGuidelines.md")).unwrap(),
            "# Intro\n\n# Philosophy\n"
        );

        // Second run finds the remote already configured
        sync_upstream(&local, &sync).await.unwrap();
    }

    #[tokio::test]
    async fn conflicting_merge_is_aborted() {
        if !git_available() {
            return;
        }

        let temp = tempdir().unwrap();
        let upstream = temp.path().join("upstream");
        let local = temp.path().join("local");
        fs::create_dir_all(&upstream).unwrap();

        run_git(&upstream, &["init", "-b", "master"]);
        commit(&upstream, "CppCoreGuidelines.md", "base\n", "first");
        run_git(
            temp.path(),
            &["clone", upstream.to_str().unwrap(), local.to_str().unwrap()],
        );
        commit(&upstream, "CppCoreGuidelines.md", "upstream\n", "theirs");
        commit(&local, "CppCoreGuidelines.md", "local\n", "ours");
        run_git(&local, &["config", "user.name", "Test"]);
        run_git(&local, &["config", "user.email", "test@example.com"]);

        let sync = SyncConfig {
            remote: "upstream".to_string(),
            url: upstream.to_string_lossy().into_owned(),
            branch: "master".to_string(),
        };
        let err = sync_upstream(&local, &sync).await.unwrap_err();
        assert!(err.to_string().contains("merge was aborted"));

        let status = StdCommand::new("git")
            .current_dir(&local)
            .args(["status", "--porcelain"])
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&status.stdout), "");
        assert_eq!(
            fs::read_to_string(local.join("CppCoreGuidelines.md")).unwrap(),
            "local\n"
        );
    }

    #[tokio::test]
    async fn stale_remote_url_is_named_in_fetch_error() {
        if !git_available() {
            return;
        }

        let temp = tempdir().unwrap();
        run_git(temp.path(), &["init", "-b", "main"]);
        let stale = temp.path().join("moved-away");
        run_git(
            temp.path(),
            &["remote", "add", "upstream", stale.to_str().unwrap()],
        );

        let sync = SyncConfig {
            remote: "upstream".to_string(),
            url: "https://github.com/isocpp/CppCoreGuidelines.git".to_string(),
            branch: "master".to_string(),
        };

        let err = sync_upstream(temp.path(), &sync).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("moved-away"), "{message}");
        assert!(!message.contains("isocpp"), "{message}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_error() {
        if !git_available() {
            return;
        }

        let temp = tempdir().unwrap();
        run_git(temp.path(), &["init", "-b", "main"]);

        let sync = SyncConfig {
            remote: "upstream".to_string(),
            url: temp.path().join("missing").to_string_lossy().into_owned(),
            branch: "master".to_string(),
        };

        let err = sync_upstream(temp.path(), &sync).await.unwrap_err();
        assert!(err.to_string().contains("fetch from"));
    }
}
