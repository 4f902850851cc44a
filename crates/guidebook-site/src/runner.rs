//! Invoking MkDocs and collecting the PDF.

use std::path::{Path, PathBuf};

use tokio::process::Command;

/// How to run the site generator.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Program and leading arguments, e.g. `["mkdocs"]` or
    /// `["python", "-m", "mkdocs"]`
    pub command: Vec<String>,

    /// `mkdocs.yml` to build from
    pub config_file: PathBuf,

    /// Output directory of the site
    pub site_dir: PathBuf,

    /// PDF location inside the site directory
    pub pdf_path: String,

    /// Fixed path the PDF is copied to
    pub pdf_output: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: vec!["mkdocs".to_string()],
            config_file: PathBuf::from("mkdocs.yml"),
            site_dir: PathBuf::from("site"),
            pdf_path: "pdf/document.pdf".to_string(),
            pdf_output: PathBuf::from("CppCoreGuidelines.pdf"),
        }
    }
}

/// Errors from running MkDocs.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("No site generator command configured")]
    EmptyCommand,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("mkdocs exited with status {code:?}\n{stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("PDF not found at {0}; is the with-pdf plugin installed?")]
    PdfMissing(PathBuf),

    #[error("Failed to copy PDF to {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Runs `mkdocs build` and copies the generated PDF.
#[derive(Debug, Clone)]
pub struct MkDocsRunner {
    config: RunnerConfig,
}

impl MkDocsRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn command(&self) -> Result<Command, RunnerError> {
        let (program, args) = self
            .config
            .command
            .split_first()
            .ok_or(RunnerError::EmptyCommand)?;
        let mut command = Command::new(program);
        command.args(args);
        Ok(command)
    }

    fn program(&self) -> String {
        self.config.command.join(" ")
    }

    /// Check that the generator can be started. Returns its version line.
    pub async fn check_available(&self) -> Result<String, RunnerError> {
        let output = self
            .command()?
            .arg("--version")
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: self.program(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!("Using {}", version);
        Ok(version)
    }

    /// Build the site into the configured site directory.
    pub async fn build(&self) -> Result<(), RunnerError> {
        tracing::info!(
            "Running {} build with {}",
            self.program(),
            self.config.config_file.display()
        );

        let output = self
            .command()?
            .arg("build")
            .arg("--config-file")
            .arg(&self.config.config_file)
            .arg("--site-dir")
            .arg(&self.config.site_dir)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: self.program(),
                source,
            })?;

        // MkDocs logs to stderr
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::debug!("mkdocs: {}", line);
        }

        if !output.status.success() {
            return Err(RunnerError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!("Site built at {}", self.config.site_dir.display());
        Ok(())
    }

    /// Location of the PDF inside the built site.
    pub fn generated_pdf(&self) -> PathBuf {
        self.config.site_dir.join(&self.config.pdf_path)
    }

    /// Copy the generated PDF to its fixed output path.
    pub async fn copy_pdf(&self) -> Result<PathBuf, RunnerError> {
        let generated = self.generated_pdf();
        if !generated.is_file() {
            return Err(RunnerError::PdfMissing(generated));
        }

        let target = self.config.pdf_output.clone();
        if let Some(parent) = non_empty_parent(&target) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RunnerError::Copy {
                    path: target.clone(),
                    source,
                })?;
        }

        tokio::fs::copy(&generated, &target)
            .await
            .map_err(|source| RunnerError::Copy {
                path: target.clone(),
                source,
            })?;

        tracing::info!("Copied {} -> {}", generated.display(), target.display());
        Ok(target)
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FAKE_MKDOCS: &str = r#"
if [ "$1" = "--version" ]; then
  echo "mkdocs, version 1.6.1"
  exit 0
fi
SITE=site
while [ $# -gt 0 ]; do
  case "$1" in
    --site-dir) shift; SITE="$1" ;;
  esac
  shift
done
mkdir -p "$SITE/pdf"
echo "<html></html>" > "$SITE/index.html"
echo "%PDF" > "$SITE/pdf/document.pdf"
echo "INFO - Documentation built" >&2
"#;

    fn runner(dir: &Path, script: &str) -> MkDocsRunner {
        let script_path = dir.join("fake-mkdocs.sh");
        fs::write(&script_path, script).unwrap();

        MkDocsRunner::new(RunnerConfig {
            command: vec!["sh".to_string(), script_path.display().to_string()],
            config_file: dir.join("mkdocs.yml"),
            site_dir: dir.join("site"),
            pdf_output: dir.join("out/CppCoreGuidelines.pdf"),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn reports_version() {
        let temp = tempdir().unwrap();
        let version = runner(temp.path(), FAKE_MKDOCS)
            .check_available()
            .await
            .unwrap();

        assert_eq!(version, "mkdocs, version 1.6.1");
    }

    #[tokio::test]
    async fn builds_site_and_copies_pdf() {
        let temp = tempdir().unwrap();
        let runner = runner(temp.path(), FAKE_MKDOCS);

        runner.build().await.unwrap();
        let pdf = runner.copy_pdf().await.unwrap();

        assert!(temp.path().join("site/index.html").exists());
        assert_eq!(pdf, temp.path().join("out/CppCoreGuidelines.pdf"));
        assert_eq!(fs::read_to_string(pdf).unwrap(), "%PDF\n");
    }

    #[tokio::test]
    async fn surfaces_generator_failure() {
        let temp = tempdir().unwrap();
        let runner = runner(temp.path(), "echo 'ERROR - Config value: nav' >&2\nexit 1\n");

        match runner.build().await {
            Err(RunnerError::Failed { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("Config value: nav"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_pdf_is_reported() {
        let temp = tempdir().unwrap();
        let runner = runner(temp.path(), "exit 0\n");

        runner.build().await.unwrap();

        assert!(matches!(
            runner.copy_pdf().await,
            Err(RunnerError::PdfMissing(_))
        ));
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let runner = MkDocsRunner::new(RunnerConfig {
            command: vec!["definitely-not-mkdocs-7f3a".to_string()],
            ..Default::default()
        });

        assert!(matches!(
            runner.check_available().await,
            Err(RunnerError::Spawn { .. })
        ));
    }

    #[test]
    fn empty_command_is_rejected() {
        let runner = MkDocsRunner::new(RunnerConfig {
            command: vec![],
            ..Default::default()
        });

        assert!(matches!(runner.command(), Err(RunnerError::EmptyCommand)));
    }
}
