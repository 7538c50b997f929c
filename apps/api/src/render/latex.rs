//! Typesetting-compiler renderer. Compiles the moderncv source in a scratch
//! directory that is removed when the render finishes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::cv::latex::build_document;
use crate::cv::{CvSections, Language};
use crate::render::{RenderError, Renderer};

const SOURCE_FILE: &str = "cv.tex";
const OUTPUT_FILE: &str = "cv.pdf";
const LOG_FILE: &str = "cv.log";

/// Two passes so moderncv's page references settle.
const PASSES: usize = 2;

pub struct LatexRenderer {
    program: String,
    timeout: Duration,
    language: Language,
    /// Parent of the per-render scratch directory. `None` is the system temp dir.
    work_root: Option<PathBuf>,
}

impl LatexRenderer {
    pub fn new(program: impl Into<String>, timeout: Duration, language: Language) -> Self {
        Self {
            program: program.into(),
            timeout,
            language,
            work_root: None,
        }
    }

    #[cfg(test)]
    fn in_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    async fn run_pass(&self, dir: &Path) -> Result<(), RenderError> {
        let child = Command::new(&self.program)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(SOURCE_FILE)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    RenderError::Unavailable(format!("'{}' is not installed", self.program))
                }
                _ => RenderError::Failed(format!("failed to start '{}': {e}", self.program)),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| RenderError::Failed(e.to_string()))?;

        if output.status.success() {
            return Ok(());
        }

        let log = tokio::fs::read_to_string(dir.join(LOG_FILE))
            .await
            .unwrap_or_default();
        let detail = first_error(&log)
            .unwrap_or_else(|| format!("exit status {}", output.status.code().unwrap_or(-1)));
        Err(RenderError::Failed(detail))
    }
}

#[async_trait]
impl Renderer for LatexRenderer {
    fn name(&self) -> &'static str {
        "latex"
    }

    async fn render(&self, sections: &CvSections) -> Result<Vec<u8>, RenderError> {
        let source = build_document(sections, self.language);

        // Removed on drop, whichever way this function returns.
        let mut builder = tempfile::Builder::new();
        builder.prefix("cv-render-");
        let dir = match &self.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| RenderError::Failed(format!("cannot create work dir: {e}")))?;
        tokio::fs::write(dir.path().join(SOURCE_FILE), source.as_bytes())
            .await
            .map_err(|e| RenderError::Failed(format!("cannot write source: {e}")))?;

        for pass in 1..=PASSES {
            debug!("{} pass {pass}/{PASSES} in {}", self.program, dir.path().display());
            self.run_pass(dir.path()).await?;
        }

        tokio::fs::read(dir.path().join(OUTPUT_FILE))
            .await
            .map_err(|e| RenderError::Failed(format!("no PDF produced: {e}")))
    }
}

/// First `!` error line of a compiler log, with the line that follows it.
fn first_error(log: &str) -> Option<String> {
    let mut lines = log.lines();
    while let Some(line) = lines.next() {
        if line.starts_with('!') {
            let context = lines.next().map(str::trim).unwrap_or_default();
            return Some(if context.is_empty() {
                line.to_string()
            } else {
                format!("{line} {context}")
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_picks_bang_line() {
        let log = "This is pdfTeX\n(./cv.tex\n! Undefined control sequence.\nl.12 \\foo\n! Second\n";
        assert_eq!(
            first_error(log).as_deref(),
            Some(r"! Undefined control sequence. l.12 \foo")
        );
        assert_eq!(first_error("all good"), None);
    }

    #[tokio::test]
    async fn test_missing_compiler_is_unavailable() {
        let renderer = LatexRenderer::new(
            "definitely-not-a-latex-compiler",
            Duration::from_secs(5),
            Language::Fr,
        );
        let err = renderer.render(&CvSections::default()).await.unwrap_err();
        assert!(matches!(err, RenderError::Unavailable(_)), "{err:?}");
    }

    fn leftover_entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[tokio::test]
    async fn test_failing_compiler_is_failed() {
        let root = tempfile::tempdir().unwrap();
        let renderer = LatexRenderer::new("false", Duration::from_secs(5), Language::Fr)
            .in_work_root(root.path());
        let err = renderer.render(&CvSections::default()).await.unwrap_err();
        assert!(matches!(err, RenderError::Failed(_)), "{err:?}");
        assert_eq!(leftover_entries(root.path()), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hanging_compiler_times_out_and_cleans_up() {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = tempfile::tempdir().unwrap();
        let compiler = bin_dir.path().join("slow-latex");
        std::fs::write(&compiler, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&compiler, std::fs::Permissions::from_mode(0o755)).unwrap();

        let root = tempfile::tempdir().unwrap();
        let renderer = LatexRenderer::new(
            compiler.to_string_lossy(),
            Duration::from_secs(1),
            Language::Fr,
        )
        .in_work_root(root.path());

        let started = std::time::Instant::now();
        let err = renderer.render(&CvSections::default()).await.unwrap_err();

        assert!(matches!(err, RenderError::Timeout { secs: 1 }), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(leftover_entries(root.path()), 0);
    }
}
