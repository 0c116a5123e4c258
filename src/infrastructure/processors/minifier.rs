use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::fs;

use crate::core::interfaces::{ProcessRequest, ProcessRunner};
use crate::core::models::{FormatStyle, Language, LanguageFamily, TransformMode};
use crate::utils::{Logger, OjPackError, Result, Timer};

pub const CLANG_FORMAT: &str = "clang-format";
pub const PYMINIFY: &str = "pyminify";

/// Dense single-line clang-format style
const COMPRESS_STYLE: &str = include_str!("styles/compress.clang-format");

/// `.clang-format` contents for a style, `None` when no file should be written
pub fn style_descriptor(style: FormatStyle) -> Option<String> {
    match style {
        FormatStyle::Never | FormatStyle::Inherit => None,
        FormatStyle::Compress => Some(COMPRESS_STYLE.to_string()),
        named => Some(format!("---\nBasedOnStyle: {}\n", named.name())),
    }
}

/// Uniquely named directory for one tool invocation. Removed when dropped,
/// so every exit path cleans up.
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    pub async fn create(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent).await?;
        let dir = tempfile::Builder::new()
            .prefix(".ojpack-")
            .rand_bytes(32)
            .tempdir_in(parent)?;
        Logger::debug(&format!("📁 Scratch workspace: {}", dir.path().display()));
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            Logger::warn(&format!("Failed to remove {}: {}", path.display(), e));
        }
    }
}

/// Formats or minifies code through external tools, falling back to the
/// input whenever the tool cannot produce a result.
pub struct CodeTransformer {
    runner: Arc<dyn ProcessRunner>,
    scratch_root: PathBuf,
    clang_format: String,
    pyminify: String,
}

impl CodeTransformer {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            scratch_root: std::env::temp_dir(),
            clang_format: CLANG_FORMAT.to_string(),
            pyminify: PYMINIFY.to_string(),
        }
    }

    /// Directory scratch workspaces are created in when no other is given
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    pub fn with_clang_format(mut self, program: impl Into<String>) -> Self {
        self.clang_format = program.into();
        self
    }

    pub fn with_pyminify(mut self, program: impl Into<String>) -> Self {
        self.pyminify = program.into();
        self
    }

    pub async fn transform(&self, text: &str, language: Language, mode: TransformMode) -> String {
        self.transform_in(&self.scratch_root, text, language, mode).await
    }

    /// Same as [`transform`](Self::transform), with the scratch workspace
    /// created under `scratch_parent`. Formatting with `Inherit` relies on
    /// this to pick up the user's own `.clang-format` from parent directories.
    pub async fn transform_in(
        &self,
        scratch_parent: &Path,
        text: &str,
        language: Language,
        mode: TransformMode,
    ) -> String {
        if mode == TransformMode::Format(FormatStyle::Never) {
            return text.to_string();
        }
        if language.family() == LanguageFamily::Python && matches!(mode, TransformMode::Format(_)) {
            Logger::debug("No formatter for Python, leaving code as is");
            return text.to_string();
        }

        let _timer = Timer::start(mode.verb());
        match self.try_transform(scratch_parent, text, language, mode).await {
            Ok(result) => result,
            Err(e) => {
                Logger::transform_fallback(mode.verb(), &e.to_string());
                text.to_string()
            }
        }
    }

    async fn try_transform(
        &self,
        scratch_parent: &Path,
        text: &str,
        language: Language,
        mode: TransformMode,
    ) -> Result<String> {
        let workspace = ScratchWorkspace::create(scratch_parent).await?;

        let stem = match mode {
            TransformMode::Format(_) => "formatted",
            TransformMode::Minify => "minified",
        };
        let file_name = format!("{}.{}", stem, language.default_extension());
        let file_path = workspace.path().join(&file_name);
        fs::write(&file_path, text).await?;

        // An early return drops `workspace`, which deletes it
        let result = match language.family() {
            LanguageFamily::CFamily => {
                let style = match mode {
                    TransformMode::Format(style) => style,
                    TransformMode::Minify => FormatStyle::Compress,
                };
                self.run_clang_format(&workspace, &file_name, style).await
            }
            LanguageFamily::Python => self.run_pyminify(&workspace, &file_name).await,
        };

        workspace.close();
        result
    }

    async fn run_clang_format(
        &self,
        workspace: &ScratchWorkspace,
        file_name: &str,
        style: FormatStyle,
    ) -> Result<String> {
        if let Some(descriptor) = style_descriptor(style) {
            fs::write(workspace.path().join(".clang-format"), descriptor).await?;
        }

        let request = ProcessRequest::new(&self.clang_format)
            .args(["-i", "--style=file", file_name])
            .current_dir(workspace.path());
        let output = self.runner.run(request).await?;

        if !output.success() {
            return Err(OjPackError::transform(format!(
                "{} exited with {:?}: {}",
                self.clang_format,
                output.status,
                output.stderr.trim()
            )));
        }

        Ok(fs::read_to_string(workspace.path().join(file_name)).await?)
    }

    async fn run_pyminify(&self, workspace: &ScratchWorkspace, file_name: &str) -> Result<String> {
        let request = ProcessRequest::new(&self.pyminify)
            .arg(workspace.path().join(file_name).to_string_lossy())
            .current_dir(workspace.path());
        let output = self.runner.run(request).await?;

        if !output.success() {
            return Err(OjPackError::transform(format!(
                "{} exited with {:?}: {}",
                self.pyminify,
                output.status,
                output.stderr.trim()
            )));
        }
        if output.stdout.trim().is_empty() {
            return Err(OjPackError::transform(format!("{} produced no output", self.pyminify)));
        }

        Ok(output.stdout)
    }
}
