use std::path::Path;
use std::sync::Arc;

use crate::core::interfaces::{ProcessRequest, ProcessRunner};
use crate::core::models::{BundledArtifact, Language};
use crate::utils::{Logger, OjPackError, Result, Timer, VariableExpander};

pub const OJ_BUNDLE: &str = "oj-bundle";

/// Delegates C and C++ bundling to `oj-bundle`
pub struct OjBundleAdapter {
    runner: Arc<dyn ProcessRunner>,
    expander: VariableExpander,
    program: String,
}

impl OjBundleAdapter {
    pub fn new(runner: Arc<dyn ProcessRunner>, expander: VariableExpander) -> Self {
        Self {
            runner,
            expander,
            program: OJ_BUNDLE.to_string(),
        }
    }

    /// Use a different executable, e.g. an absolute path to `oj-bundle`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn request(&self, root: &Path, include_paths: &[String]) -> ProcessRequest {
        let mut request = ProcessRequest::new(&self.program).arg(root.to_string_lossy());
        for include in include_paths {
            request = request.args(["-I".to_string(), self.expander.expand(include)]);
        }
        match root.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => request.current_dir(dir),
            _ => request,
        }
    }

    pub async fn bundle(
        &self,
        root: &Path,
        language: Language,
        include_paths: &[String],
    ) -> Result<BundledArtifact> {
        let _timer = Timer::start("oj-bundle");

        let output = self
            .runner
            .run(self.request(root, include_paths))
            .await
            .map_err(|e| OjPackError::BundleTool {
                status: None,
                stderr: e.to_string(),
            })?;

        if !output.stderr.trim().is_empty() {
            Logger::tool_stderr(&self.program, &output.stderr);
        }

        if !output.success() {
            return Err(OjPackError::BundleTool {
                status: output.status,
                stderr: output.stderr,
            });
        }

        Ok(BundledArtifact::new(output.stdout, language, root))
    }
}
