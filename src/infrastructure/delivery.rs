use std::path::PathBuf;
use std::sync::Arc;

use crate::core::interfaces::{FileSystemService, ProcessRequest, ProcessRunner};
use crate::core::models::Destination;
use crate::utils::{Logger, OjPackError, Result, VariableExpander};

/// Platform clipboard command reading the text from stdin
pub fn clipboard_command() -> ProcessRequest {
    if cfg!(target_os = "macos") {
        ProcessRequest::new("pbcopy")
    } else if cfg!(windows) {
        ProcessRequest::new("clip")
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        ProcessRequest::new("wl-copy")
    } else {
        ProcessRequest::new("xclip").args(["-selection", "clipboard"])
    }
}

/// Writes the final artifact to the clipboard or a file
pub struct ArtifactDeliverer {
    fs_service: Arc<dyn FileSystemService>,
    runner: Arc<dyn ProcessRunner>,
}

impl ArtifactDeliverer {
    pub fn new(fs_service: Arc<dyn FileSystemService>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { fs_service, runner }
    }

    /// Returns a description of where the code ended up
    pub async fn deliver(
        &self,
        code: &str,
        destination: &Destination,
        expander: &VariableExpander,
    ) -> Result<String> {
        let delivered_to = match destination {
            Destination::Clipboard => {
                self.copy_to_clipboard(code).await?;
                "clipboard".to_string()
            }
            Destination::File(template) => {
                let path = self.resolve_file(template, expander)?;
                self.fs_service.write_file(&path, code).await?;
                path.display().to_string()
            }
        };

        Logger::delivered(&delivered_to, code.len());
        Ok(delivered_to)
    }

    fn resolve_file(&self, template: &str, expander: &VariableExpander) -> Result<PathBuf> {
        let path = expander.expand_path(template);
        if path.as_os_str().is_empty() {
            return Err(OjPackError::delivery("bundled file destination is empty"));
        }
        if path.is_dir() {
            return Err(OjPackError::delivery(format!(
                "{} is a directory, not a file",
                path.display()
            )));
        }
        Ok(path)
    }

    async fn copy_to_clipboard(&self, code: &str) -> Result<()> {
        let request = clipboard_command().stdin(code);
        let program = request.program.clone();

        let output = self.runner.run(request).await.map_err(|e| {
            OjPackError::delivery(format!("could not run {}: {}", program, e))
        })?;

        if !output.success() {
            return Err(OjPackError::delivery(format!(
                "{} exited with {:?}: {}",
                program,
                output.status,
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}
