use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OjPackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot resolve {}: imported from {} but the file could not be read", .path.display(), .importer.display())]
    Resolution {
        path: PathBuf,
        importer: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bundle the file: oj-bundle exited with {}", status_label(.status))]
    BundleTool {
        status: Option<i32>,
        stderr: String,
    },

    #[error("Unsupported language: {}", .path.display())]
    UnsupportedLanguage { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Formatter/minifier failure. Always recovered by the caller.
    #[error("Transform failed: {0}")]
    Transform(String),
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal or failed to start)".to_string(),
    }
}

impl OjPackError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }

    /// Format error with the extra context a terminal user needs
    pub fn format_detailed(&self) -> String {
        match self {
            OjPackError::Resolution { path, importer, source } => format!(
                "❌ Resolution Error: {}\n📁 Missing: {}\n📎 Imported by: {}",
                source,
                path.display(),
                importer.display()
            ),
            OjPackError::BundleTool { stderr, .. } if !stderr.trim().is_empty() => {
                let mut output = format!("❌ {}\n📝 oj-bundle output:\n", self);
                for line in stderr.lines() {
                    output.push_str(&format!("  │ {}\n", line));
                }
                output
            }
            _ => format!("❌ {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OjPackError>;

impl From<regex::Error> for OjPackError {
    fn from(err: regex::Error) -> Self {
        OjPackError::config(format!("Regex error: {}", err))
    }
}

impl From<serde_json::Error> for OjPackError {
    fn from(err: serde_json::Error) -> Self {
        OjPackError::config(err.to_string())
    }
}
