use crate::core::models::BundleReport;
use crate::utils::{OjPackError, Result};
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn read_file(&self, path: &Path) -> std::io::Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
}

/// One external command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Written to the child's stdin, which is then closed
    pub stdin: Option<String>,
}

impl ProcessRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external tools. Spawn failures are `Err`; a non-zero exit is an `Ok`
/// output the caller has to inspect.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput>;
}

/// One user-initiated bundle request, from target file to delivered artifact
#[async_trait]
pub trait BundleService: Send + Sync {
    async fn run(&self, target: &Path) -> Result<BundleReport>;
}

/// Read-only view over the user's settings
pub trait ConfigProvider: Send + Sync {
    fn lookup(&self, name: &str) -> Option<serde_json::Value>;
}

/// Typed lookup; a missing or mistyped key is a configuration error naming it
pub fn get_config<T: DeserializeOwned>(provider: &dyn ConfigProvider, name: &str) -> Result<T> {
    let value = provider
        .lookup(name)
        .ok_or_else(|| OjPackError::config(format!("Failed to get configuration: \"{}\"", name)))?;

    serde_json::from_value(value).map_err(|e| {
        OjPackError::config(format!("Invalid value for configuration \"{}\": {}", name, e))
    })
}
