use std::collections::HashMap;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(?P<name>[A-Za-z][A-Za-z0-9_]*)(?::(?P<arg>[^}]*))?\}").unwrap()
});

/// Expands `${...}` tokens in configured paths.
///
/// Supported tokens:
/// - `${workspaceFolder}`, `${workspaceFolderBasename}`
/// - `${file}`, `${fileBasename}`, `${fileBasenameNoExtension}`,
///   `${fileDirname}`, `${fileExtname}`
/// - `${userHome}`, `${cwd}`
/// - `${env:NAME}` (empty when unset)
///
/// Unknown tokens are left as written.
#[derive(Debug, Clone, Default)]
pub struct VariableExpander {
    workspace_folder: Option<PathBuf>,
    active_file: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

impl VariableExpander {
    pub fn new(workspace_folder: impl Into<PathBuf>) -> Self {
        Self {
            workspace_folder: Some(workspace_folder.into()),
            ..Self::default()
        }
    }

    pub fn with_active_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.active_file = Some(file.into());
        self
    }

    /// Pin a value for `${env:NAME}` without touching the process environment
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn expand(&self, input: &str) -> String {
        if !input.contains("${") {
            return input.to_string();
        }

        VARIABLE_REGEX
            .replace_all(input, |caps: &Captures| {
                let name = &caps["name"];
                let arg = caps.name("arg").map(|m| m.as_str());
                self.lookup(name, arg)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn expand_path(&self, input: &str) -> PathBuf {
        PathBuf::from(self.expand(input))
    }

    fn lookup(&self, name: &str, arg: Option<&str>) -> Option<String> {
        match (name, arg) {
            ("env", Some(key)) => Some(
                self.overrides
                    .get(key)
                    .cloned()
                    .or_else(|| std::env::var(key).ok())
                    .unwrap_or_default(),
            ),
            (_, Some(_)) => None,
            ("workspaceFolder", None) => self.workspace_folder.as_deref().map(display),
            ("workspaceFolderBasename", None) => self
                .workspace_folder
                .as_deref()
                .and_then(Path::file_name)
                .map(|s| s.to_string_lossy().into_owned()),
            ("file", None) => self.active_file.as_deref().map(display),
            ("fileBasename", None) => self
                .active_file
                .as_deref()
                .and_then(Path::file_name)
                .map(|s| s.to_string_lossy().into_owned()),
            ("fileBasenameNoExtension", None) => self
                .active_file
                .as_deref()
                .and_then(Path::file_stem)
                .map(|s| s.to_string_lossy().into_owned()),
            ("fileDirname", None) => self
                .active_file
                .as_deref()
                .and_then(Path::parent)
                .map(display),
            ("fileExtname", None) => self.active_file.as_deref().map(|p| {
                p.extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default()
            }),
            ("userHome", None) => dirs::home_dir().as_deref().map(display),
            ("cwd", None) => std::env::current_dir().ok().as_deref().map(display),
            _ => None,
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
