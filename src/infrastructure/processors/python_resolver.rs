//! Inlines local Python modules into a single file.
//!
//! A dependency edge is an import statement followed by a marker comment:
//!
//! ```text
//! from foo import bar  # !oj-ext import ./lib/foo.py
//! ```
//!
//! The marker path is authoritative; the import itself is never interpreted.
//! Each matched region becomes
//!
//! ```text
//! # begin import bar
//! <contents of lib/foo.py>
//! # end import bar
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use sugar_path::SugarPath;

use crate::core::interfaces::FileSystemService;
use crate::core::models::{BundledArtifact, Language};
use crate::utils::{Logger, OjPackError, Result, Timer, VariableExpander};

pub const DEFAULT_MARKER_TAG: &str = "oj-ext";

fn marker_regex(tag: &str) -> Result<Regex> {
    let pattern = format!(
        r"(?mR)^[ \t]*(?:from[ \t]+[\w.]+[ \t]+)?import[ \t]+(?P<symbol>[\w.]+)(?:[ \t]+as[ \t]+\w+)?\s*#[ \t]*!{}[ \t]+import[ \t]+(?P<path>\S+)[ \t]*$",
        regex::escape(tag)
    );
    Ok(Regex::new(&pattern)?)
}

/// Lexically normalized absolute path, lower-cased where the file system
/// ignores case
pub fn normalize_path(path: &Path) -> PathBuf {
    let normalized = path.normalize();
    if cfg!(windows) {
        PathBuf::from(normalized.to_string_lossy().to_lowercase())
    } else {
        normalized
    }
}

#[derive(Debug)]
struct ImportMarker {
    start: usize,
    end: usize,
    symbol: String,
    declared_path: String,
}

pub struct PythonResolver {
    fs_service: Arc<dyn FileSystemService>,
    expander: VariableExpander,
    marker: Regex,
}

impl PythonResolver {
    pub fn new(fs_service: Arc<dyn FileSystemService>, expander: VariableExpander) -> Result<Self> {
        Ok(Self {
            fs_service,
            expander,
            marker: marker_regex(DEFAULT_MARKER_TAG)?,
        })
    }

    pub fn with_marker_tag(mut self, tag: &str) -> Result<Self> {
        self.marker = marker_regex(tag)?;
        Ok(self)
    }

    /// Resolve `root` and every file it transitively imports into one text.
    ///
    /// Each resolved path is inlined at most once per call. Later imports of
    /// an already inlined path, including cyclic ones, become empty text.
    pub async fn resolve(&self, root: &Path) -> Result<BundledArtifact> {
        let _timer = Timer::start("Python dependency resolution");

        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        let root = normalize_path(&absolute);

        let mut seen = HashSet::new();
        seen.insert(root.clone());

        let code = self.inline(&root, None, &mut seen).await?;
        Logger::debug(&format!("Inlined {} file(s) into {}", seen.len(), root.display()));

        Ok(BundledArtifact::new(code, Language::Python, root))
    }

    fn inline<'a>(
        &'a self,
        path: &'a Path,
        importer: Option<&'a Path>,
        seen: &'a mut HashSet<PathBuf>,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            let content = self.fs_service.read_file(path).await.map_err(|source| match importer {
                Some(importer) => OjPackError::Resolution {
                    path: path.to_path_buf(),
                    importer: importer.to_path_buf(),
                    source,
                },
                None => OjPackError::Io(std::io::Error::new(
                    source.kind(),
                    format!("cannot read {}: {}", path.display(), source),
                )),
            })?;

            let markers = self.scan(&content);
            if markers.is_empty() {
                return Ok(content);
            }

            let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
            let base_dir = path.parent().unwrap_or(path);
            let mut output = String::with_capacity(content.len());
            let mut last = 0;

            for marker in markers {
                output.push_str(&content[last..marker.start]);
                last = marker.end;

                let expanded = self.expander.expand(&marker.declared_path);
                let resolved = normalize_path(&base_dir.join(expanded));

                if !seen.insert(resolved.clone()) {
                    Logger::debug(&format!(
                        "Skipping duplicate import of {} in {}",
                        resolved.display(),
                        path.display()
                    ));
                    continue;
                }

                Logger::debug(&format!("🔍 Inlining {} as {}", resolved.display(), marker.symbol));
                let inlined = self.inline(&resolved, Some(path), seen).await?;
                output.push_str(&format!(
                    "# begin import {symbol}{nl}{body}{nl}# end import {symbol}",
                    symbol = marker.symbol,
                    body = inlined.trim(),
                    nl = newline
                ));
            }

            output.push_str(&content[last..]);
            Ok(output)
        }
        .boxed()
    }

    fn scan(&self, content: &str) -> Vec<ImportMarker> {
        self.marker
            .captures_iter(content)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(ImportMarker {
                    start: whole.start(),
                    end: whole.end(),
                    symbol: caps.name("symbol")?.as_str().to_string(),
                    declared_path: caps.name("path")?.as_str().to_string(),
                })
            })
            .collect()
    }
}
