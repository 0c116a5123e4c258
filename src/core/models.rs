use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::core::interfaces::{get_config, ConfigProvider};
use crate::utils::{OjPackError, Result};

/// Configuration keys, as spelled in `ojpack.config.json`
pub mod keys {
    pub const INCLUDE_PATH: &str = "includePath";
    pub const HIDE_PATH: &str = "hidePath";
    pub const ERASE_LINE_DIRECTIVES: &str = "eraseLineDirectives";
    pub const MINIFY: &str = "minify";
    pub const FORMAT_STYLE: &str = "formatStyle";
    pub const BUNDLED_FILE_DESTINATION: &str = "bundledFileDestination";
    pub const BUNDLE: &str = "bundle";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    C,
    Cpp,
    Python,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// Bundled by `oj-bundle`, emits `#line` directives, formatted by clang-format
    CFamily,
    /// Bundled by the marker-comment resolver, minified by pyminify
    Python,
}

impl Language {
    /// The one extension table. Anything not listed here is unsupported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx" => Some(Language::Cpp),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| OjPackError::UnsupportedLanguage { path: path.to_path_buf() })
    }

    pub fn family(self) -> LanguageFamily {
        match self {
            Language::C | Language::Cpp => LanguageFamily::CFamily,
            Language::Python => LanguageFamily::Python,
        }
    }

    /// Extension used for scratch files when only the language is known
    pub fn default_extension(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Python => "py",
        }
    }

    pub fn emits_line_directives(self) -> bool {
        self.family() == LanguageFamily::CFamily
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Python => "Python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source file read from disk for one pipeline run
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub language: Language,
}

/// The single-file program produced by a resolver or bundler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledArtifact {
    pub code: String,
    pub language: Language,
    pub root: PathBuf,
}

impl BundledArtifact {
    pub fn new(code: impl Into<String>, language: Language, root: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            language,
            root: root.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.code.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatStyle {
    /// Leave the code alone
    Never,
    /// Use whatever `.clang-format` the tool discovers on its own
    Inherit,
    /// Dense single-line style, also used for minification
    Compress,
    #[serde(rename = "LLVM")]
    Llvm,
    Google,
    Chromium,
    Mozilla,
    WebKit,
    Microsoft,
    #[serde(rename = "GNU")]
    Gnu,
}

impl FormatStyle {
    pub const ALL: [FormatStyle; 10] = [
        FormatStyle::Never,
        FormatStyle::Inherit,
        FormatStyle::Compress,
        FormatStyle::Llvm,
        FormatStyle::Google,
        FormatStyle::Chromium,
        FormatStyle::Mozilla,
        FormatStyle::WebKit,
        FormatStyle::Microsoft,
        FormatStyle::Gnu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatStyle::Never => "Never",
            FormatStyle::Inherit => "Inherit",
            FormatStyle::Compress => "Compress",
            FormatStyle::Llvm => "LLVM",
            FormatStyle::Google => "Google",
            FormatStyle::Chromium => "Chromium",
            FormatStyle::Mozilla => "Mozilla",
            FormatStyle::WebKit => "WebKit",
            FormatStyle::Microsoft => "Microsoft",
            FormatStyle::Gnu => "GNU",
        }
    }
}

impl fmt::Display for FormatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatStyle {
    type Err = OjPackError;

    fn from_str(s: &str) -> Result<Self> {
        FormatStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = FormatStyle::ALL.iter().map(|style| style.name()).collect();
                OjPackError::config(format!(
                    "Unknown format style \"{}\" (expected one of: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    Format(FormatStyle),
    Minify,
}

impl TransformMode {
    pub fn verb(self) -> &'static str {
        match self {
            TransformMode::Format(_) => "format",
            TransformMode::Minify => "minify",
        }
    }
}

/// Which line-directive rewrite a run applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveTransform {
    Erase,
    HidePath,
}

/// Where the final artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Clipboard,
    /// Path template, expanded against the run's variables at delivery time
    File(String),
}

impl Destination {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("clipboard") {
            Destination::Clipboard
        } else {
            Destination::File(value.to_string())
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Clipboard => f.write_str("clipboard"),
            Destination::File(template) => f.write_str(template),
        }
    }
}

/// Options read once at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfiguration {
    pub include_path: Vec<String>,
    pub hide_path: bool,
    pub erase_line_directives: bool,
    pub minify: bool,
    pub format_style: FormatStyle,
    pub bundled_file_destination: Destination,
    /// `false` submits the target as written, without resolving dependencies
    pub bundle: bool,
}

impl Default for TransformConfiguration {
    fn default() -> Self {
        Self {
            include_path: Vec::new(),
            hide_path: false,
            erase_line_directives: false,
            minify: false,
            format_style: FormatStyle::Never,
            bundled_file_destination: Destination::Clipboard,
            bundle: true,
        }
    }
}

impl TransformConfiguration {
    pub fn resolve(provider: &dyn ConfigProvider) -> Result<Self> {
        let destination: String = get_config(provider, keys::BUNDLED_FILE_DESTINATION)?;
        Ok(Self {
            include_path: get_config(provider, keys::INCLUDE_PATH)?,
            hide_path: get_config(provider, keys::HIDE_PATH)?,
            erase_line_directives: get_config(provider, keys::ERASE_LINE_DIRECTIVES)?,
            minify: get_config(provider, keys::MINIFY)?,
            format_style: get_config(provider, keys::FORMAT_STYLE)?,
            bundled_file_destination: Destination::parse(&destination),
            bundle: get_config(provider, keys::BUNDLE)?,
        })
    }

    /// Erase wins when both are configured
    pub fn directive_transform(&self) -> Option<DirectiveTransform> {
        if self.erase_line_directives {
            Some(DirectiveTransform::Erase)
        } else if self.hide_path {
            Some(DirectiveTransform::HidePath)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    SelectResolver,
    Resolve,
    ApplyDirectiveTransform,
    MaybeFormat,
    MaybeMinify,
    Deliver,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::SelectResolver => "select resolver",
            PipelineStage::Resolve => "resolve",
            PipelineStage::ApplyDirectiveTransform => "apply directive transform",
            PipelineStage::MaybeFormat => "format",
            PipelineStage::MaybeMinify => "minify",
            PipelineStage::Deliver => "deliver",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a finished run produced and where it went
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub artifact: BundledArtifact,
    pub delivered_to: String,
    /// Stages entered, in order, ending with `Done`
    pub stages: Vec<PipelineStage>,
    pub build_time: std::time::Duration,
}
