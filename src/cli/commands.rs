use crate::core::{interfaces::*, models::*, services::*};
use crate::infrastructure::{
    CodeTransformer, TokioFileSystemService, TokioProcessRunner, CLANG_FORMAT, OJ_BUNDLE, PYMINIFY,
};
use crate::utils::{BundleUI, ConfigLoader, Logger, OjPackConfig, CONFIG_FILE_NAME};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ojpack")]
#[command(version)]
#[command(about = "ojpack - bundle a solution and its library code into one submittable file")]
pub struct Cli {
    /// Log every pipeline stage and tool invocation
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub tools: ToolPrograms,

    #[command(subcommand)]
    pub command: Commands,
}

/// External executables, for installs under another name (e.g. clang-format-18)
#[derive(Args, Debug, Clone)]
pub struct ToolPrograms {
    #[arg(long, global = true, value_name = "PROGRAM", default_value = OJ_BUNDLE)]
    pub oj_bundle: String,
    #[arg(long, global = true, value_name = "PROGRAM", default_value = CLANG_FORMAT)]
    pub clang_format: String,
    #[arg(long, global = true, value_name = "PROGRAM", default_value = PYMINIFY)]
    pub pyminify: String,
}

impl ToolPrograms {
    pub fn transformer(&self, runner: Arc<dyn ProcessRunner>) -> CodeTransformer {
        CodeTransformer::new(runner)
            .with_clang_format(self.clang_format.clone())
            .with_pyminify(self.pyminify.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve dependencies, transform and deliver a solution
    Bundle {
        /// Solution file (.c, .cpp, .py, ...)
        file: PathBuf,
        /// Extra include directory for oj-bundle (repeatable)
        #[arg(short = 'I', long = "include")]
        include: Vec<String>,
        /// "clipboard" or a path template such as ${fileDirname}/submit${fileExtname}
        #[arg(long)]
        dest: Option<String>,
        /// Minify the bundled code
        #[arg(long)]
        minify: bool,
        /// Drop #line directives entirely
        #[arg(long)]
        erase_line_directives: bool,
        /// Keep #line numbers but drop the file paths
        #[arg(long)]
        hide_path: bool,
        /// Never, Inherit, Compress, LLVM, Google, Chromium, Mozilla, WebKit, Microsoft, GNU
        #[arg(long)]
        format_style: Option<FormatStyle>,
        /// Submit the file as written, without resolving dependencies
        #[arg(long)]
        no_bundle: bool,
        /// Workspace folder holding ojpack.config.json
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
    /// Format a single file with clang-format
    Format {
        file: PathBuf,
        #[arg(long)]
        format_style: Option<FormatStyle>,
        /// Rewrite the file instead of printing to stdout
        #[arg(long)]
        in_place: bool,
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
    /// Minify a single file
    Minify {
        file: PathBuf,
        /// Rewrite the file instead of printing to stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Write an example ojpack.config.json
    Init {
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

/// Flags that map onto configuration keys. Switches left off stay unset so
/// the config file decides.
#[derive(Debug, Default)]
pub struct BundleFlags {
    pub include: Vec<String>,
    pub dest: Option<String>,
    pub minify: bool,
    pub erase_line_directives: bool,
    pub hide_path: bool,
    pub format_style: Option<FormatStyle>,
    pub no_bundle: bool,
}

impl BundleFlags {
    pub fn into_config(self) -> OjPackConfig {
        OjPackConfig {
            include_path: (!self.include.is_empty()).then_some(self.include),
            hide_path: self.hide_path.then_some(true),
            erase_line_directives: self.erase_line_directives.then_some(true),
            minify: self.minify.then_some(true),
            format_style: self.format_style,
            bundled_file_destination: self.dest,
            bundle: self.no_bundle.then_some(false),
        }
    }
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        let cli = Cli::parse();

        Logger::init(cli.verbose);

        match cli.command {
            Commands::Bundle {
                file,
                include,
                dest,
                minify,
                erase_line_directives,
                hide_path,
                format_style,
                no_bundle,
                workspace,
            } => {
                let flags = BundleFlags {
                    include,
                    dest,
                    minify,
                    erase_line_directives,
                    hide_path,
                    format_style,
                    no_bundle,
                };
                self.handle_bundle_command(&file, &workspace, flags, &cli.tools).await
            }
            Commands::Format {
                file,
                format_style,
                in_place,
                workspace,
            } => {
                self.handle_format_command(&file, &workspace, format_style, in_place, &cli.tools)
                    .await
            }
            Commands::Minify { file, in_place } => {
                self.handle_minify_command(&file, in_place, &cli.tools).await
            }
            Commands::Init { workspace } => self.handle_init_command(&workspace).await,
        }
    }

    async fn handle_bundle_command(
        &self,
        file: &Path,
        workspace: &Path,
        flags: BundleFlags,
        tools: &ToolPrograms,
    ) -> Result<()> {
        let workspace = absolute(workspace)?;
        let config = load_configuration(&workspace, flags.into_config())?;

        let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);
        let pipeline = BundlePipeline::new(fs_service, runner.clone(), config, &workspace)
            .with_transformer(tools.transformer(runner))
            .with_oj_bundle_program(tools.oj_bundle.clone());

        let file_name = display_name(file);
        let mut ui = BundleUI::new();
        ui.start(&format!("Bundling {}", file_name));

        match pipeline.run(file).await {
            Ok(report) => {
                ui.finish_delivered(&file_name, &report.delivered_to, report.artifact.size());
                Ok(())
            }
            Err(e) => {
                ui.fail(&e.format_detailed());
                bail!("could not bundle {}", file.display())
            }
        }
    }

    async fn handle_format_command(
        &self,
        file: &Path,
        workspace: &Path,
        format_style: Option<FormatStyle>,
        in_place: bool,
        tools: &ToolPrograms,
    ) -> Result<()> {
        let workspace = absolute(workspace)?;
        let cli = OjPackConfig {
            format_style,
            ..Default::default()
        };
        let style = load_configuration(&workspace, cli)?.format_style;
        let file = absolute(file)?;

        let transformer = tools.transformer(Arc::new(TokioProcessRunner));
        let (language, code) = read_target(&file).await?;
        let target_dir = file.parent().unwrap_or(&workspace);
        let formatted = transformer
            .transform_in(target_dir, &code, language, TransformMode::Format(style))
            .await;

        emit(&file, &formatted, in_place).await
    }

    async fn handle_minify_command(&self, file: &Path, in_place: bool, tools: &ToolPrograms) -> Result<()> {
        let file = absolute(file)?;
        let transformer = tools.transformer(Arc::new(TokioProcessRunner));
        let (language, code) = read_target(&file).await?;
        let minified = transformer.transform(&code, language, TransformMode::Minify).await;

        emit(&file, &minified, in_place).await
    }

    async fn handle_init_command(&self, workspace: &Path) -> Result<()> {
        let config_path = workspace.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            bail!("{} already exists", config_path.display());
        }

        TokioFileSystemService
            .write_file(&config_path, &format!("{}\n", ConfigLoader::generate_example()))
            .await
            .with_context(|| format!("writing {}", config_path.display()))?;

        Logger::info(&format!("📝 Created {}", config_path.display()));
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Defaults, then ojpack.config.json in `workspace`, then `cli`
pub fn load_configuration(workspace: &Path, cli: OjPackConfig) -> Result<TransformConfiguration> {
    let provider = ConfigLoader::provider(workspace, cli)
        .with_context(|| format!("loading configuration from {}", workspace.display()))?;
    Ok(TransformConfiguration::resolve(&provider)?)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("reading the current directory")?;
    Ok(cwd.join(path))
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

async fn read_target(file: &Path) -> Result<(Language, String)> {
    let language = Language::from_path(file)?;
    let code = TokioFileSystemService
        .read_file(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    Ok((language, code))
}

async fn emit(file: &Path, code: &str, in_place: bool) -> Result<()> {
    if in_place {
        TokioFileSystemService
            .write_file(file, code)
            .await
            .with_context(|| format!("writing {}", file.display()))?;
        Logger::info(&format!("✏️  Rewrote {}", file.display()));
    } else {
        print!("{}", code);
    }
    Ok(())
}
