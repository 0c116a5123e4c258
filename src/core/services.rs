use crate::core::{interfaces::*, models::*};
use crate::infrastructure::{
    apply_directive_transform, ArtifactDeliverer, CodeTransformer, OjBundleAdapter, PythonResolver,
};
use crate::utils::{Logger, OjPackError, Result, Timer, VariableExpander};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Records the stages a run passes through
#[derive(Debug, Default)]
struct StageTracker {
    visited: Vec<PipelineStage>,
}

impl StageTracker {
    fn enter(&mut self, stage: PipelineStage) {
        Logger::stage(&stage.to_string());
        self.visited.push(stage);
    }

    fn current(&self) -> PipelineStage {
        self.visited.last().copied().unwrap_or(PipelineStage::SelectResolver)
    }
}

/// Target file → resolved program → directive rewrite → format → minify → destination
pub struct BundlePipeline {
    fs_service: Arc<dyn FileSystemService>,
    runner: Arc<dyn ProcessRunner>,
    config: TransformConfiguration,
    workspace_folder: PathBuf,
    transformer: CodeTransformer,
    oj_bundle_program: Option<String>,
}

impl BundlePipeline {
    pub fn new(
        fs_service: Arc<dyn FileSystemService>,
        runner: Arc<dyn ProcessRunner>,
        config: TransformConfiguration,
        workspace_folder: impl Into<PathBuf>,
    ) -> Self {
        let transformer = CodeTransformer::new(runner.clone());
        Self {
            fs_service,
            runner,
            config,
            workspace_folder: workspace_folder.into(),
            transformer,
            oj_bundle_program: None,
        }
    }

    /// Replace the formatter/minifier, e.g. to move its scratch root
    pub fn with_transformer(mut self, transformer: CodeTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_oj_bundle_program(mut self, program: impl Into<String>) -> Self {
        self.oj_bundle_program = Some(program.into());
        self
    }

    async fn run_stages(&self, target: &Path, tracker: &mut StageTracker) -> Result<BundleReport> {
        let started = Instant::now();

        tracker.enter(PipelineStage::SelectResolver);
        // Decided from the extension alone, before touching disk or tools
        let language = Language::from_path(target)?;
        let target = if target.is_absolute() {
            target.to_path_buf()
        } else {
            std::env::current_dir()?.join(target)
        };
        let expander = VariableExpander::new(&self.workspace_folder).with_active_file(&target);
        Logger::bundle_start(&target.display().to_string(), language.name());

        tracker.enter(PipelineStage::Resolve);
        let artifact = self.resolve(&target, language, &expander).await?;

        tracker.enter(PipelineStage::ApplyDirectiveTransform);
        let mut code = artifact.code;
        if language.emits_line_directives() {
            if let Some(transform) = self.config.directive_transform() {
                code = apply_directive_transform(&code, transform);
            }
        }

        tracker.enter(PipelineStage::MaybeFormat);
        if self.config.format_style != FormatStyle::Never {
            let target_dir = target.parent().unwrap_or(&self.workspace_folder);
            code = self
                .transformer
                .transform_in(target_dir, &code, language, TransformMode::Format(self.config.format_style))
                .await;
        }

        tracker.enter(PipelineStage::MaybeMinify);
        if self.config.minify {
            code = self.transformer.transform(&code, language, TransformMode::Minify).await;
        }

        tracker.enter(PipelineStage::Deliver);
        let deliverer = ArtifactDeliverer::new(self.fs_service.clone(), self.runner.clone());
        let delivered_to = deliverer
            .deliver(&code, &self.config.bundled_file_destination, &expander)
            .await?;

        tracker.enter(PipelineStage::Done);
        Ok(BundleReport {
            artifact: BundledArtifact::new(code, language, artifact.root),
            delivered_to,
            stages: tracker.visited.clone(),
            build_time: started.elapsed(),
        })
    }

    async fn resolve(
        &self,
        target: &Path,
        language: Language,
        expander: &VariableExpander,
    ) -> Result<BundledArtifact> {
        if !self.config.bundle {
            let source = self.read_source(target, language).await?;
            return Ok(BundledArtifact::new(source.content, source.language, source.path));
        }

        match language.family() {
            LanguageFamily::CFamily => {
                let mut adapter = OjBundleAdapter::new(self.runner.clone(), expander.clone());
                if let Some(program) = &self.oj_bundle_program {
                    adapter = adapter.with_program(program.clone());
                }
                adapter.bundle(target, language, &self.config.include_path).await
            }
            LanguageFamily::Python => {
                PythonResolver::new(self.fs_service.clone(), expander.clone())?
                    .resolve(target)
                    .await
            }
        }
    }

    async fn read_source(&self, path: &Path, language: Language) -> Result<SourceFile> {
        let content = self.fs_service.read_file(path).await.map_err(|e| {
            OjPackError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot read {}: {}", path.display(), e),
            ))
        })?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            content,
            language,
        })
    }
}

#[async_trait::async_trait]
impl BundleService for BundlePipeline {
    async fn run(&self, target: &Path) -> Result<BundleReport> {
        let _timer = Timer::start("bundle pipeline");
        let mut tracker = StageTracker::default();

        match self.run_stages(target, &mut tracker).await {
            Ok(report) => Ok(report),
            Err(e) => {
                Logger::debug(&format!(
                    "Pipeline {} during {}: {}",
                    PipelineStage::Failed,
                    tracker.current(),
                    e
                ));
                Err(e)
            }
        }
    }
}
