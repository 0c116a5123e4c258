use crate::support::{write_fixture, CountingFileSystem, Script, ScriptedTools};
use ojpack::core::interfaces::BundleService;
use ojpack::core::models::{Destination, FormatStyle, Language, PipelineStage, TransformConfiguration};
use ojpack::core::services::BundlePipeline;
use ojpack::infrastructure::CodeTransformer;
use ojpack::utils::OjPackError;
use std::sync::Arc;
use tempfile::tempdir;

const BUNDLED_CPP: &str = "#line 1 \"/home/me/lib/segtree.hpp\"\nstruct SegTree {};\n#line 3 \"/home/me/contest/a.cpp\"\nint main() {}\n";

fn to_file(dir: &std::path::Path, name: &str) -> Destination {
    Destination::File(dir.join(name).display().to_string())
}

#[tokio::test]
async fn test_unsupported_language_touches_nothing() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "main.rs", "fn main() {}\n");
    let fs = Arc::new(CountingFileSystem::default());
    let tools = Arc::new(ScriptedTools::new());

    let pipeline = BundlePipeline::new(fs.clone(), tools.clone(), TransformConfiguration::default(), dir.path());
    let err = pipeline.run(&target).await.unwrap_err();

    assert!(matches!(err, OjPackError::UnsupportedLanguage { .. }));
    assert_eq!(fs.reads(), 0);
    assert_eq!(fs.writes(), 0);
    assert!(tools.calls().is_empty());
}

#[tokio::test]
async fn test_cpp_bundle_passes_expanded_includes() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "contest/a.cpp", "#include \"segtree.hpp\"\n");
    let tools = Arc::new(ScriptedTools::new().script("oj-bundle", Script::Stdout(BUNDLED_CPP.to_string())));

    let config = TransformConfiguration {
        include_path: vec!["${workspaceFolder}/lib".to_string(), "/opt/ac-library".to_string()],
        bundled_file_destination: to_file(dir.path(), "submit.cpp"),
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools.clone(), config, dir.path());
    let report = pipeline.run(&target).await.unwrap();

    let call = tools.call_to("oj-bundle").unwrap();
    let lib = dir.path().join("lib").display().to_string();
    assert_eq!(
        call.args,
        vec![target.display().to_string(), "-I".to_string(), lib, "-I".to_string(), "/opt/ac-library".to_string()]
    );
    assert_eq!(call.cwd.as_deref(), Some(dir.path().join("contest").as_path()));

    // No directive option configured: output is oj-bundle's, untouched
    assert_eq!(report.artifact.code, BUNDLED_CPP);
    assert_eq!(report.artifact.language, Language::Cpp);
    assert_eq!(std::fs::read_to_string(dir.path().join("submit.cpp")).unwrap(), BUNDLED_CPP);
}

#[tokio::test]
async fn test_erase_wins_over_hide_path() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let tools = Arc::new(ScriptedTools::new().script("oj-bundle", Script::Stdout(BUNDLED_CPP.to_string())));

    let config = TransformConfiguration {
        erase_line_directives: true,
        hide_path: true,
        bundled_file_destination: to_file(dir.path(), "out.cpp"),
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools, config, dir.path());
    let report = pipeline.run(&target).await.unwrap();

    assert!(!report.artifact.code.contains("#line"));
    assert!(report.artifact.code.contains("struct SegTree {};"));
}

#[tokio::test]
async fn test_hide_path_keeps_line_numbers() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let tools = Arc::new(ScriptedTools::new().script("oj-bundle", Script::Stdout(BUNDLED_CPP.to_string())));

    let config = TransformConfiguration {
        hide_path: true,
        bundled_file_destination: to_file(dir.path(), "out.cpp"),
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools, config, dir.path());
    let report = pipeline.run(&target).await.unwrap();

    assert_eq!(report.artifact.code, "#line 1\nstruct SegTree {};\n#line 3\nint main() {}\n");
}

#[tokio::test]
async fn test_bundle_tool_failure_aborts_before_delivery() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let fs = Arc::new(CountingFileSystem::default());
    let tools = Arc::new(
        ScriptedTools::new().script("oj-bundle", Script::Fail(1, "a.cpp:1: no such file: x.hpp".to_string())),
    );

    let config = TransformConfiguration {
        bundled_file_destination: to_file(dir.path(), "out.cpp"),
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(fs.clone(), tools.clone(), config, dir.path());
    let err = pipeline.run(&target).await.unwrap_err();

    match &err {
        OjPackError::BundleTool { status, stderr } => {
            assert_eq!(*status, Some(1));
            assert!(stderr.contains("x.hpp"));
        }
        other => panic!("expected BundleTool, got {:?}", other),
    }
    assert!(err.format_detailed().contains("no such file"));
    assert_eq!(fs.writes(), 0);
    assert!(!dir.path().join("out.cpp").exists());
    assert_eq!(tools.programs(), vec!["oj-bundle"]);
}

#[tokio::test]
async fn test_missing_bundler_is_bundle_tool_error() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let tools = Arc::new(ScriptedTools::new().script("oj-bundle", Script::Missing));

    let pipeline = BundlePipeline::new(
        Arc::new(CountingFileSystem::default()),
        tools,
        TransformConfiguration::default(),
        dir.path(),
    );
    let err = pipeline.run(&target).await.unwrap_err();

    assert!(matches!(err, OjPackError::BundleTool { status: None, .. }));
}

#[tokio::test]
async fn test_minify_failure_delivers_unminified_code() {
    let dir = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let tools = Arc::new(
        ScriptedTools::new()
            .script("oj-bundle", Script::Stdout("int main() {\n  return 0;\n}\n".to_string()))
            .script("clang-format", Script::Fail(1, "invalid style".to_string())),
    );

    let config = TransformConfiguration {
        minify: true,
        bundled_file_destination: to_file(dir.path(), "out.cpp"),
        ..Default::default()
    };
    let transformer = CodeTransformer::new(tools.clone()).with_scratch_root(scratch.path());
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools.clone(), config, dir.path())
        .with_transformer(transformer);
    let report = pipeline.run(&target).await.unwrap();

    assert_eq!(report.artifact.code, "int main() {\n  return 0;\n}\n");
    assert_eq!(tools.programs(), vec!["oj-bundle", "clang-format"]);
    // Scratch workspace is gone even though the tool failed
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_format_then_minify() {
    let dir = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "");
    let tools = Arc::new(
        ScriptedTools::new()
            .script("oj-bundle", Script::Stdout("int main(){return 0;}\n".to_string()))
            .script("clang-format", Script::RewriteLastArg("int main() { return 0; }\n".to_string())),
    );

    let config = TransformConfiguration {
        format_style: FormatStyle::Google,
        minify: true,
        bundled_file_destination: to_file(dir.path(), "out.cpp"),
        ..Default::default()
    };
    let transformer = CodeTransformer::new(tools.clone()).with_scratch_root(scratch.path());
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools.clone(), config, dir.path())
        .with_transformer(transformer);
    let report = pipeline.run(&target).await.unwrap();

    assert_eq!(report.artifact.code, "int main() { return 0; }\n");

    let calls = tools.calls();
    assert_eq!(calls.len(), 3);
    // Formatting happens next to the target so a user .clang-format is in reach,
    // minification in the scratch root
    assert_eq!(calls[1].cwd.as_ref().and_then(|cwd| cwd.parent()), Some(dir.path()));
    assert_eq!(calls[2].cwd.as_ref().and_then(|cwd| cwd.parent()), Some(scratch.path()));
    assert_eq!(calls[1].args[..2], ["-i".to_string(), "--style=file".to_string()]);

    // Nothing left behind in either place
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".ojpack-"))
        .collect();
    assert!(leftovers.is_empty());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_no_bundle_submits_file_as_written() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "#include \"lib.hpp\"\nint main() {}\n");
    let tools = Arc::new(ScriptedTools::new());

    let config = TransformConfiguration {
        bundle: false,
        bundled_file_destination: Destination::Clipboard,
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools.clone(), config, dir.path());
    let report = pipeline.run(&target).await.unwrap();

    assert_eq!(report.delivered_to, "clipboard");
    assert_eq!(report.artifact.code, "#include \"lib.hpp\"\nint main() {}\n");

    // Only the clipboard tool ran, fed the artifact on stdin
    let calls = tools.calls();
    assert_eq!(calls.len(), 1);
    assert_ne!(calls[0].program, "oj-bundle");
    assert_eq!(calls[0].stdin.as_deref(), Some("#include \"lib.hpp\"\nint main() {}\n"));
}

#[tokio::test]
async fn test_clipboard_failure_is_delivery_error() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "a.cpp", "int main() {}\n");
    let tools = ["pbcopy", "clip", "wl-copy", "xclip"]
        .iter()
        .fold(ScriptedTools::new(), |tools, program| {
            tools.script(program, Script::Fail(1, "no display".to_string()))
        });

    let config = TransformConfiguration {
        bundle: false,
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), Arc::new(tools), config, dir.path());
    let err = pipeline.run(&target).await.unwrap_err();

    assert!(matches!(err, OjPackError::Delivery(_)));
}

#[tokio::test]
async fn test_destination_template_uses_target_variables() {
    let dir = tempdir().unwrap();
    let target = write_fixture(dir.path(), "abc123/d.cpp", "");
    let tools = Arc::new(ScriptedTools::new().script("oj-bundle", Script::Stdout("int main() {}\n".to_string())));

    let config = TransformConfiguration {
        bundled_file_destination: Destination::File(
            "${workspaceFolder}/submissions/${fileBasenameNoExtension}.bundled${fileExtname}".to_string(),
        ),
        ..Default::default()
    };
    let pipeline = BundlePipeline::new(Arc::new(CountingFileSystem::default()), tools, config, dir.path());
    let report = pipeline.run(&target).await.unwrap();

    let expected = dir.path().join("submissions/d.bundled.cpp");
    assert_eq!(report.delivered_to, expected.display().to_string());
    assert_eq!(std::fs::read_to_string(expected).unwrap(), "int main() {}\n");
    assert_eq!(
        report.stages,
        vec![
            PipelineStage::SelectResolver,
            PipelineStage::Resolve,
            PipelineStage::ApplyDirectiveTransform,
            PipelineStage::MaybeFormat,
            PipelineStage::MaybeMinify,
            PipelineStage::Deliver,
            PipelineStage::Done,
        ]
    );
}
