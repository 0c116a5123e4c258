use crate::support::{Script, ScriptedTools};
use ojpack::core::models::{FormatStyle, Language, TransformMode};
use ojpack::infrastructure::{erase_line_directives, hide_filepath, style_descriptor, CodeTransformer};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_line_directive_scenarios() {
    assert_eq!(hide_filepath("#line 10 \"a.cpp\"\nint x;"), "#line 10\nint x;");
    assert_eq!(erase_line_directives("#line 10 \"a.cpp\"\nint x;"), "\nint x;");
    assert_eq!(erase_line_directives("#line 7\nint y;"), "\nint y;");

    let untouched = "int main() {\n  return 0;\n}\n";
    assert_eq!(hide_filepath(untouched), untouched);
    assert_eq!(erase_line_directives(untouched), untouched);
}

#[test]
fn test_named_styles_base_on_clang_presets() {
    assert_eq!(style_descriptor(FormatStyle::Never), None);
    assert_eq!(style_descriptor(FormatStyle::Inherit), None);
    assert!(style_descriptor(FormatStyle::Llvm).unwrap().contains("BasedOnStyle: LLVM"));
    assert!(style_descriptor(FormatStyle::Gnu).unwrap().contains("BasedOnStyle: GNU"));
    assert!(style_descriptor(FormatStyle::Compress).unwrap().starts_with("---"));
}

#[tokio::test]
async fn test_formatter_never_runs_no_tool() {
    let tools = Arc::new(ScriptedTools::new());
    let transformer = CodeTransformer::new(tools.clone());

    let out = transformer
        .transform("int  x ;", Language::C, TransformMode::Format(FormatStyle::Never))
        .await;

    assert_eq!(out, "int  x ;");
    assert!(tools.calls().is_empty());
}

#[tokio::test]
async fn test_missing_formatter_falls_back_to_input() {
    let scratch = tempdir().unwrap();
    let tools = Arc::new(ScriptedTools::new().script("clang-format", Script::Missing));
    let transformer = CodeTransformer::new(tools.clone()).with_scratch_root(scratch.path());

    let out = transformer
        .transform("int  x ;", Language::Cpp, TransformMode::Format(FormatStyle::Mozilla))
        .await;

    assert_eq!(out, "int  x ;");
    assert_eq!(tools.programs(), vec!["clang-format"]);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_custom_tool_names() {
    let scratch = tempdir().unwrap();
    let tools = Arc::new(ScriptedTools::new().script("clang-format-18", Script::RewriteLastArg("int x;\n".to_string())));
    let transformer = CodeTransformer::new(tools.clone())
        .with_scratch_root(scratch.path())
        .with_clang_format("clang-format-18");

    let out = transformer.transform("int  x ;", Language::C, TransformMode::Minify).await;

    assert_eq!(out, "int x;\n");
    let call = tools.call_to("clang-format-18").unwrap();
    assert_eq!(call.args.last().map(String::as_str), Some("minified.c"));
}
