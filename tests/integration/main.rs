// Integration tests drive the public API with scripted tools in place of
// oj-bundle, clang-format, pyminify and the clipboard.


mod pipeline_tests;
mod transform_tests;
