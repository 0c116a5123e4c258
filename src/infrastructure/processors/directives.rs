//! `#line` directive rewriting for bundled C and C++ output.
//!
//! `oj-bundle` marks every inlined region with `#line N "path"`, which leaks
//! local paths into the submission. These transforms either drop the
//! directives or keep only the line number.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::DirectiveTransform;

// A path argument runs to the end of its line, so hiding never joins the
// line number to text after the closing quote
static LINE_DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?mR)#line[ \t]+(?P<line>\d+)(?P<path>[ \t]+R?"[^\r\n]*"[ \t]*$)?"#).unwrap()
});

static LINE_DIRECTIVE_WITH_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?mR)#line[ \t]+(?P<line>\d+)[ \t]+R?"[^\r\n]*"[ \t]*$"#).unwrap()
});

/// Remove every `#line` directive, with or without a path argument.
pub fn erase_line_directives(code: &str) -> String {
    let mut current = LINE_DIRECTIVE_REGEX.replace_all(code, "").into_owned();
    // Removing one directive can splice two fragments into a new one
    while LINE_DIRECTIVE_REGEX.is_match(&current) {
        current = LINE_DIRECTIVE_REGEX.replace_all(&current, "").into_owned();
    }
    current
}

/// Rewrite `#line N "path"` to `#line N`. Directives without a path stay.
pub fn hide_filepath(code: &str) -> String {
    LINE_DIRECTIVE_WITH_PATH_REGEX
        .replace_all(code, "#line $line")
        .into_owned()
}

pub fn apply_directive_transform(code: &str, transform: DirectiveTransform) -> String {
    match transform {
        DirectiveTransform::Erase => erase_line_directives(code),
        DirectiveTransform::HidePath => hide_filepath(code),
    }
}
