//! Helpers for embedding untrusted values into ffmpeg argument grammars.

use std::path::Path;

/// Render `value` as a filter option value, ready to follow `key=`.
///
/// A value inside a filter graph is tokenized twice: once by the graph
/// parser, which splits on `, ; [ ]`, and once by the option parser, which
/// splits on `:`. Both passes drop unescaped quotes and backslashes and trim
/// unescaped whitespace at the ends. The option level is backslash-escaped
/// and the result is single-quoted for the graph level, with each inner `'`
/// written as `'\''`.
///
/// ```
/// use clipforge_av::quote_option_value;
///
/// assert_eq!(quote_option_value("/fonts/Sans.ttf"), "'/fonts/Sans.ttf'");
/// assert_eq!(quote_option_value("12:30"), r"'12\:30'");
/// assert_eq!(quote_option_value("it's"), r"'it\'\''s'");
/// ```
pub fn quote_option_value(value: &str) -> String {
    let leading = value.len() - value.trim_start().len();
    let trailing = value.trim_end().len();

    let mut escaped = String::with_capacity(value.len() + 8);
    for (i, c) in value.char_indices() {
        let edge_space = c.is_whitespace() && (i < leading || i >= trailing);
        if matches!(c, '\\' | '\'' | ':') || edge_space {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    format!("'{}'", escaped.replace('\'', r"'\''"))
}

/// Render overlay text as the value of a `drawtext` `text=` option.
///
/// On top of [`quote_option_value`], `drawtext` expands `%{...}` sequences
/// and consumes backslashes in its text, so `\` and `%` are escaped first.
///
/// ```
/// use clipforge_av::escape_drawtext_text;
///
/// assert_eq!(escape_drawtext_text("Hello"), "'Hello'");
/// assert_eq!(escape_drawtext_text("50%"), r"'50\\%'");
/// ```
pub fn escape_drawtext_text(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if matches!(c, '\\' | '%') {
            literal.push('\\');
        }
        literal.push(c);
    }
    quote_option_value(&literal)
}

/// Render a concat-demuxer list for `paths`, in order.
///
/// Each line is `file '<path>'`; single quotes inside a path are closed,
/// escaped and reopened (`'\''`).
pub fn concat_list<P: AsRef<Path>>(paths: &[P]) -> String {
    let mut out = String::new();
    for path in paths {
        let quoted = path.as_ref().to_string_lossy().replace('\'', "'\\''");
        out.push_str("file '");
        out.push_str(&quoted);
        out.push_str("'\n");
    }
    out
}
