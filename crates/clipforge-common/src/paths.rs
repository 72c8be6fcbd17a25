//! Path utilities for artifact filenames and declared content types.

use std::path::Path;

/// Content types accepted for video uploads when no override is configured.
pub const DEFAULT_VIDEO_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/webm", "video/ogg"];

/// Normalize an extension hint into `.ext` form.
///
/// The hint may be given with or without its leading dot. Hints that are
/// empty or contain anything other than ASCII alphanumerics fall back to
/// `default`, so a client-supplied name can never smuggle a path separator
/// into the store.
///
/// # Examples
///
/// ```
/// use clipforge_common::paths::normalize_extension;
///
/// assert_eq!(normalize_extension("webm", ".mp4"), ".webm");
/// assert_eq!(normalize_extension(".mov", ".mp4"), ".mov");
/// assert_eq!(normalize_extension("", ".mp4"), ".mp4");
/// assert_eq!(normalize_extension("../x", ".mp4"), ".mp4");
/// ```
pub fn normalize_extension(hint: &str, default: &str) -> String {
    let bare = hint.trim().trim_start_matches('.');
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
        return with_dot(default);
    }
    format!(".{bare}")
}

fn with_dot(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Extension of a client-supplied filename, including its leading dot.
///
/// ```
/// use clipforge_common::paths::extension_of;
///
/// assert_eq!(extension_of("clip.webm").as_deref(), Some(".webm"));
/// assert_eq!(extension_of("README"), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
}

/// Best-effort content type for a local file, based on its extension.
///
/// Used by the command-line front end, which has no declared MIME type to
/// forward.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mime)
}
