/// Name used when nothing survives sanitization
pub const FALLBACK_FILENAME: &str = "upload";

/// Longest basename we will write to disk, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Reduce a client-supplied filename to a basename made of `[A-Za-z0-9._-]`.
///
/// Path separators are treated as word breaks, so `../../etc/passwd` turns into
/// `etc_passwd`. Leading and trailing dots and underscores are stripped, which
/// rules out hidden files and `..`. Never fails: an empty result becomes
/// [`FALLBACK_FILENAME`].
pub fn sanitize_filename(filename: &str) -> String {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {:?}", filename);
    }

    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let sanitized: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let mut sanitized = sanitized.trim_matches(|c| c == '.' || c == '_').to_string();

    // All remaining characters are ASCII, so byte truncation is char-safe
    if sanitized.len() > MAX_FILENAME_LEN {
        sanitized.truncate(MAX_FILENAME_LEN);
        sanitized = sanitized.trim_end_matches(['.', '_']).to_string();
    }

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}
