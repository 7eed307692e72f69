use std::path::Path;

/// Final path component as an owned string (lossy for non-UTF-8 names).
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split a filename into stem and extension (extension keeps its dot).
///
/// A leading dot does not start an extension, so `.hidden` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Lowercased extension without the dot, if any.
pub fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// First eight characters of an id, for compact listings.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
