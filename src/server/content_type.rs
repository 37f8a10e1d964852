use std::path::Path;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
