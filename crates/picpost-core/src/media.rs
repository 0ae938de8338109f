//! Media-type checks and blob-name safety rules.
//!
//! Upload validation trusts the client-declared media type; no content
//! sniffing is done at that point. Content sniffing only happens when
//! choosing a `Content-Type` for retrieval.

/// Extensions accepted from client-supplied filenames (lower case, no dot).
///
/// SVG is deliberately absent: it is XML that can carry script.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "ico", "heic", "heif", "avif",
];

/// Extension used when the original filename offers nothing usable.
pub const FALLBACK_EXTENSION: &str = ".jpg";

/// Suffix for in-progress blob writes. Such files are never served.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Maximum blob name length in bytes.
pub const MAX_BLOB_NAME_LEN: usize = 255;

/// Whether a declared media type is an image type.
///
/// Absent or blank declarations are rejected. The comparison ignores case
/// and surrounding whitespace, as media types are case-insensitive.
pub fn is_image_media_type(declared: Option<&str>) -> bool {
    match declared {
        Some(mime) => mime.trim().to_ascii_lowercase().starts_with("image/"),
        None => false,
    }
}

/// Derive a storage extension (with leading dot) from an untrusted filename.
///
/// Only the last path component is considered, and only extensions from
/// [`ALLOWED_IMAGE_EXTENSIONS`] survive; anything else yields
/// [`FALLBACK_EXTENSION`].
pub fn image_extension(original_filename: Option<&str>) -> String {
    let Some(original) = original_filename else {
        return FALLBACK_EXTENSION.to_string();
    };

    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let ext = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return FALLBACK_EXTENSION.to_string(),
    };

    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        format!(".{}", ext)
    } else {
        FALLBACK_EXTENSION.to_string()
    }
}

/// Whether `name` is a flat blob name that cannot escape the blob root.
///
/// Rejects empty or over-long names, path separators, parent references,
/// leading dots, and control characters.
pub fn is_safe_blob_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_BLOB_NAME_LEN
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(['/', '\\', ':'])
        && !name.chars().any(|c| c.is_control())
}

/// Pick a `Content-Type` for stored bytes.
///
/// Magic bytes win; otherwise the (allow-listed) extension decides; otherwise
/// `application/octet-stream`.
pub fn detect_content_type(filename: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some((_, ext)) = filename.rsplit_once('.') {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    "application/octet-stream".to_string()
}

/// Map allow-listed image extensions to MIME types.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "ico" => Some("image/x-icon"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
