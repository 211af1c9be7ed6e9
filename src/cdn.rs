//! Conversions between stored image paths and the URLs clients load them from.

use std::path::Path;

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Expands a stored image path (`/recipes/slug/hero.webp`, optionally with a
/// leading `cdn/`) to `{base}/api/cdn/...`. Absolute URLs pass through.
pub fn image_url(base_url: &str, path: Option<&str>) -> Option<String> {
    let path = path.filter(|path| !path.is_empty())?;
    if is_absolute_url(path) {
        return Some(path.to_string());
    }

    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_prefix("cdn/").unwrap_or(path);

    Some(format!("{}/api/cdn/{path}", base_url.trim_end_matches('/')))
}

/// Reverse of [`image_url`]. `None` if the URL is not served by this CDN.
pub fn extract_cdn_path(base_url: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/api/cdn/", base_url.trim_end_matches('/'));
    let path = url.strip_prefix(&prefix)?;

    Some(format!("/{}", path.trim_start_matches('/')))
}

/// What gets persisted for a submitted image URL: a CDN path when the URL
/// points at our CDN, the URL itself otherwise.
pub fn storable_image_path(base_url: &str, url: &str) -> String {
    extract_cdn_path(base_url, url).unwrap_or_else(|| url.to_string())
}

pub fn recipe_image_path(slug: &str, file_name: &str) -> String {
    format!("/recipes/{slug}/{file_name}")
}

/// Rejects traversal out of the CDN root.
pub fn is_safe_path(path: &str) -> bool {
    !path.starts_with('/')
        && !path.split('/').any(|segment| segment == "..")
        && !path.contains('\\')
}

pub fn content_type(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
