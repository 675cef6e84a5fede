//! Public download URLs for generated files

use std::path::Path;

/// Build `<base_url>/<folder_name>/<filename>` for a generated file.
///
/// Only the last component of `folder` is used. Leading slashes are stripped
/// from both components and a trailing slash on the base is ignored, so the
/// result never contains `//` between segments.
pub fn public_url(base_url: &str, folder: &Path, filename: &str) -> String {
    let folder = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        folder.trim_start_matches('/'),
        filename.trim_start_matches('/')
    )
}
