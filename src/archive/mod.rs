//! Archive builder
//!
//! Bundles files already written into an export folder into one zip or 7z
//! archive inside the same folder. Each member is stored under its path
//! relative to the folder root, so nested directories survive extraction.

mod sevenz;
mod zip;

use crate::error::{Error, Result};
use crate::export::{resolve_filename, timestamp};
use std::path::{Path, PathBuf};

/// Supported archive containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveFormat {
    /// Deflate-compressed zip
    #[default]
    Zip,
    /// LZMA2 7z
    SevenZ,
}

impl ArchiveFormat {
    /// Parse a caller-supplied format. Anything other than `7z` is zip.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("7z") {
            ArchiveFormat::SevenZ
        } else {
            ArchiveFormat::Zip
        }
    }

    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZ => "7z",
        }
    }
}

/// Archive file name `<base>_<timestamp>.<ext>`, where `base` defaults to
/// `archive` and loses a trailing `.zip`/`.7z` the caller already added.
pub fn archive_file_name(name: Option<&str>, format: ArchiveFormat) -> String {
    let mut base = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("archive")
        .to_string();
    for ext in [".zip", ".7z"] {
        if base.to_ascii_lowercase().ends_with(ext) {
            base.truncate(base.len() - ext.len());
        }
    }
    format!("{}_{}.{}", base, timestamp(), format.extension())
}

/// Path of `member` relative to `folder`, using `/` separators
pub fn member_name(folder: &Path, member: &Path) -> Result<String> {
    let relative = member.strip_prefix(folder).map_err(|_| {
        Error::Archive(format!(
            "{} is not inside {}",
            member.display(),
            folder.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Build an archive of `members` inside `folder`.
///
/// Returns the archive path and its name relative to the folder.
pub fn build_archive(
    folder: &Path,
    members: &[PathBuf],
    format: ArchiveFormat,
    name: Option<&str>,
) -> Result<(PathBuf, String)> {
    let file_name = archive_file_name(name, format);
    let (path, file_name) = resolve_filename(folder, format.extension(), Some(&file_name))?;

    let entries = members
        .iter()
        .map(|m| Ok((m.as_path(), member_name(folder, m)?)))
        .collect::<Result<Vec<_>>>()?;

    match format {
        ArchiveFormat::Zip => zip::write_zip(&path, &entries)?,
        ArchiveFormat::SevenZ => sevenz::write_7z(&path, &entries)?,
    }

    tracing::debug!(
        archive = %path.display(),
        members = entries.len(),
        format = format.extension(),
        "Built archive"
    );
    Ok((path, file_name))
}
