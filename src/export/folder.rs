//! Export folder allocation and collision-free file naming
//!
//! Every tool call gets its own folder under the export root, named
//! `export_<hex>_<timestamp>`. Folder creation uses `create_dir` (not
//! `create_dir_all`) so an existing entry is detected atomically and a fresh
//! name is drawn instead of reusing it.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const FOLDER_PREFIX: &str = "export";
const FILE_PREFIX: &str = "export";
const MAX_FOLDER_ATTEMPTS: usize = 16;

/// An isolated output directory owned by one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFolder {
    path: PathBuf,
    name: String,
}

impl ExportFolder {
    /// Absolute path of the folder
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder name (last path component), used in public URLs
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Local timestamp used in folder and file names
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Create a new, previously non-existent export folder under `root`.
///
/// The root itself is created when missing.
pub fn allocate_folder(root: &Path) -> Result<ExportFolder> {
    std::fs::create_dir_all(root)?;

    for _ in 0..MAX_FOLDER_ATTEMPTS {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}_{}_{}", FOLDER_PREFIX, &hex[..10], timestamp());
        let path = root.join(&name);

        match std::fs::create_dir(&path) {
            Ok(()) => {
                tracing::debug!(folder = %path.display(), "Allocated export folder");
                return Ok(ExportFolder { path, name });
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(folder = %name, "Export folder name taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::Internal(format!(
        "Could not allocate a unique export folder after {} attempts",
        MAX_FOLDER_ATTEMPTS
    )))
}

/// Split a file name into `(base, extension)` where the extension keeps its
/// leading dot. Only the last path component is inspected, and a leading dot
/// (as in `.env`) does not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let component_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    let component = &name[component_start..];
    match component.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(component_start + dot),
        _ => (name, ""),
    }
}

/// Lowercased extension of `name` without the dot
pub fn infer_extension(name: &str) -> String {
    split_extension(name).1.trim_start_matches('.').to_lowercase()
}

/// Normalize a caller-supplied relative path: strip leading slashes and
/// reject anything that would escape the export folder or does not end in a
/// file name.
pub fn sanitize_relative(name: &str) -> Result<String> {
    let trimmed = name.trim_start_matches(&['/', '\\'][..]);
    let last = trimmed.rsplit(&['/', '\\'][..]).next().unwrap_or_default();
    if matches!(last, "" | "." | "..") {
        return Err(Error::InvalidInput(format!(
            "Invalid file name '{}': must end with a file name",
            name
        )));
    }

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::InvalidInput(format!(
                    "File name '{}' must stay inside the export folder",
                    name
                )))
            }
        }
    }

    Ok(trimmed.to_string())
}

/// Pick a file name inside `folder` that does not exist yet.
///
/// With no `filename`, one is synthesized as `export_<timestamp>.<ext>`.
/// While the candidate exists, `_1`, `_2`, ... is inserted before the
/// extension. Returns the full path and the relative name actually used.
pub fn resolve_filename(
    folder: &Path,
    ext: &str,
    filename: Option<&str>,
) -> Result<(PathBuf, String)> {
    let requested = match filename.filter(|f| !f.is_empty()) {
        Some(name) => sanitize_relative(name)?,
        None => format!("{}_{}.{}", FILE_PREFIX, timestamp(), ext),
    };

    let (base, ext) = split_extension(&requested);
    let mut name = requested.clone();
    let mut path = folder.join(&name);
    let mut counter = 1;
    while path.exists() {
        name = format!("{}_{}{}", base, counter, ext);
        path = folder.join(&name);
        counter += 1;
    }

    Ok((path, name))
}

/// Create the parent directory of `path` if it is missing.
///
/// Fails with invalid input when an existing file sits where a directory is
/// needed, as when one generated file is named `a` and another `a/b.txt`.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    if let Some(existing) = parent.ancestors().find(|a| a.exists()) {
        if !existing.is_dir() {
            let name = |p: &Path| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };
            return Err(Error::InvalidInput(format!(
                "Cannot create '{}': '{}' is a file, not a directory",
                name(path),
                name(existing)
            )));
        }
    }

    std::fs::create_dir_all(parent)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_folder_creates_unique_dirs() {
        let root = tempfile::tempdir().unwrap();
        let a = allocate_folder(root.path()).unwrap();
        let b = allocate_folder(root.path()).unwrap();

        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("export_"));
        // export_<10 hex>_<YYYYmmdd>_<HHMMSS>
        let parts: Vec<&str> = a.name().split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), 10);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_allocate_folder_creates_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nested").join("exports");
        let folder = allocate_folder(&root).unwrap();
        assert!(folder.path().starts_with(&root));
        assert!(folder.path().is_dir());
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.csv"), ("report", ".csv"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("Makefile"), ("Makefile", ""));
        assert_eq!(split_extension(".env"), (".env", ""));
        assert_eq!(split_extension("src.d/main"), ("src.d/main", ""));
        assert_eq!(split_extension("sub/y.txt"), ("sub/y", ".txt"));
    }

    #[test]
    fn test_infer_extension() {
        assert_eq!(infer_extension("Program.CS"), "cs");
        assert_eq!(infer_extension("notes"), "");
    }

    #[test]
    fn test_sanitize_relative() {
        assert_eq!(sanitize_relative("/a/b.txt").unwrap(), "a/b.txt");
        assert!(sanitize_relative("../escape.txt").is_err());
        assert!(sanitize_relative("a/../../b").is_err());
        assert!(sanitize_relative("///").is_err());
    }

    #[test]
    fn test_sanitize_relative_requires_file_name() {
        for name in ["sub/", "sub\\", ".", "./", "a/.", "a/.."] {
            let err = sanitize_relative(name).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{}", name);
        }
        assert_eq!(sanitize_relative("sub/.env").unwrap(), "sub/.env");
    }

    #[test]
    fn test_resolve_filename_synthesizes_name() {
        let dir = tempfile::tempdir().unwrap();
        let (path, name) = resolve_filename(dir.path(), "xlsx", None).unwrap();
        assert!(name.starts_with("export_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(path, dir.path().join(&name));
    }

    #[test]
    fn test_resolve_filename_appends_counter_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "first").unwrap();

        let (path, name) = resolve_filename(dir.path(), "csv", Some("data.csv")).unwrap();
        assert_eq!(name, "data_1.csv");
        std::fs::write(&path, "second").unwrap();

        let (_, name) = resolve_filename(dir.path(), "csv", Some("data.csv")).unwrap();
        assert_eq!(name, "data_2.csv");

        assert_eq!(
            std::fs::read_to_string(dir.path().join("data.csv")).unwrap(),
            "first"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("data_1.csv")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_resolve_filename_nested_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/y.txt"), "yo").unwrap();

        let (_, name) = resolve_filename(dir.path(), "txt", Some("/sub/y.txt")).unwrap();
        assert_eq!(name, "sub/y_1.txt");
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "x").unwrap();

        for target in ["a/b.txt", "a/deeper/c.txt"] {
            let err = ensure_parent_dir(&dir.path().join(target)).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{}", target);
        }
        assert!(dir.path().join("a").is_file());
    }
}
