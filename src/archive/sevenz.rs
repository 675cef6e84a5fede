//! 7z container

use crate::error::{Error, Result};
use sevenz_rust::{SevenZArchiveEntry, SevenZWriter};
use std::fs::File;
use std::path::Path;

pub(super) fn write_7z(path: &Path, entries: &[(&Path, String)]) -> Result<()> {
    let mut writer = SevenZWriter::create(path)
        .map_err(|e| Error::Archive(format!("Failed to create 7z: {}", e)))?;

    for (source, name) in entries {
        let entry = SevenZArchiveEntry::from_path(source, name.clone());
        writer
            .push_archive_entry(entry, Some(File::open(source)?))
            .map_err(|e| Error::Archive(format!("Failed to add '{}' to 7z: {}", name, e)))?;
    }

    writer
        .finish()
        .map_err(|e| Error::Archive(format!("Failed to finalize 7z: {}", e)))?;
    Ok(())
}
