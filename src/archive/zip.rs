//! Zip container

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

pub(super) fn write_zip(path: &Path, entries: &[(&Path, String)]) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (source, name) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::Archive(format!("Failed to add '{}' to zip: {}", name, e)))?;
        let mut input = File::open(source)?;
        std::io::copy(&mut input, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| Error::Archive(format!("Failed to finalize zip: {}", e)))?;
    Ok(())
}
