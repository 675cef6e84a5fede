//! Raw text and raw bytes writers

use crate::error::Result;
use std::path::Path;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Write `content` as UTF-8 text.
///
/// `.xml` targets whose content does not already start with an XML
/// declaration (ignoring leading whitespace) get one prepended on its own
/// line.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if is_xml(path) && !content.trim_start().starts_with("<?xml") {
        std::fs::write(path, format!("{}\n{}", XML_DECLARATION, content))?;
    } else {
        std::fs::write(path, content)?;
    }
    Ok(())
}

/// Write `bytes` with no transcoding
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)?;
    Ok(())
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}
