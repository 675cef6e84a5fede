//! Tool request and response types

use crate::archive::ArchiveFormat;
use crate::error::{Error, Result};
use crate::export::{infer_extension, sanitize_relative};
use crate::writers::{Format, Row};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments of `create_excel` and `create_csv`
#[derive(Debug, Clone, Deserialize)]
pub struct RowsRequest {
    /// Rows of cell values, in order
    pub data: Vec<Row>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub persistent: Option<bool>,
}

/// Paragraph list, or a single paragraph
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Paragraphs {
    Many(Vec<String>),
    One(String),
}

impl Paragraphs {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Paragraphs::Many(items) => items,
            Paragraphs::One(item) => vec![item],
        }
    }
}

/// Arguments of `create_pdf`
#[derive(Debug, Clone, Deserialize)]
pub struct PdfRequest {
    pub text: Paragraphs,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub persistent: Option<bool>,
}

/// Arguments of `create_file`
#[derive(Debug, Clone, Deserialize)]
pub struct FileRequest {
    pub content: String,
    pub filename: String,
    #[serde(default)]
    pub persistent: Option<bool>,
}

/// Arguments of `generate_and_archive`
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveRequest {
    pub files_data: Vec<Value>,
    #[serde(default)]
    pub archive_format: Option<String>,
    #[serde(default)]
    pub archive_name: Option<String>,
    #[serde(default)]
    pub persistent: Option<bool>,
}

impl ArchiveRequest {
    pub fn format(&self) -> ArchiveFormat {
        self.archive_format
            .as_deref()
            .map(ArchiveFormat::parse)
            .unwrap_or_default()
    }
}

/// A tool invocation, as named on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    CreateExcel(RowsRequest),
    CreateCsv(RowsRequest),
    CreatePdf(PdfRequest),
    CreateFile(FileRequest),
    GenerateAndArchive(ArchiveRequest),
}

impl ToolCall {
    /// Wire name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::CreateExcel(_) => "create_excel",
            ToolCall::CreateCsv(_) => "create_csv",
            ToolCall::CreatePdf(_) => "create_pdf",
            ToolCall::CreateFile(_) => "create_file",
            ToolCall::GenerateAndArchive(_) => "generate_and_archive",
        }
    }

    /// Per-call persistence override
    pub fn persistent(&self) -> Option<bool> {
        match self {
            ToolCall::CreateExcel(r) | ToolCall::CreateCsv(r) => r.persistent,
            ToolCall::CreatePdf(r) => r.persistent,
            ToolCall::CreateFile(r) => r.persistent,
            ToolCall::GenerateAndArchive(r) => r.persistent,
        }
    }
}

/// Every tool answers with a single download URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub url: String,
}

/// One file to generate for `generate_and_archive`
#[derive(Debug, Clone, PartialEq)]
pub struct FileSpec {
    /// Path relative to the export folder; empty means "synthesize a name"
    pub path: String,
    pub content: Option<Value>,
    pub format: Format,
}

impl FileSpec {
    /// Accepts, in order of precedence:
    /// - `{"filename": ..., "content": ..., "format": ...}` (format optional)
    /// - `{"filename": ..., "code": ...}`
    /// - `{"path/inside/archive.ext": content}`
    pub fn parse(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(invalid_shape)?;

        if let Some(filename) = object.get("filename") {
            let path = match filename {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                _ => return Err(Error::InvalidInput("'filename' must be a string".to_string())),
            };
            let content = object
                .get("content")
                .or_else(|| object.get("code"))
                .cloned();
            let format = explicit_format(object).unwrap_or_else(|| infer_extension(&path));
            return FileSpec::new(path, content, &format);
        }

        if object.len() == 1 {
            if let Some((path, content)) = object.iter().next() {
                let format = infer_extension(path);
                return FileSpec::new(path.clone(), Some(content.clone()), &format);
            }
        }

        Err(invalid_shape())
    }

    fn new(path: String, content: Option<Value>, format: &str) -> Result<Self> {
        let path = if path.is_empty() {
            path
        } else {
            sanitize_relative(&path)?
        };
        Ok(Self {
            path,
            content,
            format: Format::from_tag(format),
        })
    }

    /// Check the file can be written without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        let missing = matches!(self.content, None | Some(Value::Null));
        if self.format.requires_content() && missing {
            let name: &str = if self.path.is_empty() {
                "<unnamed>"
            } else {
                &self.path
            };
            return Err(Error::InvalidInput(format!("Missing 'content' for {}", name)));
        }
        Ok(())
    }
}

fn explicit_format(object: &Map<String, Value>) -> Option<String> {
    object
        .get("format")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn invalid_shape() -> Error {
    Error::InvalidInput(
        "Invalid file_info; expected {filename,content[,format]} (or 'code' alias) \
         or a single-key mapping {path: content}"
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filename_content_format() {
        let spec = FileSpec::parse(&json!({
            "filename": "src/Program.cs",
            "content": "class P {}",
            "format": "txt"
        }))
        .unwrap();
        assert_eq!(spec.path, "src/Program.cs");
        assert_eq!(spec.content, Some(json!("class P {}")));
        assert_eq!(spec.format, Format::Text("txt".into()));
    }

    #[test]
    fn test_parse_code_alias_and_inferred_format() {
        let spec = FileSpec::parse(&json!({"filename": "run.SH", "code": "echo hi"})).unwrap();
        assert_eq!(spec.content, Some(json!("echo hi")));
        assert_eq!(spec.format, Format::Text("sh".into()));
    }

    #[test]
    fn test_parse_single_key_mapping() {
        let spec = FileSpec::parse(&json!({"/docs/readme.md": "# hi"})).unwrap();
        assert_eq!(spec.path, "docs/readme.md");
        assert_eq!(spec.format, Format::Text("md".into()));
    }

    #[test]
    fn test_parse_defaults_to_txt() {
        let spec = FileSpec::parse(&json!({"filename": "LICENSE", "content": "MIT"})).unwrap();
        assert_eq!(spec.format, Format::Text("txt".into()));
    }

    #[test]
    fn test_parse_rejects_invalid_shapes() {
        assert!(FileSpec::parse(&json!("just a string")).is_err());
        assert!(FileSpec::parse(&json!({"a.txt": "x", "b.txt": "y"})).is_err());
        assert!(FileSpec::parse(&json!({})).is_err());
        assert!(FileSpec::parse(&json!({"filename": 3, "content": "x"})).is_err());
        assert!(FileSpec::parse(&json!({"filename": "../up.txt", "content": "x"})).is_err());
    }

    #[test]
    fn test_validate_missing_content() {
        let spec = FileSpec::parse(&json!({"filename": "main.py"})).unwrap();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("main.py"));

        let spec = FileSpec::parse(&json!({"filename": "page.html"})).unwrap();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_tool_call_from_wire() {
        let call: ToolCall = serde_json::from_value(json!({
            "name": "create_csv",
            "arguments": {"data": [["a", "b"]], "persistent": true}
        }))
        .unwrap();
        assert_eq!(call.name(), "create_csv");
        assert_eq!(call.persistent(), Some(true));

        let call: ToolCall = serde_json::from_value(json!({
            "name": "create_pdf",
            "arguments": {"text": "single paragraph"}
        }))
        .unwrap();
        match call {
            ToolCall::CreatePdf(req) => assert_eq!(req.text.into_vec().len(), 1),
            other => panic!("unexpected call {:?}", other),
        }

        assert!(serde_json::from_value::<ToolCall>(json!({
            "name": "delete_everything",
            "arguments": {}
        }))
        .is_err());
    }

    #[test]
    fn test_archive_request_format_default() {
        let req: ArchiveRequest = serde_json::from_value(json!({"files_data": []})).unwrap();
        assert_eq!(req.format(), ArchiveFormat::Zip);
    }
}
