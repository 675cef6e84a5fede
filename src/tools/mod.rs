//! Tool surface
//!
//! Five stateless tools, each allocating exactly one export folder per call:
//!
//! | Tool                   | Produces                                  |
//! |------------------------|-------------------------------------------|
//! | `create_excel`         | one `.xlsx` workbook                      |
//! | `create_csv`           | one `.csv` file                           |
//! | `create_pdf`           | one `.pdf` document                       |
//! | `create_file`          | one text file with a caller-chosen name   |
//! | `generate_and_archive` | N generated files plus one zip/7z archive |
//!
//! The format libraries are synchronous, so [`ExportService::call`] runs the
//! writing on the blocking pool, then schedules retention and builds the
//! public URL. Tools are reachable over REST ([`handler`]) and JSON-RPC
//! ([`rpc`]).

pub mod handler;
pub mod rpc;
pub mod stdio;
mod types;

use crate::archive::{build_archive, ArchiveFormat};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::export::{
    allocate_folder, ensure_parent_dir, public_url, resolve_filename, ExportFolder,
    RetentionSweeper,
};
use crate::writers::{csv, pdf, spreadsheet, text, write_content, Row, WriteOptions};
use std::path::PathBuf;
use std::sync::Arc;

pub use handler::{tools_router, ToolsState};
pub use types::{
    ArchiveRequest, FileRequest, FileSpec, Paragraphs, PdfRequest, RowsRequest, ToolCall,
    ToolResponse,
};

/// A finished export: the folder and the file the URL should point at
#[derive(Debug, Clone)]
pub struct Export {
    pub folder: ExportFolder,
    pub filename: String,
}

/// Runs tool calls against one export root
#[derive(Debug, Clone)]
pub struct ExportService {
    export_dir: PathBuf,
    base_url: String,
    sweeper: RetentionSweeper,
    options: WriteOptions,
}

impl ExportService {
    /// Create a service from the resolved configuration
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            export_dir: config.export.dir.clone(),
            base_url: config.export.base_url.clone(),
            sweeper: RetentionSweeper::from_config(&config.retention),
            options: WriteOptions {
                pdf_font: config.export.pdf_font.clone(),
            },
        }
    }

    /// Execute a tool call end to end and return its download URL.
    pub async fn call(self: &Arc<Self>, call: ToolCall) -> Result<ToolResponse> {
        let name = call.name();
        let persistent = call.persistent();
        let service = Arc::clone(self);

        let export = tokio::task::spawn_blocking(move || service.execute(call))
            .await
            .map_err(|e| Error::Internal(format!("Tool task failed: {}", e)))??;

        self.sweeper
            .schedule(export.folder.path().to_path_buf(), persistent);

        let url = public_url(&self.base_url, export.folder.path(), &export.filename);
        tracing::info!(
            tool = name,
            folder = export.folder.name(),
            file = %export.filename,
            "Export created"
        );
        Ok(ToolResponse { url })
    }

    /// Execute a tool call synchronously, without retention scheduling.
    pub fn execute(&self, call: ToolCall) -> Result<Export> {
        match call {
            ToolCall::CreateExcel(req) => self.create_excel(&req.data, req.filename.as_deref()),
            ToolCall::CreateCsv(req) => self.create_csv(&req.data, req.filename.as_deref()),
            ToolCall::CreatePdf(req) => self.create_pdf(&req.text.into_vec(), req.filename.as_deref()),
            ToolCall::CreateFile(req) => self.create_file(&req.content, &req.filename),
            ToolCall::GenerateAndArchive(req) => {
                let format = req.format();
                let specs = req
                    .files_data
                    .iter()
                    .map(FileSpec::parse)
                    .collect::<Result<Vec<_>>>()?;
                self.generate_and_archive(&specs, format, req.archive_name.as_deref())
            }
        }
    }

    /// Rows → spreadsheet
    pub fn create_excel(&self, rows: &[Row], filename: Option<&str>) -> Result<Export> {
        self.single_file("xlsx", filename, |path| spreadsheet::write_xlsx(path, rows))
    }

    /// Rows → CSV
    pub fn create_csv(&self, rows: &[Row], filename: Option<&str>) -> Result<Export> {
        self.single_file("csv", filename, |path| csv::write_csv(path, rows))
    }

    /// Paragraphs → PDF
    pub fn create_pdf(&self, paragraphs: &[String], filename: Option<&str>) -> Result<Export> {
        self.single_file("pdf", filename, |path| {
            pdf::write_pdf(path, paragraphs, self.options.pdf_font.as_deref())
        })
    }

    /// Text → file named by the caller (may include subdirectories)
    pub fn create_file(&self, content: &str, filename: &str) -> Result<Export> {
        if filename.trim().is_empty() {
            return Err(Error::InvalidInput("'filename' is required".to_string()));
        }
        self.single_file("txt", Some(filename), |path| text::write_text(path, content))
    }

    /// File specs → generated files + archive
    pub fn generate_and_archive(
        &self,
        specs: &[FileSpec],
        format: ArchiveFormat,
        archive_name: Option<&str>,
    ) -> Result<Export> {
        for spec in specs {
            spec.validate()?;
        }

        let folder = allocate_folder(&self.export_dir)?;
        let result = write_members(&folder, specs, format, archive_name, &self.options);
        self.finish(folder, result)
    }

    fn single_file<F>(&self, ext: &str, filename: Option<&str>, write: F) -> Result<Export>
    where
        F: FnOnce(&std::path::Path) -> Result<()>,
    {
        // Validate the requested name before creating anything on disk.
        if let Some(name) = filename.filter(|n| !n.is_empty()) {
            crate::export::sanitize_relative(name)?;
        }

        let folder = allocate_folder(&self.export_dir)?;
        let result = resolve_filename(folder.path(), ext, filename).and_then(|(path, name)| {
            ensure_parent_dir(&path)?;
            write(&path)?;
            Ok(name)
        });

        self.finish(folder, result)
    }

    /// Turn a write result into an [`Export`], discarding the folder on
    /// failure so a failed call leaves nothing behind.
    fn finish(&self, folder: ExportFolder, result: Result<String>) -> Result<Export> {
        match result {
            Ok(filename) => Ok(Export { folder, filename }),
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_dir_all(folder.path()) {
                    tracing::warn!(
                        folder = %folder.path().display(),
                        error = %cleanup,
                        "Failed to discard incomplete export"
                    );
                }
                Err(e)
            }
        }
    }
}

/// Write every file spec into `folder`, then archive them. Returns the archive's
/// name relative to the folder.
fn write_members(
    folder: &ExportFolder,
    specs: &[FileSpec],
    format: ArchiveFormat,
    archive_name: Option<&str>,
    options: &WriteOptions,
) -> Result<String> {
    let mut members = Vec::with_capacity(specs.len());
    for spec in specs {
        let requested = Some(spec.path.as_str()).filter(|p| !p.is_empty());
        let (path, _) = resolve_filename(folder.path(), spec.format.extension(), requested)?;
        ensure_parent_dir(&path)?;
        write_content(&path, &spec.format, spec.content.as_ref(), options)?;
        members.push(path);
    }
    let (_, filename) = build_archive(folder.path(), &members, format, archive_name)?;
    Ok(filename)
}
