//! File Export - turns structured data into downloadable files
//!
//! A tool server accepts rows, paragraphs, raw text or whole file sets and
//! writes them as spreadsheets, CSV, PDF, arbitrary text files or zip/7z
//! archives. Every call gets its own export folder and answers with a
//! public URL; a separate file server hands those files out.
//!
//! ## Architecture
//!
//! ```text
//!  tool call ──► ExportService ──► allocate_folder ──► resolve_filename
//!                     │                                      │
//!                     │                               writers / archive
//!                     │                                      │
//!                     ├──► RetentionSweeper (unless persistent)
//!                     └──► public_url ──► {"url": ...}
//!
//!  GET /files/<folder>/<file> ──► file server (same root directory)
//! ```
//!
//! ## Modules
//!
//! - [`tools`]: tool calls, REST and JSON-RPC (HTTP and stdio) transports
//! - [`export`]: folder allocation, filename resolution, URLs, retention
//! - [`writers`]: spreadsheet, CSV, PDF and text writers
//! - [`archive`]: zip and 7z bundling
//! - [`files`]: static file server
//! - [`api`]: HTTP applications
//! - [`config`]: configuration management

pub mod api;
pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod files;
pub mod tools;
pub mod writers;

pub use config::ExportConfig;
pub use error::{Error, Result};
