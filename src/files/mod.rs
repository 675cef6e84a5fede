//! Static file server over the export root
//!
//! `GET /files/:folder/:filename` forces a download; every other
//! `/files/...` path is served as a plain static file.

pub mod handler;

pub use handler::{files_router, FilesState};
