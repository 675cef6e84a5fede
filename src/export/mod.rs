//! Export folders, file naming, public URLs and retention
//!
//! Each tool call allocates one [`ExportFolder`], writes its files into it
//! under collision-free names, and hands the folder to the
//! [`RetentionSweeper`] once writing is complete.

pub mod folder;
pub mod retention;
pub mod url;

pub use folder::{
    allocate_folder, ensure_parent_dir, infer_extension, resolve_filename, sanitize_relative,
    split_extension, timestamp, ExportFolder,
};
pub use retention::RetentionSweeper;
pub use url::public_url;
