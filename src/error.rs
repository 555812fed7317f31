use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a captioning run. Per-image failures are handled
/// inside the loop and never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Cannot reach server at {url}: {cause}")]
    ServerUnreachable { url: String, cause: anyhow::Error },

    #[error("Error reading folder '{path}': {source}")]
    FolderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid folder path '{0}'")]
    InvalidFolder(String),
}
