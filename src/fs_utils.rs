use std::path::{Path, PathBuf};

use tokio::fs;

use crate::constants::{CAPTION_EXTENSION, SUPPORTED_EXTENSIONS};
use crate::error::RunError;

pub fn is_supported_image(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|supported| *supported == ext)
        })
        .unwrap_or(false)
}

/// Sidecar path for an image: same directory, same base name, `.txt`.
pub fn caption_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(CAPTION_EXTENSION)
}

/// Lists supported image filenames in the folder, sorted ascending.
pub async fn list_images(folder: &Path) -> Result<Vec<String>, RunError> {
    let folder_err = |source| RunError::FolderRead {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(folder).await.map_err(folder_err)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(folder_err)? {
        let file_type = entry.file_type().await.map_err(folder_err)?;
        if !file_type.is_file() {
            continue;
        }

        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };

        if is_supported_image(&file_name) {
            names.push(file_name);
        }
    }

    names.sort();
    Ok(names)
}
