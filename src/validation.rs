use crate::error::{CompressionError, Result};
use std::path::Path;

/// Checks the precondition every job has on its source: it exists and is a
/// directory. The folder is only read, never modified.
pub fn validate_source_folder(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FolderNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return Err(CompressionError::NotADirectory(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_validate_source_folder_not_found() {
        let result = validate_source_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(CompressionError::FolderNotFound(_))));
    }

    #[test]
    fn test_validate_source_folder_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        File::create(&file).unwrap();

        let result = validate_source_folder(&file);
        assert!(matches!(result, Err(CompressionError::NotADirectory(_))));
    }

    #[test]
    fn test_validate_source_folder_valid() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_source_folder(temp_dir.path()).is_ok());
    }
}
