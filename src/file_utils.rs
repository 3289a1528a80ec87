use anyhow::{Context, Result, anyhow};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Find files with a specific extension in a directory, recursively
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// List the regular files directly inside a directory
    pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() {
                result.push(entry.into_path());
            }
        }

        Ok(result)
    }

    /// Read a whole UTF-8 file to a string
    pub async fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, AppError> {
        let path = path.as_ref();
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::File(format!("Failed to read file {:?}: {}", path, e)))
    }

    /// Write a string to a file, creating parent directories
    pub async fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::File(format!("Failed to create directory {:?}: {}", parent, e)))?;
            }
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| AppError::File(format!("Failed to write to file {:?}: {}", path, e)))
    }

    // @generates: Mirrored output path
    // @params: input_file, source_marker, output_marker
    /// Replace the first path component equal to `source_marker` with `output_marker`.
    ///
    /// `quests/chapters/ch1/q1.snbt` becomes `quests/chapters-translate/ch1/q1.snbt`.
    /// Only whole components match, so `chapters-old` is left alone.
    pub fn mirrored_output_path<P: AsRef<Path>>(
        input_file: P,
        source_marker: &str,
        output_marker: &str,
    ) -> Result<PathBuf> {
        let input_file = input_file.as_ref();
        let mut replaced = false;
        let mut output = PathBuf::new();

        for component in input_file.components() {
            match component {
                Component::Normal(name) if !replaced && name == OsStr::new(source_marker) => {
                    output.push(output_marker);
                    replaced = true;
                }
                other => output.push(other.as_os_str()),
            }
        }

        if !replaced {
            return Err(anyhow!(
                "Path {:?} has no '{}' directory to mirror into '{}'",
                input_file,
                source_marker,
                output_marker
            ));
        }

        Ok(output)
    }
}
