use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions recognized as XLIFF scene documents
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["xliff", "xlf"];

/// Extensions recognized as subtitle cue streams, in lookup order
pub const SUBTITLE_EXTENSIONS: [&str; 2] = ["srt", "vtt"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Sibling output path `<stem>.<suffix>` next to the input
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(suffix);

        input_file.with_file_name(output_filename)
    }

    /// Read a file as raw bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a text file, replacing invalid UTF-8 sequences
    pub fn read_text_lossy<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = Self::read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find files with one of the given extensions in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, extensions) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Subtitle file sharing the document's stem, if one exists
    pub fn find_subtitle_for<P: AsRef<Path>>(document: P) -> Option<PathBuf> {
        let document = document.as_ref();
        SUBTITLE_EXTENSIONS
            .iter()
            .map(|ext| document.with_extension(ext))
            .find(|candidate| Self::file_exists(candidate))
    }

    // @checks: Case-insensitive extension match
    pub fn has_extension<P: AsRef<Path>>(path: P, extensions: &[&str]) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted))
            })
            .unwrap_or(false)
    }
}
