use std::fs;
use std::path::{Path, PathBuf};

use image_manager_application::{ApplicationError, RawFile};
use image_manager_domain::detect_image_format;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct LoadedFiles {
    pub scanned_files: usize,
    pub skipped_files: usize,
    pub files: Vec<RawFile>,
}

/// Reads upload candidates from disk.
///
/// Files named explicitly are always loaded and left for the decoder to judge.
/// Folders are walked recursively in path order and only files with a
/// supported image extension are picked up.
#[derive(Debug, Default)]
pub struct WalkdirFileLoader;

impl WalkdirFileLoader {
    pub fn load(&self, inputs: &[PathBuf]) -> Result<LoadedFiles, ApplicationError> {
        let mut loaded = LoadedFiles::default();

        for input in inputs {
            if input.is_file() {
                loaded.scanned_files += 1;
                loaded.files.push(read_raw_file(input)?);
                continue;
            }
            if !input.is_dir() {
                return Err(ApplicationError::InvalidInput(format!(
                    "path does not exist: {}",
                    input.display()
                )));
            }

            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }

                loaded.scanned_files += 1;
                if detect_image_format(entry.path()).is_none() {
                    debug!(path = %entry.path().display(), "skipping unsupported file");
                    loaded.skipped_files += 1;
                    continue;
                }
                loaded.files.push(read_raw_file(entry.path())?);
            }
        }

        Ok(loaded)
    }
}

fn read_raw_file(path: &Path) -> Result<RawFile, ApplicationError> {
    let bytes = fs::read(path)
        .map_err(|error| ApplicationError::Io(format!("{}: {error}", path.display())))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(RawFile { name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn folders_yield_supported_files_in_path_order() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("b.png"), b"b").expect("write");
        fs::write(dir.path().join("a.JPG"), b"a").expect("write");
        fs::write(dir.path().join("notes.txt"), b"n").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested").join("c.webp"), b"c").expect("write");

        let loaded = WalkdirFileLoader
            .load(&[dir.path().to_path_buf()])
            .expect("load");

        let names: Vec<_> = loaded.files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
        assert_eq!(loaded.scanned_files, 4);
        assert_eq!(loaded.skipped_files, 1);
        assert_eq!(loaded.files[1].bytes, b"b");
    }

    #[test]
    fn explicit_files_are_loaded_regardless_of_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("scan.raw");
        fs::write(&path, b"raw").expect("write");

        let loaded = WalkdirFileLoader.load(&[path]).expect("load");
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].name, "scan.raw");
    }

    #[test]
    fn missing_path_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let result = WalkdirFileLoader.load(&[dir.path().join("missing")]);
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }
}
