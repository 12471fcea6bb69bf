use std::io::{Cursor, Write};

use image_manager_application::{ApplicationError, ArchiveBuilder, ArchiveWriter};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds in-memory ZIP archives.
///
/// The folder exists only as a prefix on entry names, so an archive of `n`
/// images has exactly `n` entries.
#[derive(Debug, Default)]
pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    fn create_folder(&self, name: &str) -> Result<Box<dyn ArchiveBuilder>, ApplicationError> {
        let prefix = if name.is_empty() {
            String::new()
        } else {
            format!("{name}/")
        };
        Ok(Box::new(ZipArchiveBuilder {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            prefix,
        }))
    }
}

struct ZipArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    prefix: String,
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), ApplicationError> {
        self.writer
            .start_file(format!("{}{name}", self.prefix), entry_options())
            .map_err(|error| ApplicationError::Archive(error.to_string()))?;
        self.writer
            .write_all(bytes)
            .map_err(|error| ApplicationError::Archive(error.to_string()))
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, ApplicationError> {
        let builder = *self;
        let cursor = builder
            .writer
            .finish()
            .map_err(|error| ApplicationError::Archive(error.to_string()))?;
        Ok(cursor.into_inner())
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    fn entries(blob: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(blob)).expect("valid zip");
        (0..archive.len())
            .map(|index| {
                let mut file = archive.by_index(index).expect("entry");
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).expect("read entry");
                (file.name().to_string(), bytes)
            })
            .collect()
    }

    #[test]
    fn one_entry_per_file_inside_the_folder_in_insertion_order() {
        let mut builder = ZipArchiveWriter.create_folder("compress").expect("folder");
        builder.add_file("0.webp", b"first").expect("add");
        builder.add_file("1.webp", b"second").expect("add");
        let blob = builder.finish().expect("finish");

        let entries = entries(blob);
        assert_eq!(
            entries,
            vec![
                ("compress/0.webp".to_string(), b"first".to_vec()),
                ("compress/1.webp".to_string(), b"second".to_vec()),
            ]
        );
    }

    #[test]
    fn empty_folder_name_writes_entries_at_the_root() {
        let mut builder = ZipArchiveWriter.create_folder("").expect("folder");
        builder.add_file("0.png", b"data").expect("add");
        let entries = entries(builder.finish().expect("finish"));
        assert_eq!(entries, vec![("0.png".to_string(), b"data".to_vec())]);
    }
}
