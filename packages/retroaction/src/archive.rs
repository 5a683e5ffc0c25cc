//! Zip bundle of every generated document.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Archive opened once per batch and finalized after every subject.
pub struct FeedbackArchive {
    path: PathBuf,
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
    entries: usize,
}

impl FeedbackArchive {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "Opened archive");
        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: 0,
        })
    }

    /// Copy `source` into the archive as `entry_name`.
    pub fn add_document(&mut self, source: &Path, entry_name: &str) -> Result<()> {
        let bytes = fs::read(source)?;
        self.zip.start_file(entry_name, self.options)?;
        self.zip.write_all(&bytes)?;
        self.entries += 1;
        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and close the file.
    pub fn finish(self) -> Result<PathBuf> {
        self.zip.finish()?;
        tracing::info!(path = %self.path.display(), entries = self.entries, "Finalized archive");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    #[test]
    fn test_entries_are_named_and_ordered() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.pdf");
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();

        let mut archive = FeedbackArchive::create(&dir.path().join("travaux.zip")).unwrap();
        archive.add_document(&second, "2045124.pdf").unwrap();
        archive.add_document(&first, "2045123.pdf").unwrap();
        assert_eq!(archive.entries(), 2);
        let path = archive.finish().unwrap();

        let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "2045124.pdf");

        let mut content = String::new();
        zip.by_name("2045123.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "first");
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let dir = tempdir().unwrap();
        let path = FeedbackArchive::create(&dir.path().join("travaux.zip"))
            .unwrap()
            .finish()
            .unwrap();

        assert_eq!(ZipArchive::new(File::open(path).unwrap()).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempdir().unwrap();
        let mut archive = FeedbackArchive::create(&dir.path().join("travaux.zip")).unwrap();
        assert!(archive
            .add_document(&dir.path().join("absent.pdf"), "absent.pdf")
            .is_err());
    }
}
