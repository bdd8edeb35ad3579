//! Reading an upload from disk.

use sensordash_cli::CompressionFormat;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::IngestError;

/// A file chosen for upload plus how to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: PathBuf,
    pub compression: Option<CompressionFormat>,
}

impl Upload {
    /// Explicit compression wins; otherwise it is detected from the extension.
    pub fn new(path: PathBuf, compression: Option<CompressionFormat>) -> Self {
        let compression = compression.or_else(|| CompressionFormat::from_extension(&path));
        Self { path, compression }
    }

    /// File name shown in the UI.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn read(&self) -> Result<Vec<u8>, IngestError> {
        read_bytes(&self.path, self.compression)
    }
}

/// Read the whole file into memory, decompressing when asked.
pub fn read_bytes(path: &Path, compression: Option<CompressionFormat>) -> Result<Vec<u8>, IngestError> {
    let f = File::open(path)?;
    let mut reader: Box<dyn Read> = match compression {
        None => Box::new(BufReader::new(f)),
        Some(CompressionFormat::Gzip) => Box::new(flate2::read::GzDecoder::new(BufReader::new(f))),
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(BufReader::new(f))?),
        Some(CompressionFormat::Bzip2) => Box::new(bzip2::read::BzDecoder::new(BufReader::new(f))),
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(BufReader::new(f))),
    };
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    info!(
        path = %path.display(),
        compression = ?compression,
        bytes = bytes.len(),
        "read upload"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn plain_file_is_read_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let upload = Upload::new(path, None);
        assert_eq!(upload.compression, None);
        assert_eq!(upload.read().unwrap(), b"a\n1\n");
        assert_eq!(upload.display_name(), "data.csv");
    }

    #[test]
    fn gzip_is_detected_from_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv.gz");
        let mut enc =
            flate2::write::GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::default());
        enc.write_all(b"Time,v\n2024-01-01,1\n").unwrap();
        enc.finish().unwrap();

        let upload = Upload::new(path, None);
        assert_eq!(upload.compression, Some(CompressionFormat::Gzip));
        assert_eq!(upload.read().unwrap(), b"Time,v\n2024-01-01,1\n");
    }

    #[test]
    fn explicit_compression_overrides_extension() {
        let upload = Upload::new(PathBuf::from("readings.dat"), Some(CompressionFormat::Zstd));
        assert_eq!(upload.compression, Some(CompressionFormat::Zstd));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_bytes(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
