use std::io::{Read, Write};
use std::path::Path;

/// Trait for importing types from a file path or reader
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Import from a reader, specifying the format.
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error>;

    /// Import from a file path.
    /// The format is inferred from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::import_from_reader(reader, &format)
    }

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }
}

/// Trait for exporting types to a file path or writer
pub trait Exportable {
    /// The error type returned by export operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Export to a writer, specifying the format.
    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error>;

    /// Export to a file path.
    /// The format is inferred from the file extension.
    fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let format = infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        self.export_to_writer(writer, &format)
    }

    /// Export into an in-memory byte vector, specifying the format.
    fn export_to_bytes(&self, format: &str) -> Result<Vec<u8>, Self::Error> {
        let mut bytes = Vec::new();
        self.export_to_writer(&mut bytes, format)?;
        Ok(bytes)
    }
}

/// Infer the (lowercase) format from the extension of a path
///
/// Leading dots in explicitly passed formats are tolerated by [`normalize_format`].
pub fn infer_format(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Normalize a format string (e.g., `".TGF"` becomes `"tgf"`)
pub fn normalize_format(format: &str) -> String {
    format.trim_start_matches('.').to_lowercase()
}
