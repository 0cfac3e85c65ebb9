use super::writer;
use crate::core::models::document::{Format, StructureDocument};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::Utf8Error;

/// Defines the interface for reading and writing structure file formats.
///
/// Implementors only provide text parsing; byte decoding, path handling and
/// serialization are shared, because every format is written back segment by segment
/// from the text it was read from.
pub trait StructureFile {
    /// The error type for I/O and parsing operations.
    type Error: Error + From<io::Error> + From<Utf8Error>;

    /// The format this implementation reads.
    fn format() -> Format;

    /// Parses a complete document from text.
    ///
    /// # Arguments
    ///
    /// * `text` - The full file contents.
    ///
    /// # Return
    ///
    /// Returns the parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if a tracked table is malformed.
    fn parse(text: &str) -> Result<StructureDocument, Self::Error>;

    /// Parses a document from raw bytes, which must be valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or parsing fails.
    fn parse_bytes(bytes: &[u8]) -> Result<StructureDocument, Self::Error> {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    /// Reads a document from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Return
    ///
    /// Returns the parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, the input is not UTF-8, or parsing fails.
    fn read_from(reader: &mut impl BufRead) -> Result<StructureDocument, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_bytes(&bytes)
    }

    /// Writes a document to a writer.
    ///
    /// # Arguments
    ///
    /// * `doc` - The document to write.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(doc: &StructureDocument, writer: &mut impl Write) -> Result<(), Self::Error> {
        writer::write(doc, writer)?;
        Ok(())
    }

    /// Reads a document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<StructureDocument, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a document to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        doc: &StructureDocument,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(doc, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
