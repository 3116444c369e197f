use super::error::IoError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Defines the interface for reading and writing delimited numeric tables.
///
/// Implementors handle the format-specific layout of one table type; the
/// path-based helpers wrap files in buffered readers and writers.
pub trait TableFile {
    /// The in-memory table this format reads and writes.
    type Table;

    /// Reads a table from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or reading fails.
    fn read_from(reader: impl Read) -> Result<Self::Table, IoError>;

    /// Writes a table to any writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(table: &Self::Table, writer: impl Write) -> Result<(), IoError>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Table, IoError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    fn write_to_path<P: AsRef<Path>>(table: &Self::Table, path: P) -> Result<(), IoError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(table, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
