use super::error::IoError;
use super::traits::TableFile;
use crate::core::models::topology::TopologyRecord;
use std::io::{Read, Write};

/// Space-delimited `distance curvature` rows, one per seed, no header.
///
/// Values are written in scientific notation with 18 fractional digits so
/// the file reads back bit-for-bit.
pub struct TopologyTable;

impl TableFile for TopologyTable {
    type Table = Vec<TopologyRecord>;

    fn read_from(reader: impl Read) -> Result<Self::Table, IoError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize::<(f64, f64)>()
            .map(|row| {
                let (distance, mean_curvature) = row?;
                Ok(TopologyRecord::new(distance, mean_curvature))
            })
            .collect()
    }

    fn write_to(table: &Self::Table, writer: impl Write) -> Result<(), IoError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(writer);

        for record in table {
            csv_writer.write_record([
                format!("{:.18e}", record.distance),
                format!("{:.18e}", record.mean_curvature),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
