use super::error::IoError;
use super::traits::TableFile;
use crate::core::models::charges::ChargeSet;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize, Serialize)]
struct ChargeRow {
    x: f64,
    y: f64,
    z: f64,
    charge: f64,
}

/// Comma-separated charge table with an `x,y,z,charge` header.
///
/// Lines starting with `#` are ignored and fields may be padded with spaces.
pub struct ChargeTable;

impl TableFile for ChargeTable {
    type Table = ChargeSet;

    fn read_from(reader: impl Read) -> Result<ChargeSet, IoError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut positions = Vec::new();
        let mut charges = Vec::new();
        for (idx, row) in csv_reader.deserialize::<ChargeRow>().enumerate() {
            let row = row?;
            if ![row.x, row.y, row.z, row.charge].iter().all(|v| v.is_finite()) {
                return Err(IoError::InvalidRow {
                    row: idx + 1,
                    message: "all fields must be finite numbers".to_string(),
                });
            }
            positions.push(Point3::new(row.x, row.y, row.z));
            charges.push(row.charge);
        }
        Ok(ChargeSet::new(positions, charges)?)
    }

    fn write_to(table: &ChargeSet, writer: impl Write) -> Result<(), IoError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (p, charge) in table.iter() {
            csv_writer.serialize(ChargeRow {
                x: p.x,
                y: p.y,
                z: p.z,
                charge,
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_parses_padded_rows_and_skips_comments() {
        let content = "x, y, z, charge\n# a comment\n1.0, 2.0, 3.0, -0.5\n 4.0,5.0,6.0,0.25\n";
        let set = ChargeTable::read_from(content.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.positions()[1], Point3::new(4.0, 5.0, 6.0));
        assert_eq!(set.charges(), &[-0.5, 0.25]);
    }

    #[test]
    fn read_rejects_non_numeric_field() {
        let content = "x,y,z,charge\n1.0,abc,3.0,1.0\n";
        assert!(matches!(
            ChargeTable::read_from(content.as_bytes()),
            Err(IoError::Csv(_))
        ));
    }

    #[test]
    fn read_rejects_non_finite_values() {
        let content = "x,y,z,charge\n1.0,2.0,3.0,NaN\n";
        assert!(matches!(
            ChargeTable::read_from(content.as_bytes()),
            Err(IoError::InvalidRow { row: 1, .. })
        ));
    }

    #[test]
    fn empty_table_reads_as_empty_set() {
        let set = ChargeTable::read_from("x,y,z,charge\n".as_bytes()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn written_file_can_be_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("charges.csv");
        let set = ChargeSet::new(
            vec![Point3::new(0.5, -1.25, 8.0), Point3::new(3.0, 3.0, 3.0)],
            vec![1.0, -2.0],
        )
        .unwrap();

        ChargeTable::write_to_path(&set, &path).unwrap();
        let read_back = ChargeTable::read_from_path(&path).unwrap();
        assert_eq!(read_back, set);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = ChargeTable::read_from_path(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(IoError::Io(_))));
    }
}
