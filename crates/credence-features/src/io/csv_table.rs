//! CSV reader and writer for [`Table`].
//!
//! The first row is the header. Empty cells (and `nan`) load as
//! [`Value::Missing`]; anything that parses as a number loads as a number.
use std::io::Read;
use std::path::Path;

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};

/// Read a comma separated file with a header row.
pub fn read_table_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)?;
    let table = read_records(reader)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.nrows(),
        table.ncols(),
        path.as_ref().display()
    );
    Ok(table)
}

/// Read CSV from any reader, e.g. an in-memory buffer.
pub fn read_table<R: Read>(rdr: R) -> Result<Table> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);
    read_records(reader)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(FeatureError::EmptyData("CSV input has no header row".to_string()));
    }
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.push(Value::parse(cell));
        }
    }
    Table::from_columns(headers.iter().zip(columns).collect())
}

/// Write `table` with a header row. Missing cells are written empty.
pub fn write_table_csv<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(table.column_names())?;
    for row in 0..table.nrows() {
        writer.write_record(table.columns().map(|(_, values)| values[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_parses_cells() {
        let data = "CODE_GENDER,CNT_CHILDREN,OCCUPATION_TYPE\nM,0,\nF,2,Managers\n";
        let table = read_table(data.as_bytes()).unwrap();
        assert_eq!(
            table.column_names(),
            &["CODE_GENDER", "CNT_CHILDREN", "OCCUPATION_TYPE"]
        );
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.column("CNT_CHILDREN").unwrap()[1], Value::Number(2.0));
        assert_eq!(table.column("OCCUPATION_TYPE").unwrap()[0], Value::Missing);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(read_table(data.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset_train.csv");
        let table = read_table("a,b\n1,x\n,y\n".as_bytes()).unwrap();
        write_table_csv(&path, &table).unwrap();
        assert_eq!(read_table_csv(&path).unwrap(), table);
    }
}
