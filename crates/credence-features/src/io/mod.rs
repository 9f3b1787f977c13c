pub mod csv_table;

pub use csv_table::{read_table, read_table_csv, write_table_csv};
