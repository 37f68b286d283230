//! Census table reading.

use std::io::Cursor;

use polars::io::SerReader;
use polars::prelude::{CsvReadOptions, DataFrame, PolarsResult};

/// Read a census CSV (header row, a `name` column and one column per year)
/// into a DataFrame. Every column is kept as text; cells are parsed later
/// by the census model so that bad values are reported per region.
pub fn read_census_table(bytes: &[u8]) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Column names of a table, in file order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
