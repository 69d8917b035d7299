//! CSV reading and writing of datasets.
//!
//! The first record is the header. With `row_labels` the first column of every
//! record is taken as the row label instead of a feature. Empty fields and the
//! tokens `NA`, `NaN` and `null` (any case) read as missing; missing cells are
//! written back as empty fields.
//!
//! CSV carries no cell types, so a text cell that spells a missing token is
//! written verbatim and reads back as missing. Writing such a cell logs a
//! warning with the number of affected cells.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use amp_common::{Cell, Dataset, Error, Result};
use tracing::{debug, warn};

pub fn read_csv(path: &Path, row_labels: bool) -> Result<Dataset> {
    let file = File::open(path)?;
    let data = read_csv_from(file, row_labels)?;
    debug!(
        path = %path.display(),
        rows = data.n_rows(),
        cols = data.n_cols(),
        "Read dataset"
    );
    Ok(data)
}

pub fn read_csv_from<R: Read>(reader: R, row_labels: bool) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut names: Vec<String> = rdr
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if row_labels {
        if names.is_empty() {
            return Err(Error::Dataset("header has no row label column".to_string()));
        }
        names.remove(0);
    }

    let mut labels = Vec::new();
    let mut rows = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let mut fields = record.iter();
        if row_labels {
            labels.push(fields.next().unwrap_or_default().to_string());
        }
        let cells: Vec<Cell> = fields.map(Cell::parse_field).collect();
        if cells.len() != names.len() {
            return Err(Error::RaggedRow {
                row,
                expected: names.len(),
                actual: cells.len(),
            });
        }
        rows.push(cells);
    }

    let data = Dataset::from_rows(rows)?.with_columns(names)?;
    if row_labels {
        data.with_row_labels(labels)
    } else {
        Ok(data)
    }
}

pub fn write_csv(path: &Path, data: &Dataset) -> Result<()> {
    let file = File::create(path)?;
    write_csv_to(file, data)?;
    debug!(path = %path.display(), rows = data.n_rows(), "Wrote dataset");
    Ok(())
}

/// Write `data` with a header row. Unlabeled columns are named by index and
/// the row label column, when present, has an empty header.
pub fn write_csv_to<W: Write>(writer: W, data: &Dataset) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let labels = data.row_labels();

    let mut header: Vec<String> = Vec::with_capacity(data.n_cols() + 1);
    if labels.is_some() {
        header.push(String::new());
    }
    header.extend((0..data.n_cols()).map(|c| data.column_name(c)));
    wtr.write_record(&header).map_err(csv_error)?;

    let mut ambiguous = 0usize;
    for (idx, row) in data.rows().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
        if let Some(labels) = labels {
            record.push(labels[idx].clone());
        }
        ambiguous += row.iter().filter(|c| reads_back_missing(c)).count();
        record.extend(row.iter().map(Cell::to_string));
        wtr.write_record(&record).map_err(csv_error)?;
    }
    wtr.flush()?;
    if ambiguous > 0 {
        warn!(
            cells = ambiguous,
            "Text cells spelling a missing-value token will read back as missing"
        );
    }
    Ok(())
}

/// True for a text cell whose written form parses back as [`Cell::Missing`].
pub fn reads_back_missing(cell: &Cell) -> bool {
    match cell {
        Cell::Text(text) => Cell::parse_field(text).is_missing(),
        _ => false,
    }
}

fn csv_error(err: csv::Error) -> Error {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            other => Error::Dataset(format!("{:?}", other)),
        }
    } else {
        Error::Dataset(format!("invalid CSV: {}", err))
    }
}
