//! CSV writers for accessibility tables and cost matrices.
//!
//! | Table         | Header                                  |
//! |---------------|-----------------------------------------|
//! | node-level    | `node_id,<variable>...`                 |
//! | geometry-level| `row,node_id,<variable>...`             |
//! | cost matrix   | `origin,<destination label>...`         |
//!
//! Unreachable matrix cells are written as `inf`.

use std::io::Write;
use std::path::Path;

use csv::Writer;

use ns_access::{AccessTable, CostMatrix};

use crate::OutputResult;

/// Write an [`AccessTable`] to `path`, replacing any existing file.
pub fn write_access_csv(path: &Path, table: &AccessTable) -> OutputResult<()> {
    write_access(Writer::from_path(path)?, table)
}

/// Like [`write_access_csv`] but into any `Write` sink.
pub fn write_access_writer<W: Write>(sink: W, table: &AccessTable) -> OutputResult<()> {
    write_access(Writer::from_writer(sink), table)
}

fn write_access<W: Write>(mut w: Writer<W>, table: &AccessTable) -> OutputResult<()> {
    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 2);
    if table.rows.is_some() {
        header.push("row");
    }
    header.push("node_id");
    header.extend(table.variable_names());
    w.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for i in 0..table.len() {
        record.clear();
        if let Some(rows) = &table.rows {
            record.push(rows[i].to_string());
        }
        record.push(table.node_ids[i].to_string());
        record.extend(table.columns.iter().map(|(_, values)| values[i].to_string()));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

/// Write a [`CostMatrix`] to `path`, one row per origin.
pub fn write_cost_matrix_csv(path: &Path, matrix: &CostMatrix) -> OutputResult<()> {
    write_matrix(Writer::from_path(path)?, matrix)
}

/// Like [`write_cost_matrix_csv`] but into any `Write` sink.
pub fn write_cost_matrix_writer<W: Write>(sink: W, matrix: &CostMatrix) -> OutputResult<()> {
    write_matrix(Writer::from_writer(sink), matrix)
}

fn write_matrix<W: Write>(mut w: Writer<W>, matrix: &CostMatrix) -> OutputResult<()> {
    let mut header = Vec::with_capacity(matrix.col_labels.len() + 1);
    header.push("origin");
    header.extend(matrix.col_labels.iter().map(String::as_str));
    w.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for (label, row) in matrix.row_labels.iter().zip(&matrix.values) {
        record.clear();
        record.push(label.clone());
        record.extend(row.iter().map(|v| v.to_string()));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}
