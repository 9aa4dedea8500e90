//! CSV point loader.
//!
//! # CSV format
//!
//! One row per point.  Two columns hold the coordinates; every other column
//! becomes an attribute of the resulting [`GeoFrame`].
//!
//! ```csv
//! geoid,x,y,total_pop,black_pop
//! 060710001,-117.40,33.95,4120,310
//! 060710002,-117.38,33.96,3875,
//! ```
//!
//! An attribute column is numeric when every non-empty cell parses as a
//! number; empty cells then read as `NaN`, which aggregation skips.  Any
//! other column is kept as text, so zero-padded ids survive intact.

use std::io::Read;
use std::path::Path;

use ns_core::{Column, Crs, GeoFrame};

use crate::{OutputError, OutputResult};

/// Which columns hold the point coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointColumns {
    pub x: String,
    pub y: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self { x: "x".to_owned(), y: "y".to_owned() }
    }
}

/// Load a point [`GeoFrame`] from a CSV file.
pub fn read_points_csv(path: &Path, columns: &PointColumns, crs: Option<Crs>) -> OutputResult<GeoFrame> {
    let file = std::fs::File::open(path)?;
    read_points_reader(file, columns, crs)
}

/// Like [`read_points_csv`] but accepts any `Read` source.
pub fn read_points_reader<R: Read>(
    reader: R,
    columns: &PointColumns,
    crs: Option<Crs>,
) -> OutputResult<GeoFrame> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| OutputError::MissingColumn(name.to_owned()))
    };
    let xi = position(&columns.x)?;
    let yi = position(&columns.y)?;

    let mut points: Vec<(f64, f64)> = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let coord = |i: usize| -> OutputResult<f64> {
            let raw = record.get(i).unwrap_or("").trim();
            raw.parse().map_err(|_| OutputError::Parse {
                line,
                column: headers[i].to_owned(),
                value:  raw.to_owned(),
            })
        };
        points.push((coord(xi)?, coord(yi)?));

        for (i, slot) in cells.iter_mut().enumerate() {
            if i != xi && i != yi {
                slot.push(record.get(i).unwrap_or("").trim().to_owned());
            }
        }
    }

    let mut frame = GeoFrame::from_xy(&points, crs);
    for (i, values) in cells.into_iter().enumerate() {
        if i == xi || i == yi {
            continue;
        }
        frame.add_column(&headers[i], infer_column(values))?;
    }
    Ok(frame)
}

fn infer_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values
        .iter()
        .map(|v| if v.is_empty() { Some(f64::NAN) } else { v.parse().ok() })
        .collect();
    match parsed {
        // Zero-padded codes look numeric but are identifiers.
        Some(nums) if !values.iter().any(|v| is_padded(v)) => Column::Float(nums),
        _ => Column::Text(values),
    }
}

fn is_padded(v: &str) -> bool {
    v.len() > 1 && v.starts_with('0') && !v.starts_with("0.")
}
