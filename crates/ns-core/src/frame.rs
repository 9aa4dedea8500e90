//! `GeoFrame`: geometries plus named attribute columns.
//!
//! A deliberately small stand-in for a geo-dataframe: one geometry per row,
//! an optional CRS, and columns that are either numeric (demographic counts)
//! or text (labels such as tract GEOIDs).  Columns are kept in insertion
//! order.

use geo::{BoundingRect, Centroid, Coord, Geometry, MapCoords, Point};

use crate::crs::{Crs, Transformer};
use crate::geo::BBox;
use crate::{CoreError, CoreResult};

/// One attribute column.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v)  => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `row` rendered as a label.
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            Column::Float(v) => v.get(row).map(|x| format_number(*x)),
            Column::Text(v)  => v.get(row).cloned(),
        }
    }
}

/// Integers print without a trailing `.0` so numeric id columns make clean labels.
fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

// ── GeoFrame ──────────────────────────────────────────────────────────────────

/// Study-area rows: points or polygons with attributes.
#[derive(Clone, Debug, Default)]
pub struct GeoFrame {
    crs:        Option<Crs>,
    geometries: Vec<Geometry<f64>>,
    columns:    Vec<(String, Column)>,
}

impl GeoFrame {
    pub fn new(geometries: Vec<Geometry<f64>>, crs: Option<Crs>) -> Self {
        Self { crs, geometries, columns: Vec::new() }
    }

    /// Convenience: one point geometry per `(x, y)` pair.
    pub fn from_xy(points: &[(f64, f64)], crs: Option<Crs>) -> Self {
        let geometries = points
            .iter()
            .map(|&(x, y)| Geometry::Point(Point::new(x, y)))
            .collect();
        Self::new(geometries, crs)
    }

    /// Builder-style [`add_column`](Self::add_column).
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> CoreResult<Self> {
        self.add_column(name, column)?;
        Ok(self)
    }

    /// Insert or replace a column.  Its length must equal the row count.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> CoreResult<()> {
        let name = name.into();
        if column.len() != self.len() {
            return Err(CoreError::ColumnLength {
                name,
                expected: self.len(),
                got:      column.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn column(&self, name: &str) -> CoreResult<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| CoreError::ColumnNotFound(name.to_owned()))
    }

    /// A numeric column's values.
    pub fn numeric(&self, name: &str) -> CoreResult<&[f64]> {
        match self.column(name)? {
            Column::Float(v) => Ok(v),
            Column::Text(_)  => Err(CoreError::NotNumeric(name.to_owned())),
        }
    }

    /// Any column's values rendered as labels.
    pub fn labels(&self, name: &str) -> CoreResult<Vec<String>> {
        let col = self.column(name)?;
        Ok((0..col.len()).filter_map(|i| col.label(i)).collect())
    }

    // ── Geometry queries ──────────────────────────────────────────────────

    /// Centroid of every row; `None` for empty geometries.
    pub fn centroids(&self) -> Vec<Option<(f64, f64)>> {
        self.geometries
            .iter()
            .map(|g| g.centroid().map(|p| (p.x(), p.y())))
            .collect()
    }

    /// Bounds covering every non-empty geometry.
    pub fn total_bounds(&self) -> CoreResult<BBox> {
        self.geometries
            .iter()
            .filter_map(|g| g.bounding_rect())
            .map(|r| BBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
            .reduce(BBox::union)
            .ok_or(CoreError::EmptyFrame)
    }

    /// Reproject every geometry into `to`.  Attributes are carried unchanged.
    pub fn to_crs(&self, to: &Crs) -> CoreResult<GeoFrame> {
        let from = self.crs.as_ref().ok_or(CoreError::MissingCrs)?;
        let tf = Transformer::new(from, to)?;

        let geometries = self
            .geometries
            .iter()
            .map(|g| {
                g.try_map_coords(|c: Coord<f64>| {
                    tf.transform(c.x, c.y).map(|(x, y)| Coord { x, y })
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(GeoFrame {
            crs: Some(to.clone()),
            geometries,
            columns: self.columns.clone(),
        })
    }
}
