//! Bounding boxes and great-circle distance.
//!
//! Coordinates are `f64` throughout: projected CRSs routinely carry values in
//! the millions of metres, where `f32` would lose sub-metre precision.

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in metres between two lon/lat points
/// given in degrees.
pub fn haversine_m(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat * 0.5).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in the units of whatever CRS it came from.
///
/// In a geographic CRS `x` is longitude and `y` is latitude, so
/// `(south, west, north, east)` = `(min_y, min_x, max_y, max_x)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    #[inline]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box covering every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => BBox::new(x, y, x, y),
                Some(b) => b.include(x, y),
            })
        })
    }

    /// Grow the box so it covers `(x, y)`.
    #[inline]
    pub fn include(self, x: f64, y: f64) -> Self {
        BBox {
            min_x: self.min_x.min(x),
            min_y: self.min_y.min(y),
            max_x: self.max_x.max(x),
            max_y: self.max_y.max(y),
        }
    }

    /// Union of two boxes.
    #[inline]
    pub fn union(self, other: BBox) -> Self {
        self.include(other.min_x, other.min_y).include(other.max_x, other.max_y)
    }

    /// Expand every side outward by `d`.
    ///
    /// For a set of geometries this equals the total bounds of the geometries
    /// each buffered by `d`.
    #[inline]
    pub fn expand(self, d: f64) -> Self {
        BBox {
            min_x: self.min_x - d,
            min_y: self.min_y - d,
            max_x: self.max_x + d,
            max_y: self.max_y + d,
        }
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 { self.max_x - self.min_x }
    pub fn height(&self) -> f64 { self.max_y - self.min_y }

    pub fn south(&self) -> f64 { self.min_y }
    pub fn west(&self) -> f64 { self.min_x }
    pub fn north(&self) -> f64 { self.max_y }
    pub fn east(&self) -> f64 { self.max_x }

    /// Points along all four edges, `per_side` segments per edge, starting at
    /// the south-west corner and going counter-clockwise.
    ///
    /// Reprojecting only the corners underestimates the extent whenever the
    /// target CRS bends straight lines.
    pub fn densify(&self, per_side: usize) -> Vec<(f64, f64)> {
        let n = per_side.max(1);
        let mut out = Vec::with_capacity(n * 4);
        for i in 0..n {
            let t = i as f64 / n as f64;
            out.push((self.min_x + t * self.width(), self.min_y));
        }
        for i in 0..n {
            let t = i as f64 / n as f64;
            out.push((self.max_x, self.min_y + t * self.height()));
        }
        for i in 0..n {
            let t = i as f64 / n as f64;
            out.push((self.max_x - t * self.width(), self.max_y));
        }
        for i in 0..n {
            let t = i as f64 / n as f64;
            out.push((self.min_x, self.max_y - t * self.height()));
        }
        out
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}, {:.6}, {:.6}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
