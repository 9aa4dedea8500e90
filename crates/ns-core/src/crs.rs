//! Coordinate reference systems and point reprojection.
//!
//! Projection math is delegated to `proj4rs`.  A [`Crs`] is either an EPSG
//! code from the small built-in table below or a raw PROJ.4 definition.
//!
//! | EPSG            | Definition                         |
//! |-----------------|------------------------------------|
//! | 4326            | WGS84 lon/lat (degrees)            |
//! | 4269            | NAD83 lon/lat (degrees)            |
//! | 3857            | Web Mercator (metres)              |
//! | 32601 – 32660   | WGS84 / UTM north zones (metres)   |
//! | 32701 – 32760   | WGS84 / UTM south zones (metres)   |
//! | 26901 – 26923   | NAD83 / UTM north zones (metres)   |
//!
//! Geographic coordinates are always **degrees** at the API boundary; the
//! radian conversion `proj4rs` needs happens inside [`Transformer`].

use std::fmt;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::geo::BBox;
use crate::{CoreError, CoreResult};

// ── Crs ───────────────────────────────────────────────────────────────────────

/// A coordinate reference system.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crs {
    /// An EPSG code from the built-in table.
    Epsg(u32),
    /// A raw PROJ.4 definition string.
    Proj4(String),
}

impl Crs {
    /// WGS84 longitude/latitude, the CRS every network source speaks.
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Parse `"EPSG:4326"`, `"epsg:32617"`, a bare code, or a `+proj=` string.
    pub fn parse(s: &str) -> CoreResult<Crs> {
        let s = s.trim();
        if s.starts_with("+proj=") {
            return Ok(Crs::Proj4(s.to_owned()));
        }
        let code = s
            .strip_prefix("EPSG:")
            .or_else(|| s.strip_prefix("epsg:"))
            .unwrap_or(s);
        let code: u32 = code.parse().map_err(|_| CoreError::InvalidProj {
            definition: s.to_owned(),
            reason:     "expected EPSG:<code> or a +proj= definition".to_owned(),
        })?;
        // Validate against the table now rather than on first transform.
        epsg_proj4(code)?;
        Ok(Crs::Epsg(code))
    }

    /// The PROJ.4 definition for this CRS.
    pub fn to_proj4(&self) -> CoreResult<String> {
        match self {
            Crs::Epsg(code) => epsg_proj4(*code),
            Crs::Proj4(s)   => Ok(s.clone()),
        }
    }

    /// `true` when coordinates are angular (lon/lat degrees).
    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Epsg(code) => matches!(code, 4326 | 4269),
            Crs::Proj4(s) => s
                .split_whitespace()
                .any(|tok| matches!(tok, "+proj=longlat" | "+proj=latlong" | "+proj=lonlat")),
        }
    }

    /// The UTM zone CRS containing `(lon, lat)` on the WGS84 datum.
    ///
    /// UTM distorts badly near the poles and across zone boundaries, but for
    /// city-scale buffers it is a serviceable linear-unit approximation.
    pub fn estimate_utm(lon: f64, lat: f64) -> Crs {
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        if lat >= 0.0 {
            Crs::Epsg(32_600 + zone)
        } else {
            Crs::Epsg(32_700 + zone)
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{code}"),
            Crs::Proj4(s)   => f.write_str(s),
        }
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Crs::Epsg(code)
    }
}

fn epsg_proj4(code: u32) -> CoreResult<String> {
    let def = match code {
        4326 => "+proj=longlat +datum=WGS84 +no_defs".to_owned(),
        4269 => "+proj=longlat +datum=NAD83 +no_defs".to_owned(),
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
            .to_owned(),
        32_601..=32_660 => {
            format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", code - 32_600)
        }
        32_701..=32_760 => {
            format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs", code - 32_700)
        }
        26_901..=26_923 => {
            format!("+proj=utm +zone={} +datum=NAD83 +units=m +no_defs", code - 26_900)
        }
        _ => return Err(CoreError::UnsupportedEpsg(code)),
    };
    Ok(def)
}

fn build_proj(crs: &Crs) -> CoreResult<Proj> {
    let definition = crs.to_proj4()?;
    Proj::from_proj_string(&definition).map_err(|e| CoreError::InvalidProj {
        reason: e.to_string(),
        definition,
    })
}

// ── Transformer ───────────────────────────────────────────────────────────────

/// A prepared `from → to` reprojection.
///
/// Build once, transform many points.  When both sides are the same CRS the
/// transformer is an exact identity and never touches `proj4rs`.
pub struct Transformer {
    from:          Proj,
    to:            Proj,
    from_geo:      bool,
    to_geo:        bool,
    identity:      bool,
}

impl Transformer {
    pub fn new(from: &Crs, to: &Crs) -> CoreResult<Self> {
        Ok(Self {
            from:     build_proj(from)?,
            to:       build_proj(to)?,
            from_geo: from.is_geographic(),
            to_geo:   to.is_geographic(),
            identity: from == to,
        })
    }

    /// Reproject a single point.
    pub fn transform(&self, x: f64, y: f64) -> CoreResult<(f64, f64)> {
        if self.identity {
            return Ok((x, y));
        }
        let mut point = if self.from_geo {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.from, &self.to, &mut point).map_err(|e| CoreError::Transform {
            x,
            y,
            reason: e.to_string(),
        })?;
        if self.to_geo {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }

    /// Reproject a batch of points; fails on the first point that fails.
    pub fn transform_all(&self, points: &[(f64, f64)]) -> CoreResult<Vec<(f64, f64)>> {
        points.iter().map(|&(x, y)| self.transform(x, y)).collect()
    }

    /// Reproject a rectangle and return the bounds of its image.
    ///
    /// Each edge is densified into `per_side` segments first.
    pub fn transform_bbox(&self, bbox: BBox, per_side: usize) -> CoreResult<BBox> {
        if self.identity {
            return Ok(bbox);
        }
        let projected = self.transform_all(&bbox.densify(per_side))?;
        BBox::from_points(projected).ok_or(CoreError::EmptyFrame)
    }
}

/// One-shot convenience over [`Transformer`].
pub fn reproject_points(
    points: &[(f64, f64)],
    from:   &Crs,
    to:     &Crs,
) -> CoreResult<Vec<(f64, f64)>> {
    Transformer::new(from, to)?.transform_all(points)
}
