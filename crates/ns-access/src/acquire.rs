//! Street network acquisition for a study area.
//!
//! ```text
//! study area (any CRS) ─▶ bounds + maxdist buffer ─▶ EPSG:4326 box
//!     ─▶ NetworkSource::fetch ─▶ RawNetwork (lon/lat)
//!     ─▶ reproject nodes into output CRS ─▶ StreetNetwork
//! ```

use ns_core::{BBox, Crs, GeoFrame, Transformer};
use ns_spatial::{NetworkSource, StreetNetwork};

use crate::{AccessError, AccessResult, NetworkQuery};

/// Segments per bbox side when a rectangle is reprojected.
const DENSIFY: usize = 21;

/// Fetch a routable street network covering `study_area` plus a
/// `query.maxdist` buffer.
///
/// Node coordinates of the result are in `query.output_crs`, or the study
/// area's CRS when that is `None`.  Edges carry a single `distance`
/// impedance in metres.
///
/// # Errors
///
/// - [`AccessError::MissingCrs`] when the study area has no CRS.  The
///   source is never called in that case.
/// - Any error from the source or from reprojection.
pub fn get_osm_network(
    study_area: &GeoFrame,
    source: &dyn NetworkSource,
    query: &NetworkQuery,
) -> AccessResult<StreetNetwork> {
    let crs = study_area.crs().ok_or(AccessError::MissingCrs)?;
    let output_crs = query.output_crs.as_ref().unwrap_or(crs);

    let bbox = fetch_bounds(study_area, crs, query.maxdist)?;
    log::info!("fetching street network from {} source for {bbox}", source.name());

    let raw = source.fetch(bbox, &query.fetch)?;
    let tf = Transformer::new(&Crs::WGS84, output_crs)?;
    let network = raw.to_network(&tf)?;

    log::info!(
        "street network ready: {} nodes, {} edges in {output_crs}",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// The EPSG:4326 rectangle to request for a study area in `crs`.
///
/// A geographic study area is buffered in an estimated UTM zone so that
/// `maxdist` is in metres.
pub fn fetch_bounds(study_area: &GeoFrame, crs: &Crs, maxdist: f64) -> AccessResult<BBox> {
    let bounds = study_area.total_bounds()?;

    if crs.is_geographic() {
        let (lon, lat) = bounds.center();
        let utm = Crs::estimate_utm(lon, lat);
        log::warn!(
            "study area is stored in a geographic CRS ({crs}); \
             estimating the {maxdist} buffer in {utm}"
        );
        let buffered = Transformer::new(crs, &utm)?
            .transform_bbox(bounds, DENSIFY)?
            .expand(maxdist);
        Ok(Transformer::new(&utm, &Crs::WGS84)?.transform_bbox(buffered, DENSIFY)?)
    } else {
        let buffered = bounds.expand(maxdist);
        Ok(Transformer::new(crs, &Crs::WGS84)?.transform_bbox(buffered, DENSIFY)?)
    }
}
