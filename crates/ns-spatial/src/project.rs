//! Network reprojection.
//!
//! The R-tree is keyed on coordinate values, so a network cannot be moved to
//! another CRS in place.  [`project_network`] transforms the node
//! coordinates and rebuilds from the original node ids, input edge list,
//! every impedance column and the `twoway` flag.  Attached variables and
//! precomputed ranges do not survive the rebuild.

use ns_core::{reproject_points, Crs};

use crate::network::{network_from_arrays, StreetNetwork};
use crate::{SpatialError, SpatialResult};

/// Rebuild `network` with node coordinates moved from `input_crs` to
/// `output_crs`.
///
/// # Errors
///
/// [`SpatialError::MissingOutputCrs`] when `output_crs` is `None`, before
/// any coordinate is touched.
pub fn project_network(
    network: &StreetNetwork,
    input_crs: &Crs,
    output_crs: Option<&Crs>,
) -> SpatialResult<StreetNetwork> {
    let output_crs = output_crs.ok_or(SpatialError::MissingOutputCrs)?;

    let xy: Vec<(f64, f64)> = network
        .node_x
        .iter()
        .zip(&network.node_y)
        .map(|(&x, &y)| (x, y))
        .collect();
    let projected = reproject_points(&xy, input_crs, output_crs)?;

    log::debug!(
        "reprojected {} nodes from {input_crs} to {output_crs}",
        projected.len()
    );

    network_from_arrays(
        &network.node_ids,
        &projected,
        network.input_edges(),
        network.impedance_names(),
        network.is_twoway(),
    )
}
