//! Distance-decayed accessibility of population groups.
//!
//! For every study-area row the centroid is snapped to its nearest network
//! node.  Each requested variable is attached to the network under its own
//! name and aggregated as a decayed sum over all nodes within the search
//! distance.  The result is either one row per snapped node or one row per
//! input geometry.

use ns_core::{Column, CoreResult, GeoFrame, NodeId};
use ns_spatial::{AggregateQuery, SpatialError, StreetNetwork};

use crate::{AccessConfig, AccessError, AccessResult};

// ── AccessTable ───────────────────────────────────────────────────────────────

/// Output of [`calc_access`].
///
/// Node-level tables hold one row per unique snapped node, ascending by id,
/// with values rounded to whole numbers.  Geometry-level tables hold one row
/// per surviving input row, in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessTable {
    /// Input row of each output row; `None` for node-level tables.
    pub rows:     Option<Vec<usize>>,
    pub node_ids: Vec<NodeId>,
    /// `(variable, values)` in the order the variables were requested.
    pub columns:  Vec<(String, Vec<f64>)>,
}

impl AccessTable {
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn is_node_level(&self) -> bool {
        self.rows.is_none()
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Join a geometry-level table back onto the study area's geometries.
    ///
    /// The frame carries a `node_ids` column followed by one column per
    /// variable.  Returns `None` for node-level tables, which have no
    /// geometry of their own.
    pub fn to_frame(&self, study_area: &GeoFrame) -> CoreResult<Option<GeoFrame>> {
        let Some(rows) = &self.rows else {
            return Ok(None);
        };
        let geometries = rows
            .iter()
            .map(|&r| study_area.geometries()[r].clone())
            .collect();
        let mut frame = GeoFrame::new(geometries, study_area.crs().cloned()).with_column(
            "node_ids",
            Column::Float(self.node_ids.iter().map(|id| id.0 as f64).collect()),
        )?;
        for (name, values) in &self.columns {
            frame.add_column(name.clone(), Column::Float(values.clone()))?;
        }
        Ok(Some(frame))
    }
}

// ── calc_access ───────────────────────────────────────────────────────────────

/// Compute accessibility of each variable in `config.variables`.
///
/// `network` is mutated: each variable is attached under its own name
/// (replacing any earlier variable of that name) and, with
/// `config.precompute`, reachable sets are cached.  A cached precompute at
/// or beyond `config.distance` is reused rather than repeated.
///
/// Rows whose geometry is empty have no centroid and are left out of the
/// result, as are rows whose aggregate overflowed to infinity.
///
/// # Errors
///
/// - [`AccessError::MissingDecay`] when `config.decay` is `None`, before
///   the network is touched.
/// - A core error when a variable column is missing or not numeric.
/// - [`SpatialError::EmptyNetwork`] when there is nothing to snap to.
pub fn calc_access(
    study_area: &GeoFrame,
    network: &mut StreetNetwork,
    config: &AccessConfig,
) -> AccessResult<AccessTable> {
    let decay = config.decay.ok_or(AccessError::MissingDecay)?;
    let inputs = config
        .variables
        .iter()
        .map(|name| study_area.numeric(name))
        .collect::<CoreResult<Vec<_>>>()?;

    if config.precompute {
        match network.precomputed_distance(None) {
            Some(d) if d >= config.distance => {
                log::debug!("reusing precomputed ranges at distance {d}");
            }
            _ => network.precompute(config.distance),
        }
    }

    // Snap centroids.
    let mut rows = Vec::with_capacity(study_area.len());
    let mut snapped = Vec::with_capacity(study_area.len());
    for (row, centroid) in study_area.centroids().into_iter().enumerate() {
        let Some((x, y)) = centroid else { continue };
        let node = network.nearest_node(x, y).ok_or(SpatialError::EmptyNetwork)?;
        rows.push(row);
        snapped.push(node);
    }
    if rows.len() < study_area.len() {
        log::warn!(
            "{} of {} rows have an empty geometry and were not snapped",
            study_area.len() - rows.len(),
            study_area.len()
        );
    }

    let mut unique = snapped.clone();
    unique.sort_unstable();
    unique.dedup();

    // Aggregate each variable at the unique snapped nodes.
    let mut node_columns = Vec::with_capacity(inputs.len());
    for (name, column) in config.variables.iter().zip(&inputs) {
        let values: Vec<f64> = rows.iter().map(|&r| column[r]).collect();
        network.set(&snapped, &values, name)?;
        let query = AggregateQuery::sum(name, config.distance, decay);
        node_columns.push((name.clone(), network.aggregate_at(&query, &unique)?));
    }
    log::debug!(
        "aggregated {} variables over {} snapped nodes within {} ({decay} decay)",
        node_columns.len(),
        unique.len(),
        config.distance
    );

    if config.return_node_data {
        let columns = node_columns
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(f64::round_ties_even).collect()))
            .collect();
        return Ok(AccessTable { rows: None, node_ids: unique, columns });
    }

    // Join back onto the input rows.
    let positions: Vec<usize> = snapped
        .iter()
        .map(|id| unique.binary_search(id).unwrap_or_default())
        .collect();
    // Finite inputs can still sum past f64::MAX.
    let keep: Vec<usize> = (0..rows.len())
        .filter(|&i| {
            node_columns
                .iter()
                .all(|(_, values)| values[positions[i]].is_finite())
        })
        .collect();

    let columns = node_columns
        .iter()
        .map(|(name, values)| {
            (name.clone(), keep.iter().map(|&i| values[positions[i]]).collect())
        })
        .collect();

    Ok(AccessTable {
        rows:     Some(keep.iter().map(|&i| rows[i]).collect()),
        node_ids: keep.iter().map(|&i| snapped[i]).collect(),
        columns,
    })
}
