//! Origin × destination shortest-path cost matrices.
//!
//! Origins and destinations are snapped to their nearest network nodes by
//! centroid.  One unbounded search per origin yields the cost to every node,
//! from which the destination columns are read off.  Unreachable pairs cost
//! `f64::INFINITY`.

use std::collections::HashMap;

use ns_core::{GeoFrame, NodeId, NodeIdx};
use ns_spatial::{DijkstraRouter, Router, SpatialError, StreetNetwork};

use crate::{AccessError, AccessResult, MatrixObserver};

// ── CostMatrix ────────────────────────────────────────────────────────────────

/// Dense cost matrix with string labels on both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `values[i][j]` is the cost from origin `i` to destination `j`.
    pub values:     Vec<Vec<f64>>,
}

impl CostMatrix {
    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.values.get(row).map(Vec::as_slice)
    }
}

// ── compute_travel_cost_matrix ────────────────────────────────────────────────

/// Shortest-path costs from every origin to every destination under the
/// network's first impedance.
///
/// Without `reindex_name` rows are labelled with the origins' snapped node
/// ids and columns with the destinations'.  With it, rows take the values
/// of that origin column and columns repeat the row labels, so origins and
/// destinations must be the same length.
///
/// # Errors
///
/// - [`AccessError::LabelMismatch`] when relabeling with unequal origin and
///   destination counts, before any routing.
/// - [`AccessError::EmptyGeometry`] for a row with no centroid.
/// - A core error when the label column does not exist.
pub fn compute_travel_cost_matrix<O: MatrixObserver>(
    origins: &GeoFrame,
    destinations: &GeoFrame,
    network: &StreetNetwork,
    reindex_name: Option<&str>,
    observer: &mut O,
) -> AccessResult<CostMatrix> {
    compute_travel_cost_matrix_with(
        &DijkstraRouter,
        origins,
        destinations,
        network,
        None,
        reindex_name,
        observer,
    )
}

/// [`compute_travel_cost_matrix`] with a caller-chosen router and impedance.
pub fn compute_travel_cost_matrix_with<R: Router, O: MatrixObserver>(
    router: &R,
    origins: &GeoFrame,
    destinations: &GeoFrame,
    network: &StreetNetwork,
    impedance: Option<&str>,
    reindex_name: Option<&str>,
    observer: &mut O,
) -> AccessResult<CostMatrix> {
    let relabel = match reindex_name {
        Some(name) => {
            if origins.len() != destinations.len() {
                return Err(AccessError::LabelMismatch {
                    origins:      origins.len(),
                    destinations: destinations.len(),
                });
            }
            Some(origins.labels(name)?)
        }
        None => None,
    };
    let imp = network.impedance_index(impedance)?;

    let origin_nodes = snap(origins, network, "origin")?;
    let dest_nodes = snap(destinations, network, "destination")?;
    let dest_idx = dest_nodes
        .iter()
        .map(|&id| network.idx_of(id))
        .collect::<Result<Vec<_>, SpatialError>>()?;

    let total = origin_nodes.len();
    observer.on_start(total);

    // Several origins often snap to one node; search from each node once.
    let mut rows_by_node: HashMap<NodeIdx, Vec<f64>> = HashMap::new();
    let mut values = Vec::with_capacity(total);
    for (i, &origin) in origin_nodes.iter().enumerate() {
        let src = network.idx_of(origin)?;
        let row = rows_by_node
            .entry(src)
            .or_insert_with(|| {
                let costs = router.costs_from(network, src, imp);
                dest_idx.iter().map(|d| costs[d.index()]).collect()
            })
            .clone();
        values.push(row);
        observer.on_origin_done(i + 1, total);
    }
    observer.on_finish();

    log::debug!(
        "cost matrix {} × {} from {} distinct origin nodes",
        total,
        dest_nodes.len(),
        rows_by_node.len()
    );

    let (row_labels, col_labels) = match relabel {
        Some(labels) => (labels.clone(), labels),
        None => (
            origin_nodes.iter().map(NodeId::to_string).collect(),
            dest_nodes.iter().map(NodeId::to_string).collect(),
        ),
    };

    Ok(CostMatrix { row_labels, col_labels, values })
}

fn snap(frame: &GeoFrame, network: &StreetNetwork, what: &'static str) -> AccessResult<Vec<NodeId>> {
    frame
        .centroids()
        .into_iter()
        .enumerate()
        .map(|(row, centroid)| {
            let (x, y) = centroid.ok_or(AccessError::EmptyGeometry { what, row })?;
            Ok(network.nearest_node(x, y).ok_or(SpatialError::EmptyNetwork)?)
        })
        .collect()
}
