//! Node variables, range precomputation, and distance-decayed aggregation.
//!
//! The workflow mirrors a classic accessibility engine:
//!
//! 1. [`StreetNetwork::set`] attaches a named value per node.  Several values
//!    landing on one node are accumulated; non-finite values are dropped.
//! 2. [`StreetNetwork::precompute`] (optional) runs one bounded search per
//!    node and keeps the reachable set, so repeated aggregations at or below
//!    that distance skip the graph search entirely.
//! 3. [`StreetNetwork::aggregate`] combines, for every source node, the
//!    values of all nodes within the search distance, weighted by [`Decay`].
//!
//! Precomputed ranges and on-the-fly searches yield identical results.

use ns_core::{Decay, NodeId, NodeIdx};

use crate::network::StreetNetwork;
use crate::router::within;
use crate::{SpatialError, SpatialResult};

/// Per-node accumulated values of one named variable.
#[derive(Clone, Debug)]
pub(crate) struct NodeVariable {
    pub(crate) sum:   Vec<f64>,
    pub(crate) count: Vec<u32>,
}

/// Reachable sets from a precompute pass for one impedance.
#[derive(Clone, Debug)]
pub(crate) struct Reach {
    pub(crate) distance: f64,
    pub(crate) ranges:   Vec<Vec<(NodeIdx, f64)>>,
}

/// How values within range are combined.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Aggregation {
    /// Decay-weighted sum of values.
    #[default]
    Sum,
    /// Decay-weighted mean of values.
    Mean,
    /// Decay-weighted number of values.
    Count,
}

/// Parameters of one aggregation query.
#[derive(Clone, Debug)]
pub struct AggregateQuery<'a> {
    /// Variable name given to [`StreetNetwork::set`].
    pub name:      &'a str,
    /// Search radius in impedance units.
    pub distance:  f64,
    pub kind:      Aggregation,
    pub decay:     Decay,
    /// Impedance column; `None` selects the first.
    pub impedance: Option<&'a str>,
}

impl<'a> AggregateQuery<'a> {
    /// A decayed sum over the first impedance.
    pub fn sum(name: &'a str, distance: f64, decay: Decay) -> Self {
        Self { name, distance, kind: Aggregation::Sum, decay, impedance: None }
    }
}

impl StreetNetwork {
    /// Attach `values[i]` to node `node_ids[i]` under `name`, replacing any
    /// earlier variable of that name.
    pub fn set(&mut self, node_ids: &[NodeId], values: &[f64], name: &str) -> SpatialResult<()> {
        if node_ids.len() != values.len() {
            return Err(SpatialError::VariableLength {
                name:   name.to_owned(),
                ids:    node_ids.len(),
                values: values.len(),
            });
        }

        let n = self.node_count();
        let mut var = NodeVariable { sum: vec![0.0; n], count: vec![0; n] };
        for (&id, &v) in node_ids.iter().zip(values) {
            let i = self.idx_of(id)?.index();
            if v.is_finite() {
                var.sum[i] += v;
                var.count[i] += 1;
            }
        }
        self.variables.insert(name.to_owned(), var);
        Ok(())
    }

    /// Names of all attached variables.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables.keys().map(String::as_str)
    }

    /// Run one bounded search per node under the first impedance and keep
    /// the reachable sets for later aggregations.
    pub fn precompute(&mut self, distance: f64) {
        // A built network always has at least one impedance column.
        self.precompute_column(distance, 0);
    }

    /// [`precompute`](Self::precompute) for a named impedance column;
    /// `None` selects the first.
    pub fn precompute_impedance(
        &mut self,
        distance: f64,
        impedance: Option<&str>,
    ) -> SpatialResult<()> {
        let imp = self.impedance_index(impedance)?;
        self.precompute_column(distance, imp);
        Ok(())
    }

    fn precompute_column(&mut self, distance: f64, imp: usize) {
        let ranges: Vec<Vec<(NodeIdx, f64)>> = (0..self.node_count())
            .map(|i| within(self, NodeIdx(i as u32), imp, distance))
            .collect();
        log::debug!(
            "precomputed ranges for {} nodes at distance {distance} (impedance {imp})",
            ranges.len()
        );
        self.precomputed.insert(imp, Reach { distance, ranges });
    }

    /// The largest precomputed distance for an impedance, if any.
    pub fn precomputed_distance(&self, impedance: Option<&str>) -> Option<f64> {
        let imp = self.impedance_index(impedance).ok()?;
        self.precomputed.get(&imp).map(|r| r.distance)
    }

    /// Aggregate for every node; the result is indexed by `NodeIdx`
    /// (i.e. aligned with [`StreetNetwork::node_ids`]).
    pub fn aggregate(&self, query: &AggregateQuery<'_>) -> SpatialResult<Vec<f64>> {
        let sources: Vec<NodeIdx> = (0..self.node_count()).map(|i| NodeIdx(i as u32)).collect();
        self.aggregate_sources(query, &sources)
    }

    /// Aggregate for the given nodes only; the result is aligned with `sources`.
    pub fn aggregate_at(
        &self,
        query: &AggregateQuery<'_>,
        sources: &[NodeId],
    ) -> SpatialResult<Vec<f64>> {
        let idx = sources
            .iter()
            .map(|&id| self.idx_of(id))
            .collect::<SpatialResult<Vec<_>>>()?;
        self.aggregate_sources(query, &idx)
    }

    fn aggregate_sources(
        &self,
        query: &AggregateQuery<'_>,
        sources: &[NodeIdx],
    ) -> SpatialResult<Vec<f64>> {
        let imp = self.impedance_index(query.impedance)?;
        let var = self
            .variables
            .get(query.name)
            .ok_or_else(|| SpatialError::UnknownVariable(query.name.to_owned()))?;

        let reach = self
            .precomputed
            .get(&imp)
            .filter(|r| r.distance >= query.distance);

        let out = sources
            .iter()
            .map(|&src| match reach {
                Some(r) => combine(var, &r.ranges[src.index()], query),
                None => combine(var, &within(self, src, imp, query.distance), query),
            })
            .collect();
        Ok(out)
    }
}

fn combine(var: &NodeVariable, range: &[(NodeIdx, f64)], query: &AggregateQuery<'_>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weighted_count = 0.0;
    for &(node, d) in range {
        if d > query.distance {
            continue;
        }
        let count = var.count[node.index()];
        if count == 0 {
            continue;
        }
        let w = query.decay.weight(d, query.distance);
        weighted_sum += w * var.sum[node.index()];
        weighted_count += w * count as f64;
    }
    match query.kind {
        Aggregation::Sum => weighted_sum,
        Aggregation::Count => weighted_count,
        Aggregation::Mean if weighted_count > 0.0 => weighted_sum / weighted_count,
        Aggregation::Mean => 0.0,
    }
}
