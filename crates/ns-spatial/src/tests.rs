//! Unit tests for ns-spatial.
//!
//! All tests use hand-crafted networks so they run without any OSM data.

#[cfg(test)]
mod helpers {
    use ns_core::NodeId;
    use crate::{StreetNetwork, StreetNetworkBuilder};

    /// Build a small planar network for testing.
    ///
    /// Nodes (x, y), metres:
    ///   1:(0,0)  2:(100,0)  3:(200,0)
    ///   4:(0,100)           5:(200,100)
    ///
    /// Undirected edges: 1-2, 2-3, 3-5, 1-4, 4-5
    ///
    /// Shortest path 1→5:
    ///   1→2→3→5 = 300  vs  1→4→5 = 600
    pub fn grid_network() -> StreetNetwork {
        let mut b = StreetNetworkBuilder::new(["distance"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 100.0, 0.0);
        b.add_node(NodeId(3), 200.0, 0.0);
        b.add_node(NodeId(4), 0.0, 100.0);
        b.add_node(NodeId(5), 200.0, 100.0);

        b.add_edge(NodeId(1), NodeId(2), &[100.0]);
        b.add_edge(NodeId(2), NodeId(3), &[100.0]);
        b.add_edge(NodeId(3), NodeId(5), &[100.0]);
        b.add_edge(NodeId(1), NodeId(4), &[500.0]); // long detour
        b.add_edge(NodeId(4), NodeId(5), &[100.0]);

        b.build().unwrap()
    }

    pub fn ids(raw: &[i64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ns_core::NodeId;
    use crate::{SpatialError, StreetNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = StreetNetworkBuilder::new(["distance"]).build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn needs_an_impedance() {
        let names: [&str; 0] = [];
        let err = StreetNetworkBuilder::new(names).build().err().unwrap();
        assert!(matches!(err, SpatialError::NoImpedance));
    }

    #[test]
    fn twoway_doubles_directed_edges() {
        let net = super::helpers::grid_network();
        assert_eq!(net.node_count(), 5);
        assert_eq!(net.input_edges().len(), 5);
        assert_eq!(net.edge_count(), 10);
        assert!(net.is_twoway());
    }

    #[test]
    fn csr_out_edges() {
        let net = super::helpers::grid_network();
        let deg = |id: i64| net.out_degree(net.idx_of(NodeId(id)).unwrap());
        assert_eq!(deg(1), 2); // 1→2, 1→4
        assert_eq!(deg(2), 2); // 2→1, 2→3
        assert_eq!(deg(3), 2);
        assert_eq!(deg(4), 2);
        assert_eq!(deg(5), 2);

        let n1 = net.idx_of(NodeId(1)).unwrap();
        for e in net.out_edges(n1) {
            assert_eq!(net.edge_from[e.index()], n1);
        }
    }

    #[test]
    fn directed_only_edge() {
        let mut b = StreetNetworkBuilder::new(["distance"]).twoway(false);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        b.add_edge(NodeId(1), NodeId(2), &[10.0]);
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.out_degree(net.idx_of(NodeId(1)).unwrap()), 1);
        assert_eq!(net.out_degree(net.idx_of(NodeId(2)).unwrap()), 0);
    }

    #[test]
    fn edge_endpoint_must_exist() {
        let mut b = StreetNetworkBuilder::new(["distance"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_edge(NodeId(1), NodeId(99), &[10.0]);
        assert!(matches!(b.build(), Err(SpatialError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut b = StreetNetworkBuilder::new(["distance"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(1), 5.0, 5.0);
        assert!(matches!(b.build(), Err(SpatialError::DuplicateNode(NodeId(1)))));
    }

    #[test]
    fn weight_arity_checked() {
        let mut b = StreetNetworkBuilder::new(["distance", "time"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        b.add_edge(NodeId(1), NodeId(2), &[10.0]);
        assert!(matches!(
            b.build(),
            Err(SpatialError::WeightArity { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn from_arrays_checks_column_lengths() {
        use crate::{network_from_arrays, EdgeList};

        let nodes = [NodeId(1), NodeId(2), NodeId(3)];
        let xy = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let names = ["distance".to_owned()];

        let short_weights = EdgeList {
            from:    vec![NodeId(1), NodeId(2)],
            to:      vec![NodeId(2), NodeId(3)],
            weights: vec![vec![10.0]],
        };
        assert!(matches!(
            network_from_arrays(&nodes, &xy, &short_weights, &names, true),
            Err(SpatialError::VariableLength { ids: 2, values: 1, .. })
        ));

        let short_targets = EdgeList {
            from:    vec![NodeId(1), NodeId(2)],
            to:      vec![NodeId(2)],
            weights: vec![vec![10.0, 10.0]],
        };
        assert!(matches!(
            network_from_arrays(&nodes, &xy, &short_targets, &names, true),
            Err(SpatialError::VariableLength { ids: 2, values: 1, .. })
        ));

        let ok = EdgeList {
            from:    vec![NodeId(1), NodeId(2)],
            to:      vec![NodeId(2), NodeId(3)],
            weights: vec![vec![10.0, 15.0]],
        };
        let net = network_from_arrays(&nodes, &xy, &ok, &names, true).unwrap();
        assert_eq!(net.shortest_path_length(NodeId(3), NodeId(1), None).unwrap(), 25.0);
    }

    #[test]
    fn negative_weight_rejected() {
        let mut b = StreetNetworkBuilder::new(["distance"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        b.add_edge(NodeId(1), NodeId(2), &[-1.0]);
        assert!(matches!(b.build(), Err(SpatialError::InvalidWeight { .. })));
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use ns_core::NodeId;
    use crate::{SpatialError, StreetNetworkBuilder};

    #[test]
    fn snap_exact_position() {
        let net = super::helpers::grid_network();
        assert_eq!(net.nearest_node(0.0, 0.0), Some(NodeId(1)));
        assert_eq!(net.nearest_node(200.0, 100.0), Some(NodeId(5)));
    }

    #[test]
    fn snap_nearest() {
        let net = super::helpers::grid_network();
        assert_eq!(net.nearest_node(40.0, 0.0), Some(NodeId(1)));
        assert_eq!(net.nearest_node(60.0, 0.0), Some(NodeId(2)));
        let ids = net.get_node_ids(&[(190.0, 90.0), (10.0, 95.0)]).unwrap();
        assert_eq!(ids, [NodeId(5), NodeId(4)]);
    }

    #[test]
    fn empty_network_returns_none() {
        let net = StreetNetworkBuilder::new(["distance"]).build().unwrap();
        assert!(net.nearest_node(0.0, 0.0).is_none());
        assert!(matches!(net.get_node_ids(&[(0.0, 0.0)]), Err(SpatialError::EmptyNetwork)));
    }

    #[test]
    fn k_nearest_order() {
        let net = super::helpers::grid_network();
        let nearest = net.k_nearest_nodes(0.0, 0.0, 3);
        assert_eq!(nearest[0], NodeId(1));
        // 2 and 4 are equidistant from the origin; either order is valid.
        assert!(nearest[1..].contains(&NodeId(2)));
        assert!(nearest[1..].contains(&NodeId(4)));
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use ns_core::NodeId;
    use crate::{SpatialError, StreetNetworkBuilder};
    use super::helpers::ids;

    #[test]
    fn trivial_same_node() {
        let net = super::helpers::grid_network();
        let r = net.shortest_path(NodeId(3), NodeId(3)).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.cost, 0.0);
        assert_eq!(r.nodes, [NodeId(3)]);
    }

    #[test]
    fn shortest_path_correct() {
        let net = super::helpers::grid_network();
        let route = net.shortest_path(NodeId(1), NodeId(5)).unwrap();
        assert_eq!(route.cost, 300.0);
        assert_eq!(route.nodes, ids(&[1, 2, 3, 5]));
        assert_eq!(route.edges.len(), 3);
        assert_eq!(net.edge_from[route.edges[0].index()], net.idx_of(NodeId(1)).unwrap());
    }

    #[test]
    fn no_route_disconnected() {
        let mut b = StreetNetworkBuilder::new(["distance"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        let net = b.build().unwrap();
        assert!(matches!(
            net.shortest_path(NodeId(1), NodeId(2)),
            Err(SpatialError::NoRoute { .. })
        ));
        assert_eq!(
            net.shortest_path_length(NodeId(1), NodeId(2), None).unwrap(),
            f64::INFINITY
        );
    }

    #[test]
    fn directed_one_way_blocks_return() {
        let mut b = StreetNetworkBuilder::new(["distance"]).twoway(false);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        b.add_edge(NodeId(1), NodeId(2), &[10.0]);
        let net = b.build().unwrap();
        assert!(net.shortest_path(NodeId(1), NodeId(2)).is_ok());
        assert!(net.shortest_path(NodeId(2), NodeId(1)).is_err());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let net = super::helpers::grid_network();
        assert!(matches!(
            net.shortest_path(NodeId(1), NodeId(42)),
            Err(SpatialError::NodeNotFound(NodeId(42)))
        ));
    }

    #[test]
    fn pairwise_lengths() {
        let net = super::helpers::grid_network();
        let got = net
            .shortest_path_lengths(&ids(&[1, 1, 4, 2]), &ids(&[5, 4, 3, 2]), None)
            .unwrap();
        // 1→4 via 2,3,5 (400) beats the direct 500 edge.
        assert_eq!(got, [300.0, 400.0, 200.0, 0.0]);
        assert!(net.shortest_path_lengths(&ids(&[1]), &ids(&[2, 3]), None).is_err());
    }

    #[test]
    fn one_to_many_matches_pairwise() {
        let net = super::helpers::grid_network();
        let targets = ids(&[1, 2, 3, 4, 5]);
        let many = net.one_to_many(NodeId(4), &targets, None).unwrap();
        let pairs = net
            .shortest_path_lengths(&vec![NodeId(4); targets.len()], &targets, None)
            .unwrap();
        assert_eq!(many, pairs);
    }

    #[test]
    fn impedance_selected_by_name() {
        let mut b = StreetNetworkBuilder::new(["distance", "minutes"]);
        b.add_node(NodeId(1), 0.0, 0.0);
        b.add_node(NodeId(2), 1.0, 0.0);
        b.add_node(NodeId(3), 2.0, 0.0);
        b.add_edge(NodeId(1), NodeId(2), &[100.0, 10.0]);
        b.add_edge(NodeId(2), NodeId(3), &[50.0, 1.0]);
        b.add_edge(NodeId(1), NodeId(3), &[120.0, 30.0]);
        let net = b.build().unwrap();

        assert_eq!(net.shortest_path_length(NodeId(1), NodeId(3), None).unwrap(), 120.0);
        assert_eq!(
            net.shortest_path_length(NodeId(1), NodeId(3), Some("minutes")).unwrap(),
            11.0
        );
        assert!(matches!(
            net.shortest_path_length(NodeId(1), NodeId(3), Some("hours")),
            Err(SpatialError::UnknownImpedance(_))
        ));
    }

    #[test]
    fn nodes_in_range_sorted() {
        let net = super::helpers::grid_network();
        let reach = net.nodes_in_range(NodeId(1), 200.0, None).unwrap();
        assert_eq!(reach, [(NodeId(1), 0.0), (NodeId(2), 100.0), (NodeId(3), 200.0)]);
    }
}

// ── Variables & aggregation ───────────────────────────────────────────────────

#[cfg(test)]
mod aggregation {
    use ns_core::{Decay, NodeId};
    use crate::{AggregateQuery, Aggregation, SpatialError};
    use super::helpers::ids;

    fn populated() -> crate::StreetNetwork {
        let mut net = super::helpers::grid_network();
        net.set(&ids(&[1, 2, 3, 4, 5]), &[10.0, 20.0, 30.0, 40.0, 50.0], "pop").unwrap();
        net
    }

    #[test]
    fn flat_sum_within_radius() {
        let net = populated();
        let q = AggregateQuery::sum("pop", 150.0, Decay::Flat);
        let got = net.aggregate_at(&q, &ids(&[1, 3, 4])).unwrap();
        // 1 reaches {1, 2}; 3 reaches {3, 2, 5}; 4 reaches {4, 5}.
        assert_eq!(got, [30.0, 100.0, 90.0]);
    }

    #[test]
    fn linear_decay_weights() {
        let net = populated();
        let q = AggregateQuery::sum("pop", 200.0, Decay::Linear);
        let got = net.aggregate_at(&q, &ids(&[1])).unwrap();
        // 10·1 + 20·(1 − 100/200) + 30·(1 − 200/200)
        assert!((got[0] - 20.0).abs() < 1e-9, "got {}", got[0]);
    }

    #[test]
    fn exponential_decay_weights() {
        let net = populated();
        let q = AggregateQuery::sum("pop", 100.0, Decay::Exponential);
        let got = net.aggregate_at(&q, &ids(&[1])).unwrap();
        let expected = 10.0 + 20.0 * (-1.0f64).exp();
        assert!((got[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn aggregate_all_nodes_is_aligned_with_node_ids() {
        let net = populated();
        let q = AggregateQuery::sum("pop", 0.0, Decay::Flat);
        let got = net.aggregate(&q).unwrap();
        let expected: Vec<f64> = net.node_ids.iter().map(|id| id.0 as f64 * 10.0).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn flat_sum_equals_brute_force() {
        let net = populated();
        let radius = 250.0;
        let q = AggregateQuery::sum("pop", radius, Decay::Flat);
        let all = ids(&[1, 2, 3, 4, 5]);
        let got = net.aggregate_at(&q, &all).unwrap();
        for (i, &src) in all.iter().enumerate() {
            let brute: f64 = all
                .iter()
                .filter(|&&dst| net.shortest_path_length(src, dst, None).unwrap() <= radius)
                .map(|dst| dst.0 as f64 * 10.0)
                .sum();
            assert_eq!(got[i], brute, "source {src}");
        }
    }

    #[test]
    fn precomputed_matches_on_the_fly() {
        let mut net = populated();
        let q = AggregateQuery::sum("pop", 250.0, Decay::Linear);
        let fresh = net.aggregate(&q).unwrap();
        net.precompute(1_000.0);
        assert_eq!(net.precomputed_distance(None), Some(1_000.0));
        let cached = net.aggregate(&q).unwrap();
        for (a, b) in fresh.iter().zip(&cached) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn precompute_by_impedance_name() {
        let mut net = populated();
        assert!(matches!(
            net.precompute_impedance(10.0, Some("time")),
            Err(SpatialError::UnknownImpedance(name)) if name == "time"
        ));
        assert!(net.precomputed_distance(None).is_none());

        net.precompute_impedance(400.0, Some("distance")).unwrap();
        assert_eq!(net.precomputed_distance(Some("distance")), Some(400.0));
        let q = AggregateQuery::sum("pop", 150.0, Decay::Flat);
        assert_eq!(net.aggregate_at(&q, &ids(&[1])).unwrap(), [30.0]);
    }

    #[test]
    fn precompute_too_small_falls_back_to_search() {
        let mut net = populated();
        net.precompute(50.0);
        let q = AggregateQuery::sum("pop", 150.0, Decay::Flat);
        assert_eq!(net.aggregate_at(&q, &ids(&[1])).unwrap(), [30.0]);
    }

    #[test]
    fn values_on_one_node_accumulate() {
        let mut net = super::helpers::grid_network();
        net.set(&ids(&[2, 2, 2]), &[1.0, 2.0, f64::NAN], "jobs").unwrap();
        let sum = net.aggregate_at(&AggregateQuery::sum("jobs", 0.0, Decay::Flat), &ids(&[2])).unwrap();
        assert_eq!(sum, [3.0]);

        let mut q = AggregateQuery::sum("jobs", 0.0, Decay::Flat);
        q.kind = Aggregation::Count;
        assert_eq!(net.aggregate_at(&q, &ids(&[2])).unwrap(), [2.0]);
        q.kind = Aggregation::Mean;
        assert_eq!(net.aggregate_at(&q, &ids(&[2])).unwrap(), [1.5]);
        assert_eq!(net.aggregate_at(&q, &ids(&[1])).unwrap(), [0.0]);
    }

    #[test]
    fn set_replaces_earlier_values() {
        let mut net = populated();
        net.set(&ids(&[1]), &[7.0], "pop").unwrap();
        let q = AggregateQuery::sum("pop", 150.0, Decay::Flat);
        assert_eq!(net.aggregate_at(&q, &ids(&[1])).unwrap(), [7.0]);
    }

    #[test]
    fn errors() {
        let mut net = populated();
        assert!(matches!(
            net.set(&ids(&[1, 2]), &[1.0], "x"),
            Err(SpatialError::VariableLength { ids: 2, values: 1, .. })
        ));
        assert!(matches!(
            net.set(&ids(&[9]), &[1.0], "x"),
            Err(SpatialError::NodeNotFound(NodeId(9)))
        ));
        let q = AggregateQuery::sum("missing", 100.0, Decay::Flat);
        assert!(matches!(net.aggregate(&q), Err(SpatialError::UnknownVariable(_))));
    }
}

// ── Reprojection ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod projection {
    use ns_core::{Crs, NodeId};
    use crate::{project_network, SpatialError, StreetNetworkBuilder};

    fn lonlat_network() -> crate::StreetNetwork {
        let mut b = StreetNetworkBuilder::new(["distance", "minutes"]).twoway(false);
        b.add_node(NodeId(10), -117.40, 33.95);
        b.add_node(NodeId(11), -117.39, 33.95);
        b.add_node(NodeId(12), -117.39, 33.96);
        b.add_edge(NodeId(10), NodeId(11), &[925.0, 11.0]);
        b.add_edge(NodeId(11), NodeId(12), &[1_110.0, 13.0]);
        b.build().unwrap()
    }

    #[test]
    fn missing_output_crs() {
        let net = lonlat_network();
        assert!(matches!(
            project_network(&net, &Crs::WGS84, None),
            Err(SpatialError::MissingOutputCrs)
        ));
    }

    #[test]
    fn same_crs_is_unchanged() {
        let net = lonlat_network();
        let same = project_network(&net, &Crs::WGS84, Some(&Crs::WGS84)).unwrap();
        assert_eq!(same.node_x, net.node_x);
        assert_eq!(same.node_y, net.node_y);
    }

    #[test]
    fn round_trip_through_utm() {
        let net = lonlat_network();
        let utm = Crs::Epsg(32611);
        let projected = project_network(&net, &Crs::WGS84, Some(&utm)).unwrap();
        // Metres now: ~925 m between the first two nodes.
        let (x0, y0) = projected.node_xy(NodeId(10)).unwrap();
        let (x1, y1) = projected.node_xy(NodeId(11)).unwrap();
        let d = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        assert!((d - 925.0).abs() < 5.0, "got {d}");

        let back = project_network(&projected, &utm, Some(&Crs::WGS84)).unwrap();
        for (a, b) in back.node_x.iter().zip(&net.node_x) {
            assert!((a - b).abs() < 1e-7);
        }
        for (a, b) in back.node_y.iter().zip(&net.node_y) {
            assert!((a - b).abs() < 1e-7);
        }
    }

    #[test]
    fn rebuild_carries_structure() {
        let net = lonlat_network();
        let p = project_network(&net, &Crs::WGS84, Some(&Crs::Epsg(3857))).unwrap();
        assert_eq!(p.node_ids, net.node_ids);
        assert_eq!(p.impedance_names(), net.impedance_names());
        assert_eq!(p.input_edges(), net.input_edges());
        assert!(!p.is_twoway());
        assert_eq!(p.edge_count(), 2);
        assert_eq!(
            p.shortest_path_length(NodeId(10), NodeId(12), Some("minutes")).unwrap(),
            24.0
        );
        // Snapping follows the new coordinates.
        let (x, y) = p.node_xy(NodeId(12)).unwrap();
        assert_eq!(p.nearest_node(x + 1.0, y - 1.0), Some(NodeId(12)));
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sources {
    use std::fs;

    use ns_core::{BBox, Crs, NodeId, Transformer};
    use rustc_hash::FxHashMap;

    use crate::source::{highway_allowed, is_oneway, ways_to_raw};
    use crate::{CsvSource, FetchParams, NetworkSource, NetworkType, RawEdge, RawNetwork, RawNode};

    fn node(id: i64, x: f64, y: f64) -> RawNode {
        RawNode { id, x, y }
    }

    fn edge(from: i64, to: i64) -> RawEdge {
        RawEdge { from, to, distance: 10.0 }
    }

    #[test]
    fn largest_component_kept() {
        let mut raw = RawNetwork {
            nodes: vec![node(1, 0.0, 0.0), node(2, 0.0, 0.0), node(3, 0.0, 0.0),
                        node(7, 0.0, 0.0), node(8, 0.0, 0.0)],
            edges: vec![edge(1, 2), edge(2, 3), edge(7, 8)],
            twoway: true,
        };
        raw.retain_largest_component();
        let kept: Vec<i64> = raw.nodes.iter().map(|n| n.id).collect();
        assert_eq!(kept, [1, 2, 3]);
        assert_eq!(raw.edges.len(), 2);
    }

    #[test]
    fn raw_to_network_reprojects() {
        let raw = RawNetwork {
            nodes: vec![node(1, 0.0, 0.0), node(2, 1.0, 0.0)],
            edges: vec![RawEdge { from: 1, to: 2, distance: 111_195.0 }],
            twoway: true,
        };
        let tf = Transformer::new(&Crs::WGS84, &Crs::Epsg(3857)).unwrap();
        let net = raw.to_network(&tf).unwrap();
        assert_eq!(net.impedance_names(), ["distance"]);
        let (x, _) = net.node_xy(NodeId(2)).unwrap();
        assert!((x - 111_319.49).abs() < 1.0);
        assert_eq!(net.shortest_path_length(NodeId(2), NodeId(1), None).unwrap(), 111_195.0);
    }

    #[test]
    fn csv_source_clips_to_bbox() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nodes.csv"),
            "id,x,y\n1,-117.40,33.95\n2,-117.39,33.95\n3,-117.38,33.95\n9,-110.0,40.0\n",
        ).unwrap();
        fs::write(
            dir.path().join("edges.csv"),
            "from,to,distance\n1,2,925.5\n2,3,925.5\n3,9,600000\n",
        ).unwrap();

        let source = CsvSource::from_dir(dir.path());
        assert_eq!(source.name(), "csv");
        let raw = source
            .fetch(BBox::new(-117.5, 33.9, -117.3, 34.0), &FetchParams::default())
            .unwrap();
        assert_eq!(raw.nodes.len(), 3);
        assert_eq!(raw.edges.len(), 2);
        assert!(raw.twoway);
    }

    #[test]
    fn csv_source_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvSource::from_dir(dir.path());
        assert!(source.fetch(BBox::new(0.0, 0.0, 1.0, 1.0), &FetchParams::default()).is_err());
    }

    #[cfg(not(feature = "overpass"))]
    #[test]
    fn no_default_source_without_backend() {
        assert!(matches!(
            crate::default_source(),
            Err(crate::SpatialError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn highway_filters() {
        let none: [(&str, &str); 0] = [];
        assert!(highway_allowed(NetworkType::Walk, "footway", &none));
        assert!(!highway_allowed(NetworkType::Walk, "motorway", &none));
        assert!(highway_allowed(NetworkType::Drive, "motorway", &none));
        assert!(!highway_allowed(NetworkType::Drive, "footway", &none));
        assert!(!highway_allowed(NetworkType::Walk, "residential", &[("foot", "no")]));
        assert!(!highway_allowed(NetworkType::Drive, "service", &[("access", "private")]));
        assert!(!highway_allowed(NetworkType::Walk, "pedestrian", &[("area", "yes")]));
    }

    #[test]
    fn oneway_rules() {
        assert!(is_oneway(NetworkType::Drive, "primary", &[("oneway", "yes")]));
        assert!(is_oneway(NetworkType::Drive, "motorway", &[]));
        assert!(is_oneway(NetworkType::Drive, "tertiary", &[("junction", "roundabout")]));
        assert!(!is_oneway(NetworkType::Drive, "primary", &[]));
        // Pedestrians ignore one-way restrictions.
        assert!(!is_oneway(NetworkType::Walk, "primary", &[("oneway", "yes")]));
    }

    #[test]
    fn ways_become_edges() {
        let mut coords = FxHashMap::default();
        coords.insert(1, (0.0, 0.0));
        coords.insert(2, (0.0, 0.001));
        coords.insert(3, (0.0, 0.002));
        // Node 4 lies outside the box and was never buffered.
        let ways = vec![(vec![1, 2, 3, 4], false), (vec![3, 2], true)];

        let undirected = ways_to_raw(&coords, &ways, true);
        assert_eq!(undirected.nodes.len(), 3);
        assert_eq!(undirected.edges.len(), 3);

        let directed = ways_to_raw(&coords, &ways, false);
        // Two-way way adds both directions; the one-way segment adds one.
        assert_eq!(directed.edges.len(), 5);
        assert!((directed.edges[0].distance - 111.19).abs() < 0.1);
    }

    #[cfg(feature = "overpass")]
    #[test]
    fn overpass_response_parses() {
        let body = r#"{"elements": [
            {"type": "node", "id": 1, "lat": 33.950, "lon": -117.40},
            {"type": "node", "id": 2, "lat": 33.951, "lon": -117.40},
            {"type": "node", "id": 3, "lat": 33.952, "lon": -117.40},
            {"type": "way", "id": 100, "nodes": [1, 2], "tags": {"highway": "residential"}},
            {"type": "way", "id": 101, "nodes": [2, 3], "tags": {"highway": "motorway"}},
            {"type": "relation", "id": 5}
        ]}"#;
        let raw = crate::overpass::parse_response(body, &FetchParams::default()).unwrap();
        // The motorway is not walkable.
        assert_eq!(raw.nodes.len(), 2);
        assert_eq!(raw.edges.len(), 1);
    }
}
