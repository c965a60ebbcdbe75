use mld_router::algo::multi_level_dijkstra::*;
use mld_router::algo::*;
use mld_router::datastr::graph::*;
use mld_router::datastr::partition::*;
use mld_router::report::*;

use rand::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

fn phantom(node: NodeId) -> PhantomNode {
    PhantomNode::at_segment_entry(node)
}

fn split_phantom(node: NodeId, weight: Weight, duration: Duration, distance: Distance) -> PhantomNode {
    PhantomNode::new(
        PhantomHalf {
            node,
            enabled: true,
            weight,
            duration,
            distance,
        },
        PhantomHalf::disabled(),
    )
}

fn transposed(matrix: &[Duration], rows: usize, columns: usize) -> Vec<Duration> {
    let mut result = vec![0; matrix.len()];
    for row in 0..rows {
        for column in 0..columns {
            result[column * rows + row] = matrix[row * columns + column];
        }
    }
    result
}

// This is the directed line graph we're going to use for the basic cases.
// The edge takes ten units of time, the segment of node 0 is 100 meters long.
//
//     0 --- 10s/100m ---> 1
//
fn line() -> MultiLevelGraph {
    let partition = MultiLevelPartition::new(vec![vec![0, 0]]);
    let graph = SegmentGraph::new(
        &[DirectedEdge {
            from: 0,
            to: 1,
            weight: 10,
            duration: 10,
        }],
        vec![100.0, 50.0],
        &partition,
    );
    MultiLevelGraph::customize(graph, partition)
}

#[test]
fn line_forward_pair() {
    let data = line();
    let mut server = Server::new(&data);
    let (durations, distances) = server.table(&[phantom(0), phantom(1)], &[0], &[1], true);
    assert_eq!(durations, vec![10]);
    assert_eq!(distances, vec![100.0]);
}

#[test]
fn line_against_one_way() {
    let data = line();
    let mut server = Server::new(&data);
    let (durations, distances) = server.table(&[phantom(0), phantom(1)], &[1], &[0], true);
    assert_eq!(durations, vec![MAXIMAL_EDGE_DURATION]);
    assert_eq!(distances, vec![INVALID_EDGE_DISTANCE]);
}

#[test]
fn self_pair() {
    let data = line();
    let mut server = Server::new(&data);
    let (durations, distances) = server.table(&[phantom(0)], &[0], &[0], true);
    assert_eq!(durations, vec![0]);
    assert_eq!(distances, vec![0.0]);
}

#[test]
fn distances_only_when_asked() {
    let data = line();
    let mut server = Server::new(&data);
    let (durations, distances) = server.table(&[phantom(0), phantom(1)], &[0], &[1], false);
    assert_eq!(durations, vec![10]);
    assert!(distances.is_empty());
}

// A triangle where the direct edge to node 2 loses against the detour.
//
//          10s           5s
//     0 --------> 1 --------> 2
//     |                       ^
//     +-------- 20s ----------+
//
#[test]
fn triangle() {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 0]]);
    let graph = SegmentGraph::new(
        &[
            DirectedEdge {
                from: 0,
                to: 1,
                weight: 10,
                duration: 10,
            },
            DirectedEdge {
                from: 1,
                to: 2,
                weight: 5,
                duration: 5,
            },
            DirectedEdge {
                from: 0,
                to: 2,
                weight: 20,
                duration: 20,
            },
        ],
        vec![100.0, 50.0, 70.0],
        &partition,
    );
    let data = MultiLevelGraph::customize(graph, partition);
    let mut server = Server::new(&data);

    let phantoms = [phantom(0), phantom(1), phantom(2)];
    let (durations, distances) = server.table(&phantoms, &[0], &[1, 2], true);
    assert_eq!(durations, vec![10, 15]);
    // the path to node 2 goes through node 1, so its length is the sum of
    // the segments of nodes 0 and 1
    assert_eq!(distances, vec![100.0, 150.0]);
}

#[test]
fn excluded_nodes_are_not_traversed() {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 0]]);
    let mut graph = SegmentGraph::new(
        &[
            DirectedEdge {
                from: 0,
                to: 1,
                weight: 10,
                duration: 10,
            },
            DirectedEdge {
                from: 1,
                to: 2,
                weight: 5,
                duration: 5,
            },
            DirectedEdge {
                from: 0,
                to: 2,
                weight: 20,
                duration: 20,
            },
        ],
        vec![100.0, 50.0, 70.0],
        &partition,
    );
    graph.set_excluded(1, true);
    let data = MultiLevelGraph::customize(graph, partition);
    let mut server = Server::new(&data);

    let phantoms = [phantom(0), phantom(2)];
    let (durations, _) = server.table(&phantoms, &[0], &[1], false);
    // without the detour node only the direct edge remains
    assert_eq!(durations, vec![20]);
}

// Four nodes in a cycle of two-way unit edges, every segment 10 meters.
//
//     0 ----- 1
//     |       |
//     2 ----- 3
//
fn ring() -> (MultiLevelGraph, Vec<PhantomNode>) {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 0, 0]]);
    let mut edges = Vec::new();
    for (from, to) in [(0, 1), (1, 3), (3, 2), (2, 0)] {
        for (from, to) in [(from, to), (to, from)] {
            edges.push(DirectedEdge {
                from,
                to,
                weight: 1,
                duration: 1,
            });
        }
    }
    let graph = SegmentGraph::new(&edges, vec![10.0; 4], &partition);
    let data = MultiLevelGraph::customize(graph, partition);
    let phantoms = (0..4).map(phantom).collect();
    (data, phantoms)
}

#[test]
fn ring_matrix() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    let endpoints = [0, 1, 2, 3];
    let (durations, distances) = server.table(&phantoms, &endpoints, &endpoints, true);

    #[rustfmt::skip]
    let expected = vec![
        0, 1, 1, 2,
        1, 0, 2, 1,
        1, 2, 0, 1,
        2, 1, 1, 0,
    ];
    assert_eq!(durations, expected);
    let expected_distances: Vec<Distance> = expected.iter().map(|&duration| duration as Distance * 10.0).collect();
    assert_eq!(distances, expected_distances);
}

#[test]
fn reversed_driver_agrees_with_row_queries() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    // three sources and two targets dispatch to the reversed driver
    let sources = [0, 1, 2];
    let targets = [3, 1];
    let (matrix, _) = server.table(&phantoms, &sources, &targets, false);

    for (row, &source) in sources.iter().enumerate() {
        let (row_durations, _) = server.table(&phantoms, &[source], &targets, false);
        assert_eq!(&matrix[row * targets.len()..(row + 1) * targets.len()], &row_durations[..]);
    }
}

#[test]
fn symmetric_graph_transposes() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    let sources = [0, 2, 3];
    let targets = [1, 3];
    let (forward, _) = server.table(&phantoms, &sources, &targets, false);
    let (backward, _) = server.table(&phantoms, &targets, &sources, false);
    assert_eq!(forward, transposed(&backward, targets.len(), sources.len()));
}

#[test]
fn repeated_queries_on_the_same_workspace_are_identical() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    let endpoints = [0, 1, 2, 3];
    let first = server.table(&phantoms, &endpoints, &endpoints, true);
    let second = server.table(&phantoms, &endpoints, &endpoints, true);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn split_phantom_offsets() {
    let data = line();
    let mut server = Server::new(&data);

    // snapped 30% into the 100m segment of node 0
    let snapped = split_phantom(0, 3, 3, 30.0);

    let (durations, distances) = server.table(&[snapped, phantom(1)], &[0], &[1], true);
    assert_eq!(durations, vec![7]);
    assert_eq!(distances, vec![70.0]);

    let (durations, distances) = server.table(&[phantom(0), snapped], &[0], &[1], true);
    assert_eq!(durations, vec![3]);
    assert_eq!(distances, vec![30.0]);
}

#[test]
fn triangle_inequality() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    let endpoints = [0, 1, 2, 3];
    let (durations, _) = server.table(&phantoms, &endpoints, &endpoints, false);
    let n = endpoints.len();
    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                assert!(durations[a * n + c] <= durations[a * n + b] + durations[b * n + c]);
            }
        }
    }
}

#[test]
fn target_offset_shifts_its_column() {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1], vec![0, 0, 0, 0]]);
    let mut edges = Vec::new();
    for (from, to) in [(0, 1), (1, 2), (2, 3)] {
        for (from, to) in [(from, to), (to, from)] {
            edges.push(DirectedEdge {
                from,
                to,
                weight: 10,
                duration: 10,
            });
        }
    }
    let graph = SegmentGraph::new(&edges, vec![100.0; 4], &partition);
    let data = MultiLevelGraph::customize(graph, partition);
    let mut server = Server::new(&data);

    let sources = [0, 1];
    let plain = [phantom(0), phantom(1), phantom(3)];
    let (base, _) = server.table(&plain, &sources, &[2], false);
    let shifted_phantoms = [phantom(0), phantom(1), phantom(3), split_phantom(3, 4, 4, 40.0)];
    let (shifted, _) = server.table(&shifted_phantoms, &sources, &[3], false);

    for (base, shifted) in base.iter().zip(shifted.iter()) {
        assert_eq!(base + 4, *shifted);
    }
}

// A two-way path of four nodes split into two cells, with a source snapped
// into the middle of its segment.
//
//      cell 0     cell 1
//     [ 0   1 ] [ 2   3 ]         every edge 10s, every segment 100m
//
#[test]
fn snapped_sources_in_bidirectional_matrices() {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1]]);
    let mut edges = Vec::new();
    for (from, to) in [(0, 1), (1, 2), (2, 3)] {
        for (from, to) in [(from, to), (to, from)] {
            edges.push(DirectedEdge {
                from,
                to,
                weight: 10,
                duration: 10,
            });
        }
    }
    let graph = SegmentGraph::new(&edges, vec![100.0; 4], &partition);
    let data = MultiLevelGraph::customize(graph, partition);
    let mut server = Server::new(&data);

    let phantoms = [split_phantom(0, 3, 3, 30.0), phantom(1), phantom(2), phantom(3)];
    // two targets against three sources dispatch to the reversed driver
    let sources = [0, 1, 3];
    let targets = [2, 3];
    let (durations, distances) = server.table(&phantoms, &sources, &targets, true);

    #[rustfmt::skip]
    let expected = vec![
        17, 27,
        10, 20,
        10,  0,
    ];
    assert_eq!(durations, expected);
    #[rustfmt::skip]
    let expected_distances = vec![
        170.0, 270.0,
        100.0, 200.0,
        100.0,   0.0,
    ];
    assert_eq!(distances, expected_distances);
}

// Two two-way road segments as four directed segment nodes: eastbound 0 and
// 1, westbound 2 and 3. Going straight on or turning around at the ends
// costs the segment the edge leaves.
//
//            0 →       1 →
//      X ========= Y ========= Z      all edges 10s, all segments 100m
//            ← 3       ← 2
//
fn two_way_street() -> MultiLevelGraph {
    let partition = MultiLevelPartition::new(vec![vec![0, 1, 1, 0]]);
    let mut edges = Vec::new();
    for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
        edges.push(DirectedEdge {
            from,
            to,
            weight: 10,
            duration: 10,
        });
    }
    let graph = SegmentGraph::new(&edges, vec![100.0; 4], &partition);
    MultiLevelGraph::customize(graph, partition)
}

// A snap on the two-way segment between X and Y: the forward half sits on
// eastbound node 0, the reverse half on westbound node 3 with the
// complementary offset.
fn two_way_snap(offset: Weight) -> PhantomNode {
    PhantomNode::new(
        PhantomHalf {
            node: 0,
            enabled: true,
            weight: offset,
            duration: offset,
            distance: offset as Distance * 10.0,
        },
        PhantomHalf {
            node: 3,
            enabled: true,
            weight: 10 - offset,
            duration: 10 - offset,
            distance: (10 - offset) as Distance * 10.0,
        },
    )
}

#[test]
fn two_way_snaps_use_both_halves() {
    let data = two_way_street();
    let mut server = Server::new(&data);

    let near = two_way_snap(3);
    let far = two_way_snap(6);

    // downstream along the shared segment the forward halves meet
    let (durations, distances) = server.table(&[near, far], &[0], &[1], true);
    assert_eq!(durations, vec![3]);
    assert_eq!(distances, vec![30.0]);

    // upstream the reverse halves on the westbound node meet instead
    let (durations, distances) = server.table(&[near, far], &[1], &[0], true);
    assert_eq!(durations, vec![3]);
    assert_eq!(distances, vec![30.0]);
}

#[test]
fn two_way_snap_matrices() {
    let data = two_way_street();
    let mut server = Server::new(&data);

    let near = two_way_snap(3);
    let far = two_way_snap(6);
    // the junction Y, sitting at the far end of both directions of its segment
    let junction = PhantomNode::new(
        PhantomHalf {
            node: 1,
            enabled: true,
            weight: 0,
            duration: 0,
            distance: 0.0,
        },
        PhantomHalf {
            node: 2,
            enabled: true,
            weight: 10,
            duration: 10,
            distance: 100.0,
        },
    );
    let phantoms = [near, far, junction];

    let (durations, distances) = server.table(&phantoms, &[0, 2], &[1, 2], true);
    #[rustfmt::skip]
    let expected = vec![
        3, 7,
        4, 0,
    ];
    assert_eq!(durations, expected);
    // the westward leg to the snap runs over the reverse halves
    #[rustfmt::skip]
    let expected_distances = vec![
        30.0, 70.0,
        40.0,  0.0,
    ];
    assert_eq!(distances, expected_distances);

    // many-to-one flips the endpoint roles onto the opposite halves
    let (durations, distances) = server.table(&phantoms, &[0, 1], &[2], true);
    assert_eq!(durations, vec![7, 4]);
    assert_eq!(distances, vec![70.0, 40.0]);
}

#[test]
fn reporting_captures_query_summaries() {
    let (data, phantoms) = ring();
    let mut server = Server::new(&data);

    let _reporting = enable_reporting("many_to_many_tests");
    let total = Timer::new();

    {
        let _query = push_context("full_matrix".to_string());
        let (durations, _) = report_time("ring matrix", || server.table(&phantoms, &[0, 1], &[2, 3], false));
        assert_eq!(durations, vec![1, 2, 2, 1]);
    }

    {
        let _query = push_context("single_pair".to_string());
        let ((durations, _), elapsed) = measure(|| server.table(&phantoms, &[0], &[1], false));
        assert_eq!(durations, vec![1]);
        assert!(total.get_passed() >= elapsed);
    }
}

// An eight node one-way street through three levels of cells.
// All edges take one unit, all segments are 10 meters.
//
//      level 2:  [    0    ] [    1    ]
//      level 1:  [ 0 ] [ 1 ] [ 2 ] [ 3 ]
//                0 → 1 2 → 3 4 → 5 6 → 7
//                  ↳ ... every node to its successor
//
fn one_way_street() -> (MultiLevelGraph, Vec<PhantomNode>) {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1, 2, 2, 3, 3], vec![0, 0, 0, 0, 1, 1, 1, 1]]);
    let edges: Vec<DirectedEdge> = (0..7)
        .map(|node| DirectedEdge {
            from: node,
            to: node + 1,
            weight: 1,
            duration: 1,
        })
        .collect();
    let graph = SegmentGraph::new(&edges, vec![10.0; 8], &partition);
    let data = MultiLevelGraph::customize(graph, partition);
    let phantoms = (0..8).map(phantom).collect();
    (data, phantoms)
}

#[test]
fn searches_climb_through_the_overlay() {
    let (data, phantoms) = one_way_street();
    let mut server = Server::new(&data);

    let sources = [0, 1];
    let targets = [6, 7];
    let (durations, distances) = server.table(&phantoms, &sources, &targets, true);

    #[rustfmt::skip]
    let expected = vec![
        6, 7,
        5, 6,
    ];
    assert_eq!(durations, expected);
    let expected_distances: Vec<Distance> = expected.iter().map(|&duration| duration as Distance * 10.0).collect();
    assert_eq!(distances, expected_distances);

    // and nothing flows against the one way street
    let (durations, _) = server.table(&phantoms, &targets, &sources, false);
    assert_eq!(durations, vec![MAXIMAL_EDGE_DURATION; 4]);
}

// Remainder: randomized comparison against a plain lexicographic Dijkstra on
// the base graph.

fn reference_durations(
    num_nodes: usize,
    edges: &[DirectedEdge],
    phantoms: &[PhantomNode],
    sources: &[usize],
    targets: &[usize],
) -> Vec<Duration> {
    let mut adjacency = vec![Vec::new(); num_nodes];
    for edge in edges {
        adjacency[edge.from as usize].push((edge.to, edge.weight, edge.duration));
    }

    let mut result = vec![MAXIMAL_EDGE_DURATION; sources.len() * targets.len()];
    for (row, &source) in sources.iter().enumerate() {
        let mut labels = vec![(INVALID_EDGE_WEIGHT, MAXIMAL_EDGE_DURATION); num_nodes];
        let mut queue = BinaryHeap::new();

        let phantom = &phantoms[source];
        let mut seed = |half: &PhantomHalf, valid: bool, labels: &mut Vec<(Weight, Duration)>, queue: &mut BinaryHeap<_>| {
            if valid && (-half.weight, -half.duration) < labels[half.node as usize] {
                labels[half.node as usize] = (-half.weight, -half.duration);
                queue.push(Reverse((-half.weight, -half.duration, half.node)));
            }
        };
        seed(&phantom.forward, phantom.is_valid_forward_source(), &mut labels, &mut queue);
        seed(&phantom.reverse, phantom.is_valid_reverse_source(), &mut labels, &mut queue);

        while let Some(Reverse((weight, duration, node))) = queue.pop() {
            if (weight, duration) > labels[node as usize] {
                continue;
            }
            for &(to, edge_weight, edge_duration) in &adjacency[node as usize] {
                let to_label = (weight + edge_weight, duration + edge_duration);
                if to_label < labels[to as usize] {
                    labels[to as usize] = to_label;
                    queue.push(Reverse((to_label.0, to_label.1, to)));
                }
            }
        }

        for (column, &target) in targets.iter().enumerate() {
            let phantom = &phantoms[target];
            let mut best = (INVALID_EDGE_WEIGHT, MAXIMAL_EDGE_DURATION);
            for (half, valid) in [
                (&phantom.forward, phantom.is_valid_forward_target()),
                (&phantom.reverse, phantom.is_valid_reverse_target()),
            ] {
                if !valid {
                    continue;
                }
                let (label_weight, label_duration) = labels[half.node as usize];
                if label_weight == INVALID_EDGE_WEIGHT {
                    continue;
                }
                let path = (label_weight + half.weight, label_duration + half.duration);
                if path.0 >= 0 && path < best {
                    best = path;
                }
            }
            result[row * targets.len() + column] = best.1;
        }
    }
    result
}

fn random_instance(rng: &mut StdRng) -> (Vec<DirectedEdge>, MultiLevelGraph, Vec<PhantomNode>) {
    let num_nodes = 40;
    let mut edges = Vec::new();
    for node in 0..num_nodes as NodeId - 1 {
        for (from, to) in [(node, node + 1), (node + 1, node)] {
            edges.push(DirectedEdge {
                from,
                to,
                weight: rng.gen_range(1..100),
                duration: rng.gen_range(1..100),
            });
        }
    }
    for _ in 0..60 {
        let from = rng.gen_range(0..num_nodes as NodeId);
        let mut to = rng.gen_range(0..num_nodes as NodeId);
        while to == from {
            to = rng.gen_range(0..num_nodes as NodeId);
        }
        edges.push(DirectedEdge {
            from,
            to,
            weight: rng.gen_range(1..100),
            duration: rng.gen_range(1..100),
        });
    }

    let partition = MultiLevelPartition::new(vec![
        (0..num_nodes as CellId).map(|node| node / 5).collect(),
        (0..num_nodes as CellId).map(|node| node / 10).collect(),
    ]);
    let graph = SegmentGraph::new(&edges, vec![10.0; num_nodes], &partition);
    let data = MultiLevelGraph::customize(graph, partition);

    let phantoms = (0..num_nodes as NodeId).map(phantom).collect();

    (edges, data, phantoms)
}

#[test]
fn random_matrices_match_plain_dijkstra() {
    let mut rng = StdRng::seed_from_u64(0xc0ffee);

    for _ in 0..10 {
        let (edges, data, phantoms) = random_instance(&mut rng);
        let mut server = Server::new(&data);

        let num_nodes = data.graph().num_nodes();
        let sources: Vec<usize> = (0..5).map(|_| rng.gen_range(0..num_nodes)).collect();
        let targets: Vec<usize> = (0..7).map(|_| rng.gen_range(0..num_nodes)).collect();

        // many to many, forward dispatch
        let (durations, _) = server.table(&phantoms, &sources, &targets, false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &sources, &targets));

        // many to many, reversed dispatch
        let (durations, _) = server.table(&phantoms, &targets, &sources, false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &targets, &sources));

        // one to many
        let (durations, _) = server.table(&phantoms, &sources[..1], &targets, false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &sources[..1], &targets));

        // many to one
        let (durations, _) = server.table(&phantoms, &sources, &targets[..1], false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &sources, &targets[..1]));
    }
}

#[test]
fn random_one_to_many_with_offsets_matches_plain_dijkstra() {
    let mut rng = StdRng::seed_from_u64(0xf00d);

    for _ in 0..10 {
        let (edges, data, mut phantoms) = random_instance(&mut rng);
        let num_nodes = data.graph().num_nodes();
        for phantom in phantoms.iter_mut().step_by(3) {
            phantom.forward.weight = rng.gen_range(0..5);
            phantom.forward.duration = rng.gen_range(0..5);
            phantom.forward.distance = 1.0;
        }
        let mut server = Server::new(&data);

        let source = rng.gen_range(0..num_nodes);
        let targets: Vec<usize> = (0..8).map(|_| rng.gen_range(0..num_nodes)).collect();

        let (durations, _) = server.table(&phantoms, &[source], &targets, false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &[source], &targets));

        let (durations, _) = server.table(&phantoms, &targets, &[source], false);
        assert_eq!(durations, reference_durations(num_nodes, &edges, &phantoms, &targets, &[source]));
    }
}

#[test]
fn random_distances_are_plausible() {
    let mut rng = StdRng::seed_from_u64(42);
    let (_, data, phantoms) = random_instance(&mut rng);
    let mut server = Server::new(&data);

    let sources: Vec<usize> = (0..4).map(|_| rng.gen_range(0..data.graph().num_nodes())).collect();
    let targets: Vec<usize> = (0..4).map(|_| rng.gen_range(0..data.graph().num_nodes())).collect();

    let (durations, distances) = server.table(&phantoms, &sources, &targets, true);
    assert_eq!(durations.len(), distances.len());
    for (&duration, &distance) in durations.iter().zip(distances.iter()) {
        if duration == MAXIMAL_EDGE_DURATION {
            assert_eq!(distance, INVALID_EDGE_DISTANCE);
        } else {
            assert!(distance >= 0.0);
            assert!(distance < INVALID_EDGE_DISTANCE);
        }
    }
}
