use mld_router::algo::multi_level_dijkstra::*;
use mld_router::algo::PhantomNode;
use mld_router::datastr::graph::*;
use mld_router::datastr::partition::*;

// Two cells on a two-way line.
//
//      cell 0     cell 1
//     [ 0   1 ] [ 2   3 ]
//      0 ↔ 1  ↔  2 ↔ 3      edge n↔n+1 has weight n+1
//
fn two_cell_line() -> MultiLevelGraph {
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1]]);
    let mut edges = Vec::new();
    for node in 0..3 {
        for (from, to) in [(node, node + 1), (node + 1, node)] {
            edges.push(DirectedEdge {
                from,
                to,
                weight: node as Weight + 1,
                duration: 10 * (node as Duration + 1),
            });
        }
    }
    let graph = SegmentGraph::new(&edges, vec![10.0; 4], &partition);
    MultiLevelGraph::customize(graph, partition)
}

#[test]
fn boundary_nodes_are_classified_by_crossing_edges() {
    let data = two_cell_line();

    // only the nodes adjacent to the 1 ↔ 2 boundary edge are boundary nodes
    let left = data.metric().cell(1, 0);
    assert_eq!(left.source_nodes(), &[1]);
    assert_eq!(left.destination_nodes(), &[1]);

    let right = data.metric().cell(1, 1);
    assert_eq!(right.source_nodes(), &[2]);
    assert_eq!(right.destination_nodes(), &[2]);
}

#[test]
fn shortcuts_carry_shortest_intra_cell_paths() {
    // a cell with an inner path: 3 → 0 enters, 2 → 3 leaves
    //
    //      cell 0
    //     [ 0 → 1 → 2 ]  ⊂  0..3
    //
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 0, 1]]);
    let graph = SegmentGraph::new(
        &[
            DirectedEdge {
                from: 0,
                to: 1,
                weight: 3,
                duration: 30,
            },
            DirectedEdge {
                from: 1,
                to: 2,
                weight: 4,
                duration: 40,
            },
            DirectedEdge {
                from: 2,
                to: 3,
                weight: 1,
                duration: 10,
            },
            DirectedEdge {
                from: 3,
                to: 0,
                weight: 1,
                duration: 10,
            },
        ],
        vec![10.0; 4],
        &partition,
    );
    let data = MultiLevelGraph::customize(graph, partition);

    let cell = data.metric().cell(1, 0);
    assert_eq!(cell.source_nodes(), &[0]);
    assert_eq!(cell.destination_nodes(), &[2]);
    assert_eq!(cell.out_weights(0), &[7]);
    assert_eq!(cell.out_durations(0), &[70]);
    assert_eq!(cell.in_weights(2).collect::<Vec<_>>(), vec![7]);
    assert_eq!(cell.in_durations(2).collect::<Vec<_>>(), vec![70]);

    // nodes that are no boundary nodes have no table rows or columns
    assert!(cell.out_weights(1).is_empty());
    assert_eq!(cell.in_weights(1).count(), 0);
}

#[test]
fn unconnected_boundary_pairs_carry_the_sentinel() {
    // 2 → 0 makes node 0 a source, 1 → 2 makes node 1 a destination,
    // but there is no way from 0 to 1 within the cell
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1]]);
    let graph = SegmentGraph::new(
        &[
            DirectedEdge {
                from: 2,
                to: 0,
                weight: 1,
                duration: 1,
            },
            DirectedEdge {
                from: 1,
                to: 2,
                weight: 1,
                duration: 1,
            },
        ],
        vec![10.0; 3],
        &partition,
    );
    let data = MultiLevelGraph::customize(graph, partition);

    let cell = data.metric().cell(1, 0);
    assert_eq!(cell.source_nodes(), &[0]);
    assert_eq!(cell.destination_nodes(), &[1]);
    assert_eq!(cell.out_weights(0), &[INVALID_EDGE_WEIGHT]);
}

#[test]
fn queries_use_the_customized_tables() {
    let data = two_cell_line();
    let mut server = Server::new(&data);

    let phantoms: Vec<_> = (0..4).map(PhantomNode::at_segment_entry).collect();
    let endpoints = [0, 1, 2, 3];
    let (durations, _) = server.table(&phantoms, &endpoints, &endpoints, false);

    #[rustfmt::skip]
    let expected = vec![
        0, 1, 3, 6,
        1, 0, 2, 5,
        3, 2, 0, 3,
        6, 5, 3, 0,
    ];
    let expected: Vec<Duration> = expected.into_iter().map(|duration: Duration| duration * 10).collect();
    assert_eq!(durations, expected);
}
