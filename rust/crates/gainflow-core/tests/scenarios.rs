use approx::{assert_abs_diff_eq, assert_relative_eq};
use gainflow_core::{max_generalized_flow, GainFlowError, GainGraph, MicroLpBackend, NodeId};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn network(node_count: usize, edges: &[(usize, usize, f64, f64)]) -> GainGraph {
    let mut graph = GainGraph::new(node_count);
    for &(from, to, capacity, gain) in edges {
        let (tail, head) = (NodeId(from), NodeId(to));
        graph.add_edge(tail, head, capacity, gain).unwrap();
    }
    graph
}

fn optimum(graph: &GainGraph) -> f64 {
    let (source, sink) = (NodeId(0), NodeId(graph.node_count() - 1));
    let flow = max_generalized_flow(graph, source, sink, &MicroLpBackend).unwrap();
    flow.assignment.verify(graph, source, sink, 1e-6).unwrap();
    flow.value
}

#[test]
fn single_lossy_edge_delivers_half() {
    init_logging();
    let graph = network(2, &[(0, 1, 10.0, 0.5)]);
    assert_abs_diff_eq!(optimum(&graph), 5.0, epsilon = 1e-6);
}

#[test]
fn amplifying_second_hop() {
    init_logging();
    let graph = network(3, &[(0, 1, 10.0, 1.0), (1, 2, 4.0, 2.0)]);
    assert_abs_diff_eq!(optimum(&graph), 8.0, epsilon = 1e-6);
}

#[test]
fn disconnected_sink_is_zero_not_an_error() {
    init_logging();
    let graph = network(4, &[(0, 1, 3.0, 0.9), (1, 2, 3.0, 0.9)]);
    assert_eq!(optimum(&graph), 0.0);
}

#[test]
fn no_edges_into_sink_is_zero() {
    init_logging();
    let graph = network(3, &[(0, 1, 3.0, 0.9), (2, 1, 3.0, 0.9)]);
    assert_abs_diff_eq!(optimum(&graph), 0.0, epsilon = 1e-9);
}

#[test]
fn empty_network_is_zero() {
    let graph = GainGraph::new(2);
    assert_eq!(optimum(&graph), 0.0);
}

#[test]
fn flow_out_of_sink_is_charged() {
    init_logging();
    // Routing out of the sink and back through a lossy loop only loses flow.
    let graph = network(
        3,
        &[(0, 2, 2.0, 1.0), (2, 1, 5.0, 1.0), (1, 2, 5.0, 0.5)],
    );
    assert_abs_diff_eq!(optimum(&graph), 2.0, epsilon = 1e-6);
}

#[test]
fn dead_end_branch_carries_no_flow() {
    init_logging();
    let graph = network(4, &[(0, 1, 5.0, 1.0), (0, 2, 5.0, 1.0), (1, 3, 5.0, 0.8)]);
    let flow = max_generalized_flow(&graph, NodeId(0), NodeId(3), &MicroLpBackend).unwrap();
    assert_abs_diff_eq!(flow.value, 4.0, epsilon = 1e-6);
    assert_abs_diff_eq!(flow.assignment.values()[1], 0.0, epsilon = 1e-6);
}

#[test]
fn eight_node_reference_network() {
    init_logging();
    let graph = network(
        8,
        &[
            (0, 1, 12.0, 0.7),
            (0, 2, 3.0, 0.9),
            (0, 3, 4.0, 0.8),
            (1, 4, 3.0, 0.5),
            (1, 5, 5.0, 0.8),
            (2, 1, 2.7, 1.0),
            (2, 3, 20.0 / 9.0, 0.9),
            (2, 5, 5.0, 0.7),
            (3, 5, 1.0, 1.0),
            (3, 6, 2.0, 0.7),
            (4, 7, 2.0, 0.5),
            (5, 4, 1.0, 0.5),
            (5, 6, 6.0, 0.7),
            (5, 7, 1.3, 1.0),
            (6, 7, 7.0, 1.0),
        ],
    );
    assert_relative_eq!(optimum(&graph), 7.363, max_relative = 1e-6);
}

#[test]
fn equal_terminals_are_rejected() {
    let graph = network(2, &[(0, 1, 1.0, 1.0)]);
    let err = max_generalized_flow(&graph, NodeId(1), NodeId(1), &MicroLpBackend).unwrap_err();
    assert_eq!(err, GainFlowError::InvalidTerminal { node: 1 });
}
