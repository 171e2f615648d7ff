//! Randomized reachability tests
//!
//! Random object graphs are collected and compared with a breadth-first
//! walk from the roots over the same edges.

use proptest::collection::vec;
use proptest::prelude::*;
use rootmark_gc::{Collector, Handle};
use std::collections::VecDeque;

/// A graph over `sizes.len()` nodes; edges and roots index into it
#[derive(Debug, Clone)]
struct Graph {
    sizes: Vec<usize>,
    edges: Vec<(usize, usize)>,
    roots: Vec<usize>,
}

fn graph() -> impl Strategy<Value = Graph> {
    (1usize..40).prop_flat_map(|nodes| {
        (
            vec(1usize..64, nodes),
            vec((0..nodes, 0..nodes), 0..80),
            vec(0..nodes, 0..4),
        )
            .prop_map(|(sizes, edges, roots)| Graph {
                sizes,
                edges,
                roots,
            })
    })
}

/// Nodes reachable from the roots
fn reachable(graph: &Graph) -> Vec<bool> {
    let mut seen = vec![false; graph.sizes.len()];
    let mut queue: VecDeque<usize> = graph.roots.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        if seen[node] {
            continue;
        }
        seen[node] = true;
        for &(from, to) in &graph.edges {
            if from == node && !seen[to] {
                queue.push_back(to);
            }
        }
    }
    seen
}

/// Allocate the graph with each payload filled with its node index
fn build(gc: &mut Collector, graph: &Graph) -> Vec<Handle> {
    let handles: Vec<Handle> = graph
        .sizes
        .iter()
        .enumerate()
        .map(|(node, &size)| {
            let handle = gc.allocate(size).unwrap();
            gc.payload_mut(handle).unwrap().fill(node as u8);
            handle
        })
        .collect();
    for &(from, to) in &graph.edges {
        gc.register_edge(handles[from], handles[to]).unwrap();
    }
    for &root in &graph.roots {
        gc.register_root(handles[root]).unwrap();
    }
    handles
}

proptest! {
    #[test]
    fn prop_collect_frees_exactly_the_unreachable(graph in graph()) {
        let mut gc = Collector::new(0);
        let handles = build(&mut gc, &graph);
        let live = reachable(&graph);

        let expected: usize = graph
            .sizes
            .iter()
            .zip(&live)
            .filter(|&(_, &alive)| !alive)
            .map(|(&size, _)| size)
            .sum();
        prop_assert_eq!(gc.collect(), expected);

        for (node, &handle) in handles.iter().enumerate() {
            prop_assert_eq!(gc.contains(handle), live[node]);
            if live[node] {
                let payload = gc.payload(handle).unwrap();
                prop_assert_eq!(payload.len(), graph.sizes[node]);
                prop_assert!(payload.iter().all(|&b| b == node as u8));
            }
        }

        let surviving_edges = graph
            .edges
            .iter()
            .filter(|&&(from, to)| live[from] && live[to])
            .count();
        prop_assert_eq!(gc.stats().edge_count, surviving_edges);
        prop_assert_eq!(gc.object_count(), live.iter().filter(|&&alive| alive).count());

        // A second cycle finds nothing new
        prop_assert_eq!(gc.collect(), 0);
    }

    #[test]
    fn prop_unrooted_graph_is_fully_reclaimed(graph in graph()) {
        let mut gc = Collector::new(0);
        let handles = build(&mut gc, &graph);
        for &root in &graph.roots {
            gc.remove_root(handles[root]).unwrap();
        }

        prop_assert_eq!(gc.collect(), graph.sizes.iter().sum::<usize>());
        prop_assert_eq!(gc.object_count(), 0);
        prop_assert_eq!(gc.stats().edge_count, 0);
    }
}
