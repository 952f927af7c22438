use std::collections::BTreeSet;

use crate::{GraphNode, NodeGraph};

/// Every non-empty knob name of every node, in enumeration order.
/// Duplicates are kept; they are what the ledger counts.
pub fn find_all_knob_names(graph: &dyn NodeGraph, recursive: bool) -> Vec<String> {
    graph
        .enumerate_nodes(recursive)
        .into_iter()
        .flat_map(|node| node.parameter_names())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Sorted, de-duplicated classes of the top-level nodes.
pub fn all_classes(graph: &dyn NodeGraph) -> Vec<String> {
    graph
        .enumerate_nodes(false)
        .into_iter()
        .map(|node| node.class_name().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted knob names of the first top-level node of `class`.
pub fn all_class_knobs(graph: &dyn NodeGraph, class: &str) -> Vec<String> {
    let Some(node) = nodes_of_class(graph, class).into_iter().next() else {
        return Vec::new();
    };
    let mut names = node.parameter_names();
    names.sort();
    names
}

pub fn nodes_of_class<'g>(graph: &'g dyn NodeGraph, class: &str) -> Vec<&'g dyn GraphNode> {
    graph
        .enumerate_nodes(false)
        .into_iter()
        .filter(|node| node.class_name() == class)
        .collect()
}

#[cfg(test)]
#[path = "tests/gather_tests.rs"]
mod tests;
