use host_graph::{nodes_of_class, NodeGraph};
use serde::Serialize;
use shared::error::{KnobError, KnobResult};
use tracing::{debug, info, warn};

use crate::coercion::CoercionTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub class_name: String,
    pub knob_name: String,
    pub updated: Vec<String>,
}

/// Sets `knob_name` on every top-level node of `class_name`.
///
/// Each node's knob is coerced on its own, since arity can differ
/// between instances. The first failure stops the batch and nodes that
/// were already set keep their new value.
pub fn apply_value_to_class<G: NodeGraph>(
    graph: &G,
    table: &CoercionTable,
    class_name: &str,
    knob_name: &str,
    raw_value: &str,
) -> KnobResult<ApplyReport> {
    let nodes = nodes_of_class(graph, class_name);
    if nodes.is_empty() {
        return Err(KnobError::host(format!("no nodes of class '{class_name}'")));
    }
    if raw_value.is_empty() {
        warn!(class_name, knob_name, "applying an empty value");
    }

    let mut updated = Vec::with_capacity(nodes.len());
    for node in nodes {
        let result = node
            .get_parameter(knob_name)
            .ok_or_else(|| {
                KnobError::host(format!(
                    "node '{}' has no knob '{knob_name}'",
                    node.name()
                ))
            })
            .and_then(|knob| {
                let value = table.coerce_value(
                    raw_value,
                    &knob.kind_tag(),
                    knob.expected_arity(),
                    graph,
                )?;
                debug!(node = node.name(), knob = knob_name, %value, "setting knob");
                knob.set_value(value).map_err(KnobError::from)
            });

        if let Err(err) = result {
            warn!(
                node = node.name(),
                already_updated = updated.len(),
                error = %err,
                "stopping batch"
            );
            return Err(err);
        }
        updated.push(node.name().to_string());
    }

    info!(class_name, knob_name, nodes = updated.len(), "applied knob value");
    Ok(ApplyReport {
        class_name: class_name.to_string(),
        knob_name: knob_name.to_string(),
        updated,
    })
}

#[cfg(test)]
#[path = "tests/apply_tests.rs"]
mod tests;
