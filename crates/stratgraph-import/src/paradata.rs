//! Paradata-group connection pass (§4.5): denormalizes `has_property` edges
//! from every stratigraphic node connected to a `ParadataNodeGroup` directly
//! to the properties contained in that group. Idempotent.

use stratgraph_core::{ConnectionsDatamodel, EdgeId, Graph, GroupKind, NodeKind};

use crate::error::ImportSummary;

pub fn connect_paradata_properties(graph: &mut Graph, datamodel: &ConnectionsDatamodel, summary: &mut ImportSummary) {
    if !datamodel.edge_exists("has_property") {
        return;
    }

    let groups: Vec<_> = graph
        .all_nodes()
        .filter(|n| matches!(n.kind, NodeKind::Group(GroupKind::Paradata)))
        .map(|n| n.id.clone())
        .collect();

    for group_id in groups {
        let property_ids: Vec<_> = graph
            .edges_to(&group_id)
            .filter(|e| e.edge_type == "is_in_paradata_nodegroup")
            .filter(|e| matches!(graph.node(&e.source).map(|n| &n.kind), Some(NodeKind::Property { .. })))
            .map(|e| e.source.clone())
            .collect();
        if property_ids.is_empty() {
            continue;
        }

        let strat_ids: Vec<_> = graph
            .edges_to(&group_id)
            .filter(|e| e.edge_type == "has_paradata_nodegroup")
            .map(|e| e.source.clone())
            .chain(
                graph
                    .edges_from(&group_id)
                    .filter(|e| e.edge_type == "has_paradata_nodegroup")
                    .map(|e| e.target.clone()),
            )
            .collect();

        for strat_id in strat_ids {
            for property_id in &property_ids {
                if graph.has_edge_between(&strat_id, property_id, "has_property") {
                    continue;
                }
                if let Err(err) = graph.add_edge(EdgeId::fresh(), strat_id.clone(), property_id.clone(), "has_property", datamodel) {
                    summary.warn(format!("could not link {strat_id} to property {property_id}: {err}"));
                }
            }
        }
    }
}
