//! Epoch extraction from a swimlane table, and positional epoch assignment
//! + continuity resolution over a parsed graph.

use stratgraph_core::{ConnectionsDatamodel, EdgeId, Graph, Node, NodeId, NodeKind, StratigraphicKind};

use crate::error::ImportSummary;
use crate::graphml::vocab;
use crate::xml::XmlElement;

pub struct ExtractedEpoch {
    pub id: NodeId,
    pub name: String,
    pub min_y: f64,
    pub max_y: f64,
    pub start: i64,
    pub end: i64,
    pub color: Option<String>,
}

/// Walk a `<y:TableNode>`'s rows, building a running vertical ribbon
/// starting at the table's own geometry, and pair each row with the
/// `NodeLabel` vocabulary naming and bounding it.
pub fn extract(table_node: &XmlElement) -> Vec<ExtractedEpoch> {
    let table_y = table_node
        .find_descendant("Geometry")
        .and_then(|g| g.attr("y"))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    let mut rows = Vec::new();
    table_node.find_descendants("Row", &mut rows);

    let mut cursor = table_y;
    let mut epochs = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let height: f64 = row.attr("height").and_then(|v| v.parse().ok()).unwrap_or(0.0);
        let min_y = cursor;
        let max_y = cursor + height;
        cursor = max_y;

        let label = row.find_descendant("NodeLabel");
        let (name, start, end, color) = match label {
            Some(l) => {
                let (name, fields) = vocab::parse(&l.text());
                let start = fields.get("start").map(|s| vocab::parse_time_bound(s)).unwrap_or(10000);
                let end = fields.get("end").map(|s| vocab::parse_time_bound(s)).unwrap_or(10000);
                let color = l.attr("backgroundColor").map(|s| s.to_string());
                let name = if name.is_empty() { format!("Epoch {}", idx + 1) } else { name };
                (name, start, end, color)
            }
            None => (format!("Epoch {}", idx + 1), 10000, 10000, None),
        };

        epochs.push(ExtractedEpoch {
            id: NodeId::fresh(),
            name,
            min_y,
            max_y,
            start,
            end,
            color,
        });
    }
    epochs
}

pub fn epoch_nodes(epochs: &[ExtractedEpoch]) -> Vec<Node> {
    epochs
        .iter()
        .map(|e| {
            let mut node = Node::new(
                e.id.clone(),
                NodeKind::Epoch {
                    start: e.start,
                    end: e.end,
                    min_y: e.min_y,
                    max_y: e.max_y,
                    color: e.color.clone(),
                },
                e.name.clone(),
            );
            node.fill_color = e.color.clone();
            node
        })
        .collect()
}

/// Assign `has_first_epoch` (and, for physical units, `survive_in_epoch`)
/// edges based on each node's vertical position. Continuity markers (`BR`
/// nodes attached to a stratigraphic unit) extend the survival window
/// beyond the unit's own `y_pos`.
pub fn assign(graph: &mut Graph, datamodel: &ConnectionsDatamodel, epochs: &[ExtractedEpoch], summary: &mut ImportSummary) {
    let mut continuity_y: std::collections::HashMap<NodeId, f64> = std::collections::HashMap::new();
    let br_nodes: Vec<(NodeId, f64)> = graph
        .all_nodes()
        .filter_map(|n| match &n.kind {
            NodeKind::Stratigraphic(StratigraphicKind::BR) => n.y_pos.map(|y| (n.id.clone(), y)),
            _ => None,
        })
        .collect();

    for (br_id, br_y) in br_nodes {
        let mut attached: Option<NodeId> = None;
        for e in graph.edges_from(&br_id) {
            attached = Some(e.target.clone());
        }
        if attached.is_none() {
            for e in graph.edges_to(&br_id) {
                attached = Some(e.source.clone());
            }
        }
        if let Some(target) = attached {
            continuity_y.insert(target, br_y);
        }
    }

    let node_infos: Vec<(NodeId, f64, bool)> = graph
        .all_nodes()
        .filter_map(|n| {
            n.y_pos.map(|y| {
                let physical = matches!(&n.kind, NodeKind::Stratigraphic(k) if k.is_physical());
                (n.id.clone(), y, physical)
            })
        })
        .collect();

    for (node_id, y, physical) in node_infos {
        let Some(first) = epochs.iter().find(|e| y >= e.min_y && y <= e.max_y) else {
            continue;
        };

        if datamodel.edge_exists("has_first_epoch") {
            if let Err(err) = graph.add_edge(EdgeId::fresh(), node_id.clone(), first.id.clone(), "has_first_epoch", datamodel) {
                summary.warn(format!("could not link {node_id} to its first epoch: {err}"));
            }
        }

        if !physical {
            continue;
        }

        let survive_above = continuity_y.get(&node_id).copied();
        for epoch in epochs {
            let survives = match survive_above {
                Some(continuity) => continuity < epoch.max_y && epoch.max_y < y,
                None => epoch.max_y < y,
            };
            if survives && datamodel.edge_exists("survive_in_epoch") {
                if let Err(err) = graph.add_edge(EdgeId::fresh(), node_id.clone(), epoch.id.clone(), "survive_in_epoch", datamodel) {
                    summary.warn(format!("could not link {node_id} survival to epoch {}: {err}", epoch.name));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datamodel() -> ConnectionsDatamodel {
        let json = r#"{
            "edge_types": {
                "has_first_epoch": {
                    "name": "has_first_epoch", "label": "has first epoch",
                    "allowed_connections": { "source": ["StratigraphicNode", "ParadataNode"], "target": ["EpochNode"] }
                },
                "survive_in_epoch": {
                    "name": "survive_in_epoch", "label": "survives in epoch",
                    "allowed_connections": { "source": ["StratigraphicNode"], "target": ["EpochNode"] }
                }
            }
        }"#;
        ConnectionsDatamodel::from_json_str(json).unwrap()
    }

    fn three_bands() -> Vec<ExtractedEpoch> {
        vec![
            ExtractedEpoch { id: NodeId::new("e0"), name: "Epoch 0-100".into(), min_y: 0.0, max_y: 100.0, start: 300, end: 200, color: None },
            ExtractedEpoch { id: NodeId::new("e1"), name: "Epoch 100-200".into(), min_y: 100.0, max_y: 200.0, start: 400, end: 300, color: None },
            ExtractedEpoch { id: NodeId::new("e2"), name: "Epoch 200-300".into(), min_y: 200.0, max_y: 300.0, start: 500, end: 400, color: None },
        ]
    }

    /// A physical US node in the middle band gets both a first-epoch edge
    /// to the band containing it and a survival edge into the more-recent
    /// band directly above; a Document node at the same position gets only
    /// the first-epoch edge.
    #[test]
    fn physical_unit_survives_into_the_band_above_it() {
        let dm = datamodel();
        let epochs = three_bands();
        let mut summary = ImportSummary::default();
        let mut graph = Graph::new("test");

        let mut unit_a = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US-A");
        unit_a.y_pos = Some(150.0);
        graph.add_node(unit_a).unwrap();

        let mut doc_b = Node::new(NodeId::new("b"), NodeKind::Document { url: None }, "Doc-B");
        doc_b.y_pos = Some(150.0);
        graph.add_node(doc_b).unwrap();

        assign(&mut graph, &dm, &epochs, &mut summary);

        assert!(graph.has_edge_between(&NodeId::new("a"), &NodeId::new("e1"), "has_first_epoch"));
        assert!(graph.has_edge_between(&NodeId::new("a"), &NodeId::new("e0"), "survive_in_epoch"));
        assert!(!graph.has_edge_between(&NodeId::new("a"), &NodeId::new("e2"), "survive_in_epoch"));

        assert!(graph.has_edge_between(&NodeId::new("b"), &NodeId::new("e1"), "has_first_epoch"));
        assert!(!graph.has_edge_between(&NodeId::new("b"), &NodeId::new("e0"), "survive_in_epoch"));
    }
}
