//! GraphML (yEd-style) importer.
//!
//! Phases, in order: dynamic key mapping, graph header extraction, a node
//! pass (classification, document dedup, group containment), epoch
//! extraction from the swimlane table, an edge pass (remapping + type
//! enhancement), epoch/continuity assignment, and finally slipback of
//! adopted identifiers into the source file.

pub mod classify;
pub mod enhancer;
pub mod epoch;
pub mod header;
pub mod keys;
pub mod slipback;
pub mod vocab;

use std::collections::HashMap;
use std::path::Path;

use stratgraph_core::{ConnectionsDatamodel, EdgeId, Graph, GroupKind, Node, NodeId, NodeKind, StratigraphicKind};

use crate::error::{ImportError, ImportSummary};
use crate::xml::XmlElement;
use keys::KeyMap;

pub struct GraphmlImporter;

/// Mutable bookkeeping threaded through the recursive node pass.
struct NodePassState<'a> {
    node_remap: HashMap<String, NodeId>,
    node_uris: HashMap<String, String>,
    doc_names: HashMap<String, NodeId>,
    table_node_elem: Option<&'a XmlElement>,
}

type BuildResult = (Graph, HashMap<String, NodeId>, HashMap<String, String>, HashMap<String, EdgeId>);

impl GraphmlImporter {
    /// Parse a GraphML file into a fresh graph, assign epochs, and slip
    /// adopted identifiers back into the source file.
    pub fn import(
        path: &Path,
        graph_id: impl Into<String>,
        datamodel: &ConnectionsDatamodel,
    ) -> Result<(Graph, ImportSummary), ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let mut root = crate::xml::parse(&text)?;
        let mut summary = ImportSummary::default();
        let mut key_map = KeyMap::build(&root);

        let (graph, node_remap, node_uris, edge_remap) =
            Self::build_graph(&root, &key_map, graph_id, datamodel, &mut summary)?;

        slipback::ensure_custom_keys(&mut root, &mut key_map);
        slipback::slip_nodes(&mut root, &key_map, &node_remap, &node_uris);
        slipback::slip_edges(&mut root, &key_map, &edge_remap);

        let rewritten = crate::xml::to_string(&root)?;
        std::fs::write(path, rewritten)?;

        Ok((graph, summary))
    }

    /// Parse-only entry point (no slipback), used by tests that build a
    /// graph from an in-memory GraphML string without writing to disk.
    pub fn import_str(
        xml_text: &str,
        graph_id: impl Into<String>,
        datamodel: &ConnectionsDatamodel,
    ) -> Result<(Graph, ImportSummary), ImportError> {
        let root = crate::xml::parse(xml_text)?;
        let key_map = KeyMap::build(&root);
        let mut summary = ImportSummary::default();
        let (graph, ..) = Self::build_graph(&root, &key_map, graph_id, datamodel, &mut summary)?;
        Ok((graph, summary))
    }

    fn build_graph(
        root: &XmlElement,
        key_map: &KeyMap,
        graph_id: impl Into<String>,
        datamodel: &ConnectionsDatamodel,
        summary: &mut ImportSummary,
    ) -> Result<BuildResult, ImportError> {
        let mut graph = Graph::new(graph_id);

        let graph_elem = root
            .find_child("graph")
            .ok_or_else(|| ImportError::ParseError("no <graph> element found".to_string()))?;

        let header = header::extract(graph_elem, key_map);
        if let Some(code) = &header.id {
            graph.code = Some(code.clone());
        }
        if let Some(description) = &header.description {
            graph.description = description.clone();
        }
        if let Some(license) = &header.license {
            graph.license = Some(license.clone());
        }
        if let Some(embargo) = &header.embargo {
            graph.embargo = chrono::NaiveDate::parse_from_str(embargo, "%Y-%m-%d").ok();
        }

        let graph_node_id = NodeId::fresh();
        let graph_node = Node::new(graph_node_id.clone(), NodeKind::Generic, header.description.clone().unwrap_or_default());
        graph.add_node(graph_node)?;

        if let Some(orcid) = header.orcid.clone() {
            let display_name = match (&header.author_name, &header.author_surname) {
                (Some(n), Some(s)) => format!("{n} {s}"),
                (Some(n), None) => n.clone(),
                _ => orcid.clone(),
            };
            let author_id = NodeId::fresh();
            graph.add_node(Node::new(author_id.clone(), NodeKind::Author { orcid }, display_name))?;
            if datamodel.edge_exists("has_author") {
                if let Err(err) = graph.add_edge(EdgeId::fresh(), graph_node_id, author_id, "has_author", datamodel) {
                    summary.warn(format!("could not link graph header to its author: {err}"));
                }
            }
        }

        let mut state = NodePassState {
            node_remap: HashMap::new(),
            node_uris: HashMap::new(),
            doc_names: HashMap::new(),
            table_node_elem: None,
        };

        process_graph(graph_elem, None, &mut graph, &mut state, key_map, datamodel, summary)?;

        if let Some(table_elem) = state.table_node_elem {
            let epochs = epoch::extract(table_elem);
            for node in epoch::epoch_nodes(&epochs) {
                graph.add_node(node)?;
            }
            epoch::assign(&mut graph, datamodel, &epochs, summary);
        }

        let mut all_edges = Vec::new();
        root.find_descendants("edge", &mut all_edges);
        let mut edge_remap = HashMap::new();
        for edge_elem in all_edges {
            process_edge(edge_elem, key_map, &state.node_remap, &mut edge_remap, &mut graph, datamodel, summary);
        }

        Ok((graph, state.node_remap, state.node_uris, edge_remap))
    }
}

fn process_graph<'a>(
    graph_elem: &'a XmlElement,
    parent: Option<(NodeId, GroupKind)>,
    graph: &mut Graph,
    state: &mut NodePassState<'a>,
    key_map: &KeyMap,
    datamodel: &ConnectionsDatamodel,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    for node_elem in graph_elem.find_children("node") {
        process_node(node_elem, parent.clone(), graph, state, key_map, datamodel, summary)?;
    }
    Ok(())
}

fn process_node<'a>(
    node_elem: &'a XmlElement,
    parent: Option<(NodeId, GroupKind)>,
    graph: &mut Graph,
    state: &mut NodePassState<'a>,
    key_map: &KeyMap,
    datamodel: &ConnectionsDatamodel,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let Some(raw_id) = node_elem.attr("id").map(|s| s.to_string()) else {
        return Ok(());
    };

    if node_elem.find_descendant("TableNode").is_some() {
        state.table_node_elem = Some(node_elem);
        return Ok(());
    }

    let geom = classify::extract_geometry(node_elem);
    let description = key_map
        .node_key("description")
        .and_then(|k| keys::data_value(node_elem, k))
        .unwrap_or_default();
    let label = geom.label_text.clone().unwrap_or_else(|| raw_id.clone());
    let emid = key_map.node_key("EMID").and_then(|k| keys::data_value(node_elem, k));
    let uri = key_map.node_key("URI").and_then(|k| keys::data_value(node_elem, k));

    let nested_graph = node_elem.find_child("graph");
    let is_group = nested_graph.is_some() || node_elem.find_descendant("GroupNode").is_some();

    let kind = if classify::is_continuity_description(&description) || classify::is_continuity_description(&label) {
        NodeKind::Stratigraphic(StratigraphicKind::BR)
    } else if let Some((strat_kind, _)) = classify::convert_shape2type(geom.shape.as_deref().unwrap_or(""), geom.border_color.as_deref()) {
        NodeKind::Stratigraphic(strat_kind)
    } else if is_group {
        NodeKind::Group(classify::classify_group(geom.fill_color.as_deref()))
    } else if matches!(parent, Some((_, GroupKind::Paradata))) {
        let is_property_like = node_elem.find_descendant("Property").is_some();
        match classify::classify_paradata(&label, is_property_like) {
            NodeKind::Document { .. } => NodeKind::Document { url: uri.clone() },
            other => other,
        }
    } else {
        NodeKind::Generic
    };

    // Document dedup-by-name: collapse the raw id onto the existing
    // document's adopted id and skip creating a second node (I6).
    if matches!(&kind, NodeKind::Document { .. }) {
        if let Some(existing_id) = state.doc_names.get(&label) {
            state.node_remap.insert(raw_id, existing_id.clone());
            return Ok(());
        }
    }

    let adopted_id = emid.map(NodeId::new).unwrap_or_else(NodeId::fresh);
    state.node_remap.insert(raw_id.clone(), adopted_id.clone());

    let mut node = Node::new(adopted_id.clone(), kind.clone(), label.clone());
    node.description = description;
    node.y_pos = geom.y_pos;
    node.fill_color = geom.fill_color;
    node.border_style = geom.border_color;
    node.shape = geom.shape;

    graph.add_node(node)?;

    if let NodeKind::Document { url } = &kind {
        state.doc_names.insert(label.clone(), adopted_id.clone());
        if let Some(uri) = &uri {
            state.node_uris.insert(raw_id.clone(), uri.clone());
        }
        if let Some(url) = url {
            if url.trim() != "Empty" && datamodel.edge_exists("has_linked_resource") {
                let link_id = NodeId::fresh();
                let link_node = Node::new(link_id.clone(), NodeKind::Link { url: url.clone() }, format!("Link to {label}"));
                graph.add_node(link_node)?;
                if let Err(err) = graph.add_edge(EdgeId::fresh(), adopted_id.clone(), link_id, "has_linked_resource", datamodel) {
                    summary.warn(format!("could not link resource for {adopted_id}: {err}"));
                }
            }
        }
    }

    if let Some((parent_id, parent_kind)) = &parent {
        let edge_type = match parent_kind {
            GroupKind::Activity => "is_in_activity",
            GroupKind::Paradata => "is_in_paradata_nodegroup",
            GroupKind::TimeBranch => "is_in_timebranch",
            GroupKind::Generic => "is_in_group",
        };
        if datamodel.edge_exists(edge_type) {
            if let Err(err) = graph.add_edge(EdgeId::fresh(), adopted_id.clone(), parent_id.clone(), edge_type, datamodel) {
                summary.warn(format!("could not record containment for {adopted_id}: {err}"));
            }
        }
    }

    if let Some(nested) = nested_graph {
        if let NodeKind::Group(group_kind) = kind {
            process_graph(nested, Some((adopted_id, group_kind)), graph, state, key_map, datamodel, summary)?;
        }
    }

    Ok(())
}

fn raw_edge_type(line_style: Option<&str>) -> &'static str {
    match line_style {
        Some("line") => "is_after",
        Some("double_line") => "has_same_time",
        Some("dotted") => "changed_from",
        Some("dashed") => "has_data_provenance",
        Some("dashed_dotted") => "contrasts_with",
        _ => "generic_connection",
    }
}

fn process_edge(
    edge_elem: &XmlElement,
    key_map: &KeyMap,
    node_remap: &HashMap<String, NodeId>,
    edge_remap: &mut HashMap<String, EdgeId>,
    graph: &mut Graph,
    datamodel: &ConnectionsDatamodel,
    summary: &mut ImportSummary,
) {
    let Some(raw_id) = edge_elem.attr("id").map(|s| s.to_string()) else {
        return;
    };
    let (Some(raw_source), Some(raw_target)) = (edge_elem.attr("source"), edge_elem.attr("target")) else {
        return;
    };

    let Some(source_id) = node_remap.get(raw_source).cloned() else {
        summary.warn(format!("edge {raw_id} references unknown source node {raw_source}"));
        return;
    };
    let Some(target_id) = node_remap.get(raw_target).cloned() else {
        summary.warn(format!("edge {raw_id} references unknown target node {raw_target}"));
        return;
    };

    let line_style = edge_elem.find_descendant("LineStyle").and_then(|e| e.attr("type"));
    let raw_type = raw_edge_type(line_style);

    let emid = key_map.edge_key("EMID").and_then(|k| keys::data_value(edge_elem, k));
    let adopted_id = emid.map(EdgeId::new).unwrap_or_else(EdgeId::fresh);
    edge_remap.insert(raw_id.clone(), adopted_id.clone());

    let (source_kind, target_kind) = match (graph.node(&source_id), graph.node(&target_id)) {
        (Some(s), Some(t)) => (s.kind.clone(), t.kind.clone()),
        _ => {
            summary.warn(format!("edge {raw_id} resolved to missing node after remap"));
            return;
        }
    };

    let enhanced_type = enhancer::enhance(raw_type, &source_kind, &target_kind);

    let result = graph.add_edge(adopted_id.clone(), source_id.clone(), target_id.clone(), &enhanced_type, datamodel);
    let result = match result {
        Ok(id) => Ok(id),
        Err(_) if enhanced_type != raw_type => {
            summary.warn(format!(
                "enhancement of edge {raw_id} to '{enhanced_type}' would violate the datamodel; keeping raw type '{raw_type}'"
            ));
            graph.add_edge(adopted_id, source_id, target_id, raw_type, datamodel)
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        summary.warn(format!("edge {raw_id} could not be inserted: {err}"));
    }
}
