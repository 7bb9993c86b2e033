//! Tabular importer: column-mapped enrichment or creation of stratigraphic
//! nodes from a sheet-like source (§4.6).

pub mod mapping;
pub mod normalize;
pub mod source;

use std::collections::HashMap;

use stratgraph_core::{ConnectionsDatamodel, EdgeId, Graph, Node, NodeId, NodeKind, StratigraphicKind};

use crate::error::{ImportError, ImportSummary};
use mapping::MappingDocument;
use normalize::normalize_column_name;
use source::TableSource;

/// Run the column-mapped import algorithm against `graph`. Whether rows
/// enrich existing nodes or create new ones is decided once, up front, from
/// whether `graph` already has nodes — not re-evaluated per row.
pub fn import_table<S: TableSource>(
    source: &S,
    mapping: &MappingDocument,
    graph: &mut Graph,
    datamodel: &ConnectionsDatamodel,
    overwrite: bool,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();
    let enrich_only = graph.node_count() > 0;

    let id_column = mapping
        .id_column()
        .ok_or_else(|| ImportError::SchemaError("no column mapping has is_id=true".to_string()))?
        .to_string();

    let normalized_headers: HashMap<String, usize> = source
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, h)| (normalize_column_name(h), idx))
        .collect();

    let mut column_source_index: HashMap<String, usize> = HashMap::new();
    for mapping_col in mapping.column_mappings.keys() {
        let normalized = normalize_column_name(mapping_col);
        if let Some(&idx) = normalized_headers.get(&normalized) {
            column_source_index.insert(mapping_col.clone(), idx);
        } else {
            summary.columns_unmatched.push(mapping_col.clone());
        }
    }
    summary.columns_matched = column_source_index.len();

    if column_source_index.is_empty() {
        return Err(ImportError::SchemaError("no columns from the mapping were found in the source (after normalization)".to_string()));
    }

    let Some(&id_idx) = column_source_index.get(&id_column) else {
        return Err(ImportError::SchemaError(format!("ID column '{id_column}' not found in source (after normalization)")));
    };

    let description_column = mapping.description_column().map(|s| s.to_string());
    let default_node_type = mapping.default_node_type();

    // `start_row` is the first real data row, 1-based over the whole sheet
    // including the header; subtract the header row and convert to 0-based
    // to get a skip count. `tutorial_row` additionally excludes one example
    // row anywhere in the remaining data by its (pre-skip) position.
    let skip_count = mapping.table_settings.start_row.saturating_sub(2);
    let tutorial_row = mapping.table_settings.tutorial_row;
    let rows: Vec<_> = source
        .rows()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx >= skip_count && Some(*idx) != tutorial_row)
        .map(|(_, row)| row)
        .collect();

    summary.rows_total = rows.len();

    for row in rows {
        let Some(Some(raw_id)) = row.get(id_idx) else {
            summary.rows_skipped += 1;
            continue;
        };
        let target_name = raw_id.trim();
        if target_name.is_empty() {
            summary.rows_skipped += 1;
            continue;
        }

        let mut row_dict: HashMap<&str, &str> = HashMap::new();
        for (mapping_col, &idx) in &column_source_index {
            if let Some(Some(value)) = row.get(idx) {
                row_dict.insert(mapping_col.as_str(), value.as_str());
            }
        }

        let node_id = match graph.find_node_by_name(target_name) {
            Some(existing) => existing.id.clone(),
            None if enrich_only => {
                summary.warn(format!("node '{target_name}' not found in existing graph, row skipped"));
                summary.rows_skipped += 1;
                continue;
            }
            None => {
                let description = description_column
                    .as_deref()
                    .and_then(|col| row_dict.get(col))
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let kind = StratigraphicKind::from_tag(&default_node_type)
                    .map(NodeKind::Stratigraphic)
                    .unwrap_or(NodeKind::Stratigraphic(StratigraphicKind::US));
                let id = NodeId::fresh();
                let mut node = Node::new(id.clone(), kind, target_name);
                node.description = description;
                match graph.add_node(node) {
                    Ok(id) => id,
                    Err(err) => {
                        summary.warn(format!("could not create node for '{target_name}': {err}"));
                        summary.rows_failed += 1;
                        continue;
                    }
                }
            }
        };

        for (mapping_col, value) in &row_dict {
            if *mapping_col == id_column || Some(*mapping_col) == description_column.as_deref() {
                continue;
            }
            let col_config = &mapping.column_mappings[*mapping_col];
            if col_config.is_id || col_config.is_description {
                continue;
            }
            let prop_name = col_config.display_name.as_deref().or(col_config.property_name.as_deref()).unwrap_or(mapping_col);
            create_or_update_property(graph, datamodel, &node_id, prop_name, value, overwrite, &mut summary);
        }

        summary.rows_imported += 1;
    }

    Ok(summary)
}

fn create_or_update_property(
    graph: &mut Graph,
    datamodel: &ConnectionsDatamodel,
    node_id: &NodeId,
    prop_name: &str,
    value: &str,
    overwrite: bool,
    summary: &mut ImportSummary,
) {
    if value.trim().is_empty() {
        return;
    }
    let prop_id = NodeId::new(format!("{}_{}", node_id.as_str(), prop_name));

    if let Some(existing) = graph.node_mut(&prop_id) {
        if overwrite {
            if let NodeKind::Property { value: slot } = &mut existing.kind {
                *slot = Some(value.to_string());
            }
            existing.description = value.to_string();
        }
        return;
    }

    let mut prop_node = Node::new(prop_id.clone(), NodeKind::Property { value: Some(value.to_string()) }, prop_name);
    prop_node.description = value.to_string();
    if let Err(err) = graph.add_node(prop_node) {
        summary.warn(format!("could not create property '{prop_name}' on {node_id}: {err}"));
        return;
    }

    if !graph.has_edge_between(node_id, &prop_id, "has_property") && datamodel.edge_exists("has_property") {
        if let Err(err) = graph.add_edge(EdgeId::fresh(), node_id.clone(), prop_id, "has_property", datamodel) {
            summary.warn(format!("could not link property '{prop_name}' to {node_id}: {err}"));
        }
    }
}
