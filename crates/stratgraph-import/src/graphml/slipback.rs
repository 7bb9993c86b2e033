//! Writes adopted node/edge identifiers back into the source GraphML file
//! so subsequent imports of the same file are stable. Idempotent: running
//! slipback twice against an already-slipped file produces the same
//! output, since the adoption policy (EMID present -> reuse it) means a
//! second parse recovers the same ids.

use std::collections::HashMap;

use stratgraph_core::NodeId;

use crate::graphml::keys::{next_free_key_id, KeyMap};
use crate::xml::XmlElement;

/// Ensure `EMID` keys exist for both node and edge scopes, and a `URI` key
/// exists for nodes. Inserts `<key>` declarations at document order if
/// absent, using the next free `d<N>` id, and updates `key_map` in place.
pub fn ensure_custom_keys(root: &mut XmlElement, key_map: &mut KeyMap) {
    ensure_key(root, key_map, "node", "EMID");
    ensure_key(root, key_map, "node", "URI");
    ensure_key(root, key_map, "edge", "EMID");
    ensure_key(root, key_map, "edge", "original_edge_id");
}

fn ensure_key(root: &mut XmlElement, key_map: &mut KeyMap, scope: &str, attr_name: &str) {
    let already_present = match scope {
        "node" => key_map.node.contains_key(attr_name),
        "edge" => key_map.edge.contains_key(attr_name),
        _ => false,
    };
    if already_present {
        return;
    }
    let id = next_free_key_id(root);
    let key_elem = XmlElement {
        tag: "key".to_string(),
        attrs: vec![
            ("id".to_string(), id.clone()),
            ("for".to_string(), scope.to_string()),
            ("attr.name".to_string(), attr_name.to_string()),
            ("attr.type".to_string(), "string".to_string()),
        ],
        children: Vec::new(),
    };
    // <key> elements are direct children of the document root, preceding <graph>.
    let insert_at = root
        .children
        .iter()
        .position(|c| matches!(c, crate::xml::XmlNode::Element(e) if e.local_name() == "graph"))
        .unwrap_or(root.children.len());
    root.children.insert(insert_at, crate::xml::XmlNode::Element(key_elem));

    match scope {
        "node" => {
            key_map.node.insert(attr_name.to_string(), id);
        }
        "edge" => {
            key_map.edge.insert(attr_name.to_string(), id);
        }
        _ => {}
    }
}

fn for_each_element_mut(elem: &mut XmlElement, f: &mut dyn FnMut(&mut XmlElement)) {
    f(elem);
    for child in elem.child_elements_mut() {
        for_each_element_mut(child, f);
    }
}

fn set_or_insert_data(elem: &mut XmlElement, key_id: &str, value: &str) {
    if let Some(data) = elem
        .children
        .iter_mut()
        .filter_map(|c| match c {
            crate::xml::XmlNode::Element(e) if e.local_name() == "data" && e.attr("key") == Some(key_id) => Some(e),
            _ => None,
        })
        .next()
    {
        data.set_text(value.to_string());
        return;
    }
    let mut data_elem = XmlElement {
        tag: "data".to_string(),
        attrs: vec![("key".to_string(), key_id.to_string())],
        children: Vec::new(),
    };
    data_elem.set_text(value.to_string());
    elem.children.push(crate::xml::XmlNode::Element(data_elem));
}

/// Write adopted node ids (and URIs, where known) back into every `<node>`
/// element whose raw id appears in `node_remap`.
pub fn slip_nodes(root: &mut XmlElement, key_map: &KeyMap, node_remap: &HashMap<String, NodeId>, node_uris: &HashMap<String, String>) {
    let emid_key = key_map.node.get("EMID").cloned();
    let uri_key = key_map.node.get("URI").cloned();
    for_each_element_mut(root, &mut |elem| {
        if elem.local_name() != "node" {
            return;
        }
        let Some(raw_id) = elem.attr("id").map(|s| s.to_string()) else {
            return;
        };
        let Some(adopted) = node_remap.get(&raw_id) else {
            return;
        };
        if let Some(key_id) = &emid_key {
            set_or_insert_data(elem, key_id, adopted.as_str());
        }
        if let Some(key_id) = &uri_key {
            if let Some(uri) = node_uris.get(&raw_id) {
                set_or_insert_data(elem, key_id, uri);
            }
        }
    });
}

/// Write adopted edge ids back into every `<edge>` element whose raw id
/// appears in `edge_remap`, also recording the original raw id so repeated
/// imports can re-derive the mapping.
pub fn slip_edges(root: &mut XmlElement, key_map: &KeyMap, edge_remap: &HashMap<String, stratgraph_core::EdgeId>) {
    let emid_key = key_map.edge.get("EMID").cloned();
    let original_id_key = key_map.edge.get("original_edge_id").cloned();
    for_each_element_mut(root, &mut |elem| {
        if elem.local_name() != "edge" {
            return;
        }
        let Some(raw_id) = elem.attr("id").map(|s| s.to_string()) else {
            return;
        };
        let Some(adopted) = edge_remap.get(&raw_id) else {
            return;
        };
        if let Some(key_id) = &emid_key {
            set_or_insert_data(elem, key_id, adopted.as_str());
        }
        if let Some(key_id) = &original_id_key {
            set_or_insert_data(elem, key_id, &raw_id);
        }
    });
}
