//! Dynamic `<key>` discovery, so custom fields (EMID, URI) can be located
//! regardless of how the source file numbers its key ids.

use std::collections::HashMap;

use crate::xml::XmlElement;

#[derive(Debug, Default)]
pub struct KeyMap {
    /// attr.name -> key id, scoped to `for="node"`.
    pub node: HashMap<String, String>,
    /// attr.name -> key id, scoped to `for="edge"`.
    pub edge: HashMap<String, String>,
    /// attr.name -> key id, scoped to `for="graph"`.
    pub graph: HashMap<String, String>,
}

impl KeyMap {
    pub fn build(root: &XmlElement) -> Self {
        let mut map = KeyMap::default();
        for key in root.find_children("key") {
            let Some(id) = key.attr("id") else { continue };
            let Some(attr_name) = key.attr("attr.name") else { continue };
            match key.attr("for") {
                Some("node") => {
                    map.node.insert(attr_name.to_string(), id.to_string());
                }
                Some("edge") => {
                    map.edge.insert(attr_name.to_string(), id.to_string());
                }
                Some("graph") => {
                    map.graph.insert(attr_name.to_string(), id.to_string());
                }
                _ => {}
            }
        }
        map
    }

    pub fn node_key(&self, attr_name: &str) -> Option<&str> {
        self.node.get(attr_name).map(|s| s.as_str())
    }

    pub fn edge_key(&self, attr_name: &str) -> Option<&str> {
        self.edge.get(attr_name).map(|s| s.as_str())
    }
}

/// Look up the text of a `<data key="...">` child whose key id matches
/// `key_id`, if any.
pub fn data_value(elem: &XmlElement, key_id: &str) -> Option<String> {
    elem.find_children("data")
        .find(|d| d.attr("key") == Some(key_id))
        .map(|d| d.text())
}

/// Next unused `d<N>` key id in the document, for inserting a fresh
/// `<key>` declaration during slipback.
pub fn next_free_key_id(root: &XmlElement) -> String {
    let mut max_seen = -1i64;
    for key in root.find_children("key") {
        if let Some(id) = key.attr("id") {
            if let Some(num) = id.strip_prefix('d').and_then(|n| n.parse::<i64>().ok()) {
                max_seen = max_seen.max(num);
            }
        }
    }
    format!("d{}", max_seen + 1)
}
