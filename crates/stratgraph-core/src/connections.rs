//! Connections datamodel: canonical/reverse edge type catalog.
//!
//! Loads a JSON catalog of edge types and expands it in two passes so that
//! both the canonical name and its synthesized reverse resolve in O(1):
//! pass one copies canonical entries as declared, pass two synthesizes a
//! reverse entry (inverted `allowed_connections`, "Reverse of …" prefixed
//! description) for every canonical entry that declares one.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::DatamodelError;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AllowedConnections {
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub target: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReverseDef {
    name: String,
    label: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEdgeDef {
    name: String,
    label: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    mapping: serde_json::Value,
    allowed_connections: AllowedConnections,
    #[serde(default)]
    reverse: Option<RawReverseDef>,
}

#[derive(Debug, Deserialize)]
struct RawDatamodel {
    #[serde(rename = "s3Dgraphy_connections_model_version", default)]
    version: Option<String>,
    #[serde(default)]
    edge_types: HashMap<String, RawEdgeDef>,
}

/// A fully expanded edge type record — either the canonical entry as
/// declared, or a reverse entry synthesized from one.
#[derive(Debug, Clone)]
pub struct EdgeDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    pub mapping: serde_json::Value,
    pub allowed_connections: AllowedConnections,
    pub is_canonical: bool,
    pub is_symmetric: bool,
    pub canonical_name: Option<String>,
    pub reverse_name: Option<String>,
}

/// Input/output socket labels for a node editor, keyed by edge name.
#[derive(Debug, Clone, Default)]
pub struct SocketLabels {
    pub inputs: Vec<(String, String)>,
    pub outputs: Vec<(String, String)>,
}

/// Manages edge type definitions and connection rules.
#[derive(Debug)]
pub struct ConnectionsDatamodel {
    version: String,
    canonical_names: Vec<String>,
    expanded: HashMap<String, EdgeDefinition>,
}

impl ConnectionsDatamodel {
    /// Load and expand a connections datamodel from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DatamodelError> {
        if !path.exists() {
            return Err(DatamodelError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and expand a connections datamodel from an in-memory JSON
    /// document (used by tests and by callers embedding the datamodel).
    pub fn from_json_str(text: &str) -> Result<Self, DatamodelError> {
        let raw: RawDatamodel = serde_json::from_str(text)?;
        let mut expanded = HashMap::with_capacity(raw.edge_types.len() * 2);
        let mut canonical_names: Vec<String> = raw.edge_types.keys().cloned().collect();
        canonical_names.sort();
        let canonical_set: std::collections::HashSet<&str> =
            canonical_names.iter().map(|s| s.as_str()).collect();
        let mut reverse_names_seen = std::collections::HashSet::new();

        for edge_name in &canonical_names {
            let def = &raw.edge_types[edge_name];
            let reverse_name = def.reverse.as_ref().map(|r| r.name.clone());
            expanded.insert(
                edge_name.clone(),
                EdgeDefinition {
                    name: def.name.clone(),
                    label: def.label.clone(),
                    description: def.description.clone(),
                    mapping: def.mapping.clone(),
                    allowed_connections: def.allowed_connections.clone(),
                    is_canonical: true,
                    is_symmetric: def.reverse.is_none(),
                    canonical_name: None,
                    reverse_name,
                },
            );

            if let Some(reverse) = &def.reverse {
                if canonical_set.contains(reverse.name.as_str())
                    || !reverse_names_seen.insert(reverse.name.clone())
                {
                    return Err(DatamodelError::DuplicateReverseName(reverse.name.clone()));
                }
                expanded.insert(
                    reverse.name.clone(),
                    EdgeDefinition {
                        name: reverse.name.clone(),
                        label: reverse.label.clone(),
                        description: format!(
                            "Reverse of {}: {}",
                            def.label, def.description
                        ),
                        mapping: def.mapping.clone(),
                        allowed_connections: AllowedConnections {
                            source: def.allowed_connections.target.clone(),
                            target: def.allowed_connections.source.clone(),
                        },
                        is_canonical: false,
                        is_symmetric: false,
                        canonical_name: Some(edge_name.clone()),
                        reverse_name: None,
                    },
                );
            }
        }

        Ok(ConnectionsDatamodel {
            version: raw.version.unwrap_or_else(|| "unknown".to_string()),
            canonical_names,
            expanded,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, edge_name: &str) -> Option<&EdgeDefinition> {
        self.expanded.get(edge_name)
    }

    pub fn label(&self, edge_name: &str) -> String {
        self.get(edge_name)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| edge_name.to_string())
    }

    pub fn description(&self, edge_name: &str) -> String {
        self.get(edge_name).map(|d| d.description.clone()).unwrap_or_default()
    }

    pub fn is_symmetric(&self, edge_name: &str) -> bool {
        self.get(edge_name).map(|d| d.is_symmetric).unwrap_or(false)
    }

    pub fn is_canonical(&self, edge_name: &str) -> bool {
        self.get(edge_name).map(|d| d.is_canonical).unwrap_or(false)
    }

    /// The reverse name of a canonical edge, or the canonical name of a
    /// reverse edge. `None` if symmetric or unknown.
    pub fn reverse_of(&self, edge_name: &str) -> Option<String> {
        let def = self.get(edge_name)?;
        if def.is_symmetric {
            return None;
        }
        if def.is_canonical {
            def.reverse_name.clone()
        } else {
            def.canonical_name.clone()
        }
    }

    pub fn validate(&self, source_kind: &str, target_kind: &str, edge_name: &str) -> bool {
        let Some(def) = self.get(edge_name) else {
            return false;
        };
        def.allowed_connections.source.iter().any(|s| s == source_kind)
            && def.allowed_connections.target.iter().any(|t| t == target_kind)
    }

    pub fn allowed_sources(&self, edge_name: &str) -> Vec<String> {
        self.get(edge_name)
            .map(|d| d.allowed_connections.source.clone())
            .unwrap_or_default()
    }

    pub fn allowed_targets(&self, edge_name: &str) -> Vec<String> {
        self.get(edge_name)
            .map(|d| d.allowed_connections.target.clone())
            .unwrap_or_default()
    }

    pub fn all_edge_names(&self, canonical_only: bool) -> Vec<String> {
        if canonical_only {
            self.canonical_names.clone()
        } else {
            self.expanded.keys().cloned().collect()
        }
    }

    /// Input/output socket labels for a node editor, grouped by whether
    /// this node kind can be a source (output) or target (input).
    pub fn socket_labels(&self, node_type: &str) -> SocketLabels {
        let mut labels = SocketLabels::default();
        for edge_name in &self.canonical_names {
            let Some(def) = self.expanded.get(edge_name) else {
                continue;
            };
            if def.allowed_connections.source.iter().any(|s| s == node_type) {
                labels.outputs.push((edge_name.clone(), def.label.clone()));
            }
            if def.allowed_connections.target.iter().any(|t| t == node_type) {
                if def.is_symmetric {
                    labels.inputs.push((edge_name.clone(), def.label.clone()));
                } else if let Some(reverse_name) = &def.reverse_name {
                    let reverse_label = self
                        .expanded
                        .get(reverse_name)
                        .map(|r| r.label.clone())
                        .unwrap_or_else(|| reverse_name.clone());
                    labels.inputs.push((reverse_name.clone(), reverse_label));
                }
            }
        }
        labels
    }

    pub fn edge_exists(&self, edge_name: &str) -> bool {
        self.expanded.contains_key(edge_name)
    }

    /// Normalize an edge name to its canonical form, or preserve direction
    /// if `prefer_canonical` is false. `None` if the edge name is unknown.
    pub fn normalize(&self, edge_name: &str, prefer_canonical: bool) -> Option<String> {
        let def = self.get(edge_name)?;
        if prefer_canonical && !def.is_canonical {
            def.canonical_name.clone()
        } else {
            Some(edge_name.to_string())
        }
    }
}

static GLOBAL_DATAMODEL: OnceLock<RwLock<Arc<ConnectionsDatamodel>>> = OnceLock::new();

/// Get the process-wide datamodel, loading it from `path` on first access.
/// Subsequent calls ignore `path` and return the already-loaded instance.
pub fn global(path: &Path) -> Result<Arc<ConnectionsDatamodel>, DatamodelError> {
    if let Some(lock) = GLOBAL_DATAMODEL.get() {
        return Ok(lock.read().expect("connections datamodel lock poisoned").clone());
    }
    let loaded = Arc::new(ConnectionsDatamodel::load(path)?);
    let _ = GLOBAL_DATAMODEL.set(RwLock::new(loaded.clone()));
    Ok(loaded)
}

/// Force a reload of the process-wide datamodel. Replaces the shared `Arc`
/// atomically; references obtained from a prior [`global`] call remain
/// valid and keep observing the old datamodel.
pub fn reload(path: &Path) -> Result<Arc<ConnectionsDatamodel>, DatamodelError> {
    let loaded = Arc::new(ConnectionsDatamodel::load(path)?);
    match GLOBAL_DATAMODEL.get() {
        Some(lock) => {
            *lock.write().expect("connections datamodel lock poisoned") = loaded.clone();
        }
        None => {
            let _ = GLOBAL_DATAMODEL.set(RwLock::new(loaded.clone()));
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "s3Dgraphy_connections_model_version": "1.5.3",
            "edge_types": {
                "is_after": {
                    "name": "is_after",
                    "label": "is after",
                    "description": "stratigraphic sequence",
                    "allowed_connections": {
                        "source": ["StratigraphicNode"],
                        "target": ["StratigraphicNode"]
                    },
                    "reverse": { "name": "is_before", "label": "is before" }
                },
                "has_same_time": {
                    "name": "has_same_time",
                    "label": "has same time",
                    "allowed_connections": {
                        "source": ["StratigraphicNode"],
                        "target": ["StratigraphicNode"]
                    }
                }
            }
        }"#
    }

    #[test]
    fn canonical_reverse_round_trip() {
        let dm = ConnectionsDatamodel::from_json_str(sample_json()).unwrap();
        assert_eq!(dm.reverse_of("is_after").as_deref(), Some("is_before"));
        assert_eq!(dm.reverse_of("is_before").as_deref(), Some("is_after"));
        assert_eq!(dm.reverse_of("has_same_time"), None);
        assert!(dm.is_symmetric("has_same_time"));
        assert!(!dm.is_symmetric("is_after"));
        assert!(dm.is_canonical("is_after"));
        assert!(!dm.is_canonical("is_before"));
    }

    #[test]
    fn reverse_inverts_allowed_connections() {
        let dm = ConnectionsDatamodel::from_json_str(sample_json()).unwrap();
        assert_eq!(dm.allowed_sources("is_after"), dm.allowed_targets("is_before"));
        assert_eq!(dm.allowed_targets("is_after"), dm.allowed_sources("is_before"));
    }

    #[test]
    fn validate_connection() {
        let dm = ConnectionsDatamodel::from_json_str(sample_json()).unwrap();
        assert!(dm.validate("StratigraphicNode", "StratigraphicNode", "is_after"));
        assert!(!dm.validate("DocumentNode", "StratigraphicNode", "is_after"));
        assert!(!dm.validate("StratigraphicNode", "StratigraphicNode", "no_such_edge"));
    }

    #[test]
    fn duplicate_reverse_name_rejected() {
        let json = r#"{
            "edge_types": {
                "is_before": {
                    "name": "is_before", "label": "x",
                    "allowed_connections": { "source": [], "target": [] }
                },
                "is_after": {
                    "name": "is_after", "label": "y",
                    "allowed_connections": { "source": [], "target": [] },
                    "reverse": { "name": "is_before", "label": "z" }
                }
            }
        }"#;
        let err = ConnectionsDatamodel::from_json_str(json).unwrap_err();
        assert!(matches!(err, DatamodelError::DuplicateReverseName(_)));
    }
}
