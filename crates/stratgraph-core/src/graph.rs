//! Graph engine: owns nodes and edges, enforces insertion invariants.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::connections::ConnectionsDatamodel;
use crate::error::GraphError;
use crate::model::{Edge, EdgeId, Node, NodeId};

/// A stratigraphic knowledge graph: a directed multigraph over [`Node`] and
/// [`Edge`], indexed by stable string identifiers rather than petgraph's
/// own indices (which are not meaningful once a node is removed and do not
/// round-trip through an external file the way EMIDs must).
pub struct Graph {
    pub id: String,
    pub code: Option<String>,
    pub description: String,
    pub embargo: Option<chrono::NaiveDate>,
    pub license: Option<String>,
    inner: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    name_index: HashMap<String, Vec<NodeId>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Graph {
            id: id.into(),
            code: None,
            description: String::new(),
            embargo: None,
            license: None,
            inner: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            name_index: HashMap::new(),
        }
    }

    /// Insert a node. Fails with `DuplicateNodeId` if the id already exists
    /// in this graph (I1).
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id.to_string()));
        }
        let id = node.id.clone();
        let name = node.name.clone();
        let idx = self.inner.add_node(node);
        self.node_index.insert(id.clone(), idx);
        self.name_index.entry(name).or_default().push(id.clone());
        Ok(id)
    }

    /// Insert an edge, validating endpoints (I3), edge type (against the
    /// datamodel), and kind-compatibility (I4). Fails with `DuplicateEdgeId`
    /// if the id already exists (I2).
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        datamodel: &ConnectionsDatamodel,
    ) -> Result<EdgeId, GraphError> {
        if self.edge_index.contains_key(&id) {
            return Err(GraphError::DuplicateEdgeId(id.to_string()));
        }
        let source_idx = *self
            .node_index
            .get(&source)
            .ok_or_else(|| GraphError::UnknownNode(source.to_string()))?;
        let target_idx = *self
            .node_index
            .get(&target)
            .ok_or_else(|| GraphError::UnknownNode(target.to_string()))?;

        if !datamodel.edge_exists(edge_type) {
            return Err(GraphError::UnknownEdgeType(edge_type.to_string()));
        }

        let source_kind = self.inner[source_idx].kind.tag();
        let target_kind = self.inner[target_idx].kind.tag();
        let source_tags = self.inner[source_idx].kind.parent_tags();
        let target_tags = self.inner[target_idx].kind.parent_tags();

        let allowed_sources = datamodel.allowed_sources(edge_type);
        let allowed_targets = datamodel.allowed_targets(edge_type);
        let source_ok = allowed_sources.iter().any(|s| s == source_kind || source_tags.contains(&s.as_str()));
        let target_ok = allowed_targets.iter().any(|t| t == target_kind || target_tags.contains(&t.as_str()));

        if !source_ok || !target_ok {
            return Err(GraphError::ForbiddenConnection {
                source_kind: source_kind.to_string(),
                target_kind: target_kind.to_string(),
                edge_type: edge_type.to_string(),
            });
        }

        let edge = Edge {
            id: id.clone(),
            source,
            target,
            edge_type: edge_type.to_string(),
            label: datamodel.label(edge_type),
            description: datamodel.description(edge_type),
        };
        let eidx = self.inner.add_edge(source_idx, target_idx, edge);
        self.edge_index.insert(id.clone(), eidx);
        Ok(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if let Some(&idx) = self.node_index.get(id) {
            self.inner.node_weight_mut(idx)
        } else {
            None
        }
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_index.get(id).and_then(|&idx| self.inner.edge_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_indices().filter_map(move |idx| self.inner.node_weight(idx))
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner.edge_indices().filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// All nodes sharing a name (used by import-time dedup and
    /// enrichment-by-name).
    pub fn find_nodes_by_name(&self, name: &str) -> Vec<&Node> {
        self.name_index
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.node(id)).collect())
            .unwrap_or_default()
    }

    /// First node with a given name, if any.
    pub fn find_node_by_name(&self, name: &str) -> Option<&Node> {
        self.find_nodes_by_name(name).into_iter().next()
    }

    pub fn edges_from(&self, source: &NodeId) -> impl Iterator<Item = &Edge> {
        let idx = self.node_index.get(source).copied();
        idx.into_iter()
            .flat_map(move |idx| self.inner.edges_directed(idx, Direction::Outgoing))
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    pub fn edges_to(&self, target: &NodeId) -> impl Iterator<Item = &Edge> {
        let idx = self.node_index.get(target).copied();
        idx.into_iter()
            .flat_map(move |idx| self.inner.edges_directed(idx, Direction::Incoming))
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, edge_type: &str) -> bool {
        self.edges_from(source).any(|e| &e.target == target && e.edge_type == edge_type)
    }

    pub fn nodes_of_kind_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.all_nodes().filter(move |n| n.kind.matches(tag))
    }

    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let idx = self.node_index.remove(id)?;
        let node = self.inner.remove_node(idx)?;
        if let Some(v) = self.name_index.get_mut(&node.name) {
            v.retain(|n| n != id);
        }
        Some(node)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let idx = self.edge_index.remove(id)?;
        self.inner.remove_edge(idx)
    }
}

/// Process-wide container of named graphs.
#[derive(Default)]
pub struct MultiGraphRegistry {
    graphs: dashmap::DashMap<String, Arc<std::sync::RwLock<Graph>>>,
}

impl MultiGraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly built or loaded graph under its own id.
    pub fn load(&self, graph: Graph) -> Arc<std::sync::RwLock<Graph>> {
        let handle = Arc::new(std::sync::RwLock::new(graph));
        let id = handle.read().expect("graph lock poisoned").id.clone();
        self.graphs.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Option<Arc<std::sync::RwLock<Graph>>> {
        self.graphs.get(id).map(|r| r.value().clone())
    }

    pub fn remove(&self, id: &str) -> Result<(), GraphError> {
        self.graphs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GraphError::GraphNotFound(id.to_string()))
    }

    pub fn ids(&self) -> Vec<String> {
        self.graphs.iter().map(|r| r.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, StratigraphicKind};

    fn datamodel() -> ConnectionsDatamodel {
        let json = r#"{
            "edge_types": {
                "is_after": {
                    "name": "is_after", "label": "is after",
                    "allowed_connections": {
                        "source": ["StratigraphicNode"],
                        "target": ["StratigraphicNode"]
                    },
                    "reverse": { "name": "is_before", "label": "is before" }
                }
            }
        }"#;
        ConnectionsDatamodel::from_json_str(json).unwrap()
    }

    #[test]
    fn add_node_and_edge_happy_path() {
        let dm = datamodel();
        let mut g = Graph::new("test-graph");
        let a = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US001");
        let b = Node::new(NodeId::new("b"), NodeKind::Stratigraphic(StratigraphicKind::US), "US002");
        g.add_node(a).unwrap();
        g.add_node(b).unwrap();
        g.add_edge(EdgeId::new("e1"), NodeId::new("a"), NodeId::new("b"), "is_after", &dm)
            .unwrap();
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge_between(&NodeId::new("a"), &NodeId::new("b"), "is_after"));
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let mut g = Graph::new("test-graph");
        let a = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US001");
        let a2 = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US001-dup");
        g.add_node(a).unwrap();
        assert!(matches!(g.add_node(a2), Err(GraphError::DuplicateNodeId(_))));
    }

    #[test]
    fn edge_with_unknown_node_rejected() {
        let dm = datamodel();
        let mut g = Graph::new("test-graph");
        let a = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US001");
        g.add_node(a).unwrap();
        let result = g.add_edge(EdgeId::new("e1"), NodeId::new("a"), NodeId::new("missing"), "is_after", &dm);
        assert!(matches!(result, Err(GraphError::UnknownNode(_))));
    }

    #[test]
    fn edge_kind_mismatch_rejected() {
        let dm = datamodel();
        let mut g = Graph::new("test-graph");
        let a = Node::new(NodeId::new("a"), NodeKind::Stratigraphic(StratigraphicKind::US), "US001");
        let doc = Node::new(NodeId::new("d"), NodeKind::Document { url: None }, "Report");
        g.add_node(a).unwrap();
        g.add_node(doc).unwrap();
        let result = g.add_edge(EdgeId::new("e1"), NodeId::new("a"), NodeId::new("d"), "is_after", &dm);
        assert!(matches!(result, Err(GraphError::ForbiddenConnection { .. })));
    }

    #[test]
    fn find_by_name_after_dedup_style_insert() {
        let mut g = Graph::new("test-graph");
        let doc = Node::new(NodeId::new("d1"), NodeKind::Document { url: None }, "Report-42");
        g.add_node(doc).unwrap();
        assert!(g.find_node_by_name("Report-42").is_some());
        assert!(g.find_node_by_name("does-not-exist").is_none());
    }

    #[test]
    fn registry_load_get_remove() {
        let registry = MultiGraphRegistry::new();
        let g = Graph::new("site-a");
        registry.load(g);
        assert!(registry.get("site-a").is_some());
        registry.remove("site-a").unwrap();
        assert!(registry.get("site-a").is_none());
        assert!(matches!(registry.remove("site-a"), Err(GraphError::GraphNotFound(_))));
    }
}
