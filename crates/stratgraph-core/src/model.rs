//! Node and edge types for the stratigraphic knowledge graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stable, externally-meaningful node identifier (EMID when adopted from a
/// source file, otherwise a freshly minted UUID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn fresh() -> Self {
        NodeId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable edge identifier, same adoption policy as [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        EdgeId(id.into())
    }

    pub fn fresh() -> Self {
        EdgeId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stratigraphic unit subtype, mirrors the yEd shape/color classification
/// table (see `importer::graphml::classify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StratigraphicKind {
    US,
    USVs,
    USVn,
    SerSU,
    SerUSVs,
    SerUSVn,
    SF,
    VSF,
    USD,
    TSU,
    SE,
    /// Continuity marker: extends a unit's lifetime across epochs it was
    /// not directly assigned to.
    BR,
}

impl StratigraphicKind {
    pub fn tag(self) -> &'static str {
        match self {
            StratigraphicKind::US => "US",
            StratigraphicKind::USVs => "USVs",
            StratigraphicKind::USVn => "USVn",
            StratigraphicKind::SerSU => "serSU",
            StratigraphicKind::SerUSVs => "serUSVs",
            StratigraphicKind::SerUSVn => "serUSVn",
            StratigraphicKind::SF => "SF",
            StratigraphicKind::VSF => "VSF",
            StratigraphicKind::USD => "USD",
            StratigraphicKind::TSU => "TSU",
            StratigraphicKind::SE => "SE",
            StratigraphicKind::BR => "BR",
        }
    }

    /// Whether this subtype is "physical" for the purposes of epoch
    /// survival (rule 2 of epoch assignment): only plain US and serSU
    /// units accumulate `survive_in_epoch` edges.
    pub fn is_physical(self) -> bool {
        matches!(self, StratigraphicKind::US | StratigraphicKind::SerSU)
    }

    /// Parse a tag produced by [`StratigraphicKind::tag`] (case-insensitive),
    /// used to interpret `node_type` strings from tabular mapping documents.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag.to_ascii_uppercase().as_str() {
            "US" => StratigraphicKind::US,
            "USVS" => StratigraphicKind::USVs,
            "USVN" => StratigraphicKind::USVn,
            "SERSU" => StratigraphicKind::SerSU,
            "SERUSVS" => StratigraphicKind::SerUSVs,
            "SERUSVN" => StratigraphicKind::SerUSVn,
            "SF" => StratigraphicKind::SF,
            "VSF" => StratigraphicKind::VSF,
            "USD" => StratigraphicKind::USD,
            "TSU" => StratigraphicKind::TSU,
            "SE" => StratigraphicKind::SE,
            "BR" => StratigraphicKind::BR,
            _ => return None,
        })
    }
}

/// Group container subtype, derived from background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Activity,
    Paradata,
    TimeBranch,
    Generic,
}

impl GroupKind {
    pub fn tag(self) -> &'static str {
        match self {
            GroupKind::Activity => "ActivityNodeGroup",
            GroupKind::Paradata => "ParadataNodeGroup",
            GroupKind::TimeBranch => "TimeBranchNodeGroup",
            GroupKind::Generic => "GroupNode",
        }
    }
}

/// Discriminates the full node class hierarchy of the source system.
/// Associated data lives on the variant where it is meaningful; shared
/// fields (name, description, y_pos, attributes) live on [`Node`] itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Stratigraphic(StratigraphicKind),
    Document { url: Option<String> },
    Extractor,
    Combiner,
    Property { value: Option<String> },
    Group(GroupKind),
    Epoch {
        start: i64,
        end: i64,
        min_y: f64,
        max_y: f64,
        color: Option<String>,
    },
    Link { url: String },
    Author { orcid: String },
    Generic,
}

impl NodeKind {
    /// The tag used for datamodel kind matching (`allowed_connections`
    /// entries, shape-classification output).
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Stratigraphic(k) => k.tag(),
            NodeKind::Document { .. } => "DocumentNode",
            NodeKind::Extractor => "ExtractorNode",
            NodeKind::Combiner => "CombinerNode",
            NodeKind::Property { .. } => "PropertyNode",
            NodeKind::Group(g) => g.tag(),
            NodeKind::Epoch { .. } => "EpochNode",
            NodeKind::Link { .. } => "LinkNode",
            NodeKind::Author { .. } => "AuthorNode",
            NodeKind::Generic => "GenericNode",
        }
    }

    /// Broader parent tags this kind also satisfies, for datamodel entries
    /// written against a parent class (e.g. `"StratigraphicNode"` rather
    /// than a specific subtype).
    pub fn parent_tags(&self) -> Vec<&'static str> {
        match self {
            NodeKind::Stratigraphic(_) => vec!["StratigraphicNode"],
            NodeKind::Document { .. }
            | NodeKind::Extractor
            | NodeKind::Combiner
            | NodeKind::Property { .. } => vec!["ParadataNode"],
            NodeKind::Group(_) => vec!["GroupNode"],
            _ => vec![],
        }
    }

    /// All tags (specific + parents) this node kind matches against, used
    /// by datamodel validation.
    pub fn matches(&self, wanted: &str) -> bool {
        if self.tag() == wanted {
            return true;
        }
        self.parent_tags().contains(&wanted)
    }
}

/// A single node in a stratigraphic graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    /// Vertical position on the source diagram; smaller y = more recent.
    /// Absent for nodes with no diagram geometry (e.g. tabular imports).
    pub y_pos: Option<f64>,
    pub fill_color: Option<String>,
    pub border_style: Option<String>,
    pub shape: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, name: impl Into<String>) -> Self {
        Node {
            id,
            kind,
            name: name.into(),
            description: String::new(),
            y_pos: None,
            fill_color: None,
            border_style: None,
            shape: None,
            attributes: HashMap::new(),
        }
    }
}

/// A directed, typed edge. `edge_type` is a name drawn from the connections
/// datamodel (canonical or synthesized reverse); `label`/`description` are
/// cached at construction time from that datamodel entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: String,
    pub label: String,
    pub description: String,
}
