//! Structured error taxonomy for the graph engine and connections datamodel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node id already exists in graph: {0}")]
    DuplicateNodeId(String),

    #[error("edge id already exists in graph: {0}")]
    DuplicateEdgeId(String),

    #[error("edge references unknown node: {0}")]
    UnknownNode(String),

    #[error("unknown edge type: {0}")]
    UnknownEdgeType(String),

    #[error("connection {source_kind} --[{edge_type}]--> {target_kind} is not allowed by the datamodel")]
    ForbiddenConnection {
        source_kind: String,
        target_kind: String,
        edge_type: String,
    },

    #[error("graph not found in registry: {0}")]
    GraphNotFound(String),
}

#[derive(Debug, Error)]
pub enum DatamodelError {
    #[error("datamodel file not found: {0}")]
    NotFound(String),

    #[error("failed to parse datamodel json: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("failed to read datamodel file: {0}")]
    Io(#[from] std::io::Error),

    #[error("synthesized reverse name collides with an existing canonical entry: {0}")]
    DuplicateReverseName(String),
}
