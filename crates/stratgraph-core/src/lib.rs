//! Stratgraph Core — node/edge model, connections datamodel, and graph engine
//! for stratigraphic knowledge graphs.

pub mod connections;
pub mod error;
pub mod graph;
pub mod model;
pub mod utils;

pub use connections::ConnectionsDatamodel;
pub use error::{DatamodelError, GraphError};
pub use graph::{Graph, MultiGraphRegistry};
pub use model::{Edge, EdgeId, GroupKind, Node, NodeId, NodeKind, StratigraphicKind};
