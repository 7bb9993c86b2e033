//! Importers that turn external sources (GraphML diagrams, tabular data)
//! into [`stratgraph_core::Graph`] instances.

pub mod error;
pub mod graphml;
pub mod paradata;
pub mod registry;
pub mod tabular;
pub mod xml;

pub use error::{ImportError, ImportSummary};
pub use graphml::GraphmlImporter;
pub use registry::{MappingRegistry, Priority};
