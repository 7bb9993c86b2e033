//! Import-specific error taxonomy. Structural errors abort the import;
//! per-row/per-edge errors are collected into an [`ImportSummary`] instead.

use thiserror::Error;

use stratgraph_core::GraphError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source not found: {0}")]
    NotFound(String),

    #[error("failed to parse source document: {0}")]
    ParseError(String),

    #[error("mapping document is missing required fields: {0}")]
    SchemaError(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Summary returned by every importer: what happened, and why anything was
/// skipped. Never fatal on its own — callers decide how to surface it.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub rows_total: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub rows_failed: usize,
    pub columns_matched: usize,
    pub columns_unmatched: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportSummary {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}
