//! Column-mapping document: what a tabular source's columns mean.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TableSettings {
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub start_row: usize,
    pub tutorial_row: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ColumnMapping {
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_description: bool,
    pub node_type: Option<String>,
    pub display_name: Option<String>,
    pub property_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub table_settings: TableSettings,
    pub column_mappings: HashMap<String, ColumnMapping>,
    pub stratigraphic_type: Option<String>,
}

impl MappingDocument {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The mapping column name flagged `is_id`, if any.
    pub fn id_column(&self) -> Option<&str> {
        self.column_mappings
            .iter()
            .find(|(_, cfg)| cfg.is_id)
            .map(|(name, _)| name.as_str())
    }

    pub fn description_column(&self) -> Option<&str> {
        self.column_mappings
            .iter()
            .find(|(_, cfg)| cfg.is_description)
            .map(|(name, _)| name.as_str())
    }

    /// Node kind tag for freshly created nodes: the ID column's own
    /// `node_type`, else the document-level default, else `"US"`.
    pub fn default_node_type(&self) -> String {
        if let Some(id_col) = self.id_column() {
            if let Some(node_type) = self.column_mappings.get(id_col).and_then(|c| c.node_type.clone()) {
                return node_type;
            }
        }
        self.stratigraphic_type.clone().unwrap_or_else(|| "US".to_string())
    }
}
