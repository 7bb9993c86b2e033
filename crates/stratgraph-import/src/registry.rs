//! Process-wide registry of mapping-document search paths, partitioned by
//! mapping type (`pyarchinit`, `emdb`, `generic`, or any caller-defined
//! type).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::tabular::mapping::MappingDocument;

pub enum Priority {
    High,
    Low,
}

/// Per-type ordered list of directories to search, in priority order.
#[derive(Default)]
pub struct MappingRegistry {
    directories: HashMap<String, Vec<PathBuf>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory to search for a mapping type. High priority
    /// directories are searched before any already registered; low priority
    /// after. Fails if the directory does not exist.
    pub fn add_directory(&mut self, mapping_type: impl Into<String>, dir: &Path, priority: Priority) -> std::io::Result<()> {
        if !dir.exists() {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, format!("mapping directory does not exist: {}", dir.display())));
        }
        let entry = self.directories.entry(mapping_type.into()).or_default();
        match priority {
            Priority::High => entry.insert(0, dir.to_path_buf()),
            Priority::Low => entry.push(dir.to_path_buf()),
        }
        Ok(())
    }

    pub fn directories(&self, mapping_type: &str) -> &[PathBuf] {
        self.directories.get(mapping_type).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First matching mapping file path for `name` under `mapping_type`,
    /// appending `.json` if the name doesn't already carry it.
    pub fn find(&self, name: &str, mapping_type: &str) -> Option<PathBuf> {
        let filename = if name.ends_with(".json") { name.to_string() } else { format!("{name}.json") };
        self.directories(mapping_type).iter().map(|dir| dir.join(&filename)).find(|p| p.exists())
    }

    /// Load and parse a mapping document. Returns `None` (with a logged
    /// warning) on a missing file or parse error rather than failing the
    /// caller's import.
    pub fn load(&self, name: &str, mapping_type: &str) -> Option<MappingDocument> {
        let path = self.find(name, mapping_type)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => match MappingDocument::parse(&text) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    tracing::warn!("failed to parse mapping {}: {err}", path.display());
                    None
                }
            },
            Err(err) => {
                tracing::warn!("failed to read mapping {}: {err}", path.display());
                None
            }
        }
    }

    /// All available mappings for a type, deduplicated by filename across
    /// directories (first directory in search order wins).
    pub fn list(&self, mapping_type: &str) -> Vec<(String, String, String)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for dir in self.directories(mapping_type) {
            let Ok(entries) = std::fs::read_dir(dir) else { continue };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(filename) = path.file_name().and_then(|f| f.to_str()) else { continue };
                if !filename.ends_with(".json") || !seen.insert(filename.to_string()) {
                    continue;
                }
                let file_id = filename.trim_end_matches(".json").to_string();
                let (display_name, description) = match std::fs::read_to_string(&path) {
                    Ok(text) => {
                        let value: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
                        let name = value.get("name").and_then(|v| v.as_str()).unwrap_or(&file_id).to_string();
                        let desc = value.get("description").and_then(|v| v.as_str()).unwrap_or("").to_string();
                        (name, desc)
                    }
                    Err(_) => (file_id.clone(), String::new()),
                };
                out.push((file_id, display_name, description));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_priority_searched_first() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        std::fs::write(dir_a.path().join("generic.json"), r#"{"column_mappings":{}}"#).unwrap();
        std::fs::write(dir_b.path().join("generic.json"), r#"{"column_mappings":{"x":{}}}"#).unwrap();

        let mut registry = MappingRegistry::new();
        registry.add_directory("generic", dir_a.path(), Priority::Low).unwrap();
        registry.add_directory("generic", dir_b.path(), Priority::High).unwrap();

        let found = registry.find("generic", "generic").unwrap();
        assert_eq!(found, dir_b.path().join("generic.json"));
    }

    #[test]
    fn missing_directory_is_error() {
        let mut registry = MappingRegistry::new();
        let result = registry.add_directory("generic", std::path::Path::new("/does/not/exist"), Priority::High);
        assert!(result.is_err());
    }

    #[test]
    fn load_returns_none_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
        let mut registry = MappingRegistry::new();
        registry.add_directory("generic", dir.path(), Priority::High).unwrap();
        assert!(registry.load("broken", "generic").is_none());
    }
}
