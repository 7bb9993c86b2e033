//! Naming helpers shared across the graph engine and importers.

/// Add or remove a graph-code prefix from an element name.
///
/// Useful for keeping names unique when multiple graphs are combined, or
/// when mapping to external systems with unique-name constraints (3D
/// object names, database keys, filesystem paths).
///
/// `action = "add"` replaces any existing prefix with `graph_code`;
/// `action = "remove"` strips whatever prefix (if any) is present,
/// ignoring `graph_code`. Empty names pass through unchanged.
///
/// ```
/// use stratgraph_core::utils::manage_id_prefix;
/// assert_eq!(manage_id_prefix("US001", Some("VDL16"), "add", "."), "VDL16.US001");
/// assert_eq!(manage_id_prefix("VDL16.US001", Some("VDL16"), "remove", "."), "US001");
/// assert_eq!(manage_id_prefix("GT15.US001", None, "remove", "."), "US001");
/// ```
pub fn manage_id_prefix(name: &str, graph_code: Option<&str>, action: &str, separator: &str) -> String {
    assert!(
        action == "add" || action == "remove",
        "invalid action '{action}', must be 'add' or 'remove'"
    );

    if name.trim().is_empty() {
        return name.to_string();
    }

    if action == "remove" {
        return match name.split_once(separator) {
            Some((_, rest)) => rest.to_string(),
            None => name.to_string(),
        };
    }

    // action == "add"
    let Some(graph_code) = graph_code.filter(|c| !c.trim().is_empty()) else {
        return name.to_string();
    };

    let base = if name.contains(separator) {
        manage_id_prefix(name, None, "remove", separator)
    } else {
        name.to_string()
    };
    format!("{graph_code}{separator}{base}")
}

/// Extract the base name, stripping any existing graph-code prefix.
pub fn get_base_name(name: &str, separator: &str) -> String {
    manage_id_prefix(name, None, "remove", separator)
}

/// Add a graph-code prefix to a name.
pub fn add_graph_prefix(name: &str, graph_code: &str, separator: &str) -> String {
    manage_id_prefix(name, Some(graph_code), "add", separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_prefix_to_bare_name() {
        assert_eq!(manage_id_prefix("US001", Some("VDL16"), "add", "."), "VDL16.US001");
    }

    #[test]
    fn add_replaces_existing_prefix() {
        assert_eq!(manage_id_prefix("GT15.US001", Some("VDL16"), "add", "."), "VDL16.US001");
    }

    #[test]
    fn remove_with_no_graph_code() {
        assert_eq!(manage_id_prefix("GT15.US001", None, "remove", "."), "US001");
    }

    #[test]
    fn remove_with_no_existing_prefix_is_noop() {
        assert_eq!(manage_id_prefix("US001", None, "remove", "."), "US001");
    }

    #[test]
    fn add_with_no_graph_code_is_noop() {
        assert_eq!(manage_id_prefix("US001", None, "add", "."), "US001");
    }

    #[test]
    fn empty_name_passes_through() {
        assert_eq!(manage_id_prefix("", Some("VDL16"), "add", "."), "");
    }

    #[test]
    fn round_trip_law() {
        for (name, code) in [("US001", "VDL16"), ("GT15.US001", "VDL16"), ("US042", "X")] {
            let base = get_base_name(name, ".");
            let added = manage_id_prefix(name, Some(code), "add", ".");
            let removed = manage_id_prefix(&added, None, "remove", ".");
            assert_eq!(removed, base);
        }
    }
}
