//! Edge-type enhancement: refines a raw line-style-derived edge type using
//! the kinds of the nodes it connects. Rules are tried in order; the first
//! match wins. An unmatched rule leaves the raw type unchanged.

use stratgraph_core::NodeKind;

fn is_strat(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Stratigraphic(_))
}

fn is_document(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Document { .. })
}

fn is_property(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Property { .. })
}

fn is_extractor(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Extractor)
}

fn is_combiner(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Combiner)
}

fn is_paradata_nodegroup(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Group(stratgraph_core::GroupKind::Paradata))
}

fn is_activity_nodegroup(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Group(stratgraph_core::GroupKind::Activity))
}

fn is_paradata_kind(kind: &NodeKind) -> bool {
    is_document(kind) || is_property(kind) || is_extractor(kind) || is_combiner(kind)
}

/// Enhance `raw_type` given the kinds of its endpoints. Returns the refined
/// type name, or the original `raw_type` if no rule applies.
pub fn enhance(raw_type: &str, source: &NodeKind, target: &NodeKind) -> String {
    match raw_type {
        "has_data_provenance" => {
            if is_strat(source) && is_property(target) {
                return "has_property".to_string();
            }
            if (is_strat(source) && is_paradata_nodegroup(target))
                || (is_paradata_nodegroup(source) && is_strat(target))
            {
                return "has_paradata_nodegroup".to_string();
            }
            if is_extractor(source) && is_document(target) {
                return "extracted_from".to_string();
            }
            if is_combiner(source) && is_extractor(target) {
                return "combines".to_string();
            }
            if is_strat(source) && is_document(target) {
                return "has_documentation".to_string();
            }
            if is_document(source) && is_strat(target) {
                return "is_documentation_of".to_string();
            }
            raw_type.to_string()
        }
        "generic_connection" => {
            if is_strat(source) && is_document(target) {
                return "has_documentation".to_string();
            }
            if is_document(source) && is_strat(target) {
                return "is_documentation_of".to_string();
            }
            if is_paradata_kind(source) && is_paradata_nodegroup(target) {
                return "is_in_paradata_nodegroup".to_string();
            }
            if is_paradata_nodegroup(source) && is_activity_nodegroup(target) {
                return "has_paradata_nodegroup".to_string();
            }
            raw_type.to_string()
        }
        other => other.to_string(),
    }
}
