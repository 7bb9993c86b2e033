//! Shape/color -> node kind classification, ported from yEd's visual
//! encoding convention (`convert_shape2type` in the original importer).

use stratgraph_core::{GroupKind, NodeKind, StratigraphicKind};

use crate::xml::XmlElement;

/// Visual attributes pulled off a GraphML `<node>`'s `y:` graphics subtree.
#[derive(Debug, Default, Clone)]
pub struct NodeGeometry {
    pub y_pos: Option<f64>,
    pub height: Option<f64>,
    pub shape: Option<String>,
    pub fill_color: Option<String>,
    pub border_color: Option<String>,
    pub label_text: Option<String>,
}

pub fn extract_geometry(node: &XmlElement) -> NodeGeometry {
    let mut geom = NodeGeometry::default();
    if let Some(geometry) = node.find_descendant("Geometry") {
        geom.y_pos = geometry.attr("y").and_then(|v| v.parse().ok());
        geom.height = geometry.attr("height").and_then(|v| v.parse().ok());
    }
    if let Some(shape) = node.find_descendant("Shape") {
        geom.shape = shape.attr("type").map(|s| s.to_string());
    }
    if let Some(fill) = node.find_descendant("Fill") {
        geom.fill_color = fill.attr("color").map(|s| s.to_string());
    }
    if let Some(border) = node.find_descendant("BorderStyle") {
        geom.border_color = border.attr("color").map(|s| s.to_string());
    }
    if let Some(label) = node.find_descendant("NodeLabel") {
        geom.label_text = Some(label.text());
    }
    geom
}

/// Stratigraphic shape/border-color table. Unrecognized combinations fall
/// back to a generic node rather than failing the import.
pub fn convert_shape2type(shape: &str, border_color: Option<&str>) -> Option<(StratigraphicKind, &'static str)> {
    match (shape, border_color) {
        ("rectangle", _) => Some((StratigraphicKind::US, "Stratigraphic Unit")),
        ("parallelogram", _) => Some((StratigraphicKind::USVs, "Structural Virtual Stratigraphic Unit")),
        ("hexagon", _) => Some((StratigraphicKind::USVn, "Non-Structural Virtual Stratigraphic Unit")),
        ("ellipse", Some("#31792D")) => Some((StratigraphicKind::SerUSVn, "Series of USVn")),
        ("ellipse", Some("#248FE7")) => Some((StratigraphicKind::SerUSVs, "Series of USVs")),
        ("ellipse", Some("#9B3333")) => Some((StratigraphicKind::SerSU, "Series of SU")),
        ("octagon", Some("#D8BD30")) => Some((StratigraphicKind::SF, "Special Find")),
        ("octagon", Some("#B19F61")) => Some((StratigraphicKind::VSF, "Virtual Special Find")),
        ("roundrectangle", _) => Some((StratigraphicKind::USD, "Documentary Stratigraphic Unit")),
        _ => None,
    }
}

/// Group container kind from background (fill) color.
pub fn classify_group(fill_color: Option<&str>) -> GroupKind {
    match fill_color {
        Some("#CCFFFF") => GroupKind::Activity,
        Some("#FFCC99") => GroupKind::Paradata,
        Some("#99CC00") => GroupKind::TimeBranch,
        _ => GroupKind::Generic,
    }
}

/// Paradata-group member subkind: Document by default, Extractor/Combiner
/// by label prefix, Property when the node is an annotation-style artifact
/// rather than a data object (detected via yEd's `UMLNoteNode`/generic
/// property-list marker, approximated here by the presence of a `Property`
/// descendant block under the node rather than a plain label).
pub fn classify_paradata(label: &str, is_property_like: bool) -> NodeKind {
    if is_property_like {
        return NodeKind::Property { value: None };
    }
    if label.starts_with("D.") {
        NodeKind::Extractor
    } else if label.starts_with("C.") {
        NodeKind::Combiner
    } else {
        NodeKind::Document { url: None }
    }
}

pub const CONTINUITY_MARKER: &str = "_continuity";

pub fn is_continuity_description(description: &str) -> bool {
    description.contains(CONTINUITY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_table_covers_every_stratigraphic_kind() {
        assert_eq!(convert_shape2type("rectangle", None).unwrap().0, StratigraphicKind::US);
        assert_eq!(convert_shape2type("parallelogram", None).unwrap().0, StratigraphicKind::USVs);
        assert_eq!(convert_shape2type("hexagon", None).unwrap().0, StratigraphicKind::USVn);
        assert_eq!(convert_shape2type("ellipse", Some("#31792D")).unwrap().0, StratigraphicKind::SerUSVn);
        assert_eq!(convert_shape2type("ellipse", Some("#248FE7")).unwrap().0, StratigraphicKind::SerUSVs);
        assert_eq!(convert_shape2type("ellipse", Some("#9B3333")).unwrap().0, StratigraphicKind::SerSU);
        assert_eq!(convert_shape2type("octagon", Some("#D8BD30")).unwrap().0, StratigraphicKind::SF);
        assert_eq!(convert_shape2type("octagon", Some("#B19F61")).unwrap().0, StratigraphicKind::VSF);
        assert_eq!(convert_shape2type("roundrectangle", None).unwrap().0, StratigraphicKind::USD);
    }

    #[test]
    fn ellipse_without_a_recognized_border_color_is_unclassified() {
        assert!(convert_shape2type("ellipse", Some("#000000")).is_none());
        assert!(convert_shape2type("ellipse", None).is_none());
    }

    #[test]
    fn unrecognized_shape_falls_back_to_none() {
        assert!(convert_shape2type("star", None).is_none());
    }

    #[test]
    fn group_fill_color_table() {
        assert_eq!(classify_group(Some("#CCFFFF")), GroupKind::Activity);
        assert_eq!(classify_group(Some("#FFCC99")), GroupKind::Paradata);
        assert_eq!(classify_group(Some("#99CC00")), GroupKind::TimeBranch);
        assert_eq!(classify_group(Some("#FFFFFF")), GroupKind::Generic);
        assert_eq!(classify_group(None), GroupKind::Generic);
    }

    #[test]
    fn paradata_member_classification_by_label_prefix() {
        assert!(matches!(classify_paradata("D.extract", false), NodeKind::Extractor));
        assert!(matches!(classify_paradata("C.combine", false), NodeKind::Combiner));
        assert!(matches!(classify_paradata("Report A", false), NodeKind::Document { url: None }));
        assert!(matches!(classify_paradata("anything", true), NodeKind::Property { value: None }));
    }

    #[test]
    fn continuity_marker_detection() {
        assert!(is_continuity_description("US1_continuity"));
        assert!(!is_continuity_description("US1"));
    }
}
