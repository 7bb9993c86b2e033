//! Graph header extraction: the swimlane vocabulary describing the graph
//! itself (site code, description, author, embargo, license).

use crate::graphml::keys::{data_value, KeyMap};
use crate::graphml::vocab;
use crate::xml::XmlElement;

#[derive(Debug, Default)]
pub struct HeaderInfo {
    pub id: Option<String>,
    pub description: Option<String>,
    pub orcid: Option<String>,
    pub author_name: Option<String>,
    pub author_surname: Option<String>,
    pub embargo: Option<String>,
    pub license: Option<String>,
}

pub fn extract(graph_elem: &XmlElement, key_map: &KeyMap) -> HeaderInfo {
    let mut header = HeaderInfo::default();
    let Some(key_id) = key_map.graph.get("description") else {
        return header;
    };
    let Some(text) = data_value(graph_elem, key_id) else {
        return header;
    };
    let (_, fields) = vocab::parse(&text);
    header.id = fields.get("ID").cloned();
    header.description = fields.get("description").cloned();
    header.orcid = fields.get("ORCID").cloned();
    header.author_name = fields.get("author_name").cloned();
    header.author_surname = fields.get("author_surname").cloned();
    header.embargo = fields.get("embargo").cloned();
    header.license = fields.get("license").cloned();
    header
}
