//! Graph exchange document
//!
//! Top-level object with `nodes` (each with a unique `id`) and `edges` (each
//! with `source` and `target`). Every other field, on the document, its
//! nodes or its edges, is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LayoutResult;
use crate::graph::{LayoutGraph, NodeId};

/// A node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,

    /// All other fields, in document order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Numeric coordinate field (`x`, `y` or `z`), if present
    pub fn coordinate(&self, axis: &str) -> Option<f64> {
        self.fields.get(axis).and_then(Value::as_f64)
    }
}

/// An edge record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EdgeRecord {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            fields: Map::new(),
        }
    }
}

/// Complete graph document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,

    /// Browser front-ends name this list `links`; both are accepted on input
    #[serde(default, alias = "links")]
    pub edges: Vec<EdgeRecord>,

    /// Unknown top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphDocument {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Resolve the document into the adjacency structure used for layout
    pub fn to_graph(&self) -> LayoutResult<LayoutGraph> {
        LayoutGraph::new(
            self.nodes.iter().map(|n| n.id.clone()),
            self.edges
                .iter()
                .map(|e| (e.source.clone(), e.target.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    const SAMPLE: &str = r#"{
        "title": "clusters",
        "nodes": [
            {"id": "a", "cluster": 1, "name": "Alpha"},
            {"id": 2, "cluster": 2}
        ],
        "edges": [
            {"source": "a", "target": 2, "weight": 0.5}
        ]
    }"#;

    #[test]
    fn parses_nodes_edges_and_extra_fields() {
        let doc: GraphDocument = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.edge_count(), 1);
        assert_eq!(doc.nodes[0].id, NodeId::from("a"));
        assert_eq!(doc.nodes[1].id, NodeId::Number(2));
        assert_eq!(doc.nodes[0].fields["name"], "Alpha");
        assert_eq!(doc.edges[0].fields["weight"], 0.5);
        assert_eq!(doc.extra["title"], "clusters");
    }

    #[test]
    fn accepts_links_alias() {
        let doc: GraphDocument = serde_json::from_str(
            r#"{"nodes": [{"id": "a"}, {"id": "b"}], "links": [{"source": "a", "target": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.edge_count(), 1);
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let doc: GraphDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.node_count(), 0);
        assert_eq!(doc.edge_count(), 0);
        assert_eq!(doc.to_graph().unwrap().node_count(), 0);
    }

    #[test]
    fn node_without_id_is_rejected() {
        let result = serde_json::from_str::<GraphDocument>(r#"{"nodes": [{"name": "x"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn round_trip_keeps_field_order() {
        let doc: GraphDocument =
            serde_json::from_str(r#"{"nodes": [{"id": "a", "zeta": 1, "alpha": 2}]}"#).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"nodes":[{"id":"a","zeta":1,"alpha":2}],"edges":[]}"#);
    }

    #[test]
    fn to_graph_resolves_edges() {
        let doc: GraphDocument = serde_json::from_str(SAMPLE).unwrap();
        let graph = doc.to_graph().unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges()[0].source, 0);
        assert_eq!(graph.edges()[0].target, 1);
    }

    #[test]
    fn to_graph_reports_dangling_edge() {
        let mut doc: GraphDocument = serde_json::from_str(SAMPLE).unwrap();
        doc.edges.push(EdgeRecord::new("a", "missing"));
        assert!(matches!(
            doc.to_graph(),
            Err(LayoutError::InvalidEdge { edge: 1, .. })
        ));
    }

    #[test]
    fn coordinate_reads_numeric_fields() {
        let mut node = NodeRecord::new("n");
        node.fields.insert("x".to_string(), Value::from(1.5));
        node.fields.insert("y".to_string(), Value::from("oops"));
        assert_eq!(node.coordinate("x"), Some(1.5));
        assert_eq!(node.coordinate("y"), None);
        assert_eq!(node.coordinate("z"), None);
    }
}
