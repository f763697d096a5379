//! Dense adjacency representation consumed by the simulation
//!
//! Nodes are addressed by contiguous indices in input order; edges are
//! resolved to index pairs once, up front.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Caller-supplied node identifier, treated as an opaque key
///
/// Graph documents use either integer or string ids, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Text(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Text(s)
    }
}

impl From<i64> for NodeId {
    fn from(n: i64) -> Self {
        NodeId::Number(n)
    }
}

/// An edge resolved to node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedEdge {
    pub source: usize,
    pub target: usize,
}

impl IndexedEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Graph ready for layout
#[derive(Debug, Clone)]
pub struct LayoutGraph {
    ids: Vec<NodeId>,
    edges: Vec<IndexedEdge>,
    /// Mapping from node ID to index
    index: HashMap<NodeId, usize>,
}

impl LayoutGraph {
    /// Build the adjacency structure from node ids and `(source, target)` pairs
    pub fn new<I, E>(node_ids: I, edge_pairs: E) -> LayoutResult<Self>
    where
        I: IntoIterator<Item = NodeId>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let ids: Vec<NodeId> = node_ids.into_iter().collect();

        let mut index = HashMap::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), position).is_some() {
                return Err(LayoutError::DuplicateNode {
                    id: id.clone(),
                    position,
                });
            }
        }

        let edges = edge_pairs
            .into_iter()
            .enumerate()
            .map(|(edge, (from, to))| {
                let lookup = |id: &NodeId| index.get(id).copied();
                match (lookup(&from), lookup(&to)) {
                    (Some(source), Some(target)) => Ok(IndexedEdge { source, target }),
                    (None, _) => Err(LayoutError::InvalidEdge {
                        edge,
                        missing: from.clone(),
                        from,
                        to,
                    }),
                    (_, None) => Err(LayoutError::InvalidEdge {
                        edge,
                        missing: to.clone(),
                        from,
                        to,
                    }),
                }
            })
            .collect::<LayoutResult<Vec<_>>>()?;

        Ok(Self { ids, edges, index })
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[IndexedEdge] {
        &self.edges
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn id_of(&self, index: usize) -> &NodeId {
        &self.ids[index]
    }

    /// Number of edge endpoints touching each node (self-loops excluded)
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.ids.len()];
        for edge in self.edges.iter().filter(|e| !e.is_self_loop()) {
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }
        degrees
    }
}
