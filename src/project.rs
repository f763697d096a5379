//! Writes computed coordinates back onto document nodes

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::backend::Backend;
use crate::config::Dimensions;
use crate::document::GraphDocument;
use crate::error::{LayoutError, LayoutResult};
use crate::graph::LayoutGraph;
use crate::simulation::LayoutOutcome;
use crate::vector::Vector;

/// A final node position; `z` is only set for 3D layouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl<const D: usize> From<Vector<D>> for Point {
    fn from(v: Vector<D>) -> Self {
        Self {
            x: v.0[0],
            y: v.0[1],
            z: v.0.get(2).copied(),
        }
    }
}

/// Axis-aligned box enclosing every node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

/// Result of a layout run, positions indexed like the graph's nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub dimensions: Dimensions,
    pub positions: Vec<Point>,
    pub backend: Backend,
    pub outcome: LayoutOutcome,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Smallest box containing all positions, `None` for an empty layout
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let (first, rest) = self.positions.split_first()?;
        let bbox = rest.iter().fold(
            BoundingBox {
                min: *first,
                max: *first,
            },
            |b, p| BoundingBox {
                min: Point {
                    x: b.min.x.min(p.x),
                    y: b.min.y.min(p.y),
                    z: b.min.z.zip(p.z).map(|(a, c)| a.min(c)),
                },
                max: Point {
                    x: b.max.x.max(p.x),
                    y: b.max.y.max(p.y),
                    z: b.max.z.zip(p.z).map(|(a, c)| a.max(c)),
                },
            },
        );
        Some(bbox)
    }
}

/// Set `x`, `y` (and `z` in 3D) on every node of `document`
///
/// Nodes are matched by id, so the document may list them in any order. All
/// other fields keep their values and positions. A `z` left over from an
/// earlier 3D run is dropped when projecting a 2D layout.
pub fn project(
    document: &mut GraphDocument,
    graph: &LayoutGraph,
    layout: &Layout,
) -> LayoutResult<()> {
    let mut dropped_z = 0;

    for node in &mut document.nodes {
        let point = graph
            .index_of(&node.id)
            .and_then(|i| layout.positions.get(i))
            .ok_or_else(|| LayoutError::UnknownNode {
                id: node.id.clone(),
            })?;

        node.fields.insert("x".to_string(), Value::from(point.x));
        node.fields.insert("y".to_string(), Value::from(point.y));
        match point.z {
            Some(z) => {
                node.fields.insert("z".to_string(), Value::from(z));
            }
            None if node.fields.contains_key("z") => {
                node.fields.shift_remove("z");
                dropped_z += 1;
            }
            None => {}
        }
    }

    if dropped_z > 0 {
        warn!(nodes = dropped_z, "dropped stale z coordinates from 2D layout");
    }
    Ok(())
}
