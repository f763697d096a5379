//! Errors raised by the layout core

use thiserror::Error;

use crate::graph::NodeId;

/// Errors that can occur while building a graph or running a layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// An edge endpoint does not resolve to a known node
    #[error("edge #{edge} ({from} -> {to}) references unknown node `{missing}`")]
    InvalidEdge {
        /// Position of the edge in the input edge list
        edge: usize,
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// The same node identifier appears more than once
    #[error("duplicate node id `{id}` at position {position}")]
    DuplicateNode { id: NodeId, position: usize },

    /// A document node has no position in the layout being projected
    #[error("node `{id}` is not part of the computed layout")]
    UnknownNode { id: NodeId },

    /// A position became NaN or infinite during the simulation
    #[error(
        "simulation diverged at iteration {iteration}: node `{node}` has non-finite coordinate {axis} = {value}"
    )]
    NumericalInstability {
        iteration: usize,
        node: NodeId,
        axis: char,
        value: f64,
    },

    /// A configuration value is outside its allowed range
    #[error("invalid configuration: {field} = {value} ({reason})")]
    Configuration {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl LayoutError {
    pub(crate) fn config(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        LayoutError::Configuration {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;
