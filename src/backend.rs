//! Choice between exact and approximate repulsion

use std::fmt;

use serde::Serialize;

use crate::force::{ExactRepulsion, RepulsionStrategy};
use crate::spatial::BarnesHutRepulsion;

/// Repulsion evaluation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// All node pairs, O(n²)
    Exact,
    /// Barnes-Hut tree, O(n log n)
    BarnesHut,
}

/// Exact below or at `threshold` nodes, Barnes-Hut above it
pub fn select_backend(node_count: usize, threshold: usize) -> Backend {
    if node_count > threshold {
        Backend::BarnesHut
    } else {
        Backend::Exact
    }
}

impl Backend {
    /// Strategy object implementing this backend
    pub fn strategy<const D: usize>(self, theta: f64) -> Box<dyn RepulsionStrategy<D>> {
        match self {
            Backend::Exact => Box::new(ExactRepulsion),
            Backend::BarnesHut => Box::new(BarnesHutRepulsion::new(theta)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Exact => f.write_str("exact"),
            Backend::BarnesHut => f.write_str("barnes-hut"),
        }
    }
}
