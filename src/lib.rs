//! spring-layout - force-directed placement of graph nodes in 2D or 3D.
//!
//! Connected nodes attract, every pair repels, and an iterative simulation
//! moves nodes until they settle or the iteration budget runs out. Graphs
//! above a configurable size switch from exact all-pairs repulsion to a
//! Barnes-Hut approximation.
//!
//! ```no_run
//! use spring_layout::{GraphDocument, SimulationConfig, layout_document};
//!
//! let mut doc: GraphDocument = serde_json::from_str(
//!     r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#,
//! )?;
//! let layout = layout_document(&mut doc, &SimulationConfig::two_dimensional())?;
//! println!("{} nodes placed ({})", layout.len(), layout.outcome.state);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod force;
pub mod graph;
pub mod io;
pub mod project;
pub mod simulation;
pub mod spatial;
pub mod vector;

use tracing::debug;

pub use backend::{Backend, select_backend};
pub use config::{CoolingSchedule, Dimensions, SimulationConfig};
pub use document::{EdgeRecord, GraphDocument, NodeRecord};
pub use error::{LayoutError, LayoutResult};
pub use graph::{LayoutGraph, NodeId};
pub use project::{BoundingBox, Layout, Point, project};
pub use simulation::{LayoutOutcome, Simulation, SimulationState};

/// Lay out `graph`, choosing dimensionality and backend from `config`
pub fn compute_layout(graph: &LayoutGraph, config: &SimulationConfig) -> LayoutResult<Layout> {
    config.validate()?;

    let backend = select_backend(graph.node_count(), config.approximation_threshold);
    debug!(
        nodes = graph.node_count(),
        threshold = config.approximation_threshold,
        %backend,
        "selected repulsion backend"
    );

    match config.dimensions {
        Dimensions::Two => run::<2>(graph, config, backend),
        Dimensions::Three => run::<3>(graph, config, backend),
    }
}

fn run<const D: usize>(
    graph: &LayoutGraph,
    config: &SimulationConfig,
    backend: Backend,
) -> LayoutResult<Layout> {
    let simulation = Simulation::<D>::with_backend(graph, config.clone(), backend)?;
    let (state, outcome) = simulation.run()?;

    Ok(Layout {
        dimensions: config.dimensions,
        positions: state.into_positions().into_iter().map(Point::from).collect(),
        backend,
        outcome,
    })
}

/// Resolve, lay out and annotate a document in place
///
/// Nothing is written to the document unless the whole run succeeds.
pub fn layout_document(
    document: &mut GraphDocument,
    config: &SimulationConfig,
) -> LayoutResult<Layout> {
    let graph = document.to_graph()?;
    let layout = compute_layout(&graph, config)?;
    project(document, &graph, &layout)?;
    Ok(layout)
}
