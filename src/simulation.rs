//! Force simulation for graph layout
//!
//! One simulation owns the positions of every node for the duration of a run.
//! Each iteration reads the current positions, computes net forces, scales
//! them by the current temperature, clamps each node's movement to the
//! configured maximum step and writes the result into a second buffer, which
//! is then swapped in. Forces are never computed against half-updated
//! positions.

use std::fmt;
use std::mem;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::backend::{Backend, select_backend};
use crate::config::SimulationConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::force::{ForceParams, RepulsionStrategy, net_forces};
use crate::graph::LayoutGraph;
use crate::vector::{AXES, Vector};

/// Lifecycle of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    /// Positions seeded, no iteration run yet
    Initialized,
    /// At least one iteration run, budget left
    Running,
    /// Largest movement fell below the convergence threshold
    Converged,
    /// Every iteration of the budget was used
    IterationBudgetExhausted,
}

impl SimulationState {
    /// Both terminal states are successful outcomes
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SimulationState::Converged | SimulationState::IterationBudgetExhausted
        )
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimulationState::Initialized => "initialized",
            SimulationState::Running => "running",
            SimulationState::Converged => "converged",
            SimulationState::IterationBudgetExhausted => "iteration budget exhausted",
        };
        f.write_str(s)
    }
}

/// Final positions, indexed like the graph's nodes
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState<const D: usize> {
    positions: Vec<Vector<D>>,
}

impl<const D: usize> LayoutState<D> {
    pub fn positions(&self) -> &[Vector<D>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn into_positions(self) -> Vec<Vector<D>> {
        self.positions
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutOutcome {
    pub state: SimulationState,
    /// Iterations actually run
    pub iterations: usize,
    /// Name of the repulsion strategy used
    pub strategy: &'static str,
}

/// Seeded uniform placement in a cube around the origin
///
/// The cube's half-width grows with `sqrt(n)` so larger graphs start roughly
/// at the density the forces will settle on.
pub fn initial_positions<const D: usize>(n: usize, k: f64, seed: u64) -> Vec<Vector<D>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = 0.5 * k * (n.max(1) as f64).sqrt();
    (0..n)
        .map(|_| Vector(std::array::from_fn(|_| rng.gen_range(-half..half))))
        .collect()
}

/// CPU force simulation in `D` dimensions
pub struct Simulation<'g, const D: usize> {
    graph: &'g LayoutGraph,
    config: SimulationConfig,
    params: ForceParams,
    strategy: Box<dyn RepulsionStrategy<D>>,
    positions: Vec<Vector<D>>,
    /// Write buffer for the next iteration
    next: Vec<Vector<D>>,
    state: SimulationState,
    iteration: usize,
}

impl<'g, const D: usize> Simulation<'g, D> {
    /// Create a simulation, picking the backend from the node count
    pub fn new(graph: &'g LayoutGraph, config: SimulationConfig) -> LayoutResult<Self> {
        let backend = select_backend(graph.node_count(), config.approximation_threshold);
        Self::with_backend(graph, config, backend)
    }

    /// Create a simulation with an explicit backend
    pub fn with_backend(
        graph: &'g LayoutGraph,
        config: SimulationConfig,
        backend: Backend,
    ) -> LayoutResult<Self> {
        let strategy = backend.strategy::<D>(config.theta);
        Self::with_strategy(graph, config, strategy)
    }

    /// Create a simulation around any repulsion strategy
    pub fn with_strategy(
        graph: &'g LayoutGraph,
        config: SimulationConfig,
        strategy: Box<dyn RepulsionStrategy<D>>,
    ) -> LayoutResult<Self> {
        config.validate()?;
        if config.dimensions.count() != D {
            return Err(LayoutError::config(
                "dimensions",
                config.dimensions.count(),
                "does not match the simulation's dimensionality",
            ));
        }

        let positions = initial_positions(graph.node_count(), config.ideal_edge_length, config.seed);
        let next = positions.clone();

        Ok(Self {
            graph,
            params: ForceParams::from_config(&config),
            config,
            strategy,
            positions,
            next,
            state: SimulationState::Initialized,
            iteration: 0,
        })
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Iterations run so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn positions(&self) -> &[Vector<D>] {
        &self.positions
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run one iteration
    ///
    /// Does nothing once a terminal state is reached.
    pub fn step(&mut self) -> LayoutResult<SimulationState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        self.state = SimulationState::Running;

        let temperature = self.config.temperature(self.iteration);
        let max_step = self.config.max_step_length();
        let forces = net_forces(
            &self.positions,
            self.graph.edges(),
            self.strategy.as_ref(),
            &self.params,
        );

        let mut max_movement = 0.0_f64;
        for (i, force) in forces.into_iter().enumerate() {
            let movement = (force * temperature).clamp_length(max_step);
            let next = self.positions[i] + movement;
            if let Some((axis, value)) = next.non_finite() {
                return Err(LayoutError::NumericalInstability {
                    iteration: self.iteration,
                    node: self.graph.id_of(i).clone(),
                    axis: AXES[axis],
                    value,
                });
            }
            max_movement = max_movement.max(movement.norm());
            self.next[i] = next;
        }
        mem::swap(&mut self.positions, &mut self.next);
        self.iteration += 1;

        trace!(
            iteration = self.iteration,
            temperature,
            max_movement,
            "layout iteration"
        );

        if max_movement < self.config.convergence_distance() {
            self.state = SimulationState::Converged;
        } else if self.iteration >= self.config.iterations {
            self.state = SimulationState::IterationBudgetExhausted;
        }
        Ok(self.state)
    }

    /// Run until convergence or until the iteration budget is used up
    pub fn run(mut self) -> LayoutResult<(LayoutState<D>, LayoutOutcome)> {
        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            dimensions = D,
            strategy = self.strategy.name(),
            budget = self.config.iterations,
            "starting layout"
        );

        while !self.state.is_terminal() {
            self.step()?;
        }

        let outcome = LayoutOutcome {
            state: self.state,
            iterations: self.iteration,
            strategy: self.strategy.name(),
        };
        info!(
            state = %outcome.state,
            iterations = outcome.iterations,
            strategy = outcome.strategy,
            "layout finished"
        );
        Ok((
            LayoutState {
                positions: self.positions,
            },
            outcome,
        ))
    }
}
