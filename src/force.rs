//! Force model
//!
//! Fruchterman-Reingold style forces: connected nodes attract with
//! magnitude `C · d² / k`, every pair repels with magnitude `C · k² / d`. Both
//! share the constant `C`, so a lone edge rests at exactly `k` for any `C`.
//!
//! Attraction is always evaluated over the edge list. Repulsion goes through a
//! [`RepulsionStrategy`] so the all-pairs and the Barnes-Hut evaluations are
//! interchangeable.

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::graph::IndexedEdge;
use crate::vector::Vector;

/// Distances below this fraction of `k` are treated as this fraction of `k`
pub const MIN_DISTANCE_RATIO: f64 = 1e-3;

/// Constants shared by every force evaluation in one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    /// Ideal edge length
    pub k: f64,
    /// Repulsion constant
    pub repulsion: f64,
    /// Linear pull toward the origin
    pub gravity: f64,
    /// Epsilon floor for distances
    pub min_distance: f64,
}

impl ForceParams {
    pub fn new(k: f64, repulsion: f64) -> Self {
        Self {
            k,
            repulsion,
            gravity: 0.0,
            min_distance: k * MIN_DISTANCE_RATIO,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            gravity: config.gravity,
            ..Self::new(config.ideal_edge_length, config.repulsion)
        }
    }

    /// Repulsion magnitude between two unit masses at distance `d`
    #[inline]
    pub fn repulsion_magnitude(&self, d: f64) -> f64 {
        self.repulsion * self.k * self.k / d.max(self.min_distance)
    }
}

/// Spring force on the source of an edge, `delta` pointing from source to target
///
/// Scaled by the repulsion constant so the balance point stays at `k`.
///
/// The target receives the negated force. Coincident endpoints exert nothing;
/// repulsion separates them first.
#[inline]
pub fn attraction<const D: usize>(delta: Vector<D>, params: &ForceParams) -> Vector<D> {
    let d = delta.norm();
    if d == 0.0 {
        return Vector::ZERO;
    }
    delta * (params.repulsion * d.max(params.min_distance) / params.k)
}

/// Direction used to separate exactly coincident nodes `i` and `j`
///
/// Antisymmetric in `(i, j)` so the pair still obeys action/reaction.
#[inline]
pub fn separation_direction<const D: usize>(i: usize, j: usize) -> Vector<D> {
    let axis = Vector::axis(i.wrapping_add(j));
    if i < j { -axis } else { axis }
}

/// Repulsive force on node `i` from node `j`, `delta = pos[i] - pos[j]`
#[inline]
pub fn repulsion<const D: usize>(
    delta: Vector<D>,
    i: usize,
    j: usize,
    params: &ForceParams,
) -> Vector<D> {
    let d = delta.norm();
    let direction = if d == 0.0 {
        separation_direction(i, j)
    } else {
        delta * (1.0 / d)
    };
    direction * params.repulsion_magnitude(d)
}

/// Repulsive force from `mass` unit nodes concentrated at one point
///
/// `delta` points from that point to the node being pushed.
#[inline]
pub fn repulsion_from_mass<const D: usize>(
    delta: Vector<D>,
    mass: f64,
    params: &ForceParams,
) -> Vector<D> {
    let d = delta.norm();
    if d == 0.0 {
        return Vector::ZERO;
    }
    delta * (mass * params.repulsion_magnitude(d) / d)
}

/// Evaluates the repulsive force on every node
pub trait RepulsionStrategy<const D: usize>: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Net repulsive force per node, in node order
    ///
    /// `positions` must not be mutated while this runs; implementations may
    /// read it from several threads.
    fn repulsion(&self, positions: &[Vector<D>], params: &ForceParams) -> Vec<Vector<D>>;
}

/// All-pairs repulsion, O(n²) per iteration
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactRepulsion;

impl<const D: usize> RepulsionStrategy<D> for ExactRepulsion {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn repulsion(&self, positions: &[Vector<D>], params: &ForceParams) -> Vec<Vector<D>> {
        // Each node sums over the others in index order, so the result does
        // not depend on how rayon splits the work.
        (0..positions.len())
            .into_par_iter()
            .map(|i| {
                let mut total = Vector::ZERO;
                for (j, other) in positions.iter().enumerate() {
                    if j != i {
                        total += repulsion(positions[i] - *other, i, j, params);
                    }
                }
                total
            })
            .collect()
    }
}

/// Net force per node: repulsion, then edge springs, then gravity
pub fn net_forces<const D: usize>(
    positions: &[Vector<D>],
    edges: &[IndexedEdge],
    strategy: &dyn RepulsionStrategy<D>,
    params: &ForceParams,
) -> Vec<Vector<D>> {
    let mut forces = strategy.repulsion(positions, params);

    for edge in edges.iter().filter(|e| !e.is_self_loop()) {
        let pull = attraction(positions[edge.target] - positions[edge.source], params);
        forces[edge.source] += pull;
        forces[edge.target] -= pull;
    }

    if params.gravity > 0.0 {
        for (force, pos) in forces.iter_mut().zip(positions) {
            *force -= *pos * params.gravity;
        }
    }

    forces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ForceParams {
        ForceParams::new(2.0, 1.0)
    }

    #[test]
    fn attraction_grows_with_distance_squared() {
        let p = params();
        let near = attraction(Vector([1.0, 0.0]), &p);
        let far = attraction(Vector([4.0, 0.0]), &p);

        assert_eq!(near, Vector([0.5, 0.0]));
        assert_eq!(far, Vector([8.0, 0.0]));
    }

    #[test]
    fn attraction_of_coincident_endpoints_is_zero() {
        assert_eq!(attraction(Vector([0.0, 0.0, 0.0]), &params()), Vector::ZERO);
    }

    #[test]
    fn repulsion_decays_with_distance() {
        let p = params();
        let near = repulsion(Vector([1.0, 0.0]), 0, 1, &p);
        let far = repulsion(Vector([4.0, 0.0]), 0, 1, &p);

        assert_eq!(near, Vector([4.0, 0.0]));
        assert_eq!(far, Vector([1.0, 0.0]));
    }

    #[test]
    fn forces_balance_at_ideal_length() {
        let p = params();
        let delta = Vector([0.0, 2.0]);
        let pull = attraction(delta, &p);
        let push = repulsion(-delta, 0, 1, &p);
        assert!((pull + push).norm() < 1e-12);
    }

    #[test]
    fn forces_balance_at_ideal_length_for_any_repulsion() {
        for c in [0.25, 2.0, 4.0, 10.0] {
            let p = ForceParams::new(1.5, c);
            let delta = Vector([1.5, 0.0, 0.0]);
            let pull = attraction(delta, &p);
            let push = repulsion(-delta, 0, 1, &p);
            assert!((pull + push).norm() < 1e-9, "C = {c}: {:?}", pull + push);
        }
    }

    #[test]
    fn coincident_nodes_get_finite_opposite_forces() {
        let p = params();
        let on_i = repulsion(Vector([0.0, 0.0, 0.0]), 3, 5, &p);
        let on_j = repulsion(Vector([0.0, 0.0, 0.0]), 5, 3, &p);

        assert!(on_i.is_finite());
        assert!(on_i.norm() > 0.0);
        assert_eq!(on_i, -on_j);
    }

    #[test]
    fn repulsion_is_capped_near_zero_distance() {
        let p = params();
        let tiny = repulsion(Vector([1e-12, 0.0]), 0, 1, &p);
        let cap = p.repulsion_magnitude(p.min_distance);
        assert!((tiny.norm() - cap).abs() < cap * 1e-9);
    }

    #[test]
    fn mass_repulsion_scales_with_mass() {
        let p = params();
        let one = repulsion_from_mass(Vector([2.0, 0.0]), 1.0, &p);
        let three = repulsion_from_mass(Vector([2.0, 0.0]), 3.0, &p);
        assert_eq!(three, one * 3.0);
        assert_eq!(one, repulsion(Vector([2.0, 0.0]), 0, 1, &p));
    }

    #[test]
    fn exact_repulsion_obeys_action_reaction() {
        let positions = vec![
            Vector([0.0, 0.0]),
            Vector([1.0, 0.5]),
            Vector([-0.3, 2.0]),
            Vector([0.0, 0.0]),
        ];
        let forces = ExactRepulsion.repulsion(&positions, &params());

        assert_eq!(forces.len(), 4);
        let total = forces.iter().fold(Vector::ZERO, |acc, f| acc + *f);
        assert!(total.norm() < 1e-6, "net force {total:?}");
    }

    #[test]
    fn net_forces_skip_self_loops_and_apply_gravity() {
        let mut p = params();
        p.gravity = 0.5;
        let positions = vec![Vector([2.0, 0.0])];
        let edges = [IndexedEdge {
            source: 0,
            target: 0,
        }];

        let forces = net_forces(&positions, &edges, &ExactRepulsion, &p);
        assert_eq!(forces, vec![Vector([-1.0, 0.0])]);
    }

    #[test]
    fn net_forces_pull_connected_pair_together() {
        let p = params();
        let positions = vec![Vector([0.0, 0.0]), Vector([10.0, 0.0])];
        let edges = [IndexedEdge {
            source: 0,
            target: 1,
        }];

        let forces = net_forces(&positions, &edges, &ExactRepulsion, &p);
        assert!(forces[0].0[0] > 0.0);
        assert!(forces[1].0[0] < 0.0);
    }
}
