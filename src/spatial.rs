//! Barnes-Hut spatial tree for approximate repulsion
//!
//! The tree is a quadtree for `D = 2` and an octree for `D = 3`, stored as a
//! flat arena: the `2^D` children of a cell are allocated next to each other,
//! so a cell only records the index of its first child.
//!
//! A cell that is small compared to its distance from the queried node
//! (`width / distance < theta`) contributes one aggregate force from its
//! centroid and node count. Closer cells are opened; leaves are evaluated
//! exactly.

use rayon::prelude::*;

use crate::force::{ForceParams, RepulsionStrategy, repulsion, repulsion_from_mass};
use crate::vector::Vector;

/// Coincident nodes stop subdividing at this depth and share a leaf
const MAX_DEPTH: usize = 48;

/// Marks a leaf cell
const LEAF: usize = usize::MAX;

/// Smallest half-width of the root cell
const MIN_HALF_SIZE: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Cell<const D: usize> {
    center: Vector<D>,
    half_size: f64,
    /// Number of nodes below this cell
    mass: f64,
    /// Sum of node positions until `finish`, centroid afterwards
    centroid: Vector<D>,
    first_child: usize,
    /// Nodes stored directly in a leaf
    bodies: Vec<usize>,
}

impl<const D: usize> Cell<D> {
    fn new(center: Vector<D>, half_size: f64) -> Self {
        Self {
            center,
            half_size,
            mass: 0.0,
            centroid: Vector::ZERO,
            first_child: LEAF,
            bodies: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.first_child == LEAF
    }

    fn contains(&self, p: &Vector<D>) -> bool {
        p.0.iter()
            .zip(self.center.0.iter())
            .all(|(a, c)| (a - c).abs() <= self.half_size)
    }

    /// Index (0..2^D) of the child quadrant/octant holding `p`
    fn orthant(&self, p: &Vector<D>) -> usize {
        p.0.iter()
            .zip(self.center.0.iter())
            .enumerate()
            .filter(|(_, (a, c))| a >= c)
            .fold(0, |bits, (axis, _)| bits | (1 << axis))
    }

    fn child_center(&self, orthant: usize) -> Vector<D> {
        let offset = self.half_size / 2.0;
        let mut center = self.center;
        for (axis, c) in center.0.iter_mut().enumerate() {
            if orthant & (1 << axis) != 0 {
                *c += offset;
            } else {
                *c -= offset;
            }
        }
        center
    }
}

/// Barnes-Hut tree over one snapshot of node positions
#[derive(Debug, Clone)]
pub struct BarnesHutTree<const D: usize> {
    cells: Vec<Cell<D>>,
    theta: f64,
}

impl<const D: usize> BarnesHutTree<D> {
    const CHILDREN: usize = 1 << D;

    /// Build a tree covering the bounding cube of `positions`
    pub fn build(positions: &[Vector<D>], theta: f64) -> Self {
        let mut tree = Self {
            cells: Vec::new(),
            theta,
        };
        let Some(first) = positions.first() else {
            return tree;
        };

        let (min, max) = positions[1..]
            .iter()
            .fold((*first, *first), |(lo, hi), p| {
                (lo.component_min(p), hi.component_max(p))
            });
        let center = (min + max) * 0.5;
        let extent = (max - min).0.iter().copied().fold(0.0_f64, f64::max);
        let half_size = (extent / 2.0).max(MIN_HALF_SIZE);

        tree.cells.push(Cell::new(center, half_size));
        for (body, p) in positions.iter().enumerate() {
            tree.insert(body, positions, p);
        }
        tree.finish();
        tree
    }

    fn insert(&mut self, body: usize, positions: &[Vector<D>], p: &Vector<D>) {
        let mut idx = 0;
        let mut depth = 0;
        loop {
            let cell = &mut self.cells[idx];
            cell.mass += 1.0;
            cell.centroid += *p;

            if cell.is_leaf() {
                if cell.bodies.is_empty() || depth >= MAX_DEPTH {
                    cell.bodies.push(body);
                    return;
                }
                self.subdivide(idx, positions);
            }

            let cell = &self.cells[idx];
            idx = cell.first_child + cell.orthant(p);
            depth += 1;
        }
    }

    /// Split a leaf, pushing its resident nodes one level down
    fn subdivide(&mut self, idx: usize, positions: &[Vector<D>]) {
        let first_child = self.cells.len();
        let parent = self.cells[idx].clone();
        for orthant in 0..Self::CHILDREN {
            self.cells.push(Cell::new(
                parent.child_center(orthant),
                parent.half_size / 2.0,
            ));
        }

        for &resident in &parent.bodies {
            let p = positions[resident];
            let child = &mut self.cells[first_child + parent.orthant(&p)];
            child.mass += 1.0;
            child.centroid += p;
            child.bodies.push(resident);
        }

        let cell = &mut self.cells[idx];
        cell.first_child = first_child;
        cell.bodies.clear();
    }

    fn finish(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.mass > 0.0) {
            cell.centroid = cell.centroid * (1.0 / cell.mass);
        }
    }

    /// Number of arena cells (for diagnostics)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.cells.first().map_or(0, |root| root.mass as usize)
    }

    /// Centroid of all nodes
    pub fn centroid(&self) -> Option<Vector<D>> {
        self.cells.first().map(|root| root.centroid)
    }

    /// Approximate repulsive force on node `body`
    pub fn force_on(&self, body: usize, positions: &[Vector<D>], params: &ForceParams) -> Vector<D> {
        let mut total = Vector::ZERO;
        if self.cells.is_empty() {
            return total;
        }
        let p = positions[body];

        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let cell = &self.cells[idx];
            if cell.mass == 0.0 {
                continue;
            }

            if cell.is_leaf() {
                for &other in cell.bodies.iter().filter(|&&o| o != body) {
                    total += repulsion(p - positions[other], body, other, params);
                }
                continue;
            }

            let delta = p - cell.centroid;
            let width = 2.0 * cell.half_size;
            if !cell.contains(&p) && width < self.theta * delta.norm() {
                total += repulsion_from_mass(delta, cell.mass, params);
            } else {
                stack.extend((cell.first_child..cell.first_child + Self::CHILDREN).rev());
            }
        }
        total
    }
}

/// Repulsion through a Barnes-Hut tree rebuilt on every call
#[derive(Debug, Clone, Copy)]
pub struct BarnesHutRepulsion {
    pub theta: f64,
}

impl BarnesHutRepulsion {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl<const D: usize> RepulsionStrategy<D> for BarnesHutRepulsion {
    fn name(&self) -> &'static str {
        "barnes-hut"
    }

    fn repulsion(&self, positions: &[Vector<D>], params: &ForceParams) -> Vec<Vector<D>> {
        let tree = BarnesHutTree::build(positions, self.theta);
        (0..positions.len())
            .into_par_iter()
            .map(|i| tree.force_on(i, positions, params))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::ExactRepulsion;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn scatter<const D: usize>(n: usize, seed: u64) -> Vec<Vector<D>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vector(std::array::from_fn(|_| rng.gen_range(-10.0..10.0))))
            .collect()
    }

    fn relative_error<const D: usize>(approx: &[Vector<D>], exact: &[Vector<D>]) -> f64 {
        let diff: f64 = approx
            .iter()
            .zip(exact)
            .map(|(a, e)| (*a - *e).norm())
            .sum();
        let scale: f64 = exact.iter().map(|e| e.norm()).sum();
        diff / scale
    }

    #[test]
    fn empty_tree_has_no_cells() {
        let tree = BarnesHutTree::<2>::build(&[], 0.9);
        assert_eq!(tree.cell_count(), 0);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.centroid().is_none());
    }

    #[test]
    fn root_aggregates_all_nodes() {
        let positions = vec![
            Vector([0.0, 0.0]),
            Vector([2.0, 0.0]),
            Vector([2.0, 2.0]),
            Vector([0.0, 2.0]),
        ];
        let tree = BarnesHutTree::build(&positions, 0.9);

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.centroid(), Some(Vector([1.0, 1.0])));
        // root plus one level of four quadrants
        assert_eq!(tree.cell_count(), 5);
    }

    #[test]
    fn octree_splits_into_eight() {
        let positions = vec![Vector([0.0, 0.0, 0.0]), Vector([1.0, 1.0, 1.0])];
        let tree = BarnesHutTree::build(&positions, 0.9);
        assert_eq!(tree.cell_count(), 9);
    }

    #[test]
    fn coincident_nodes_share_a_leaf() {
        let positions = vec![Vector([1.0, 1.0]); 3];
        let tree = BarnesHutTree::build(&positions, 0.9);
        let params = ForceParams::new(1.0, 1.0);

        assert_eq!(tree.node_count(), 3);
        for i in 0..3 {
            let f = tree.force_on(i, &positions, &params);
            assert!(f.is_finite());
            assert!(f.norm() > 0.0);
        }
    }

    #[test]
    fn zero_theta_matches_exact_repulsion() {
        let positions = scatter::<2>(64, 1);
        let params = ForceParams::new(1.0, 1.0);

        let exact = ExactRepulsion.repulsion(&positions, &params);
        let approx = BarnesHutRepulsion::new(0.0).repulsion(&positions, &params);

        assert!(relative_error(&approx, &exact) < 1e-9);
    }

    #[test]
    fn approximation_error_is_small_in_2d() {
        let positions = scatter::<2>(300, 7);
        let params = ForceParams::new(1.0, 1.0);

        let exact = ExactRepulsion.repulsion(&positions, &params);
        let approx = BarnesHutRepulsion::new(0.5).repulsion(&positions, &params);

        let err = relative_error(&approx, &exact);
        assert!(err < 0.05, "relative error {err}");
    }

    #[test]
    fn approximation_error_is_small_in_3d() {
        let positions = scatter::<3>(300, 11);
        let params = ForceParams::new(1.0, 1.0);

        let exact = ExactRepulsion.repulsion(&positions, &params);
        let approx = BarnesHutRepulsion::new(0.5).repulsion(&positions, &params);

        let err = relative_error(&approx, &exact);
        assert!(err < 0.05, "relative error {err}");
    }

    #[test]
    fn larger_theta_visits_fewer_cells_but_stays_close() {
        let positions = scatter::<3>(200, 3);
        let params = ForceParams::new(1.0, 1.0);

        let exact = ExactRepulsion.repulsion(&positions, &params);
        let coarse = BarnesHutRepulsion::new(1.2).repulsion(&positions, &params);

        assert!(coarse.iter().all(|f| f.is_finite()));
        assert!(relative_error(&coarse, &exact) < 0.25);
    }
}
