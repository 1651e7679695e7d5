/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Analytic evaluation of each coupling with exact derivatives.

use crate::bonds::{Bond, BondRegistry};
use crate::DIPOLAR_CONST;

use itertools::Itertools;
use rayon_cond::CondIterator;
use rdc2_array_types::{M33, V3};
use rdc2_structure::Cell;

/// Per-step output of the direct evaluator.
///
/// Recomputed in full on every call; nothing is retained between steps.
#[derive(Debug, Clone)]
pub struct DirectOutput {
    /// One coupling per bond.
    pub couplings: Vec<f64>,
    /// Gradient of each bond's coupling on each participating particle,
    /// indexed like the position input (bond `i` owns entries `2i`, `2i+1`).
    pub gradients: Vec<V3>,
    /// Per-bond virial contribution: the outer product of the bond's
    /// minimum-image displacement with the gradient on its first particle.
    pub virials: Vec<M33>,
}

impl DirectOutput {
    fn zeros(num_bonds: usize) -> DirectOutput {
        DirectOutput {
            couplings: vec![0.0; num_bonds],
            gradients: vec![V3::zero(); 2 * num_bonds],
            virials: vec![M33::zero(); num_bonds],
        }
    }

    // Element-wise sum of two contributions. Each bond is owned by exactly
    // one worker, so every entry has a single nonzero contributor.
    fn merge(mut self, other: DirectOutput) -> DirectOutput {
        for (a, b) in self.couplings.iter_mut().zip_eq(other.couplings) {
            *a += b;
        }
        for (a, b) in self.gradients.iter_mut().zip_eq(other.gradients) {
            *a += b;
        }
        for (a, b) in self.virials.iter_mut().zip_eq(other.virials) {
            *a += b;
        }
        self
    }
}

/// Computes couplings analytically, with their exact gradients and virial.
#[derive(Debug)]
pub struct DirectEvaluator {
    registry: BondRegistry,
    serial: bool,
}

impl DirectEvaluator {
    pub fn new(registry: BondRegistry, serial: bool) -> DirectEvaluator {
        DirectEvaluator { registry, serial }
    }

    pub fn registry(&self) -> &BondRegistry
    { &self.registry }

    /// The worker count the next `compute` call will use.
    pub fn num_workers(&self) -> usize {
        match self.serial {
            true => 1,
            false => rayon::current_num_threads(),
        }
    }

    /// Evaluate every bond.
    ///
    /// `positions` holds one entry per participating particle, ordered as
    /// configured (bond `i` reads entries `2i` and `2i + 1`).
    pub fn compute(&self, positions: &[V3], cell: &Cell) -> DirectOutput {
        self.compute_with_workers(self.num_workers(), positions, cell)
    }

    /// Evaluate with an explicit worker count.
    ///
    /// Worker `k` owns bonds `k, k + P, k + 2P, …`. Each worker fills an
    /// owned, zero-initialized full-length contribution; the contributions
    /// are then combined by an element-wise sum, which completes only once
    /// every worker's part is in. The final arrays are identical for any
    /// worker count.
    pub fn compute_with_workers(&self, num_workers: usize, positions: &[V3], cell: &Cell) -> DirectOutput {
        assert!(num_workers > 0);
        assert_eq!(
            positions.len(), self.registry.num_particles(),
            "wrong number of positions for the configured bonds",
        );

        let contributions: Vec<DirectOutput> = {
            CondIterator::new(0..num_workers, num_workers > 1)
                .map(|rank| self.worker_contribution(rank, num_workers, positions, cell))
                .collect()
        };
        contributions.into_iter()
            .fold(DirectOutput::zeros(self.registry.len()), DirectOutput::merge)
    }

    fn worker_contribution(
        &self,
        rank: usize,
        num_workers: usize,
        positions: &[V3],
        cell: &Cell,
    ) -> DirectOutput {
        let bonds = self.registry.bonds();
        let mut out = DirectOutput::zeros(bonds.len());
        for (index, bond) in bonds.iter().enumerate().skip(rank).step_by(num_workers) {
            let delta = cell.min_image_displacement(positions[2 * index], positions[2 * index + 1]);
            let BondOutput { coupling, grad, virial } = compute_bond(bond, delta);

            out.couplings[index] = coupling;
            out.gradients[2 * index] = grad;
            // Newton's third law, exactly
            out.gradients[2 * index + 1] = -grad;
            out.virials[index] = virial;
        }
        out
    }
}

struct BondOutput {
    coupling: f64,
    /// Gradient on the first particle.
    grad: V3,
    virial: M33,
}

/// The coupling of one bond and its exact derivative, given the
/// minimum-image displacement from the first particle to the second.
///
/// A zero-length displacement is not guarded; coincident particles are a
/// degenerate configuration and produce non-finite output.
fn compute_bond(bond: &Bond, delta: V3) -> BondOutput {
    let d2 = delta.sqnorm();
    let d = d2.sqrt();
    let ind = 1.0 / d;
    let id3 = ind * ind * ind;
    let id7 = id3 * id3 * ind;

    let max = -DIPOLAR_CONST * bond.scale * bond.gyrom;
    let dmax = max * id3;
    let cos_theta = delta[2] * ind;
    let coupling = 0.5 * dmax * (3.0 * cos_theta * cos_theta - 1.0);

    // derivative of  0.5 * max * (3 z^2 / d^5 - 1 / d^3)  with respect to delta
    let z2 = delta[2] * delta[2];
    let grad_delta = V3([
        delta[0] * (d2 - 5.0 * z2),
        delta[1] * (d2 - 5.0 * z2),
        delta[2] * (3.0 * d2 - 5.0 * z2),
    ]) * (1.5 * max * id7);

    // delta = (-pos_a) + pos_b
    let grad = -grad_delta;
    let virial = M33::outer(&delta, &grad);
    BondOutput { coupling, grad, virial }
}
