///////////////////////////////////////////////////////////////
///////////////////// module: bundling ////////////////////////
///////////////////////////////////////////////////////////////

/// Partitions the relevant facilities into disjoint bundles, one per
/// representative.
///
/// For a representative j let R[j] be half the distance to the nearest other
/// representative (infinite for a singleton C'). The bundle candidates of j
/// are the facilities of F[j] strictly within r_max * R[j] of j. Every
/// facility that is a bundle candidate of at least one representative is put
/// into exactly one bundle: that of the representative with minimal cost(i, j),
/// ties broken uniformly at random. All other facilities stay unbundled and
/// are opened independently later.
use rand::rngs::StdRng;
use rand::Rng;

use crate::instance::Instance;
use crate::relaxation::FractionalSolution;
use crate::types::{ClientIdx, Distance, FacilityIdx, RepIdx};

/// Default radius multiplier for the bundle candidate balls.
pub const DEFAULT_R_MAX: Distance = 1.5;

/// Disjoint facility bundles, parallel to the representative set.
pub(crate) struct Bundles {
    /// bundles[r] holds the facilities bundled to representative r.
    pub bundles: Vec<Vec<FacilityIdx>>,
    /// bundled[i] is true iff facility i belongs to some bundle.
    pub bundled: Vec<bool>,
}

pub(crate) fn build_bundles(
    instance: &Instance,
    fractional: &FractionalSolution,
    representatives: &[ClientIdx],
    r_max: Distance,
    rng: &mut StdRng,
) -> Bundles {
    let n_facilities = instance.n_facilities();

    // half the distance to the nearest other representative
    let radius: Vec<Distance> = representatives
        .iter()
        .map(|&j| {
            representatives
                .iter()
                .filter(|&&j_other| j_other != j)
                .map(|&j_other| instance.client_dist(j, j_other))
                .fold(Distance::INFINITY, Distance::min)
                * 0.5
        })
        .collect();

    // bundle candidates F'[r] = ball(j, r_max * R[j]) intersected with F[j]
    let candidate_sets: Vec<Vec<FacilityIdx>> = representatives
        .iter()
        .enumerate()
        .map(|(r, &j)| {
            let ball = fractional.ball(instance, j, r_max * radius[r]);
            fractional.candidates[j]
                .iter()
                .copied()
                .filter(|i| ball.contains(i))
                .collect()
        })
        .collect();

    // for each facility, the representatives whose candidate set contains it
    let mut claimants: Vec<Vec<RepIdx>> = vec![Vec::new(); n_facilities];
    for (r, set) in candidate_sets.iter().enumerate() {
        for &i in set.iter() {
            claimants[i].push(r);
        }
    }

    let mut bundles: Vec<Vec<FacilityIdx>> = vec![Vec::new(); representatives.len()];
    let mut bundled = vec![false; n_facilities];

    for (i, claiming) in claimants.iter().enumerate() {
        if claiming.is_empty() {
            continue;
        }
        let closest = claiming
            .iter()
            .map(|&r| instance.cost(i, representatives[r]))
            .fold(Distance::INFINITY, Distance::min);
        let at_minimum: Vec<RepIdx> = claiming
            .iter()
            .copied()
            .filter(|&r| instance.cost(i, representatives[r]) <= closest)
            .collect();
        let winner = at_minimum[rng.gen_range(0..at_minimum.len())];
        bundles[winner].push(i);
        bundled[i] = true;
    }

    #[cfg(debug_assertions)]
    if (r_max - DEFAULT_R_MAX).abs() < f64::EPSILON {
        const TOL: f64 = 1e-4;
        for (r, bundle) in bundles.iter().enumerate() {
            if bundle.is_empty() {
                continue;
            }
            let vol = fractional.volume(bundle);
            debug_assert!(
                (0.5 - TOL..=1.0 + TOL).contains(&vol),
                "bundle of representative {} has volume {}",
                r,
                vol
            );
        }
    }

    Bundles { bundles, bundled }
}
