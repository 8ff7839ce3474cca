//! Approximate k-medoids / facility location by LP rounding.
//!
//! Given pairwise dissimilarities between candidate facilities and clients and
//! a budget k, [solve] picks exactly k facilities ("medoids") so that the sum
//! over clients of the distance to the nearest open facility is provably close
//! to optimal. The pipeline first solves the LP relaxation of the problem and
//! then rounds the fractional solution in four phases:
//!
//! 1. **Filtering** selects a set of mutually far-apart representative clients.
//! 2. **Bundling** groups the fractionally open facilities around the
//!    representatives into disjoint bundles.
//! 3. **Matching** pairs up nearby representatives.
//! 4. **Sampling** repeatedly draws a random open set from the bundles and the
//!    leftover facilities until exactly k facilities are open.
//!
//! The randomized phases run on explicitly seeded generators, so a fixed seed
//! reproduces the returned medoid set exactly.
//!
//! ## Example
//!
//! ```rust
//! use lp_k_medoids::solve;
//!
//! // four points, two tight groups
//! let d = vec![
//!     vec![0.0, 1.0, 9.0, 10.0],
//!     vec![1.0, 0.0, 10.0, 9.0],
//!     vec![9.0, 10.0, 0.0, 1.0],
//!     vec![10.0, 9.0, 1.0, 0.0],
//! ];
//! let medoids = solve(d, 2).unwrap();
//! assert_eq!(medoids.len(), 2);
//! ```

pub mod types;
pub use types::{ClientCount, ClientIdx, Distance, FacilityCount, FacilityIdx};

mod errors;
pub use errors::RoundingError;

mod instance;
pub use instance::Instance;

mod assertions;
use assertions::assert_problem_parameters;

mod relaxation;
use relaxation::solve_relaxation;

mod filtering;
use filtering::filter_representatives;

mod bundling;
use bundling::build_bundles;
pub use bundling::DEFAULT_R_MAX;

mod matching;
use matching::match_representatives;

mod sampling;
use sampling::sample_open_set;
pub use sampling::DEFAULT_MAX_TRIALS;

use rand::rngs::StdRng;
use rand::SeedableRng;

// keeps the sampling trial stream independent of the bundling tie-breaks
const SAMPLING_SEED_OFFSET: u64 = 0x5851_F42D_4C95_7F2D;

/// Optional parameters of [solve_with_params]. Every `None` falls back to a
/// default.
#[derive(Debug, Clone, Default)]
pub struct OptionalParameters {
    /// 0: silent (default), 1: phase summaries, 2: verbose.
    pub verbose: Option<u8>,
    /// Threads for the sampling phase. `None` or `Some(1)`: sequential;
    /// `Some(0)`: one thread per core; sequential and parallel runs return the
    /// same medoid set for the same seed.
    pub thread_count: Option<usize>,
    /// Seed of the randomized phases. `None`: a fresh random seed.
    pub seed: Option<u64>,
    /// Cap on the rejection-sampling trials (default
    /// [DEFAULT_MAX_TRIALS]).
    pub max_trials: Option<usize>,
    /// Radius multiplier of the bundling phase (default [DEFAULT_R_MAX]).
    /// The bundle volume guarantee only holds for the default.
    pub r_max: Option<Distance>,
}

/// Computes an approximate k-medoids solution for a square dissimilarity
/// matrix whose rows/columns are both the candidate facilities and the
/// clients. This is the common calling contract shared with the other medoid
/// algorithms (distance matrix + k -> medoid indices).
///
/// Returns the sorted list of exactly k distinct facility indices (0-based,
/// matching the matrix indexing).
pub fn solve(
    distances: Vec<Vec<Distance>>,
    k: FacilityCount,
) -> Result<Vec<FacilityIdx>, RoundingError> {
    solve_with_params(distances, k, None, None)
}

/// The full entry point.
///
/// `costs` is the n_facilities x n_clients dissimilarity matrix. The
/// client-to-client metric `client_dists` defaults to `costs` itself when that
/// matrix is square; for a rectangular `costs` it must be supplied. The
/// client metric should be symmetric and satisfy the triangle inequality --
/// the approximation guarantee relies on it, although the algorithm
/// terminates either way.
///
/// On success the result contains exactly k sorted, distinct facility
/// indices; otherwise one of the [RoundingError] variants is returned and no
/// partial result is handed out.
pub fn solve_with_params(
    costs: Vec<Vec<Distance>>,
    k: FacilityCount,
    client_dists: Option<Vec<Vec<Distance>>>,
    optional: Option<OptionalParameters>,
) -> Result<Vec<FacilityIdx>, RoundingError> {
    let instance = Instance::new(costs, client_dists)?;
    assert_problem_parameters(&instance, k)?;

    let params = optional.unwrap_or_default();
    let verbose = params.verbose.unwrap_or(0);
    let r_max = params.r_max.unwrap_or(DEFAULT_R_MAX);
    let max_trials = params.max_trials.unwrap_or(DEFAULT_MAX_TRIALS);
    let seed = params.seed.unwrap_or_else(rand::random);
    let thread_count = match params.thread_count {
        None => 1,
        Some(0) => num_cpus::get(),
        Some(t) => t,
    };

    if !(r_max.is_finite() && r_max > 0.0) {
        return Err(RoundingError::InvalidArgument(format!(
            "the radius multiplier must be positive and finite, got {}",
            r_max
        )));
    }

    // with a full budget every facility opens; no randomness needed
    if k == instance.n_facilities() {
        if verbose >= 1 {
            println!("** k equals the number of facilities; opening all of them.");
        }
        return Ok((0..k).collect());
    }

    let fractional = solve_relaxation(&instance, k)?;
    if verbose >= 1 {
        println!(
            "** Phase 1: Solved the LP relaxation; objective value: {}",
            fractional.objective
        );
    }

    let representatives = filter_representatives(&instance, &fractional)?;
    if verbose >= 1 {
        println!(
            "** Phase 2: Filtered {} clients down to {} representatives.",
            instance.n_clients(),
            representatives.len()
        );
    }
    if verbose >= 2 {
        println!("    representatives: {:?}", representatives);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let bundles = build_bundles(&instance, &fractional, &representatives, r_max, &mut rng);
    if verbose >= 1 {
        println!(
            "** Phase 3: Bundled {} facilities into {} bundles.",
            bundles.bundled.iter().filter(|&&b| b).count(),
            bundles.bundles.len()
        );
    }

    let matches = match_representatives(&instance, &representatives);
    if verbose >= 1 {
        let singletons = matches.iter().filter(|m| m.second.is_none()).count();
        println!(
            "** Phase 4: Matched the representatives into {} pairs and {} singletons.",
            matches.len() - singletons,
            singletons
        );
    }

    let open = sample_open_set(
        &fractional,
        &bundles,
        &matches,
        k,
        max_trials,
        seed.wrapping_add(SAMPLING_SEED_OFFSET),
        thread_count,
    )?;
    if verbose >= 1 {
        println!("** Phase 5: Sampling accepted an open set of {} facilities.", open.len());
    }
    if verbose >= 2 {
        println!("    open facilities: {:?}", open);
    }

    Ok(open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Vec<Distance>> {
        // corners (0,0), (1,0), (0,1), (1,1) with euclidean distances
        let s = 2.0f64.sqrt();
        vec![
            vec![0.0, 1.0, 1.0, s],
            vec![1.0, 0.0, s, 1.0],
            vec![1.0, s, 0.0, 1.0],
            vec![s, 1.0, 1.0, 0.0],
        ]
    }

    fn connection_cost(distances: &[Vec<Distance>], medoids: &[FacilityIdx]) -> Distance {
        let n_clients = distances[0].len();
        (0..n_clients)
            .map(|j| {
                medoids
                    .iter()
                    .map(|&i| distances[i][j])
                    .fold(Distance::INFINITY, Distance::min)
            })
            .sum()
    }

    #[test]
    fn unit_square_with_two_medoids() {
        let d = unit_square();
        let medoids = solve(d.clone(), 2).unwrap();

        assert_eq!(medoids.len(), 2);
        assert!(medoids[0] < medoids[1]);
        assert!(medoids.iter().all(|&i| i < 4));

        // every 2-subset of the square corners has connection cost 2, and the
        // LP optimum is 2 as well, so the approximation factor of 3.25 leaves
        // plenty of room
        let cost = connection_cost(&d, &medoids);
        assert!((cost - 2.0).abs() < 1e-6);

        let instance = Instance::new(d, None).unwrap();
        let fractional = solve_relaxation(&instance, 2).unwrap();
        assert!(cost <= 3.25 * fractional.objective + 1e-6);
    }

    #[test]
    fn full_budget_returns_every_facility() {
        let d = unit_square();
        let medoids = solve(d.clone(), 4).unwrap();
        assert_eq!(medoids, vec![0, 1, 2, 3]);
        assert_eq!(connection_cost(&d, &medoids), 0.0);
    }

    #[test]
    fn fixed_seed_makes_the_result_reproducible() {
        let d = vec![
            vec![0.0, 1.0, 6.0, 7.0, 13.0],
            vec![1.0, 0.0, 5.0, 6.0, 12.0],
            vec![6.0, 5.0, 0.0, 1.0, 7.0],
            vec![7.0, 6.0, 1.0, 0.0, 6.0],
            vec![13.0, 12.0, 7.0, 6.0, 0.0],
        ];
        let params = OptionalParameters {
            seed: Some(7),
            ..Default::default()
        };
        let first = solve_with_params(d.clone(), 2, None, Some(params.clone())).unwrap();
        let second = solve_with_params(d, 2, None, Some(params)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn rectangular_instance_with_a_client_metric() {
        // facilities at 0, 5, 10 on a line; clients at 0, 1, 9, 10
        let facility_pos = [0.0f64, 5.0, 10.0];
        let client_pos = [0.0f64, 1.0, 9.0, 10.0];
        let costs: Vec<Vec<Distance>> = facility_pos
            .iter()
            .map(|f| client_pos.iter().map(|c| (f - c).abs()).collect())
            .collect();
        let client_dists: Vec<Vec<Distance>> = client_pos
            .iter()
            .map(|a| client_pos.iter().map(|b| (a - b).abs()).collect())
            .collect();

        let params = OptionalParameters {
            seed: Some(11),
            ..Default::default()
        };
        let medoids = solve_with_params(costs, 2, Some(client_dists), Some(params)).unwrap();
        assert_eq!(medoids.len(), 2);
        assert!(medoids.iter().all(|&i| i < 3));
        assert!(medoids[0] < medoids[1]);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(matches!(
            solve(unit_square(), 5),
            Err(RoundingError::InvalidArgument(_))
        ));
        assert!(matches!(
            solve(unit_square(), 0),
            Err(RoundingError::InvalidArgument(_))
        ));
        assert!(matches!(
            solve(vec![vec![0.0, -1.0], vec![1.0, 0.0]], 1),
            Err(RoundingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn degenerate_radius_multiplier_is_rejected() {
        let params = OptionalParameters {
            r_max: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            solve_with_params(unit_square(), 2, None, Some(params)),
            Err(RoundingError::InvalidArgument(_))
        ));
    }
}
