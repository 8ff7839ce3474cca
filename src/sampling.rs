///////////////////////////////////////////////////////////////
///////////////////// module: sampling ////////////////////////
///////////////////////////////////////////////////////////////

/// The randomized rounding loop.
///
/// Each trial opens facilities at random: matched bundle pairs open one
/// facility from one side or one from each (correlated through a single
/// uniform draw), a singleton bundle opens one facility with probability equal
/// to its volume, and every unbundled kept facility is opened independently
/// with probability y[i]. A trial is accepted iff exactly k facilities end up
/// open; otherwise it is discarded and redrawn. The expected number of trials
/// is constant under the theoretical guarantee, but the loop is capped and
/// reports [RoundingError::SamplingNonconvergent] when the cap is exhausted.
///
/// Every trial draws from its own rng seeded by mixing the base seed with the
/// trial number. A fixed base seed therefore reproduces the exact sequence of
/// trials, and the parallel path (rayon, first accepted trial in trial order
/// wins) returns the same open set as the sequential one.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::ThreadPoolBuilder;

use crate::bundling::Bundles;
use crate::errors::RoundingError;
use crate::matching::Match;
use crate::relaxation::FractionalSolution;
use crate::types::{FacilityCount, FacilityIdx};

/// Default cap on the number of rejection-sampling trials.
pub const DEFAULT_MAX_TRIALS: usize = 10_000;

// trials handed to each thread per parallel round
const TRIALS_PER_THREAD: usize = 64;

pub(crate) fn sample_open_set(
    fractional: &FractionalSolution,
    bundles: &Bundles,
    matches: &[Match],
    k: FacilityCount,
    max_trials: usize,
    seed: u64,
    thread_count: usize,
) -> Result<Vec<FacilityIdx>, RoundingError> {
    for m in matches.iter() {
        let valid = m.first < bundles.bundles.len()
            && m.second.map_or(true, |b| b < bundles.bundles.len());
        if !valid {
            return Err(RoundingError::InternalInvariantViolation(format!(
                "match ({}, {:?}) references an unknown representative; only {} bundles exist",
                m.first,
                m.second,
                bundles.bundles.len()
            )));
        }
    }

    let n_facilities = fractional.y.len();
    let volumes: Vec<f64> = bundles
        .bundles
        .iter()
        .map(|bundle| fractional.volume(bundle))
        .collect();
    let unbundled: Vec<FacilityIdx> = (0..n_facilities)
        .filter(|&i| fractional.keep[i] && !bundles.bundled[i])
        .collect();

    let run_trial = |trial: usize| -> Option<Vec<FacilityIdx>> {
        let mut rng = StdRng::seed_from_u64(mix_seed(seed, trial));
        let mut open = vec![false; n_facilities];

        for m in matches.iter() {
            match m.second {
                Some(partner) => {
                    // one uniform draw decides which side of the pair opens;
                    // the branch cut-offs guarantee at least one side does
                    let vol_first = volumes[m.first];
                    let vol_partner = volumes[partner];
                    let u: f64 = rng.gen();
                    if u < 1.0 - vol_partner {
                        open_one(&bundles.bundles[m.first], &mut rng, &mut open);
                    } else if u < (1.0 - vol_partner) + (1.0 - vol_first) {
                        open_one(&bundles.bundles[partner], &mut rng, &mut open);
                    } else {
                        open_one(&bundles.bundles[m.first], &mut rng, &mut open);
                        open_one(&bundles.bundles[partner], &mut rng, &mut open);
                    }
                }
                None => {
                    if rng.gen::<f64>() < volumes[m.first] {
                        open_one(&bundles.bundles[m.first], &mut rng, &mut open);
                    }
                }
            }
        }

        for &i in unbundled.iter() {
            if rng.gen::<f64>() < fractional.y[i] {
                open[i] = true;
            }
        }

        if open.iter().filter(|&&o| o).count() == k {
            Some(
                open.iter()
                    .enumerate()
                    .filter_map(|(i, &o)| o.then_some(i))
                    .collect(),
            )
        } else {
            None
        }
    };

    if thread_count <= 1 {
        for trial in 0..max_trials {
            if let Some(open) = run_trial(trial) {
                return Ok(open);
            }
        }
        Err(RoundingError::SamplingNonconvergent { trials: max_trials })
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .expect("could not build the sampling thread pool");
        pool.install(|| {
            let batch = thread_count * TRIALS_PER_THREAD;
            let mut start = 0;
            while start < max_trials {
                let end = usize::min(start + batch, max_trials);
                if let Some(open) = (start..end).into_par_iter().find_map_first(&run_trial) {
                    return Ok(open);
                }
                start = end;
            }
            Err(RoundingError::SamplingNonconvergent { trials: max_trials })
        })
    }
}

// one facility uniformly at random from the bundle; a degenerate fractional
// solution can leave a bundle empty, in which case the trial opens fewer
// facilities and is rejected by the cardinality check
fn open_one(bundle: &[FacilityIdx], rng: &mut StdRng, open: &mut [bool]) {
    if bundle.is_empty() {
        return;
    }
    open[bundle[rng.gen_range(0..bundle.len())]] = true;
}

fn mix_seed(seed: u64, trial: usize) -> u64 {
    seed ^ (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
