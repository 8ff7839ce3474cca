use thiserror::Error;

/// Everything that can go wrong while rounding. The top-level entry points either
/// return exactly k facility indices or one of these variants; a partial medoid
/// list is never handed out.
#[derive(Debug, Error)]
pub enum RoundingError {
    /// The caller handed us something malformed: k out of range, a ragged or
    /// negative cost matrix, or a client metric of the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The LP solver reported infeasible/unbounded or failed internally. The
    /// relaxation is feasible for every valid input, so this points at a
    /// misconfigured solver rather than at bad luck. Not retried.
    #[error("LP solver failure: {0}")]
    SolverFailure(String),

    /// A logic defect inside the rounding pipeline, e.g. the filtering phase
    /// could not drain the remaining-client set. Fails loudly on purpose.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// The rejection-sampling loop exhausted its trial budget without hitting
    /// exactly k open facilities. Callers may retry with a different seed.
    #[error("sampling did not converge within {trials} trials")]
    SamplingNonconvergent { trials: usize },
}
