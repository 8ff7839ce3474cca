use crate::errors::RoundingError;
use crate::instance::Instance;
use crate::types::FacilityCount;

/// Checks the problem parameters against the instance.
///
/// If this check passes the relaxation is feasible and the main algorithm will
/// return exactly k facility indices (or a sampling/solver error, never a
/// malformed result).
///
/// Fails with [RoundingError::InvalidArgument] if one of the following is violated:
/// * k must be at least 1.
/// * k must not exceed the number of candidate facilities.
pub(crate) fn assert_problem_parameters(
    instance: &Instance,
    k: FacilityCount,
) -> Result<(), RoundingError> {
    if k < 1 {
        return Err(RoundingError::InvalidArgument(
            "we have k = 0; at least one facility must be opened".to_string(),
        ));
    }
    if k > instance.n_facilities() {
        return Err(RoundingError::InvalidArgument(format!(
            "we have k > n_facilities ({} > {}); cannot open more facilities than there are candidates",
            k,
            instance.n_facilities()
        )));
    }
    Ok(())
}
