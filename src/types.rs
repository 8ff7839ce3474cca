/// Type of the number of candidate facilities.
pub type FacilityCount = usize;
/// Type of the number of clients.
pub type ClientCount = usize;

/// Index of a candidate facility; corresponds to a row of the cost matrix.
pub type FacilityIdx = usize;
/// Index of a client; corresponds to a column of the cost matrix.
pub type ClientIdx = usize;
/// Type of all dissimilarity values.
pub type Distance = f64;

/// Position of a representative within the filtered representative set.
pub(crate) type RepIdx = usize;
