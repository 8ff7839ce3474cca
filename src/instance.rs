///////////////////////////////////////////////////////////////
//////////////////// module: instance /////////////////////////
///////////////////////////////////////////////////////////////

/// A validated facility-location instance.
///
/// Holds the facility-to-client cost matrix (n_facilities x n_clients) and a
/// square client-to-client metric (n_clients x n_clients). When the cost
/// matrix is square and no separate client metric is supplied, facilities and
/// clients are taken to coincide and the cost matrix doubles as the client
/// metric. That is the usual k-medoids setting.
///
/// The client metric is expected to be symmetric and to satisfy the triangle
/// inequality; the approximation guarantee of the rounding pipeline relies on
/// it. This is a precondition and is not verified here (it would cost O(n^3)),
/// only non-negativity and shape are checked.
use crate::errors::RoundingError;
use crate::types::{ClientCount, ClientIdx, Distance, FacilityCount, FacilityIdx};

pub struct Instance {
    costs: Vec<Vec<Distance>>,         // costs[i][j]: facility i to client j
    client_dists: Vec<Vec<Distance>>,  // client_dists[j][j']
}

impl Instance {
    /// Builds an instance from a cost matrix and an optional client metric.
    ///
    /// Fails with [RoundingError::InvalidArgument] if the cost matrix is empty
    /// or ragged, if any entry is negative or non-finite, if the client metric
    /// is not a quadratic n_clients x n_clients matrix, or if the cost matrix
    /// is rectangular and no client metric is given.
    pub fn new(
        costs: Vec<Vec<Distance>>,
        client_dists: Option<Vec<Vec<Distance>>>,
    ) -> Result<Instance, RoundingError> {
        let n_facilities = costs.len();
        if n_facilities == 0 {
            return Err(RoundingError::InvalidArgument(
                "the cost matrix has no rows, i.e., there are no candidate facilities".to_string(),
            ));
        }
        let n_clients = costs[0].len();
        if n_clients == 0 {
            return Err(RoundingError::InvalidArgument(
                "the cost matrix has no columns, i.e., there are no clients".to_string(),
            ));
        }
        for (i, row) in costs.iter().enumerate() {
            if row.len() != n_clients {
                return Err(RoundingError::InvalidArgument(format!(
                    "cost matrix is ragged: row {} has {} entries, row 0 has {}",
                    i,
                    row.len(),
                    n_clients
                )));
            }
            check_entries(row, "cost matrix", i)?;
        }

        let client_dists = match client_dists {
            Some(dists) => {
                if dists.len() != n_clients {
                    return Err(RoundingError::InvalidArgument(format!(
                        "client metric has {} rows but there are {} clients",
                        dists.len(),
                        n_clients
                    )));
                }
                for (j, row) in dists.iter().enumerate() {
                    if row.len() != n_clients {
                        return Err(RoundingError::InvalidArgument(format!(
                            "client metric is not quadratic: row {} has {} entries; expected {}",
                            j,
                            row.len(),
                            n_clients
                        )));
                    }
                    check_entries(row, "client metric", j)?;
                }
                dists
            }
            None => {
                if n_facilities != n_clients {
                    return Err(RoundingError::InvalidArgument(format!(
                        "cost matrix is {}x{}; a separate client metric is required unless facilities and clients coincide",
                        n_facilities, n_clients
                    )));
                }
                costs.clone()
            }
        };

        Ok(Instance {
            costs,
            client_dists,
        })
    }

    /// Number of candidate facilities (rows of the cost matrix).
    pub fn n_facilities(&self) -> FacilityCount {
        self.costs.len()
    }

    /// Number of clients (columns of the cost matrix).
    pub fn n_clients(&self) -> ClientCount {
        self.costs[0].len()
    }

    /// Cost of serving client j from facility i.
    pub fn cost(&self, i: FacilityIdx, j: ClientIdx) -> Distance {
        self.costs[i][j]
    }

    /// Distance between two clients in the client metric.
    pub fn client_dist(&self, j1: ClientIdx, j2: ClientIdx) -> Distance {
        self.client_dists[j1][j2]
    }
}

fn check_entries(row: &[Distance], name: &str, idx: usize) -> Result<(), RoundingError> {
    for (col, &entry) in row.iter().enumerate() {
        if !entry.is_finite() || entry < 0.0 {
            return Err(RoundingError::InvalidArgument(format!(
                "{} entry ({}, {}) is {}; all dissimilarities must be finite and non-negative",
                name, idx, col, entry
            )));
        }
    }
    Ok(())
}
