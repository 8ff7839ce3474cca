///////////////////////////////////////////////////////////////
/////////////////// module: relaxation ////////////////////////
///////////////////////////////////////////////////////////////

/// Builds and solves the LP relaxation of the k-medoids problem and stores the
/// fractional solution for the rounding phases.
///
/// Variables: x[j][i] in [0,1] (assignment of client j to facility i) and
/// y[i] in [0,1] (openness of facility i).
/// Constraints: for every client j: sum_i x[j][i] = 1;
///              for every pair: x[j][i] <= y[i];
///              sum_i y[i] <= k.
/// Objective: minimize sum_{i,j} cost(i,j) * x[j][i].
///
/// The solver itself is a black box behind good_lp; infeasible or unbounded
/// reports are surfaced as [RoundingError::SolverFailure] and never retried.
use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};

use crate::errors::RoundingError;
use crate::instance::Instance;
use crate::types::{ClientIdx, Distance, FacilityCount, FacilityIdx};

/// Fractional mass below this threshold is treated as zero when deciding which
/// facilities to keep and which assignments count as candidates.
pub(crate) const FRACTIONAL_EPS: f64 = 1e-9;

/// The optimal solution of the relaxation. Produced once by
/// [solve_relaxation] and read-only afterwards.
pub(crate) struct FractionalSolution {
    /// Fractional openness y[i] of each facility.
    pub y: Vec<f64>,
    /// Fractional assignment x[j][i] of client j to facility i.
    pub x: Vec<Vec<f64>>,
    /// keep[i] is true iff y[i] carries positive mass; facilities without mass
    /// are excluded from all later phases.
    pub keep: Vec<bool>,
    /// Candidate facility set F[j] of each client: kept facilities with
    /// positive assignment mass x[j][i].
    pub candidates: Vec<Vec<FacilityIdx>>,
    /// Optimal objective value of the relaxation.
    pub objective: f64,
}

impl FractionalSolution {
    /// volume(S) = sum of y[i] over the facility set S.
    pub fn volume(&self, set: &[FacilityIdx]) -> f64 {
        set.iter().map(|&i| self.y[i]).sum()
    }

    /// Volume-weighted mean distance from client j to the facility set S.
    /// Returns None if the set carries no volume (the mean is undefined then).
    pub fn average_distance(
        &self,
        instance: &Instance,
        set: &[FacilityIdx],
        j: ClientIdx,
    ) -> Option<Distance> {
        let vol = self.volume(set);
        if vol <= 0.0 {
            return None;
        }
        let weighted: f64 = set.iter().map(|&i| self.y[i] * instance.cost(i, j)).sum();
        Some(weighted / vol)
    }

    /// Fractional connection cost of client j: the average distance to its
    /// candidate set F[j]. None if F[j] carries no volume, which would mean
    /// the relaxation handed us a client without any assignment mass.
    pub fn connection_cost(&self, instance: &Instance, j: ClientIdx) -> Option<Distance> {
        self.average_distance(instance, &self.candidates[j], j)
    }

    /// ball(j, r): all kept facilities strictly within distance r of client j.
    pub fn ball(&self, instance: &Instance, j: ClientIdx, r: Distance) -> Vec<FacilityIdx> {
        (0..self.y.len())
            .filter(|&i| self.keep[i] && instance.cost(i, j) < r)
            .collect()
    }

    // Verifies the LP invariants right after the solver adapter. Only active in
    // debug builds; a violation here means the solver (or the extraction) is
    // broken, not the input.
    #[cfg(debug_assertions)]
    fn check_invariants(&self, k: FacilityCount) {
        const TOL: f64 = 1e-5;
        for (j, row) in self.x.iter().enumerate() {
            let total: f64 = row.iter().sum();
            debug_assert!(
                (total - 1.0).abs() <= TOL,
                "client {} has total assignment mass {} instead of 1",
                j,
                total
            );
            for (i, &xv) in row.iter().enumerate() {
                debug_assert!(
                    xv <= self.y[i] + TOL,
                    "x[{}][{}] = {} exceeds y[{}] = {}",
                    j,
                    i,
                    xv,
                    i,
                    self.y[i]
                );
            }
        }
        let total_openness: f64 = self.y.iter().sum();
        debug_assert!(
            total_openness <= k as f64 + TOL,
            "total openness {} exceeds k = {}",
            total_openness,
            k
        );
    }
}

/// Solves the relaxation for the given instance and facility budget k.
pub(crate) fn solve_relaxation(
    instance: &Instance,
    k: FacilityCount,
) -> Result<FractionalSolution, RoundingError> {
    let n_facilities = instance.n_facilities();
    let n_clients = instance.n_clients();

    let mut vars = variables!();
    let y_vars: Vec<Variable> = (0..n_facilities)
        .map(|_| vars.add(variable().min(0.0).max(1.0)))
        .collect();
    let x_vars: Vec<Vec<Variable>> = (0..n_clients)
        .map(|_| {
            (0..n_facilities)
                .map(|_| vars.add(variable().min(0.0).max(1.0)))
                .collect()
        })
        .collect();

    let mut objective = Expression::with_capacity(n_facilities * n_clients);
    for (j, row) in x_vars.iter().enumerate() {
        for (i, &xv) in row.iter().enumerate() {
            objective.add_mul(instance.cost(i, j), xv);
        }
    }

    let mut model = vars.minimise(objective).using(default_solver);

    // every client distributes one unit of assignment mass
    for row in x_vars.iter() {
        let mut assigned = Expression::with_capacity(n_facilities);
        for &xv in row.iter() {
            assigned.add_mul(1.0, xv);
        }
        model = model.with(assigned.eq(1.0));
    }

    // assignment mass only flows to (fractionally) open facilities
    for row in x_vars.iter() {
        for (i, &xv) in row.iter().enumerate() {
            model = model.with((1.0 * xv - y_vars[i]).leq(0.0));
        }
    }

    // the openness budget
    let mut opened = Expression::with_capacity(n_facilities);
    for &yv in y_vars.iter() {
        opened.add_mul(1.0, yv);
    }
    model = model.with(opened.leq(k as f64));

    let solution = model.solve().map_err(map_resolution_error)?;

    let y: Vec<f64> = y_vars
        .iter()
        .map(|&v| solution.value(v).clamp(0.0, 1.0))
        .collect();
    let x: Vec<Vec<f64>> = x_vars
        .iter()
        .map(|row| row.iter().map(|&v| solution.value(v).clamp(0.0, 1.0)).collect())
        .collect();

    let keep: Vec<bool> = y.iter().map(|&yv| yv > FRACTIONAL_EPS).collect();
    let candidates: Vec<Vec<FacilityIdx>> = x
        .iter()
        .map(|row| {
            (0..n_facilities)
                .filter(|&i| keep[i] && row[i] > FRACTIONAL_EPS)
                .collect()
        })
        .collect();

    let objective = x
        .iter()
        .enumerate()
        .map(|(j, row)| -> f64 {
            row.iter()
                .enumerate()
                .map(|(i, &xv)| instance.cost(i, j) * xv)
                .sum()
        })
        .sum();

    let fractional = FractionalSolution {
        y,
        x,
        keep,
        candidates,
        objective,
    };

    #[cfg(debug_assertions)]
    fractional.check_invariants(k);

    Ok(fractional)
}

fn map_resolution_error(err: ResolutionError) -> RoundingError {
    match err {
        ResolutionError::Infeasible => {
            RoundingError::SolverFailure("the relaxation is infeasible".to_string())
        }
        ResolutionError::Unbounded => {
            RoundingError::SolverFailure("the relaxation is unbounded".to_string())
        }
        other => RoundingError::SolverFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_instance() -> Instance {
        // two tight groups: facilities 0/1 near clients 0/1, facilities 2/3 near clients 2/3
        Instance::new(
            vec![
                vec![0.0, 1.0, 9.0, 10.0],
                vec![1.0, 0.0, 10.0, 9.0],
                vec![9.0, 10.0, 0.0, 1.0],
                vec![10.0, 9.0, 1.0, 0.0],
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn relaxation_satisfies_lp_invariants() {
        let instance = two_cluster_instance();
        let frac = solve_relaxation(&instance, 2).unwrap();

        for j in 0..instance.n_clients() {
            let total: f64 = frac.x[j].iter().sum();
            assert!((total - 1.0).abs() < 1e-5, "client {} mass {}", j, total);
            for i in 0..instance.n_facilities() {
                assert!(frac.x[j][i] <= frac.y[i] + 1e-5);
            }
        }
        assert!(frac.y.iter().sum::<f64>() <= 2.0 + 1e-5);
    }

    #[test]
    fn relaxation_finds_the_obvious_optimum() {
        // with k = 2 one unit of mass stays inside each tight group, so every
        // client pays at most the in-group distance 1; the LP optimum is 2
        // (every client j pays at least (1 - y of its closest facility) * 1,
        // which sums to 4 - sum y >= 2)
        let instance = two_cluster_instance();
        let frac = solve_relaxation(&instance, 2).unwrap();
        assert!((frac.objective - 2.0).abs() < 1e-5);
    }

    #[test]
    fn infeasible_budget_is_a_solver_failure() {
        // k = 0 passes no facility mass at all, so sum x = 1 cannot hold;
        // the public entry rejects k = 0 earlier, the adapter must propagate
        let instance = two_cluster_instance();
        assert!(matches!(
            solve_relaxation(&instance, 0),
            Err(RoundingError::SolverFailure(_))
        ));
    }

    #[test]
    fn aggregate_helpers() {
        let instance = Instance::new(
            vec![
                vec![0.0, 2.0],
                vec![1.0, 1.0],
                vec![2.0, 0.0],
            ],
            Some(vec![vec![0.0, 2.0], vec![2.0, 0.0]]),
        )
        .unwrap();
        let frac = FractionalSolution {
            y: vec![0.5, 0.5, 0.0],
            x: vec![vec![0.5, 0.5, 0.0], vec![0.0, 0.5, 0.5]],
            keep: vec![true, true, false],
            candidates: vec![vec![0, 1], vec![1]],
            objective: 0.0,
        };

        assert_eq!(frac.volume(&[0, 1]), 1.0);
        assert_eq!(frac.volume(&[]), 0.0);

        // weighted mean of cost(0,0) = 0 and cost(1,0) = 1 with equal weights
        assert_eq!(frac.average_distance(&instance, &[0, 1], 0), Some(0.5));
        assert_eq!(frac.average_distance(&instance, &[], 0), None);

        assert_eq!(frac.connection_cost(&instance, 0), Some(0.5));
        assert_eq!(frac.connection_cost(&instance, 1), Some(1.0));

        // facility 2 is not kept, so it never shows up in a ball
        assert_eq!(frac.ball(&instance, 0, 10.0), vec![0, 1]);
        assert_eq!(frac.ball(&instance, 0, 1.0), vec![0]);
        assert!(frac.ball(&instance, 0, 0.0).is_empty());
    }
}
