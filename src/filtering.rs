///////////////////////////////////////////////////////////////
//////////////////// module: filtering ////////////////////////
///////////////////////////////////////////////////////////////

/// Selects the representative set C' from all clients.
///
/// Clients are processed in increasing order of their fractional connection
/// cost; ties are broken deliberately by the lower client index, so the phase
/// is deterministic. A client that is still remaining becomes a
/// representative and removes every remaining client j' (itself included)
/// with client_dist(j, j') <= 4 * connection_cost(j').
///
/// Postcondition: the remaining set is drained completely and the
/// representatives are pairwise non-dominated under the removal rule. A
/// non-drained remaining set signals a logic defect, not a bad input.
use crate::errors::RoundingError;
use crate::instance::Instance;
use crate::relaxation::FractionalSolution;
use crate::types::{ClientIdx, Distance};

pub(crate) fn filter_representatives(
    instance: &Instance,
    fractional: &FractionalSolution,
) -> Result<Vec<ClientIdx>, RoundingError> {
    let n_clients = instance.n_clients();

    let mut connection_costs: Vec<Distance> = Vec::with_capacity(n_clients);
    for j in 0..n_clients {
        let cost = fractional.connection_cost(instance, j).ok_or_else(|| {
            RoundingError::InternalInvariantViolation(format!(
                "client {} has a candidate set without any fractional volume",
                j
            ))
        })?;
        connection_costs.push(cost);
    }

    // sort (cost, client) pairs directly; lowest index wins on equal cost
    let mut order: Vec<(Distance, ClientIdx)> = connection_costs
        .iter()
        .enumerate()
        .map(|(j, &cost)| (cost, j))
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut remaining = vec![true; n_clients];
    let mut representatives: Vec<ClientIdx> = Vec::new();

    for &(_, j) in order.iter() {
        if !remaining[j] {
            continue;
        }
        representatives.push(j);
        for j_other in 0..n_clients {
            if remaining[j_other]
                && instance.client_dist(j, j_other) <= 4.0 * connection_costs[j_other]
            {
                remaining[j_other] = false;
            }
        }
        if remaining[j] {
            // client_dist(j, j) <= 4 * cost(j) holds for every non-negative
            // metric with zero diagonal, so j must have removed itself
            return Err(RoundingError::InternalInvariantViolation(format!(
                "representative {} did not remove itself; the client metric has a non-zero diagonal",
                j
            )));
        }
    }

    if remaining.iter().any(|&r| r) {
        return Err(RoundingError::InternalInvariantViolation(
            "filtering failed to drain the remaining-client set".to_string(),
        ));
    }

    Ok(representatives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relaxation::solve_relaxation;

    // a fractional solution with hand-picked connection costs:
    // cost(0) = 0.5, cost(1) = 0.5, cost(2) = 3.0
    fn handmade() -> (Instance, FractionalSolution) {
        let instance = Instance::new(
            vec![
                vec![0.0, 1.0, 3.0],
                vec![1.0, 0.0, 3.0],
                vec![8.0, 8.0, 3.0],
            ],
            Some(vec![
                vec![0.0, 1.0, 20.0],
                vec![1.0, 0.0, 20.0],
                vec![20.0, 20.0, 0.0],
            ]),
        )
        .unwrap();
        let fractional = FractionalSolution {
            y: vec![0.5, 0.5, 1.0],
            x: vec![
                vec![0.5, 0.5, 0.0],
                vec![0.5, 0.5, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            keep: vec![true, true, true],
            candidates: vec![vec![0, 1], vec![0, 1], vec![2]],
            objective: 0.0,
        };
        (instance, fractional)
    }

    #[test]
    fn dominated_clients_are_pruned() {
        let (instance, fractional) = handmade();
        let reps = filter_representatives(&instance, &fractional).unwrap();
        // client 0 wins the tie against client 1 and absorbs it
        // (dist 1 <= 4 * 0.5); client 2 is far away and survives
        assert_eq!(reps, vec![0, 2]);
    }

    #[test]
    fn postconditions_hold_on_a_solved_instance() {
        let instance = Instance::new(
            vec![
                vec![0.0, 1.0, 6.0, 7.0, 13.0],
                vec![1.0, 0.0, 5.0, 6.0, 12.0],
                vec![6.0, 5.0, 0.0, 1.0, 7.0],
                vec![7.0, 6.0, 1.0, 0.0, 6.0],
                vec![13.0, 12.0, 7.0, 6.0, 0.0],
            ],
            None,
        )
        .unwrap();
        let fractional = solve_relaxation(&instance, 2).unwrap();
        let reps = filter_representatives(&instance, &fractional).unwrap();
        assert!(!reps.is_empty());

        let cost =
            |j| fractional.connection_cost(&instance, j).unwrap();

        // every non-representative was removed by some representative
        for j in 0..instance.n_clients() {
            if reps.contains(&j) {
                continue;
            }
            assert!(
                reps.iter()
                    .any(|&rep| instance.client_dist(rep, j) <= 4.0 * cost(j)),
                "client {} was dropped without a dominating representative",
                j
            );
        }

        // representatives are pairwise non-dominated: the earlier (cheaper)
        // one never lies within the removal radius of the later one
        for (a_pos, &a) in reps.iter().enumerate() {
            for &b in reps.iter().skip(a_pos + 1) {
                assert!(
                    instance.client_dist(a, b) > 4.0 * cost(b),
                    "representative {} should have removed representative {}",
                    a,
                    b
                );
            }
        }
    }
}
