extern crate lp_k_medoids;

use lp_k_medoids::{solve_with_params, Distance, OptionalParameters};
use rand::Rng;

fn main() {
    let n = 40;
    let k = 4;

    // random points in the [-100,100]x[-100,100] box
    let mut rng = rand::thread_rng();
    let positions: Vec<(f64, f64)> = (0..n)
        .map(|_| {
            (
                rng.gen_range(-100.0f64..100.0f64),
                rng.gen_range(-100.0f64..100.0f64),
            )
        })
        .collect();
    let distances: Vec<Vec<Distance>> = positions
        .iter()
        .map(|a| {
            positions
                .iter()
                .map(|b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt())
                .collect()
        })
        .collect();

    let params = OptionalParameters {
        verbose: Some(1),
        seed: Some(42),
        ..Default::default()
    };

    match solve_with_params(distances.clone(), k, None, Some(params)) {
        Ok(medoids) => {
            let cost: Distance = (0..n)
                .map(|j| {
                    medoids
                        .iter()
                        .map(|&i| distances[i][j])
                        .fold(Distance::INFINITY, Distance::min)
                })
                .sum();
            println!("** Opened {} medoids: {:?}", medoids.len(), medoids);
            println!("** Total connection cost: {:.3}", cost);
        }
        Err(error) => println!("Computation failed. Reason: {}", error),
    }
}
