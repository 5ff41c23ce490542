use crate::distance::euclidean;
use crate::error::{InvalidKSnafu, Result};
use crate::rng;
use crate::types::{CentroidSet, Dataset};
use rand::RngExt;
use snafu::prelude::*;
use tracing::debug;

/// Initial centroids picked by k-means++.
#[derive(Debug, Clone, PartialEq)]
pub struct Seeding {
    pub centroids: CentroidSet,
    /// Source row of every centroid, in selection order.
    pub indices: Vec<usize>,
}

impl Seeding {
    /// Identifiers of the chosen points, in selection order.
    pub fn ids(&self, dataset: &Dataset) -> Vec<i64> {
        self.indices.iter().map(|&i| dataset.id(i)).collect()
    }
}

// Zero weights are never drawn, `sum` must be positive.
#[inline(always)]
fn sample_by_distance(rng: &mut impl RngExt, weights: &[f64], sum: f64) -> usize {
    let random_threshold = rng.random::<f64>() * sum;
    let mut cumsum = 0.0;
    let mut last_positive = 0;

    for (i, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            last_positive = i;
        }
        cumsum += weight;
        if cumsum > random_threshold {
            return i;
        }
    }

    // Rounding left the threshold above the total
    last_positive
}

/// Picks `k` distinct rows of `dataset` with k-means++ and returns their
/// indices in selection order.
///
/// The first row is drawn uniformly. Every following row is drawn from the rows
/// not picked yet, with probability proportional to its distance to the nearest
/// row already picked. When all remaining rows coincide with picked ones the
/// draw is uniform.
pub fn find_initial(rng: &mut impl RngExt, dataset: &Dataset, k: usize) -> Result<Vec<usize>> {
    let n = dataset.len();
    ensure!((1..=n).contains(&k), InvalidKSnafu { k, n });

    let mut init_points = Vec::<usize>::with_capacity(k);
    let mut candidates: Vec<usize> = (0..n).collect();

    let mut latest = candidates.swap_remove(rng.random_range(0..n));
    init_points.push(latest);
    debug!(index = latest, "picked first centroid");

    // Distance from each remaining candidate to its nearest picked row
    let mut min_distances = vec![f64::INFINITY; candidates.len()];

    for _ in 1..k {
        let centroid = dataset.point(latest);
        let mut sum = 0.0;
        for (d, &candidate) in min_distances.iter_mut().zip(&candidates) {
            *d = d.min(euclidean(dataset.point(candidate), centroid)?);
            sum += *d;
        }

        let pick = if sum > 0.0 {
            sample_by_distance(rng, &min_distances, sum)
        } else {
            debug!(
                remaining = candidates.len(),
                "remaining points coincide with centroids, sampling uniformly"
            );
            rng.random_range(0..candidates.len())
        };

        let probability = if sum > 0.0 {
            min_distances[pick] / sum
        } else {
            1.0 / candidates.len() as f64
        };
        latest = candidates.swap_remove(pick);
        min_distances.swap_remove(pick);
        init_points.push(latest);
        debug!(index = latest, probability, "picked centroid");
    }

    Ok(init_points)
}

/// Runs k-means++ with a generator seeded from `seed`.
pub fn seed(dataset: &Dataset, k: usize, seed: u64) -> Result<Seeding> {
    let mut rng = rng::new(seed);
    let indices = find_initial(&mut rng, dataset, k)?;
    Ok(Seeding {
        centroids: CentroidSet::from_points(dataset, &indices),
        indices,
    })
}
