use crate::config::KMeansConfig;
use crate::distance::squared_euclidean;
use crate::error::{AssignmentLengthSnafu, ClusterOutOfRangeSnafu, Result};
use crate::types::{CentroidSet, Dataset};
use snafu::prelude::*;
use tracing::info_span;

pub mod lloyds;
pub mod plus_plus_init;

// References:
// - k-means++: The Advantages of Careful Seeding (D. Arthur, S. Vassilvitskii)
//   https://theory.stanford.edu/~sergei/papers/kMeansPP-soda.pdf
// - Least squares quantization in PCM (S. Lloyd)
//
// Seeding weights candidates by plain distance to the nearest centroid rather
// than its square.

pub use lloyds::{Refinement, refine};
pub use plus_plus_init::{Seeding, seed};

/// Sum of squared distances from every point to the centroid it's assigned to.
///
/// `assignment` must hold one cluster index below `centroids.k()` per point.
pub fn inertia(dataset: &Dataset, centroids: &CentroidSet, assignment: &[usize]) -> Result<f64> {
    ensure!(
        assignment.len() == dataset.len(),
        AssignmentLengthSnafu {
            expected: dataset.len(),
            found: assignment.len(),
        }
    );

    dataset
        .points()
        .zip(assignment)
        .try_fold(0.0, |acc, (point, &cluster)| -> Result<f64> {
            ensure!(
                cluster < centroids.k(),
                ClusterOutOfRangeSnafu {
                    cluster,
                    k: centroids.k(),
                }
            );
            Ok(acc + squared_euclidean(point, centroids.centroid(cluster))?)
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub seeding: Seeding,
    pub refinement: Refinement,
}

/// Seeds with k-means++ and refines with Lloyd's iteration.
pub fn fit(dataset: &Dataset, config: &KMeansConfig) -> Result<Clustering> {
    let _span = info_span!("fit", k = config.k, n = dataset.len(), dim = dataset.dim()).entered();

    config.validate(dataset.len())?;

    let seeding = seed(dataset, config.k, config.seed)?;
    let refinement = refine(
        dataset,
        seeding.centroids.clone(),
        config.max_iterations,
        config.epsilon,
    )?;

    Ok(Clustering {
        seeding,
        refinement,
    })
}
