use super::inertia;
use crate::distance::{euclidean, squared_euclidean};
use crate::error::{
    AssignmentLengthSnafu, ClusterOutOfRangeSnafu, DimensionMismatchSnafu, InvalidParametersSnafu,
    Result,
};
use crate::types::{Assignment, CentroidSet, Dataset};
use snafu::prelude::*;
use tracing::{debug, info};

/// Assigns every point to its nearest centroid. Ties go to the lowest cluster
/// index.
#[inline]
pub fn assign_points(
    dataset: &Dataset,
    centroids: &CentroidSet,
    assignments: &mut [usize],
) -> Result<()> {
    ensure!(
        assignments.len() == dataset.len(),
        AssignmentLengthSnafu {
            expected: dataset.len(),
            found: assignments.len(),
        }
    );

    for (point, assignment) in dataset.points().zip(assignments.iter_mut()) {
        let mut min = f64::INFINITY;
        let mut min_idx = 0;
        for (j, centroid) in centroids.iter().enumerate() {
            let d = squared_euclidean(point, centroid)?;
            if d < min {
                min = d;
                min_idx = j;
            }
        }

        *assignment = min_idx;
    }

    Ok(())
}

#[derive(Debug)]
pub struct UpdateResult {
    /// Largest distance any centroid moved.
    pub max_shift: f64,
    /// Number of points in every cluster.
    pub counts: Vec<usize>,
}

impl UpdateResult {
    pub fn empty_clusters(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }
}

/// Moves every centroid to the mean of the points assigned to it. A centroid
/// without points stays where it is.
#[inline]
pub fn update_centroids(
    dataset: &Dataset,
    assignments: &[usize],
    centroids: &mut CentroidSet,
) -> Result<UpdateResult> {
    ensure!(
        assignments.len() == dataset.len(),
        AssignmentLengthSnafu {
            expected: dataset.len(),
            found: assignments.len(),
        }
    );
    ensure!(
        centroids.dim() == dataset.dim(),
        DimensionMismatchSnafu {
            expected: dataset.dim(),
            found: centroids.dim(),
        }
    );

    let k = centroids.k();
    let dim = dataset.dim();
    let mut counts = vec![0usize; k];
    let mut sums = vec![0f64; k * dim];

    for (point, &assigned_c) in dataset.points().zip(assignments) {
        ensure!(
            assigned_c < k,
            ClusterOutOfRangeSnafu {
                cluster: assigned_c,
                k
            }
        );

        counts[assigned_c] += 1;
        for (sum, &x) in sums[assigned_c * dim..(assigned_c + 1) * dim]
            .iter_mut()
            .zip(point)
        {
            *sum += x;
        }
    }

    let mut max_shift = 0f64;
    let mut new_centroid = vec![0f64; dim];

    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            // Empty cluster, keep the previous centroid
            continue;
        }

        for (new, &sum) in new_centroid
            .iter_mut()
            .zip(&sums[i * dim..(i + 1) * dim])
        {
            *new = sum / count as f64;
        }

        let centroid = centroids.centroid_mut(i);
        max_shift = max_shift.max(euclidean(centroid, &new_centroid)?);
        centroid.copy_from_slice(&new_centroid);
    }

    Ok(UpdateResult { max_shift, counts })
}

/// Outcome of Lloyd's iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub centroids: CentroidSet,
    /// Cluster of every point from the last assign phase.
    pub assignment: Assignment,
    /// Rounds actually executed.
    pub iterations: usize,
    /// Whether the loop stopped because the centroids settled rather than at
    /// the iteration cap.
    pub converged: bool,
    pub inertia: f64,
}

/// Lloyd's iteration starting from `centroids`.
///
/// Every round assigns the points and moves the centroids to the cluster means.
/// The loop stops once no centroid moves by `epsilon` or more, or after
/// `max_iterations` rounds.
pub fn refine(
    dataset: &Dataset,
    mut centroids: CentroidSet,
    max_iterations: usize,
    epsilon: f64,
) -> Result<Refinement> {
    ensure!(
        max_iterations > 0,
        InvalidParametersSnafu {
            reason: "maximum iterations must be positive",
        }
    );
    ensure!(
        epsilon.is_finite() && epsilon > 0.0,
        InvalidParametersSnafu {
            reason: "epsilon must be a positive number",
        }
    );
    ensure!(
        centroids.dim() == dataset.dim(),
        DimensionMismatchSnafu {
            expected: dataset.dim(),
            found: centroids.dim(),
        }
    );

    let mut assignment = vec![0usize; dataset.len()];
    let mut iterations = max_iterations;
    let mut converged = false;

    for round in 1..=max_iterations {
        assign_points(dataset, &centroids, &mut assignment)?;
        let update_result = update_centroids(dataset, &assignment, &mut centroids)?;

        debug!(
            round,
            max_shift = update_result.max_shift,
            empty_clusters = update_result.empty_clusters(),
            "lloyd round"
        );

        if update_result.max_shift < epsilon {
            iterations = round;
            converged = true;
            break;
        }
    }

    let inertia = inertia(dataset, &centroids, &assignment)?;
    info!(iterations, converged, inertia, "lloyd iteration finished");

    Ok(Refinement {
        centroids,
        assignment,
        iterations,
        converged,
        inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KMeansError;
    use crate::kmeans::plus_plus_init;
    use pretty_assertions::assert_eq;

    const N_PER_CLUSTER: usize = 256;
    const CENTERS: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
        [0.0, 10.0, 0.0],
        [0.0, 0.0, 10.0],
    ];

    fn make_four_clusters() -> Dataset {
        let mut rows = Vec::with_capacity(N_PER_CLUSTER * 4);
        for center in &CENTERS {
            for i in 0..N_PER_CLUSTER {
                let offset = i as f64 * 0.001;
                rows.push(center.map(|c| c + offset));
            }
        }
        Dataset::from_rows(&rows).unwrap()
    }

    fn two_groups() -> Dataset {
        Dataset::from_rows(&[[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_assign_points() {
        let data = make_four_clusters();
        let centroids = CentroidSet::from_rows(&CENTERS).unwrap();

        let mut assignments = vec![0usize; data.len()];
        assign_points(&data, &centroids, &mut assignments).unwrap();

        for ci in 0..4 {
            let start = ci * N_PER_CLUSTER;
            let end = start + N_PER_CLUSTER;
            assert!(
                assignments[start..end].iter().all(|&a| a == ci),
                "cluster {ci}: not all points assigned to centroid {ci}",
            );
        }
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let data = Dataset::from_rows(&[[0.0]]).unwrap();
        let centroids = CentroidSet::from_rows(&[[2.0], [-1.0], [1.0]]).unwrap();

        let mut assignments = vec![0usize; 1];
        assign_points(&data, &centroids, &mut assignments).unwrap();
        assert_eq!(assignments, vec![1]);

        let centroids = CentroidSet::from_rows(&[[3.0], [1.0], [-1.0]]).unwrap();
        assign_points(&data, &centroids, &mut assignments).unwrap();
        assert_eq!(assignments, vec![1]);
    }

    #[test]
    fn test_update_centroids() {
        let data = make_four_clusters();
        let n = data.len();

        // Correct assignments: point i belongs to cluster i / N_PER_CLUSTER
        let assignments: Vec<usize> = (0..n).map(|i| i / N_PER_CLUSTER).collect();

        // Start centroids far away
        let mut centroids = CentroidSet::from_rows(&[[99.0; 3]; 4]).unwrap();

        let result = update_centroids(&data, &assignments, &mut centroids).unwrap();

        // Per-cluster offsets are 0..256 * 0.001, so mean offset ~0.13
        for (i, center) in CENTERS.iter().enumerate() {
            for (axis, (&got, &want)) in centroids.centroid(i).iter().zip(center).enumerate() {
                assert!(
                    (got - want).abs() < 0.2,
                    "centroid {i} axis {axis}: expected ~{want}, got {got}",
                );
            }
        }

        assert!(
            result.max_shift > 100.0,
            "max_shift should be large, got {}",
            result.max_shift,
        );
        assert_eq!(result.counts, vec![N_PER_CLUSTER; 4]);
        assert_eq!(result.empty_clusters(), 0);
    }

    #[test]
    fn empty_cluster_keeps_centroid() {
        let data = Dataset::from_rows(&[[0.0, 0.0], [1.0, 0.0]]).unwrap();
        let mut centroids = CentroidSet::from_rows(&[[0.5, 0.0], [100.0, 100.0]]).unwrap();

        let mut assignments = vec![0usize; data.len()];
        assign_points(&data, &centroids, &mut assignments).unwrap();
        assert_eq!(assignments, vec![0, 0]);

        let result = update_centroids(&data, &assignments, &mut centroids).unwrap();
        assert_eq!(result.counts, vec![2, 0]);
        assert_eq!(result.empty_clusters(), 1);
        assert_eq!(centroids.k(), 2);
        assert_eq!(centroids.centroid(1), &[100.0, 100.0]);

        let refinement = refine(&data, centroids, 10, 1e-4).unwrap();
        assert_eq!(refinement.centroids.k(), 2);
        assert_eq!(refinement.centroids.centroid(0), &[0.5, 0.0]);
        assert_eq!(refinement.centroids.centroid(1), &[100.0, 100.0]);
        assert!(refinement.converged);
    }

    #[test]
    fn rejects_bad_assignments() {
        let data = Dataset::from_rows(&[[0.0], [1.0], [2.0]]).unwrap();
        let mut centroids = CentroidSet::from_rows(&[[0.0], [2.0]]).unwrap();

        let mut short = vec![0usize; 2];
        assert_eq!(
            assign_points(&data, &centroids, &mut short),
            Err(KMeansError::AssignmentLength {
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            update_centroids(&data, &[0, 1], &mut centroids),
            Err(KMeansError::AssignmentLength { .. })
        ));

        assert!(matches!(
            update_centroids(&data, &[0, 5, 1], &mut centroids),
            Err(KMeansError::ClusterOutOfRange { cluster: 5, k: 2 })
        ));
        // Nothing moved
        assert_eq!(centroids.to_rows(), vec![vec![0.0], vec![2.0]]);
    }

    #[test]
    fn two_groups_converge() {
        let data = two_groups();
        let initial = CentroidSet::from_rows(&[[0.0, 0.0], [10.0, 0.0]]).unwrap();

        let result = refine(&data, initial, 200, 1e-4).unwrap();

        assert_eq!(result.centroids.to_rows(), vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
        assert_eq!(result.assignment, vec![0, 0, 1, 1]);
        assert_eq!(result.iterations, 2);
        assert!(result.converged);
        assert_eq!(result.inertia, 1.0);
    }

    #[test]
    fn iteration_cap() {
        let data = two_groups();
        let initial = CentroidSet::from_rows(&[[0.0, 0.0], [10.0, 0.0]]).unwrap();

        let result = refine(&data, initial, 1, 1e-4).unwrap();
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
    }

    #[test]
    fn never_exceeds_cap() {
        let data = make_four_clusters();
        let initial = CentroidSet::from_rows(&[[5.0, 5.0, 5.0], [5.1, 5.0, 5.0]]).unwrap();

        for max_iterations in 1..6 {
            let result = refine(&data, initial.clone(), max_iterations, 1e-12).unwrap();
            assert!(result.iterations <= max_iterations);
            if !result.converged {
                assert_eq!(result.iterations, max_iterations);
            }
        }
    }

    #[test]
    fn k_equals_n_singletons() {
        let data = Dataset::from_rows(&[[0.0, 0.0], [3.0, 1.0], [-2.0, 4.0], [7.0, 7.0]]).unwrap();
        let seeding = plus_plus_init::seed(&data, data.len(), 42).unwrap();

        let result = refine(&data, seeding.centroids, 200, 1e-4).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.inertia, 0.0);

        let mut clusters = result.assignment.clone();
        clusters.sort();
        assert_eq!(clusters, vec![0, 1, 2, 3]);
    }

    #[test]
    fn inertia_non_increasing() {
        let rows: Vec<[f64; 2]> = (0..60)
            .map(|i| {
                let t = i as f64;
                [(t * 0.37).sin() * 5.0 + (i % 3) as f64 * 6.0, (t * 0.91).cos() * 4.0]
            })
            .collect();
        let data = Dataset::from_rows(&rows).unwrap();
        let mut centroids = CentroidSet::from_rows(&[[0.0, 0.0], [0.1, 0.0], [0.2, 0.0]]).unwrap();

        let mut assignments = vec![0usize; data.len()];
        let mut previous = f64::INFINITY;
        for _ in 0..20 {
            assign_points(&data, &centroids, &mut assignments).unwrap();
            let current = inertia(&data, &centroids, &assignments).unwrap();
            assert!(
                current <= previous + 1e-9,
                "inertia went up from {previous} to {current}"
            );
            previous = current;
            update_centroids(&data, &assignments, &mut centroids).unwrap();
        }
    }

    #[test]
    fn invalid_parameters() {
        let data = two_groups();
        let initial = CentroidSet::from_rows(&[[0.0, 0.0], [10.0, 0.0]]).unwrap();

        for (max_iterations, epsilon) in [(0, 1e-4), (10, 0.0), (10, -1.0), (10, f64::NAN)] {
            let err = refine(&data, initial.clone(), max_iterations, epsilon).unwrap_err();
            assert!(
                matches!(err, KMeansError::InvalidParameters { .. }),
                "unexpected error {err:?}"
            );
        }
    }

    #[test]
    fn dimension_mismatch() {
        let data = two_groups();
        let initial = CentroidSet::from_rows(&[[0.0, 0.0, 0.0]]).unwrap();

        assert_eq!(
            refine(&data, initial, 10, 1e-4).unwrap_err(),
            KMeansError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
    }
}
