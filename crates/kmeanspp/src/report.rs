//! Plain-text renderings of clustering results.

use crate::types::CentroidSet;

/// Comma-joined point identifiers, e.g. the seeding selection order.
pub fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// One centroid per line, coordinates comma-joined with four decimals.
pub fn format_centroids(centroids: &CentroidSet) -> String {
    centroids
        .iter()
        .map(|centroid| {
            let line = centroid
                .iter()
                // Avoid printing "-0.0000"
                .map(|&x| if x.abs() < 0.00005 { 0.0 } else { x })
                .map(|x| format!("{x:.4}"))
                .collect::<Vec<_>>()
                .join(",");
            line + "\n"
        })
        .collect()
}
