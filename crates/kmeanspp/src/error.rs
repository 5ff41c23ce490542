use snafu::prelude::*;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum KMeansError {
    #[snafu(display("invalid number of clusters {k}, must be between 1 and {n}"))]
    InvalidK { k: usize, n: usize },

    #[snafu(display("invalid parameters: {reason}"))]
    InvalidParameters { reason: &'static str },

    #[snafu(display("dimension mismatch: expected {expected} coordinates, found {found}"))]
    DimensionMismatch { expected: usize, found: usize },

    #[snafu(display("assignment covers {found} points, dataset has {expected}"))]
    AssignmentLength { expected: usize, found: usize },

    #[snafu(display("cluster {cluster} out of range for {k} centroids"))]
    ClusterOutOfRange { cluster: usize, k: usize },

    #[snafu(display("point index {index} out of range for {n} points"))]
    PointOutOfRange { index: usize, n: usize },

    #[snafu(display("dataset is empty"))]
    EmptyDataset,

    #[snafu(display("points must have at least one coordinate"))]
    ZeroDimension,

    #[snafu(display("row {row} has {found} coordinates, expected {expected}"))]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[snafu(display("row {row}, column {column}: coordinate is not a finite number"))]
    NonFiniteCoordinate { row: usize, column: usize },

    #[snafu(display("got {ids} identifiers for {points} points"))]
    IdCountMismatch { ids: usize, points: usize },

    #[snafu(display("row {row}: identifier {value} is not an integer"))]
    NonIntegerId { row: usize, value: f64 },
}

pub type Result<T, E = KMeansError> = std::result::Result<T, E>;
