//! k-means clustering for dense numeric datasets: k-means++ seeding followed by
//! Lloyd's iteration.
//!
//! ```
//! use kmeanspp::{Dataset, KMeansConfig, kmeans};
//!
//! let data = Dataset::from_rows(&[[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
//! let result = kmeans::fit(&data, &KMeansConfig::new(2)).unwrap();
//!
//! assert_eq!(result.refinement.centroids.k(), 2);
//! assert!(result.refinement.iterations <= 200);
//! ```
//!
//! The two stages can also be run separately, e.g. to refine externally chosen
//! centroids:
//!
//! ```
//! use kmeanspp::{CentroidSet, Dataset, kmeans};
//!
//! let data = Dataset::from_rows(&[[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap();
//! let initial = CentroidSet::from_rows(&[[0.0, 0.0], [10.0, 0.0]]).unwrap();
//!
//! let refinement = kmeans::refine(&data, initial, 200, 1e-4).unwrap();
//! assert_eq!(refinement.centroids.to_rows(), vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
//! assert_eq!(refinement.inertia, 1.0);
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod kmeans;
pub mod report;
pub mod rng;
pub mod types;

pub use config::KMeansConfig;
pub use error::{KMeansError, Result};
pub use kmeans::{Clustering, Refinement, Seeding};
pub use types::{Assignment, CentroidSet, Dataset};
