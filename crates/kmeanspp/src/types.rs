use crate::error::{
    DimensionMismatchSnafu, EmptyDatasetSnafu, IdCountMismatchSnafu, InvalidKSnafu,
    NonFiniteCoordinateSnafu, NonIntegerIdSnafu, PointOutOfRangeSnafu, RaggedRowSnafu, Result,
    ZeroDimensionSnafu,
};
use snafu::prelude::*;

/// Checks that `rows` form a non-empty rectangle of finite numbers and flattens
/// them row-major. Returns the flattened buffer and the row width.
fn flatten_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<(Vec<f64>, usize)> {
    ensure!(!rows.is_empty(), EmptyDatasetSnafu);

    let dim = rows[0].as_ref().len();
    ensure!(dim > 0, ZeroDimensionSnafu);

    let mut coords = Vec::with_capacity(rows.len() * dim);
    for (row, values) in rows.iter().enumerate() {
        let values = values.as_ref();
        ensure!(
            values.len() == dim,
            RaggedRowSnafu {
                row,
                expected: dim,
                found: values.len(),
            }
        );
        for (column, &v) in values.iter().enumerate() {
            ensure!(v.is_finite(), NonFiniteCoordinateSnafu { row, column });
        }
        coords.extend_from_slice(values);
    }

    Ok((coords, dim))
}

/// A read-only set of `N` points with `D` coordinates each.
///
/// Coordinates live in one row-major buffer. Identifiers are kept apart and are
/// only used for reporting; rows without explicit identifiers are identified by
/// their index.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dim: usize,
    coords: Vec<f64>,
    ids: Option<Vec<i64>>,
}

impl Dataset {
    /// Builds a dataset from coordinate rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let (coords, dim) = flatten_rows(rows)?;
        Ok(Self {
            dim,
            coords,
            ids: None,
        })
    }

    /// Builds a dataset from coordinate rows and one identifier per row.
    pub fn with_ids<R: AsRef<[f64]>>(ids: Vec<i64>, rows: &[R]) -> Result<Self> {
        let (coords, dim) = flatten_rows(rows)?;
        ensure!(
            ids.len() == rows.len(),
            IdCountMismatchSnafu {
                ids: ids.len(),
                points: rows.len(),
            }
        );
        Ok(Self {
            dim,
            coords,
            ids: Some(ids),
        })
    }

    /// Builds a dataset from rows whose leading column is an integral point
    /// identifier, followed by the coordinates.
    pub fn from_id_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        ensure!(!rows.is_empty(), EmptyDatasetSnafu);

        let mut ids = Vec::with_capacity(rows.len());
        let mut coordinate_rows = Vec::with_capacity(rows.len());
        for (row, values) in rows.iter().enumerate() {
            let (&id, coordinates) = values.as_ref().split_first().context(ZeroDimensionSnafu)?;
            ensure!(
                id.is_finite() && id.fract() == 0.0,
                NonIntegerIdSnafu { row, value: id }
            );
            ids.push(id as i64);
            coordinate_rows.push(coordinates);
        }

        Self::with_ids(ids, &coordinate_rows)
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len() / self.dim
    }

    /// Always false, construction rejects empty datasets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of coordinates per point.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn point(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.coords.chunks_exact(self.dim)
    }

    /// Reporting identifier of point `i`: the explicit one if present, the row
    /// index otherwise.
    pub fn id(&self, i: usize) -> i64 {
        match &self.ids {
            Some(ids) => ids[i],
            None => i as i64,
        }
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }
}

/// An ordered set of `K` centroids. The position of a centroid is its cluster
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidSet {
    dim: usize,
    coords: Vec<f64>,
}

impl CentroidSet {
    /// Builds a centroid set from externally supplied rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        ensure!(!rows.is_empty(), InvalidKSnafu { k: 0usize, n: 0usize });

        let dim = rows[0].as_ref().len();
        for row in rows {
            ensure!(
                row.as_ref().len() == dim,
                DimensionMismatchSnafu {
                    expected: dim,
                    found: row.as_ref().len(),
                }
            );
        }
        let (coords, dim) = flatten_rows(rows)?;
        Ok(Self { dim, coords })
    }

    /// Starts from the dataset rows at `indices`, in that order.
    pub fn from_indices(dataset: &Dataset, indices: &[usize]) -> Result<Self> {
        ensure!(
            !indices.is_empty(),
            InvalidKSnafu {
                k: 0usize,
                n: dataset.len(),
            }
        );
        if let Some(&index) = indices.iter().find(|&&i| i >= dataset.len()) {
            return PointOutOfRangeSnafu {
                index,
                n: dataset.len(),
            }
            .fail();
        }
        Ok(Self::from_points(dataset, indices))
    }

    /// Copies the given dataset rows, in order.
    pub(crate) fn from_points(dataset: &Dataset, indices: &[usize]) -> Self {
        let mut coords = Vec::with_capacity(indices.len() * dataset.dim());
        for &i in indices {
            coords.extend_from_slice(dataset.point(i));
        }
        Self {
            dim: dataset.dim(),
            coords,
        }
    }

    /// Number of centroids.
    #[inline]
    pub fn k(&self) -> usize {
        self.coords.len() / self.dim
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn centroid(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    pub(crate) fn centroid_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.coords[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.coords.chunks_exact(self.dim)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }
}

/// Cluster index of every point, in dataset order.
pub type Assignment = Vec<usize>;
