use kmeanspp::config::DEFAULT_MAX_ITERATIONS;
use kmeanspp::rng::DEFAULT_SEED;
use kmeanspp::{CentroidSet, Dataset, KMeansConfig, kmeans};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(err: kmeanspp::KMeansError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn fit_id_rows(
    k: usize,
    epsilon: f64,
    data: &[Vec<f64>],
    max_iterations: usize,
    seed: u64,
) -> kmeanspp::Result<(Vec<i64>, Vec<Vec<f64>>)> {
    let dataset = Dataset::from_id_rows(data)?;
    let config = KMeansConfig::new(k)
        .with_max_iterations(max_iterations)
        .with_epsilon(epsilon)
        .with_seed(seed);

    let result = kmeans::fit(&dataset, &config)?;
    Ok((
        result.seeding.ids(&dataset),
        result.refinement.centroids.to_rows(),
    ))
}

fn refine_from_indices(
    max_iterations: usize,
    epsilon: f64,
    data: &[Vec<f64>],
    initial: &[usize],
) -> kmeanspp::Result<Vec<Vec<f64>>> {
    let dataset = Dataset::from_rows(data)?;
    let centroids = CentroidSet::from_indices(&dataset, initial)?;

    let refinement = kmeans::refine(&dataset, centroids, max_iterations, epsilon)?;
    Ok(refinement.centroids.to_rows())
}

/// Seeds `k` centroids with k-means++ and refines them.
///
/// Every row of `data` starts with an integer point id. Returns the ids of the
/// seeding picks and the final centroids.
#[pyfunction]
#[pyo3(signature = (k, epsilon, data, max_iterations = DEFAULT_MAX_ITERATIONS, seed = DEFAULT_SEED))]
fn fit(
    k: usize,
    epsilon: f64,
    data: Vec<Vec<f64>>,
    max_iterations: usize,
    seed: u64,
) -> PyResult<(Vec<i64>, Vec<Vec<f64>>)> {
    fit_id_rows(k, epsilon, &data, max_iterations, seed).map_err(value_error)
}

/// Runs Lloyd's iteration and returns the final centroids.
///
/// `data` holds coordinates only. `centroids` lists the row indices into
/// `data` to start from, one per cluster.
#[pyfunction]
#[pyo3(name = "kmeans")]
fn refine(
    max_iterations: usize,
    epsilon: f64,
    data: Vec<Vec<f64>>,
    centroids: Vec<usize>,
) -> PyResult<Vec<Vec<f64>>> {
    refine_from_indices(max_iterations, epsilon, &data, &centroids).map_err(value_error)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fit, m)?)?;
    m.add_function(wrap_pyfunction!(refine, m)?)?;
    Ok(())
}
