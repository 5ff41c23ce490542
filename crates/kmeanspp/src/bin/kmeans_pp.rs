use clap::Parser;
use clap::error::ErrorKind;
use kmeanspp::config::{DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_LIMIT};
use kmeanspp::report::{format_centroids, format_ids};
use kmeanspp::rng::DEFAULT_SEED;
use kmeanspp::{Dataset, KMeansConfig, KMeansError, kmeans};
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Joins two comma-separated files on their leading id column, seeds K
/// centroids with k-means++ and refines them with Lloyd's iteration.
///
/// Prints the ids of the seeding picks, then one line per final centroid.
// Numeric arguments stay strings; `Settings::from_args` checks them so every
// bad value gets its own message.
#[derive(Parser)]
#[command(version, allow_negative_numbers = true)]
struct Args {
    /// Number of clusters
    k: String,

    /// Convergence threshold on centroid movement
    epsilon: String,

    /// First input file
    file1: PathBuf,

    /// Second input file
    file2: PathBuf,

    /// Maximum number of Lloyd rounds
    #[arg(long = "iter", default_value_t = DEFAULT_MAX_ITERATIONS.to_string())]
    max_iterations: String,

    /// Seed of the k-means++ generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

/// Numeric arguments after range checks.
#[derive(Debug, PartialEq)]
struct Settings {
    k: usize,
    max_iterations: usize,
    epsilon: f64,
}

/// Whole non-negative number, also written as an integral float ("2.0").
fn parse_whole(value: &str) -> Option<usize> {
    let x = value.trim().parse::<f64>().ok()?;
    (x.is_finite() && x >= 0.0 && x.fract() == 0.0).then_some(x as usize)
}

impl Settings {
    /// Checks K, then the iteration cap, then epsilon. `K <= N` can only be
    /// checked once the input is loaded.
    fn from_args(args: &Args) -> Result<Self, String> {
        let k = parse_whole(&args.k)
            .filter(|&k| k >= 1)
            .ok_or("Invalid number of clusters!")?;
        let max_iterations = parse_whole(&args.max_iterations)
            .filter(|n| (1..MAX_ITERATIONS_LIMIT).contains(n))
            .ok_or("Invalid maximum iteration!")?;
        let epsilon = args
            .epsilon
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|eps| eps.is_finite() && *eps > 0.0)
            .ok_or("Invalid epsilon!")?;

        Ok(Self {
            k,
            max_iterations,
            epsilon,
        })
    }
}

#[derive(Debug, Snafu)]
enum LoadError {
    #[snafu(display("failed to read {}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{}:{line}: invalid number {value:?}", path.display()))]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
        source: std::num::ParseFloatError,
    },

    #[snafu(display("{}:{line}: id {value} is not an integer", path.display()))]
    NonIntegerId {
        path: PathBuf,
        line: usize,
        value: f64,
    },

    #[snafu(display("no ids shared between the input files"))]
    NoCommonRows,

    #[snafu(display("invalid dataset"))]
    Dataset { source: KMeansError },
}

type Table = BTreeMap<i64, Vec<f64>>;

fn parse_table(path: &Path, text: &str) -> Result<Table, LoadError> {
    let mut table = Table::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut values = Vec::new();
        for field in line.split(',') {
            let field = field.trim();
            let value = field.parse::<f64>().context(ParseSnafu {
                path,
                line: i + 1,
                value: field,
            })?;
            values.push(value);
        }

        let id = values.remove(0);
        ensure!(
            id.is_finite() && id.fract() == 0.0,
            NonIntegerIdSnafu {
                path,
                line: i + 1,
                value: id,
            }
        );
        table.insert(id as i64, values);
    }

    Ok(table)
}

fn read_table(path: &Path) -> Result<Table, LoadError> {
    let text = std::fs::read_to_string(path).context(ReadSnafu { path })?;
    parse_table(path, &text)
}

/// Inner join on the id, coordinates of the first table first, sorted by id.
fn join(left: Table, mut right: Table) -> Result<Dataset, LoadError> {
    let mut ids = Vec::new();
    let mut rows = Vec::new();

    for (id, mut coordinates) in left {
        if let Some(extra) = right.remove(&id) {
            coordinates.extend(extra);
            ids.push(id);
            rows.push(coordinates);
        }
    }

    ensure!(!rows.is_empty(), NoCommonRowsSnafu);
    Dataset::with_ids(ids, &rows).context(DatasetSnafu)
}

fn run(args: &Args) -> Result<(), String> {
    let settings = Settings::from_args(args)?;

    let general = |err: LoadError| {
        tracing::error!(error = %snafu::Report::from_error(err), "failed to load input");
        "An error has occurred!".to_string()
    };

    let dataset = join(
        read_table(&args.file1).map_err(general)?,
        read_table(&args.file2).map_err(general)?,
    )
    .map_err(general)?;

    if settings.k > dataset.len() {
        return Err("Invalid number of clusters!".to_string());
    }

    let config = KMeansConfig::new(settings.k)
        .with_max_iterations(settings.max_iterations)
        .with_epsilon(settings.epsilon)
        .with_seed(args.seed);

    let result = kmeans::fit(&dataset, &config).map_err(|err| {
        tracing::error!(error = %err, "clustering failed");
        "An error has occurred!".to_string()
    })?;

    println!("{}", format_ids(&result.seeding.ids(&dataset)));
    print!("{}", format_centroids(&result.refinement.centroids));
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            tracing::error!(error = %err, "invalid command line");
            println!("An error has occurred!");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            println!("{message}");
            ExitCode::FAILURE
        }
    }
}
