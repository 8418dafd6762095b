use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use geomark::config::QueryType;
use geomark::generator::{
    IntersectsConfig, generate_contains_queries, generate_intersects_queries,
    generate_point_queries,
};
use geomark::{GeomarkError, loader};

/// Generate query workloads with controlled statistical properties.
#[derive(Parser, Debug)]
#[command(name = "geomark-gen", version, about, long_about = None)]
struct Args {
    /// Path of the input data file in WKT format
    #[arg(long)]
    input: PathBuf,

    /// Path the generated workload is written to, one WKT per line
    #[arg(long)]
    output: PathBuf,

    /// point-contains/range-contains/range-intersects
    #[arg(long)]
    query_type: QueryType,

    /// Number of queries to generate
    #[arg(long, default_value_t = 100)]
    num_queries: usize,

    /// Minimum dataset boxes each intersects-query must match; derived from
    /// --selectivity when omitted
    #[arg(long)]
    min_qualified: Option<usize>,

    /// Target fraction of the dataset matched per intersects-query
    #[arg(long)]
    selectivity: Option<f64>,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Read at most this many geometries from the input
    #[arg(long)]
    limit: Option<usize>,

    /// Generator worker threads; 0 uses all hardware threads
    #[arg(long, default_value_t = 0)]
    parallelism: usize,

    /// Discard candidates matching more than this multiple of the target
    #[arg(long, default_value_t = 10.0)]
    overshoot_factor: f64,

    /// Redraw budget per query before settling for the tightest candidate
    #[arg(long, default_value_t = 64)]
    max_retries: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> geomark::Result<()> {
    if std::fs::File::open(&args.input).is_err() {
        return Err(GeomarkError::InvalidConfig(format!(
            "cannot open {}",
            args.input.display()
        )));
    }

    let limit = args.limit.unwrap_or(usize::MAX);
    let geoms = loader::load_boxes(&args.input, limit)?;
    info!("loaded {} geometries", geoms.len());

    match args.query_type {
        QueryType::PointContains => {
            let queries = generate_point_queries(&geoms, args.num_queries, args.seed)?;
            loader::dump_points(&args.output, &queries)?;
            info!(
                "wrote {} point queries to {}",
                queries.len(),
                args.output.display()
            );
        }
        QueryType::RangeContains => {
            let queries = generate_contains_queries(&geoms, args.num_queries, args.seed)?;
            loader::dump_boxes(&args.output, &queries)?;
            info!(
                "wrote {} contains queries to {}",
                queries.len(),
                args.output.display()
            );
        }
        QueryType::RangeIntersects => {
            let min_qualified = match (args.min_qualified, args.selectivity) {
                (Some(k), _) => k,
                (None, Some(s)) => {
                    let k = ((geoms.len() as f64 * s) as usize).max(1);
                    info!("selectivity {s} maps to min_qualified {k}");
                    k
                }
                (None, None) => 10,
            };
            let config = IntersectsConfig {
                min_qualified,
                num_queries: args.num_queries,
                seed: args.seed,
                parallelism: args.parallelism,
                overshoot_factor: args.overshoot_factor,
                max_retries: args.max_retries,
            };
            let outcome = generate_intersects_queries(&geoms, &config)?;
            loader::dump_boxes(&args.output, &outcome.queries)?;
            info!(
                "wrote {} intersects queries to {} (realized selectivity {:.6})",
                outcome.queries.len(),
                args.output.display(),
                outcome.selectivity
            );
        }
        other => {
            return Err(GeomarkError::InvalidConfig(format!(
                "query type '{other}' cannot be generated, expected \
                 point-contains/range-contains/range-intersects"
            )));
        }
    }
    Ok(())
}
