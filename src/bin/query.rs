use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use geomark::config::{BenchmarkConfig, IndexType, QueryType, ResultMode};
use geomark::harness::{self, Workload};
use geomark::{Point, Rect, cache, create_index, loader, report};

/// Benchmark spatial-index backends over WKT datasets.
#[derive(Parser, Debug)]
#[command(name = "geomark", version, about, long_about = None)]
struct Args {
    /// Path of the geometry file in WKT format
    #[arg(long)]
    geom: PathBuf,

    /// Path of the query file in WKT format
    #[arg(long)]
    query: Option<PathBuf>,

    /// Directory for binary geometry caches
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// point-contains/range-contains/range-intersects/bulk-loading/insertion/deletion
    #[arg(long)]
    query_type: QueryType,

    /// rtree/linear
    #[arg(long, default_value = "rtree")]
    index_type: IndexType,

    /// Iterations discarded from the reported average
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Iterations contributing to the reported average
    #[arg(long, default_value_t = 5)]
    repeat: usize,

    /// Read at most this many geometries per input file
    #[arg(long)]
    limit: Option<usize>,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Query worker threads; 0 uses all hardware threads
    #[arg(long, default_value_t = 0)]
    parallelism: usize,

    /// Result-buffer pre-reservation hint as a fraction of the dataset size
    #[arg(long, default_value_t = 0.1)]
    load_factor: f64,

    /// Chunk size for the insertion/deletion benchmarks
    #[arg(long, default_value_t = 1024)]
    batch: usize,

    /// Report the warmup-trimmed average instead of per-iteration latencies
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    avg_time: bool,

    /// Count matches instead of materializing them
    #[arg(long)]
    count_only: bool,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
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
    let config = BenchmarkConfig {
        geom: args.geom,
        query: args.query,
        cache_dir: args.cache_dir,
        warmup: args.warmup,
        repeat: args.repeat,
        limit: args.limit,
        seed: args.seed,
        parallelism: args.parallelism,
        avg_time: args.avg_time,
        query_type: args.query_type,
        index_type: args.index_type,
        result_mode: if args.count_only {
            ResultMode::Count
        } else {
            ResultMode::Collect
        },
        load_factor: args.load_factor,
        batch: args.batch,
        json: args.json,
    }
    .validated()?;

    let geoms = load_boxes(&config.geom, &config)?;
    info!("loaded {} geometries", geoms.len());

    let workload = match (config.query_type, &config.query) {
        (QueryType::PointContains, Some(path)) => Workload::Points(load_points(path, &config)?),
        (QueryType::RangeContains | QueryType::RangeIntersects, Some(path)) => {
            Workload::Boxes(load_boxes(path, &config)?)
        }
        _ => Workload::empty(),
    };
    if config.query_type.has_query_phase() {
        info!("loaded {} queries", workload.len());
    }

    let mut index = create_index(config.index_type);
    let ts = match config.query_type {
        QueryType::PointContains | QueryType::RangeContains | QueryType::RangeIntersects => {
            harness::run_query_benchmark(index.as_mut(), &geoms, &workload, &config)
        }
        QueryType::BulkLoading => harness::run_bulk_load_benchmark(index.as_mut(), &geoms, &config),
        QueryType::Insertion => harness::run_insertion_benchmark(index.as_mut(), &geoms, &config),
        QueryType::Deletion => harness::run_deletion_benchmark(index.as_mut(), &geoms, &config),
    };

    if config.json {
        report::print_json(&ts, &config)?;
    } else {
        report::print_report(&ts, &config);
    }
    Ok(())
}

fn load_boxes(path: &Path, config: &BenchmarkConfig) -> geomark::Result<Vec<Rect<f64>>> {
    match &config.cache_dir {
        Some(dir) => cache::load_boxes_cached(path, dir, config.limit()),
        None => loader::load_boxes(path, config.limit()),
    }
}

fn load_points(path: &Path, config: &BenchmarkConfig) -> geomark::Result<Vec<Point<f64>>> {
    match &config.cache_dir {
        Some(dir) => cache::load_points_cached(path, dir, config.limit()),
        None => loader::load_points(path, config.limit()),
    }
}
