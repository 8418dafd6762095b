//! Formats aggregated timing and selectivity statistics.
//!
//! Benchmark results go to stdout; progress and diagnostics go through the
//! logger. Text mode prints one metric per line; JSON mode serializes the
//! same numbers for downstream tooling.

use serde::Serialize;

use crate::config::{BenchmarkConfig, QueryType};
use crate::error::Result;
use crate::stats::TimeStat;

/// Print the human-readable report for a finished run.
pub fn print_report(ts: &TimeStat, config: &BenchmarkConfig) {
    if let Some(avg) = ts.average(&ts.insert_ms, config) {
        println!("Loading Time {avg:.3} ms");
    }

    if !ts.query_ms.is_empty() {
        println!("Geoms {}", ts.num_geoms);
        println!("Queries {}", ts.num_queries);
        println!("Threads {}", ts.num_threads);
        if config.avg_time {
            if let Some(avg) = ts.average(&ts.query_ms, config) {
                println!("Query Time {avg:.3} ms");
            }
        } else {
            for (i, t) in ts.query_ms.iter().enumerate() {
                println!("{i}, Query Time {t:.3} ms");
            }
        }
        println!("Results {}", ts.num_results);
        println!("Selectivity: {}", ts.selectivity());
    }

    if config.query_type == QueryType::Insertion && ts.num_inserts > 0 {
        if let Some(avg) = ts.average(&ts.insert_ms, config) {
            println!("Inserts {}", ts.num_inserts);
            println!(
                "Insert Rate {:.0} geoms/s",
                ts.num_inserts as f64 / (avg / 1e3)
            );
        }
    }

    if config.query_type == QueryType::Deletion && ts.num_deletes > 0 {
        if let Some(avg) = ts.average(&ts.delete_ms, config) {
            println!("Deletes {}", ts.num_deletes);
            println!(
                "Delete Rate {:.0} geoms/s",
                ts.num_deletes as f64 / (avg / 1e3)
            );
        }
    }
}

/// Print the same report as pretty JSON.
pub fn print_json(ts: &TimeStat, config: &BenchmarkConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Report::new(ts, config))?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    index_type: &'static str,
    query_type: &'static str,
    avg_build_ms: Option<f64>,
    avg_query_ms: Option<f64>,
    avg_delete_ms: Option<f64>,
    selectivity: f64,
    #[serde(flatten)]
    stats: &'a TimeStat,
}

impl<'a> Report<'a> {
    fn new(ts: &'a TimeStat, config: &BenchmarkConfig) -> Self {
        Self {
            index_type: config.index_type.as_str(),
            query_type: config.query_type.as_str(),
            avg_build_ms: ts.average(&ts.insert_ms, config),
            avg_query_ms: ts.average(&ts.query_ms, config),
            avg_delete_ms: ts.average(&ts.delete_ms, config),
            selectivity: ts.selectivity(),
            stats: ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexType, ResultMode};
    use std::path::PathBuf;

    #[test]
    fn report_serializes_derived_aggregates() {
        let ts = TimeStat {
            insert_ms: vec![10.0, 2.0, 4.0],
            query_ms: vec![5.0, 1.0, 3.0],
            num_geoms: 100,
            num_queries: 10,
            num_results: 200,
            num_threads: 4,
            ..TimeStat::default()
        };
        let config = BenchmarkConfig {
            geom: PathBuf::new(),
            query: None,
            cache_dir: None,
            warmup: 1,
            repeat: 2,
            limit: None,
            seed: 0,
            parallelism: 4,
            avg_time: true,
            query_type: QueryType::RangeIntersects,
            index_type: IndexType::RTree,
            result_mode: ResultMode::Collect,
            load_factor: 0.1,
            batch: 1024,
            json: true,
        };

        let value = serde_json::to_value(Report::new(&ts, &config)).unwrap();
        assert_eq!(value["index_type"], "rtree");
        assert_eq!(value["query_type"], "range-intersects");
        assert_eq!(value["avg_build_ms"], 3.0);
        assert_eq!(value["avg_query_ms"], 2.0);
        assert_eq!(value["num_results"], 200);
        assert_eq!(value["selectivity"], 0.2);
    }
}
