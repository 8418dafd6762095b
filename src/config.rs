//! Benchmark configuration.
//!
//! A [`BenchmarkConfig`] is created once from command-line input, validated,
//! and never mutated afterwards. Enum-valued flags parse through `FromStr`;
//! an unrecognized string is a fatal configuration error, mirrored all the
//! way to a nonzero process exit.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{GeomarkError, Result};

/// The operation a benchmark run measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Dataset boxes containing a query point
    PointContains,
    /// Dataset boxes containing a query box
    RangeContains,
    /// Dataset boxes intersecting a query box
    RangeIntersects,
    /// Index construction only, no query phase
    BulkLoading,
    /// Chunked insertion throughput
    Insertion,
    /// Chunked deletion throughput
    Deletion,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointContains => "point-contains",
            Self::RangeContains => "range-contains",
            Self::RangeIntersects => "range-intersects",
            Self::BulkLoading => "bulk-loading",
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
        }
    }

    /// Whether this operation runs the sharded query phase.
    pub fn has_query_phase(&self) -> bool {
        matches!(
            self,
            Self::PointContains | Self::RangeContains | Self::RangeIntersects
        )
    }
}

impl FromStr for QueryType {
    type Err = GeomarkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "point-contains" => Ok(Self::PointContains),
            "range-contains" => Ok(Self::RangeContains),
            "range-intersects" => Ok(Self::RangeIntersects),
            "bulk-loading" => Ok(Self::BulkLoading),
            "insertion" => Ok(Self::Insertion),
            "deletion" => Ok(Self::Deletion),
            other => Err(GeomarkError::InvalidConfig(format!(
                "unknown query type '{}', expected point-contains/range-contains/\
                 range-intersects/bulk-loading/insertion/deletion",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The spatial-index backend driven by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// R-tree backed by the `rstar` crate
    RTree,
    /// Exhaustive scan baseline
    Linear,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RTree => "rtree",
            Self::Linear => "linear",
        }
    }
}

impl FromStr for IndexType {
    type Err = GeomarkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rtree" => Ok(Self::RTree),
            "linear" => Ok(Self::Linear),
            other => Err(GeomarkError::InvalidConfig(format!(
                "unknown index type '{}', expected rtree/linear",
                other
            ))),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How query-phase workers account for their matches.
///
/// A runtime switch rather than a build-time one, so a single binary can
/// report either full match sets or bare cardinalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultMode {
    /// Materialize matched ids into a shared buffer
    #[default]
    Collect,
    /// Count matches into a shared atomic total
    Count,
}

impl FromStr for ResultMode {
    type Err = GeomarkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "collect" => Ok(Self::Collect),
            "count" => Ok(Self::Count),
            other => Err(GeomarkError::InvalidConfig(format!(
                "unknown result mode '{}', expected collect/count",
                other
            ))),
        }
    }
}

/// Immutable configuration for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Input geometry file (WKT)
    pub geom: PathBuf,
    /// Query geometry file (WKT); required for query-phase operations
    pub query: Option<PathBuf>,
    /// Directory holding binary geometry caches; parsed WKT is cached here
    pub cache_dir: Option<PathBuf>,
    /// Timed iterations discarded from the reported average
    pub warmup: usize,
    /// Timed iterations contributing to the reported average
    pub repeat: usize,
    /// Read at most this many geometries per input file
    pub limit: Option<usize>,
    /// Seed for workload generation
    pub seed: u64,
    /// Query-phase worker count; 0 resolves to hardware concurrency
    pub parallelism: usize,
    /// Report the warmup-trimmed average instead of per-iteration latencies
    pub avg_time: bool,
    pub query_type: QueryType,
    pub index_type: IndexType,
    pub result_mode: ResultMode,
    /// Result-buffer pre-reservation hint, as a fraction of the dataset size
    pub load_factor: f64,
    /// Chunk size for the insertion/deletion variants
    pub batch: usize,
    /// Emit the report as JSON instead of text
    pub json: bool,
}

impl BenchmarkConfig {
    /// Normalize defaults and reject inconsistent settings.
    ///
    /// `parallelism == 0` resolves to the hardware thread count. Unreadable
    /// input paths, `repeat == 0`, `batch == 0`, a negative `load_factor`,
    /// and a missing query file for a query-phase operation are all fatal.
    pub fn validated(mut self) -> Result<Self> {
        if self.repeat == 0 {
            return Err(GeomarkError::InvalidConfig(
                "repeat must be at least 1".into(),
            ));
        }
        if self.batch == 0 {
            return Err(GeomarkError::InvalidConfig(
                "batch must be at least 1".into(),
            ));
        }
        if !self.load_factor.is_finite() || self.load_factor < 0.0 {
            return Err(GeomarkError::InvalidConfig(format!(
                "load_factor must be non-negative, got {}",
                self.load_factor
            )));
        }
        if self.parallelism == 0 {
            self.parallelism = hardware_parallelism();
        }

        check_readable(&self.geom)?;
        if self.query_type.has_query_phase() {
            match &self.query {
                Some(path) => check_readable(path)?,
                None => {
                    return Err(GeomarkError::InvalidConfig(format!(
                        "query type '{}' requires --query",
                        self.query_type
                    )));
                }
            }
        }

        Ok(self)
    }

    /// Geometry read limit, with "no limit" folded to `usize::MAX`.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }
}

fn check_readable(path: &std::path::Path) -> Result<()> {
    std::fs::File::open(path)
        .map(|_| ())
        .map_err(|_| GeomarkError::InvalidConfig(format!("cannot open {}", path.display())))
}

/// Number of worker threads to use when the user does not pin one.
pub fn hardware_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
