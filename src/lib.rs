//! Selectivity-controlled workload generation and parallel benchmarking for
//! spatial-index backends.
//!
//! ```rust
//! use geomark::{IntersectsConfig, generate_intersects_queries};
//! use geo::{Rect, coord};
//!
//! let data: Vec<Rect<f64>> = (0..20)
//!     .map(|i| {
//!         let x = (i % 5) as f64 * 2.0;
//!         let y = (i / 5) as f64 * 2.0;
//!         Rect::new(coord! { x: x, y: y }, coord! { x: x + 3.0, y: y + 3.0 })
//!     })
//!     .collect();
//!
//! let config = IntersectsConfig {
//!     min_qualified: 3,
//!     num_queries: 5,
//!     seed: 42,
//!     parallelism: 1,
//!     ..IntersectsConfig::default()
//! };
//! let outcome = generate_intersects_queries(&data, &config)?;
//! assert_eq!(outcome.queries.len(), 5);
//! # Ok::<(), geomark::GeomarkError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod geom;
pub mod harness;
pub mod index;
pub mod loader;
pub mod report;
pub mod stats;

pub use config::{BenchmarkConfig, IndexType, QueryType, ResultMode};
pub use error::{GeomarkError, Result};

pub use generator::{
    IntersectsConfig, IntersectsOutcome, generate_contains_queries, generate_intersects_queries,
    generate_point_queries,
};

pub use harness::{
    Workload, run_bulk_load_benchmark, run_deletion_benchmark, run_insertion_benchmark,
    run_query_benchmark, shard_range,
};

pub use index::{LinearScanIndex, RTreeIndex, SpatialIndex, create_index};

pub use stats::{TimeStat, average_time};

pub use geo::{Point, Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
