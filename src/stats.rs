//! Timing accumulators and the warmup/repeat averaging protocol.

use serde::Serialize;

use crate::config::BenchmarkConfig;

/// Per-run timing record.
///
/// Written only by the harness while a benchmark executes; read only by the
/// reporter afterwards. Latency series keep one entry per iteration, warmups
/// included, so per-iteration reporting stays possible.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TimeStat {
    /// Index construction latency per iteration, milliseconds
    pub insert_ms: Vec<f64>,
    /// Query-phase wall time per iteration, milliseconds
    pub query_ms: Vec<f64>,
    /// Deletion-phase wall time per iteration, milliseconds
    pub delete_ms: Vec<f64>,
    pub num_geoms: usize,
    pub num_queries: usize,
    /// Result cardinality of the last query iteration
    pub num_results: u64,
    pub num_inserts: usize,
    pub num_deletes: usize,
    pub num_threads: usize,
}

impl TimeStat {
    /// Fraction of the dataset matched by an average query, in `[0, 1]`.
    pub fn selectivity(&self) -> f64 {
        if self.num_queries == 0 || self.num_geoms == 0 {
            return 0.0;
        }
        self.num_results as f64 / (self.num_queries as f64 * self.num_geoms as f64)
    }

    /// Average of a latency series under this config's warmup/repeat protocol.
    pub fn average(&self, series: &[f64], config: &BenchmarkConfig) -> Option<f64> {
        average_time(series, config.warmup, config.repeat)
    }
}

/// Mean of `series[warmup .. warmup + repeat]`.
///
/// Warmup entries are recorded but never reported. Returns `None` when
/// `repeat` is zero or the series holds no post-warmup entries.
///
/// # Examples
///
/// ```rust
/// use geomark::average_time;
///
/// let series = [9.0, 2.0, 4.0];
/// assert_eq!(average_time(&series, 1, 2), Some(3.0));
/// assert_eq!(average_time(&series, 0, 0), None);
/// ```
pub fn average_time(series: &[f64], warmup: usize, repeat: usize) -> Option<f64> {
    if repeat == 0 || warmup >= series.len() {
        return None;
    }
    let end = (warmup + repeat).min(series.len());
    Some(series[warmup..end].iter().sum::<f64>() / repeat as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_iteration_without_warmup() {
        assert_eq!(average_time(&[7.5], 0, 1), Some(7.5));
    }

    #[test]
    fn warmup_entries_are_excluded() {
        let series = [100.0, 2.0, 4.0, 6.0];
        assert_eq!(average_time(&series, 1, 3), Some(4.0));
    }

    #[test]
    fn zero_repeat_is_guarded() {
        assert_eq!(average_time(&[1.0, 2.0], 0, 0), None);
    }

    #[test]
    fn warmup_beyond_series_is_guarded() {
        assert_eq!(average_time(&[1.0], 3, 2), None);
    }

    #[test]
    fn selectivity_stays_in_unit_interval() {
        let mut ts = TimeStat {
            num_geoms: 100,
            num_queries: 10,
            num_results: 250,
            ..TimeStat::default()
        };
        let s = ts.selectivity();
        assert!((0.0..=1.0).contains(&s));
        assert!((s - 0.25).abs() < 1e-12);

        // every query matching everything is the upper bound
        ts.num_results = 1000;
        assert!((ts.selectivity() - 1.0).abs() < 1e-12);

        ts.num_queries = 0;
        assert_eq!(ts.selectivity(), 0.0);
    }
}
