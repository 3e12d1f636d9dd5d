//! Observability hooks for the munging pipeline.
//!
//! Stage progress goes through the `log` facade. Drop counters and stage timings
//! are emitted as structured `key=value` lines through `log_metric!`, which is
//! compiled out of release builds.

use std::time::Instant;

/// Logs a structured key-value metric line at debug level, only in debug builds.
///
/// # Example
/// ```
/// use sumstats_munge::log_metric;
/// let dropped = 4;
/// log_metric!("event"="row_filter", "column"="P", "dropped"=&dropped);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            log::debug!(target: "munge_metric", "{}", parts.join(" "));
        }
    };
}

/// Installs an `env_logger` backend. `RUST_LOG` still wins when set.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .try_init();
}

/// Logs how long a stage took when it goes out of scope.
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        log_metric!("event"="stage_timing", "stage"=self.stage, "elapsed_ms"=format!("{:.3}", elapsed_ms));
        log::debug!("{} took {:.3} ms", self.stage, elapsed_ms);
    }
}
