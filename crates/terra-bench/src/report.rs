use std::fmt::Write as _;
use std::io;
use std::path::Path;

use crate::runner::{BenchmarkResult, TimingSeries};

/// Results of one full bench run, as stored on disk.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Which settle statistic regressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MeanSettle,
    P95Settle,
}

impl Metric {
    fn label(self) -> &'static str {
        match self {
            Metric::MeanSettle => "mean settle",
            Metric::P95Settle => "p95 settle",
        }
    }

    fn read(self, timings: &TimingSeries) -> f64 {
        match self {
            Metric::MeanSettle => timings.mean_ms,
            Metric::P95Settle => timings.p95_ms,
        }
    }
}

/// A scene that got slower than the baseline by more than the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub scene: String,
    pub metric: Metric,
    pub baseline_ms: f64,
    pub current_ms: f64,
}

impl Regression {
    pub fn pct_change(&self) -> f64 {
        (self.current_ms - self.baseline_ms) / self.baseline_ms * 100.0
    }
}

/// None if the file is missing or not a baseline.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            log::warn!("ignoring unreadable baseline {}: {e}", path.display());
            None
        }
    }
}

pub fn save_baseline(path: &Path, baseline: &Baseline) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let text = serde_json::to_string_pretty(baseline).map_err(io::Error::other)?;
    std::fs::write(path, text)
}

/// Settle-time regressions of `current` against `baseline`, by scene name.
/// Scenes missing from the baseline and zero baselines are skipped.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    let mut regressions = Vec::new();
    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };
        for metric in [Metric::MeanSettle, Metric::P95Settle] {
            let baseline_ms = metric.read(&base.timings);
            if !(baseline_ms.is_finite() && baseline_ms > 0.0) {
                continue;
            }
            let regression = Regression {
                scene: result.scene_name.clone(),
                metric,
                baseline_ms,
                current_ms: metric.read(&result.timings),
            };
            if regression.pct_change() > threshold_pct {
                regressions.push(regression);
            }
        }
    }
    regressions
}

pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::from(
        "| Scene | Steps | Chunks | Meshed | Settle mean (ms) | Median | P95 | P99 | Min | Max |\n\
         |---|---|---|---|---|---|---|---|---|---|\n",
    );
    for r in results {
        let t = &r.timings;
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            r.scene_name,
            r.steps,
            r.chunks_placed,
            r.chunks_meshed,
            t.mean_ms,
            t.median_ms,
            t.p95_ms,
            t.p99_ms,
            t.min_ms,
            t.max_ms,
        );
    }
    out
}

pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!("No regressions beyond {threshold_pct:.0}%.\n");
    }
    let mut out = format!("{} regressions beyond {threshold_pct:.0}%:\n", regressions.len());
    for r in regressions {
        let _ = writeln!(
            out,
            "  - {} {}: {:.2} ms -> {:.2} ms (+{:.1}%)",
            r.scene,
            r.metric.label(),
            r.baseline_ms,
            r.current_ms,
            r.pct_change()
        );
    }
    out
}
