use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use terra_bench::report;
use terra_bench::runner::BenchmarkRunner;
use terra_bench::scenes;
use terra_catalog::{defaults, load_streaming_config, validate_config, validate_materials};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut iterations = 3u32;
    let mut view_distance: Option<i32> = None;
    let mut threads: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--baseline" => baseline_path = Some(PathBuf::from(value_of(&args, &mut i, flag))),
            "--output" => output_path = Some(PathBuf::from(value_of(&args, &mut i, flag))),
            "--config" => config_path = Some(PathBuf::from(value_of(&args, &mut i, flag))),
            "--regression-threshold" => regression_threshold = parse_value(&args, &mut i, flag),
            "--iterations" => iterations = parse_value(&args, &mut i, flag),
            "--view-distance" => view_distance = Some(parse_value(&args, &mut i, flag)),
            "--threads" => threads = Some(parse_value(&args, &mut i, flag)),
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!("  --config <path>                Streaming config RON (default: built-in)");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --iterations <n>               Runs per scene (default: 3)");
                eprintln!("  --view-distance <n>            Override the config view distance");
                eprintln!("  --threads <n>                  Override the generation pool size");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                fail(&format!("cannot read {}: {e}", path.display()));
            });
            load_streaming_config(&text).unwrap_or_else(|e| fail(&e.to_string()))
        }
        None => defaults::default_config().unwrap_or_else(|e| fail(&e.to_string())),
    };
    if let Some(vd) = view_distance {
        config.view_distance = vd;
    }
    if let Some(n) = threads {
        config.generation_threads = n;
    }
    let catalog = defaults::default_catalog().unwrap_or_else(|e| fail(&e.to_string()));

    let checks = [validate_config(&config), validate_materials(&catalog)];
    let errors: Vec<_> = checks.into_iter().filter_map(Result::err).flatten().collect();
    if !errors.is_empty() {
        for e in &errors {
            log::error!("Validation error: {e}");
        }
        fail(&format!("validation failed with {} errors", errors.len()));
    }

    log::info!(
        "Streaming with view distance {}, {} workers, {} max pending",
        config.view_distance,
        config.generation_threads,
        config.max_pending
    );
    let scene_configs = scenes::standard_scenes(&config);
    let runner = BenchmarkRunner::new(config, catalog, iterations);
    let mut results = Vec::new();

    for scene in &scene_configs {
        match runner.run_scene(scene) {
            Ok(result) => results.push(result),
            Err(e) => fail(&format!("scene '{}' failed: {e}", scene.name)),
        }
    }

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_timestamp(),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            fail(&format!("failed to save baseline: {e}"));
        }
        log::info!("Saved baseline to {}", path.display());
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

/// Consume the value following `flag`.
fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value,
        None => fail(&format!("{flag} needs a value")),
    }
}

fn parse_value<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let raw = value_of(args, i, flag);
    raw.parse()
        .unwrap_or_else(|_| fail(&format!("invalid {flag} value: {raw}")))
}

fn fail(message: &str) -> ! {
    eprintln!("ERROR: {message}");
    process::exit(1);
}

/// Baseline label from the Unix time in seconds.
fn run_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}
