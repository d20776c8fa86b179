use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use attrtree_core::{
    Attribute, AttributeTree, CoercionConfig, SchemaCoercion, SchemaEntry, SchemaTree, TypeTag,
    TIMEZONE_OPTION,
};
use attrtree_test_support::{put, DAY, HOUR};

const CI_CONFIG: &[(u64, u64)] = &[(100, 5), (1_000, 1), (10_000, 1)];

const LOCAL_CONFIG: &[(u64, u64)] = &[(10, 1), (100, 1), (1_000, 1), (10_000, 1)];

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    implementation: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_leaves: u64,
    duration_ms: f64,
    leaves_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Extra {
    count: u64,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_duration_ms: Option<f64>,
}

fn is_ci() -> bool {
    env::var("CI").map(|v| v == "true").unwrap_or(false)
}

/// `count` groups, each holding a DATE leaf and a zoned TIME leaf.
fn workload(count: u64) -> (SchemaTree, AttributeTree) {
    let mut schema = SchemaTree::named("bench");
    let mut tree = AttributeTree::named("bench");
    for i in 0..count {
        let day = i as i64 * DAY;
        put(
            &mut schema,
            &format!("g{i}/day"),
            SchemaEntry::typed(TypeTag::Date),
        );
        put(
            &mut schema,
            &format!("g{i}/at"),
            SchemaEntry::typed(TypeTag::Time).with_option(TIMEZONE_OPTION, "Europe/Berlin"),
        );
        put(&mut tree, &format!("g{i}/day"), Attribute::number(day));
        put(&mut tree, &format!("g{i}/at"), Attribute::number(day + 9 * HOUR));
    }
    (schema, tree)
}

fn run_benchmark(count: u64) -> f64 {
    let (schema, mut tree) = workload(count);
    let config = CoercionConfig::default();

    let start = Instant::now();
    SchemaCoercion::new(&schema, &config)
        .apply(&mut tree)
        .expect("coercion succeeds");
    start.elapsed().as_secs_f64() * 1000.0
}

fn main() {
    let config: &[(u64, u64)] = if is_ci() { CI_CONFIG } else { LOCAL_CONFIG };

    let mut out_dir: Option<PathBuf> = None;
    let mut custom_config: Option<Vec<(u64, u64)>> = None;
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--count=") {
            let count = val.parse().unwrap_or(500);
            custom_config = Some(vec![(count, 1)]);
        } else if let Some(val) = arg.strip_prefix("--counts=") {
            let parsed: Vec<(u64, u64)> = val
                .split(',')
                .filter_map(|s| s.trim().parse::<u64>().ok())
                .map(|c| (c, 1))
                .collect();
            if !parsed.is_empty() {
                custom_config = Some(parsed);
            }
        } else if let Some(val) = arg.strip_prefix("--out-dir=") {
            out_dir = Some(PathBuf::from(val));
        }
    }

    let config = custom_config.as_deref().unwrap_or(config);
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("benchmarks/core"));
    fs::create_dir_all(&out_dir).expect("mkdirs");

    for &(count, iterations) in config {
        let (duration_ms, iterations_opt, avg_duration_ms) = if iterations > 1 {
            let durations: Vec<f64> = (0..iterations).map(|_| run_benchmark(count)).collect();
            let avg = durations.iter().sum::<f64>() / durations.len() as f64;
            (avg, Some(iterations), Some(avg))
        } else {
            (run_benchmark(count), None, None)
        };

        let workload_name = format!("coerce-date-time-{count}");
        let out_path = out_dir.join(format!("{workload_name}.json"));
        let total_leaves = count * 2;

        let output = Output {
            implementation: "attrtree-core",
            workload: workload_name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            name: workload_name,
            total_leaves,
            duration_ms,
            leaves_per_sec: if duration_ms > 0.0 {
                total_leaves as f64 / duration_ms * 1000.0
            } else {
                f64::INFINITY
            },
            extra: Extra {
                count,
                mode: "transactional",
                iterations: iterations_opt,
                avg_duration_ms,
            },
            source_file: Some(out_path.display().to_string()),
        };

        let json = serde_json::to_string_pretty(&output).expect("serialize");
        fs::write(&out_path, &json).expect("write output");
        println!("{json}");
    }
}
