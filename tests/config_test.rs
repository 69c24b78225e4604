use salesdash::config::{
    DEFAULT_BIND_ADDR, DEFAULT_DATA_FILE, DEFAULT_OUT_DIR, DEFAULT_TITLE, DashboardConfig,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment lookup over owned copies of `pairs`, so callers may pass temporaries
fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_arguments() {
    let config =
        DashboardConfig::resolve(&[], env_of(&[]), "SALESDASH_ADDR", DEFAULT_BIND_ADDR).unwrap();
    assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_FILE));
    assert_eq!(config.target, DEFAULT_BIND_ADDR);
    assert_eq!(config.title, DEFAULT_TITLE);
    assert_eq!((config.chart_width, config.chart_height), (800, 500));
}

#[test]
fn arguments_take_precedence_over_environment() {
    let env = env_of(&[("SALESDASH_DATA", "env.xlsx"), ("SALESDASH_ADDR", "0.0.0.0:9000")]);
    let args = vec!["args.csv".to_string(), "out".to_string()];

    let config = DashboardConfig::resolve(&args, env, "SALESDASH_OUT", DEFAULT_OUT_DIR).unwrap();
    assert_eq!(config.data_path, PathBuf::from("args.csv"));
    assert_eq!(config.target, "out");
}

#[test]
fn environment_fills_missing_arguments() {
    let env = env_of(&[
        ("SALESDASH_ADDR", "0.0.0.0:9000"),
        ("SALESDASH_TITLE", "Brand Sales"),
        ("SALESDASH_CHART_WIDTH", "1024"),
        ("SALESDASH_CHART_HEIGHT", " 600 "),
    ]);
    let args = vec!["data.xlsx".to_string()];

    let config =
        DashboardConfig::resolve(&args, env, "SALESDASH_ADDR", DEFAULT_BIND_ADDR).unwrap();
    assert_eq!(config.data_path, PathBuf::from("data.xlsx"));
    assert_eq!(config.target, "0.0.0.0:9000");
    assert_eq!(config.title, "Brand Sales");
    assert_eq!((config.chart_width, config.chart_height), (1024, 600));
}

#[test]
fn invalid_chart_sizes_are_rejected() {
    for bad in ["wide", "0", "99", "4001", "-5"] {
        let env = env_of(&[("SALESDASH_CHART_WIDTH", bad)]);
        let err =
            DashboardConfig::resolve(&[], env, "SALESDASH_ADDR", DEFAULT_BIND_ADDR).unwrap_err();
        assert!(err.to_string().contains("SALESDASH_CHART_WIDTH"), "{}", bad);
    }
}

#[test]
fn renderer_reads_its_own_output_variable() {
    let env = env_of(&[("SALESDASH_ADDR", "0.0.0.0:9000"), ("SALESDASH_OUT", "charts")]);
    let config = DashboardConfig::resolve(&[], env, "SALESDASH_OUT", DEFAULT_OUT_DIR).unwrap();
    assert_eq!(config.target, "charts");

    let config =
        DashboardConfig::resolve(&[], env_of(&[]), "SALESDASH_OUT", DEFAULT_OUT_DIR).unwrap();
    assert_eq!(config.target, "dashboard_output");
}

#[test]
fn lookup_outlives_its_temporary_pairs() {
    let env = env_of(&[("SALESDASH_TITLE", "Owned")]);
    assert_eq!(env("SALESDASH_TITLE").as_deref(), Some("Owned"));
    assert_eq!(env("SALESDASH_DATA"), None);
}
