//! Checks the shipped demo config against the session.

use pagelog::core::{ClearPolicy, OverflowPolicy, PoolConfig};
use pagelog::session::run_demo_session;

#[test]
fn test_shipped_config_runs() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/pagelog.toml");
    let config = PoolConfig::from_toml_file(path).unwrap();

    assert_eq!(config, PoolConfig::default());
    assert_eq!(config.overflow, OverflowPolicy::Truncate);
    assert_eq!(config.clear_all, ClearPolicy::Sentinel);

    let mut out = Vec::new();
    let summary = run_demo_session(&config, &mut out).unwrap();
    assert_eq!(summary.page_count, 6);
}

#[test]
fn test_strict_config_rejects_oversized_append() {
    let config = PoolConfig::from_toml_str("page_count = 2\npage_capacity = 16\noverflow = \"reject\"\n").unwrap();
    let result = run_demo_session(&config, &mut Vec::new());
    assert!(matches!(result, Err(pagelog::DemoError::Pool(_))));
}
