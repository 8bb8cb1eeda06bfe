//! Bundled scenario files must load and validate.

use std::path::PathBuf;

use tool_bench::ScenarioConfig;

fn scenarios_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

#[test]
fn test_bundled_scenarios_validate() {
    let mut count = 0;
    for entry in std::fs::read_dir(scenarios_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|s| s.to_str()) != Some("yaml") {
            continue;
        }
        let config = ScenarioConfig::from_file(&path)
            .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        config
            .validate()
            .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        count += 1;
    }
    assert!(count >= 3);
}

#[test]
fn test_echo_scenario_arguments() {
    let config = ScenarioConfig::from_file(scenarios_dir().join("echo.yaml")).unwrap();
    let spec = config.to_spec().unwrap();
    assert_eq!(spec.tool_name, "echo");
    assert_eq!(spec.iterations, 20);
    assert_eq!(spec.arguments["message"], "hello from tool-bench");
}
