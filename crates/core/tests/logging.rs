use std::path::Path;
use tempfile::TempDir;

// Installs the global subscriber, so this file holds exactly one test.
#[test]
fn test_init_logging_writes_to_component_file() {
    let dir = TempDir::new().unwrap();
    let guard =
        depot_core::logging::init_logging("registry", Some(dir.path()), false).unwrap();

    tracing::info!("registry smoke line");
    drop(guard);

    let contents = read_component_log(dir.path(), "registry");
    assert!(
        contents.contains("registry smoke line"),
        "log file missing the emitted line: {contents:?}"
    );
}

fn read_component_log(dir: &Path, component: &str) -> String {
    let mut combined = String::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy();
        if name.starts_with(component) {
            combined.push_str(&std::fs::read_to_string(&path).unwrap());
        }
    }
    combined
}
