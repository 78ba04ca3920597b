// tests/config_directories.rs

use sasswatch_test_utils::init_tracing;

use std::error::Error;

use sasswatch::config::{load_and_validate, save, unwatch_directory, watch_directory};
use sasswatch::errors::SasswatchError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn add_and_remove_persist_through_the_config_file() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("site").join("Sasswatch.toml");

    // Missing file: defaults, nothing watched.
    let mut cfg = load_and_validate(&path)?;
    assert!(cfg.watch.directories.is_empty());

    assert!(watch_directory(&mut cfg, "src/a"));
    assert!(watch_directory(&mut cfg, "src/b"));
    assert!(!watch_directory(&mut cfg, "src/a"));
    save(&path, &cfg)?;

    let mut reloaded = load_and_validate(&path)?;
    assert_eq!(reloaded, cfg);
    assert_eq!(reloaded.watch.directories, vec!["src/a", "src/b"]);

    assert_eq!(unwatch_directory(&mut reloaded, "src/a")?, "src/a unwatched");
    save(&path, &reloaded)?;

    let mut last = load_and_validate(&path)?;
    assert_eq!(last.watch.directories, vec!["src/b"]);

    let err = unwatch_directory(&mut last, "src/a").unwrap_err();
    assert!(matches!(err, SasswatchError::NotWatchedBefore(_)));
    assert_eq!(err.to_string(), "src/a was not watched before");
    Ok(())
}

#[test]
fn other_settings_survive_an_edit() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Sasswatch.toml");
    std::fs::write(
        &path,
        r#"
[compiler]
backend = "native"
sass_bin_path = "/opt/sass/sass"
include_path = ["node_modules"]

[output]
target_directory = "public/css"
"#,
    )?;

    let mut cfg = load_and_validate(&path)?;
    assert!(watch_directory(&mut cfg, "styles"));
    save(&path, &cfg)?;

    let reloaded = load_and_validate(&path)?;
    assert_eq!(reloaded.compiler.sass_bin_path, "/opt/sass/sass");
    assert_eq!(reloaded.compiler.include_path, vec!["node_modules"]);
    assert_eq!(reloaded.output.target_directory, "public/css");
    assert_eq!(reloaded.watch.directories, vec!["styles"]);
    Ok(())
}
