// tests/supervisor.rs

use sasswatch_test_utils::{FakeCompiler, fake_watcher, init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use sasswatch::config::load_and_validate;
use sasswatch::engine::{Supervisor, SupervisorEvent};
use sasswatch::watch::Watcher;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(path: &Path, directories: &[&str]) -> std::io::Result<()> {
    let dirs = directories
        .iter()
        .map(|d| format!("\"{d}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        path,
        format!(
            r#"
[output]
target_directory = "out"
target_minified_directory = "out/min"

[watch]
directories = [{dirs}]
verify_interval_secs = 0
"#
        ),
    )
}

/// Poll until the watched directories are exactly `expected`.
async fn wait_for_dirs(watcher: &Watcher, expected: &[PathBuf]) {
    with_timeout(async {
        loop {
            let dirs: Vec<PathBuf> = watcher.watch_list().keys().cloned().collect();
            if dirs == expected {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
}

#[tokio::test]
async fn supervisor_launches_on_start_and_clears_on_shutdown() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    let config_path = root.join("Sasswatch.toml");
    write_config(&config_path, &["src/a", "src/b"])?;
    let cfg = load_and_validate(&config_path)?;

    let (watcher, _compiler, control) = fake_watcher(FakeCompiler::new());
    let (tx, rx) = mpsc::channel(16);
    let supervisor = Supervisor::new(watcher.clone(), config_path, root.clone(), cfg, rx);
    let run = tokio::spawn(supervisor.run());

    wait_for_dirs(&watcher, &[root.join("src/a"), root.join("src/b")]).await;

    tx.send(SupervisorEvent::ShutdownRequested).await?;
    with_timeout(run).await??;

    assert!(watcher.watch_list().is_empty());
    assert_eq!(control.terminated().len(), 4);
    Ok(())
}

#[tokio::test]
async fn config_change_relaunches_from_the_new_config() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    let config_path = root.join("Sasswatch.toml");
    write_config(&config_path, &["src/a", "src/b"])?;
    let cfg = load_and_validate(&config_path)?;

    let (watcher, compiler, control) = fake_watcher(FakeCompiler::new());
    let (tx, rx) = mpsc::channel(16);
    let supervisor = Supervisor::new(watcher.clone(), config_path.clone(), root.clone(), cfg, rx);
    let run = tokio::spawn(supervisor.run());

    wait_for_dirs(&watcher, &[root.join("src/a"), root.join("src/b")]).await;

    write_config(&config_path, &["src/c"])?;
    // A burst of events settles into one relaunch.
    tx.send(SupervisorEvent::ConfigChanged).await?;
    tx.send(SupervisorEvent::ConfigChanged).await?;

    wait_for_dirs(&watcher, &[root.join("src/c")]).await;
    with_timeout(async {
        while compiler.calls().len() < 6 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert_eq!(control.terminated().len(), 4);

    tx.send(SupervisorEvent::ShutdownRequested).await?;
    with_timeout(run).await??;

    assert!(watcher.watch_list().is_empty());
    assert_eq!(control.terminated().len(), 6);
    Ok(())
}

#[tokio::test]
async fn broken_config_keeps_current_watches() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    let config_path = root.join("Sasswatch.toml");
    write_config(&config_path, &["src/a"])?;
    let cfg = load_and_validate(&config_path)?;

    let (watcher, _compiler, control) = fake_watcher(FakeCompiler::new());
    let (tx, rx) = mpsc::channel(16);
    let supervisor = Supervisor::new(watcher.clone(), config_path.clone(), root.clone(), cfg, rx);
    let run = tokio::spawn(supervisor.run());

    wait_for_dirs(&watcher, &[root.join("src/a")]).await;

    fs::write(&config_path, "[watch\ndirectories = ")?;
    tx.send(SupervisorEvent::ConfigChanged).await?;
    // Past the debounce window.
    sleep(Duration::from_millis(500)).await;

    assert_eq!(watcher.watch_list().len(), 1);
    assert!(control.terminated().is_empty());

    tx.send(SupervisorEvent::ShutdownRequested).await?;
    with_timeout(run).await??;
    assert_eq!(control.terminated().len(), 2);
    Ok(())
}

#[tokio::test]
async fn closed_event_channel_stops_the_supervisor() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    let config_path = root.join("Sasswatch.toml");
    write_config(&config_path, &["src/a"])?;
    let cfg = load_and_validate(&config_path)?;

    let (watcher, _compiler, control) = fake_watcher(FakeCompiler::new());
    let (tx, rx) = mpsc::channel(16);
    let supervisor = Supervisor::new(watcher.clone(), config_path, root.clone(), cfg, rx);
    let run = tokio::spawn(supervisor.run());

    wait_for_dirs(&watcher, &[root.join("src/a")]).await;
    drop(tx);

    with_timeout(run).await??;
    assert!(watcher.watch_list().is_empty());
    assert_eq!(control.terminated().len(), 2);
    Ok(())
}
