// src/lib.rs

pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod target;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cli::{CliArgs, Command};
use crate::compiler::select_compiler;
use crate::config::{CompilerConfig, load_and_validate, save, unwatch_directory, watch_directory};
use crate::engine::{Supervisor, SupervisorEvent};
use crate::target::{normalize, watch_minified_target_directory, watch_target_directory, xform_path};
use crate::watch::{Watcher, spawn_config_watcher};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let project_root = project_root_dir(&config_path);
    debug!(root = %project_root.display(), "project root");

    match args.command {
        Command::Watch { dry_run } => {
            let cfg = load_and_validate(&config_path)?;
            if dry_run {
                print_dry_run(&cfg, &project_root);
                return Ok(());
            }
            run_watch(config_path, project_root, cfg).await
        }
        Command::Add { directory } => {
            let mut cfg = load_and_validate(&config_path)?;
            if watch_directory(&mut cfg, &directory) {
                save(&config_path, &cfg)?;
                println!("{directory} added to the watch list");
            } else {
                println!("{directory} already watched");
            }
            Ok(())
        }
        Command::Remove { directory } => {
            let mut cfg = load_and_validate(&config_path)?;
            let msg = unwatch_directory(&mut cfg, &directory)?;
            save(&config_path, &cfg)?;
            println!("{msg}");
            Ok(())
        }
        Command::List => {
            let cfg = load_and_validate(&config_path)?;
            print_watch_list(&cfg, &project_root);
            Ok(())
        }
        Command::Compile { file } => {
            let cfg = load_and_validate(&config_path)?;
            let compiler = select_compiler(&cfg);
            let output = compiler.compile_file(&file, &project_root, &cfg).await?;
            println!("{}", output.display());
            Ok(())
        }
        Command::Version => {
            let cfg = load_and_validate(&config_path)?;
            let compiler = select_compiler(&cfg);
            let version = compiler.version(&project_root, &cfg).await?;
            println!("{} ({})", version, compiler.name());
            Ok(())
        }
    }
}

/// Wire the watcher, config watcher and Ctrl-C handling around the
/// supervisor loop.
async fn run_watch(config_path: PathBuf, project_root: PathBuf, cfg: CompilerConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel::<SupervisorEvent>(16);

    // A missing config watcher only disables hot reload.
    let _config_watcher = match spawn_config_watcher(&config_path, tx.clone()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "config file watching disabled");
            None
        }
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SupervisorEvent::ShutdownRequested).await;
        });
    }

    let watcher = Watcher::from_config(&cfg);
    let supervisor = Supervisor::new(watcher, config_path, project_root, cfg, rx);
    supervisor.run().await?;
    Ok(())
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Sasswatch.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sasswatch.toml" (parent = ""),
///   we fall back to the current working directory.
///
/// The result is absolute so that registry keys are stable.
pub fn project_root_dir(config_path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => normalize(&cwd.join(parent)),
        _ => cwd,
    }
}

/// Print the watch list and where each directory compiles to.
fn print_watch_list(cfg: &CompilerConfig, project_root: &Path) {
    if cfg.watch.directories.is_empty() {
        println!("no directories are watched");
        return;
    }
    for dir in &cfg.watch.directories {
        let source = xform_path(project_root, dir);
        let target = watch_target_directory(&source, project_root, cfg);
        println!("{dir}");
        println!("    source: {}", source.display());
        println!("    target: {}", target.display());
        if !cfg.output.disable_minified_file_generation {
            let minified = watch_minified_target_directory(&source, project_root, cfg);
            println!("    minified target: {}", minified.display());
        }
    }
}

/// Simple dry-run output: print the processes `watch` would start.
fn print_dry_run(cfg: &CompilerConfig, project_root: &Path) {
    let compiler = select_compiler(cfg);

    println!("sasswatch dry-run");
    println!("  compiler.backend = {}", cfg.compiler.backend);
    println!("  project root = {}", project_root.display());
    println!();

    println!("watches ({}):", cfg.watch.directories.len());
    for dir in &cfg.watch.directories {
        let source = xform_path(project_root, dir);
        println!("  - {dir}");
        println!(
            "      normal: {}",
            compiler.watch_invocation(&source, project_root, cfg, false)
        );

        if cfg.output.disable_minified_file_generation {
            continue;
        }
        let target = watch_target_directory(&source, project_root, cfg);
        let minified = watch_minified_target_directory(&source, project_root, cfg);
        if target == minified {
            println!("      minified: skipped (same target as normal output)");
        } else {
            println!(
                "      minified: {}",
                compiler.watch_invocation(&source, project_root, cfg, true)
            );
        }
    }

    debug!("dry-run complete (no processes started)");
}
