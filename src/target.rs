// src/target.rs

//! Resolution of source and output paths.
//!
//! Everything here is pure: paths are normalized lexically, never
//! canonicalized, so directories that do not exist yet still resolve.

use std::path::{Component, Path, PathBuf};

use crate::config::CompilerConfig;
use crate::errors::{Result, SasswatchError};

/// Resolve a configured path against the project root.
///
/// - empty → the project root itself
/// - absolute → unchanged (but normalized)
/// - relative → joined to the project root
pub fn xform_path(project_root: &Path, path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return normalize(project_root);
    }
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        normalize(candidate)
    } else {
        normalize(&project_root.join(candidate))
    }
}

/// Lexical normalization: drops `.` and resolves `..` against the preceding
/// component.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` directly under the root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Where the normal-output watcher for `source_dir` writes.
pub fn watch_target_directory(
    source_dir: &Path,
    project_root: &Path,
    config: &CompilerConfig,
) -> PathBuf {
    let target = &config.output.target_directory;
    if target.trim().is_empty() {
        normalize(source_dir)
    } else {
        xform_path(project_root, target)
    }
}

/// Where the minified-output watcher for `source_dir` writes.
pub fn watch_minified_target_directory(
    source_dir: &Path,
    project_root: &Path,
    config: &CompilerConfig,
) -> PathBuf {
    let target = &config.output.target_minified_directory;
    if target.trim().is_empty() {
        watch_target_directory(source_dir, project_root, config)
    } else {
        xform_path(project_root, target)
    }
}

/// `<target>/<stem>.css` for a single compiled file.
pub fn output_css(input: &Path, project_root: &Path, config: &CompilerConfig) -> PathBuf {
    let dir = watch_target_directory(parent_of(input), project_root, config);
    dir.join(format!("{}.css", file_stem(input)))
}

/// `<minified target>/<stem>.min.css` for a single compiled file.
pub fn output_minified_css(input: &Path, project_root: &Path, config: &CompilerConfig) -> PathBuf {
    let dir = watch_minified_target_directory(parent_of(input), project_root, config);
    dir.join(format!("{}.min.css", file_stem(input)))
}

/// Configured output directories must exist before anything is compiled.
pub fn validate_target_directories(project_root: &Path, config: &CompilerConfig) -> Result<()> {
    let configured = [
        ("target_directory", &config.output.target_directory),
        (
            "target_minified_directory",
            &config.output.target_minified_directory,
        ),
    ];
    for (key, value) in configured {
        if value.trim().is_empty() {
            continue;
        }
        let dir = xform_path(project_root, value);
        if !dir.is_dir() {
            return Err(SasswatchError::ConfigError(format!(
                "[output].{key} {} does not exist",
                dir.display()
            )));
        }
    }
    Ok(())
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
