//! `sass` command-line arguments shared by both backends.

use std::path::Path;

use crate::config::CompilerConfig;
use crate::target::xform_path;

/// Output style flag.
pub fn style_arg(minified: bool) -> &'static str {
    if minified {
        "--style=compressed"
    } else {
        "--style=expanded"
    }
}

/// Flags common to watch and single-file compiles.
pub fn common_args(project_root: &Path, config: &CompilerConfig, minified: bool) -> Vec<String> {
    let mut args = vec![style_arg(minified).to_string()];
    if config.compiler.disable_source_map {
        args.push("--no-source-map".to_string());
    }
    for include in &config.compiler.include_path {
        let dir = xform_path(project_root, include);
        args.push(format!("--load-path={}", dir.display()));
    }
    args
}

/// `--watch <flags> <source>:<target>`
pub fn watch_args(
    source_dir: &Path,
    target_dir: &Path,
    project_root: &Path,
    config: &CompilerConfig,
    minified: bool,
) -> Vec<String> {
    let mut args = vec!["--watch".to_string()];
    args.extend(common_args(project_root, config, minified));
    args.push(mapping(source_dir, target_dir));
    args
}

/// `<flags> <input>:<output>` for a one-shot compile.
pub fn compile_args(
    input: &Path,
    output: &Path,
    project_root: &Path,
    config: &CompilerConfig,
    minified: bool,
) -> Vec<String> {
    let mut args = common_args(project_root, config, minified);
    args.push(mapping(input, output));
    args
}

fn mapping(from: &Path, to: &Path) -> String {
    format!("{}:{}", from.display(), to.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn watch_args_for_normal_output() {
        let cfg = CompilerConfig::default();
        let args = watch_args(
            Path::new("/p/src"),
            Path::new("/p/out"),
            Path::new("/p"),
            &cfg,
            false,
        );
        assert_eq!(args, vec!["--watch", "--style=expanded", "/p/src:/p/out"]);
    }

    #[test]
    fn include_paths_and_source_map_flags() {
        let mut cfg = CompilerConfig::default();
        cfg.compiler.disable_source_map = true;
        cfg.compiler.include_path = vec!["node_modules".into(), "/abs/lib".into()];

        let args = compile_args(
            &PathBuf::from("/p/src/a.scss"),
            &PathBuf::from("/p/src/a.min.css"),
            Path::new("/p"),
            &cfg,
            true,
        );
        assert_eq!(
            args,
            vec![
                "--style=compressed",
                "--no-source-map",
                "--load-path=/p/node_modules",
                "--load-path=/abs/lib",
                "/p/src/a.scss:/p/src/a.min.css",
            ]
        );
    }
}
