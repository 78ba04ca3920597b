use std::path::Path;

use crate::compiler::{Compiler, working_directory};
use crate::config::CompilerConfig;
use crate::exec::Invocation;
use crate::target::xform_path;

/// Runs the npm `sass` package (Dart-Sass compiled to JavaScript) with
/// `node`.
///
/// The script path is resolved against the project root, so a plain
/// `npm install sass` in the project is enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct DartSassCompiler;

impl Compiler for DartSassCompiler {
    fn name(&self) -> &'static str {
        "dartsass"
    }

    fn executable_setting(&self) -> &'static str {
        "[compiler].node_bin_path"
    }

    fn base_invocation(&self, project_root: &Path, config: &CompilerConfig) -> Invocation {
        let script = xform_path(project_root, &config.compiler.dart_sass_script);
        Invocation::new(config.compiler.node_bin_path.trim())
            .arg(script.to_string_lossy())
            .current_dir(working_directory(project_root, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_first_argument() {
        let mut cfg = CompilerConfig::default();
        cfg.compiler.sass_working_directory = "styles".into();

        let inv = DartSassCompiler.base_invocation(Path::new("/p"), &cfg);
        assert_eq!(inv.program, "node");
        assert_eq!(inv.args, vec!["/p/node_modules/sass/sass.js"]);
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/p/styles")));
    }
}
