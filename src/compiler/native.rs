use std::path::Path;

use crate::compiler::{Compiler, working_directory};
use crate::config::CompilerConfig;
use crate::exec::Invocation;

/// Runs the standalone `sass` executable from `[compiler].sass_bin_path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompiler;

impl Compiler for NativeCompiler {
    fn name(&self) -> &'static str {
        "native"
    }

    fn executable_setting(&self) -> &'static str {
        "[compiler].sass_bin_path"
    }

    fn base_invocation(&self, project_root: &Path, config: &CompilerConfig) -> Invocation {
        Invocation::new(config.compiler.sass_bin_path.trim())
            .current_dir(working_directory(project_root, config))
    }
}
