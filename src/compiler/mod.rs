// src/compiler/mod.rs

//! Compiler backends.
//!
//! The watcher only needs [`Compiler::watch`]; the CLI also uses `version`
//! and `compile_file`. Both backends drive the Dart-Sass command line and
//! differ only in how the program is launched:
//!
//! - [`NativeCompiler`] runs the standalone `sass` executable.
//! - [`DartSassCompiler`] runs the npm `sass` package through `node`.
//!
//! [`CompilerSelector`] picks one from the config. Tests provide their own
//! selector that hands out a fake compiler.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::errors::{ProcessError, Result};
use crate::exec::{BoxFuture, Invocation, run, run_detached};
use crate::target::{
    output_css, output_minified_css, validate_target_directories,
    watch_minified_target_directory, watch_target_directory, xform_path,
};
use crate::types::{CompilerBackend, ProcessOutcome};

pub mod args;
pub mod dartsass;
pub mod document;
pub mod native;

pub use dartsass::DartSassCompiler;
pub use document::validate_document;
pub use native::NativeCompiler;

/// A sass compiler capability.
pub trait Compiler: Send + Sync + fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Config key holding the executable this backend launches; quoted in
    /// launch diagnostics.
    fn executable_setting(&self) -> &'static str;

    /// Program plus leading arguments and working directory, before any
    /// sass flags.
    fn base_invocation(&self, project_root: &Path, config: &CompilerConfig) -> Invocation;

    /// The full `--watch` invocation for `source_dir`.
    fn watch_invocation(
        &self,
        source_dir: &Path,
        project_root: &Path,
        config: &CompilerConfig,
        minified: bool,
    ) -> Invocation {
        let target = if minified {
            watch_minified_target_directory(source_dir, project_root, config)
        } else {
            watch_target_directory(source_dir, project_root, config)
        };
        self.base_invocation(project_root, config)
            .args(args::watch_args(source_dir, &target, project_root, config, minified))
    }

    /// Start a detached watch process for `source_dir`.
    ///
    /// Resolves as soon as the process runs; never waits for it to exit.
    fn watch<'a>(
        &'a self,
        source_dir: &'a Path,
        project_root: &'a Path,
        config: &'a CompilerConfig,
        minified: bool,
    ) -> BoxFuture<'a, std::result::Result<ProcessOutcome, ProcessError>> {
        Box::pin(async move {
            let invocation = self.watch_invocation(source_dir, project_root, config, minified);
            if config.compiler.debug {
                info!(backend = self.name(), cmd = %invocation, "watch invocation");
            }
            run_detached(&invocation).await
        })
    }

    /// `<program> --version`
    fn version<'a>(
        &'a self,
        project_root: &'a Path,
        config: &'a CompilerConfig,
    ) -> BoxFuture<'a, std::result::Result<String, ProcessError>> {
        Box::pin(async move {
            let invocation = self.base_invocation(project_root, config).arg("--version");
            run(&invocation).await
        })
    }

    /// Compile one stylesheet, plus its minified variant unless disabled.
    ///
    /// Returns the last file written.
    fn compile_file<'a>(
        &'a self,
        input: &'a Path,
        project_root: &'a Path,
        config: &'a CompilerConfig,
    ) -> BoxFuture<'a, Result<PathBuf>> {
        Box::pin(async move {
            validate_document(input, config)?;
            validate_target_directories(project_root, config)?;

            let input = xform_path(project_root, &input.to_string_lossy());
            let output = output_css(&input, project_root, config);
            if config.compiler.debug {
                info!(
                    working_directory = %config.compiler.sass_working_directory,
                    include_path = %config.compiler.include_path.join(","),
                    "compile settings"
                );
            }
            info!("{} -> {}", input.display(), output.display());

            let invocation = self
                .base_invocation(project_root, config)
                .args(args::compile_args(&input, &output, project_root, config, false));
            run(&invocation).await?;

            if config.output.disable_minified_file_generation {
                return Ok(output);
            }

            let minified = output_minified_css(&input, project_root, config);
            info!("{} -> {}", input.display(), minified.display());
            let invocation = self
                .base_invocation(project_root, config)
                .args(args::compile_args(&input, &minified, project_root, config, true));
            run(&invocation).await?;

            Ok(minified)
        })
    }
}

/// Picks the compiler a launch should use.
pub trait CompilerSelector: Send + Sync + fmt::Debug {
    fn select(&self, config: &CompilerConfig) -> Arc<dyn Compiler>;
}

/// Production selector: `[compiler].backend` decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSelector;

impl CompilerSelector for BackendSelector {
    fn select(&self, config: &CompilerConfig) -> Arc<dyn Compiler> {
        select_compiler(config)
    }
}

/// The compiler for the configured backend.
pub fn select_compiler(config: &CompilerConfig) -> Arc<dyn Compiler> {
    let compiler: Arc<dyn Compiler> = match config.compiler.backend {
        CompilerBackend::Native => Arc::new(NativeCompiler),
        CompilerBackend::DartSass => Arc::new(DartSassCompiler),
    };
    debug!(backend = compiler.name(), "selected compiler");
    compiler
}

/// Working directory for compiler processes.
pub(crate) fn working_directory(project_root: &Path, config: &CompilerConfig) -> PathBuf {
    xform_path(project_root, &config.compiler.sass_working_directory)
}
