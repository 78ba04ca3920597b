#![allow(dead_code)]

use sasswatch::config::CompilerConfig;
use sasswatch::types::CompilerBackend;

/// Builder for `CompilerConfig` to simplify test setup.
pub struct ConfigBuilder {
    config: CompilerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CompilerConfig::default(),
        }
    }

    pub fn backend(mut self, backend: CompilerBackend) -> Self {
        self.config.compiler.backend = backend;
        self
    }

    pub fn watch(mut self, dir: &str) -> Self {
        self.config.watch.directories.push(dir.to_string());
        self
    }

    pub fn target(mut self, dir: &str) -> Self {
        self.config.output.target_directory = dir.to_string();
        self
    }

    pub fn minified_target(mut self, dir: &str) -> Self {
        self.config.output.target_minified_directory = dir.to_string();
        self
    }

    /// Distinct normal and minified targets, so launches start two
    /// processes.
    pub fn split_targets(self) -> Self {
        self.target("out").minified_target("out/min")
    }

    pub fn disable_minified(mut self) -> Self {
        self.config.output.disable_minified_file_generation = true;
        self
    }

    pub fn verify_interval_secs(mut self, secs: u64) -> Self {
        self.config.watch.verify_interval_secs = secs;
        self
    }

    pub fn build(self) -> CompilerConfig {
        sasswatch::config::validate_config(&self.config)
            .expect("Failed to build valid config from builder");
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
