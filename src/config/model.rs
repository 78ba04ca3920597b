use serde::{Deserialize, Serialize};

use crate::types::CompilerBackend;

/// Top-level configuration as read from `Sasswatch.toml`.
///
/// ```toml
/// [compiler]
/// backend = "native"
/// sass_bin_path = "/usr/local/bin/sass"
/// include_path = ["node_modules"]
///
/// [output]
/// target_directory = "public/css"
/// target_minified_directory = "public/css/min"
///
/// [watch]
/// directories = ["src/styles", "src/themes"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CompilerConfig {
    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[compiler]` section: which backend runs and how it is invoked.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompilerSection {
    #[serde(default)]
    pub backend: CompilerBackend,

    /// Path of the native `sass` executable.
    #[serde(default = "default_sass_bin_path")]
    pub sass_bin_path: String,

    /// `node` executable used by the dartsass backend.
    #[serde(default = "default_node_bin_path")]
    pub node_bin_path: String,

    /// CLI entry of the npm `sass` package, relative to the project root.
    #[serde(default = "default_dart_sass_script")]
    pub dart_sass_script: String,

    /// Extra `--load-path` directories, relative to the project root.
    #[serde(default)]
    pub include_path: Vec<String>,

    /// Working directory of the compiler process; project root when empty.
    #[serde(default)]
    pub sass_working_directory: String,

    #[serde(default)]
    pub disable_source_map: bool,

    /// Log the full compiler invocation at info level.
    #[serde(default)]
    pub debug: bool,
}

fn default_sass_bin_path() -> String {
    "sass".to_string()
}

fn default_node_bin_path() -> String {
    "node".to_string()
}

fn default_dart_sass_script() -> String {
    "node_modules/sass/sass.js".to_string()
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            backend: CompilerBackend::default(),
            sass_bin_path: default_sass_bin_path(),
            node_bin_path: default_node_bin_path(),
            dart_sass_script: default_dart_sass_script(),
            include_path: Vec::new(),
            sass_working_directory: String::new(),
            disable_source_map: false,
            debug: false,
        }
    }
}

/// `[output]` section: where compiled CSS goes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct OutputSection {
    /// Output directory for expanded CSS; next to the sources when empty.
    #[serde(default)]
    pub target_directory: String,

    /// Output directory for minified CSS; `target_directory` when empty.
    #[serde(default)]
    pub target_minified_directory: String,

    #[serde(default)]
    pub disable_minified_file_generation: bool,

    /// Compile partials (`_name.scss`) as standalone files.
    #[serde(default)]
    pub enable_start_with_underscores: bool,
}

/// `[watch]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WatchSection {
    /// Directories kept under continuous compilation, relative to the
    /// project root. Order is preserved.
    #[serde(default)]
    pub directories: Vec<String>,

    /// How long a terminated watch process gets to exit after SIGINT before
    /// it is killed.
    #[serde(default = "default_terminate_timeout_ms")]
    pub terminate_timeout_ms: u64,

    /// Interval for checking that watch processes are still alive.
    /// `0` disables the check.
    #[serde(default = "default_verify_interval_secs")]
    pub verify_interval_secs: u64,
}

fn default_terminate_timeout_ms() -> u64 {
    2000
}

fn default_verify_interval_secs() -> u64 {
    30
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            terminate_timeout_ms: default_terminate_timeout_ms(),
            verify_interval_secs: default_verify_interval_secs(),
        }
    }
}
