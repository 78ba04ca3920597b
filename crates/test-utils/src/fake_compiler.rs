use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use sasswatch::compiler::{Compiler, CompilerSelector};
use sasswatch::config::CompilerConfig;
use sasswatch::errors::ProcessError;
use sasswatch::exec::{BoxFuture, Invocation};
use sasswatch::types::ProcessOutcome;

/// What a fake `watch` call reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeWatch {
    /// A fresh positive pid.
    Start,
    /// `killed = true`.
    Killed,
    /// `pid = None`.
    NoPid,
    /// The compiler call itself fails.
    Fail(String),
}

/// One recorded `watch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchCall {
    pub source_dir: PathBuf,
    pub minified: bool,
}

/// A compiler that never spawns anything.
///
/// - hands out distinct pids starting at 1000
/// - records every `watch` call
/// - can be scripted per output kind and per directory
/// - can hold calls in flight until the test releases them
#[derive(Debug)]
pub struct FakeCompiler {
    next_pid: AtomicU32,
    calls: Mutex<Vec<WatchCall>>,
    started: Mutex<Vec<u32>>,
    defaults: Mutex<HashMap<bool, FakeWatch>>,
    per_dir: Mutex<HashMap<(PathBuf, bool), FakeWatch>>,
    queued: Mutex<VecDeque<FakeWatch>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            calls: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
            defaults: Mutex::new(HashMap::new()),
            per_dir: Mutex::new(HashMap::new()),
            queued: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    /// Every `watch` call waits for a permit on the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Behaviour for all normal (`minified = false`) or minified calls.
    pub fn with_behaviour(self, minified: bool, behaviour: FakeWatch) -> Self {
        self.defaults.lock().unwrap().insert(minified, behaviour);
        self
    }

    /// Behaviour for one resolved source directory.
    pub fn with_dir_behaviour(
        self,
        dir: impl Into<PathBuf>,
        minified: bool,
        behaviour: FakeWatch,
    ) -> Self {
        self.per_dir
            .lock()
            .unwrap()
            .insert((dir.into(), minified), behaviour);
        self
    }

    /// Behaviour for the next call to get past the gate, ahead of any
    /// per-directory or default setting. Queued behaviours are used in order.
    pub fn with_next(self, behaviour: FakeWatch) -> Self {
        self.queued.lock().unwrap().push_back(behaviour);
        self
    }

    pub fn calls(&self) -> Vec<WatchCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Pids handed out so far, in order.
    pub fn started(&self) -> Vec<u32> {
        self.started.lock().unwrap().clone()
    }

    fn behaviour_for(&self, dir: &Path, minified: bool) -> FakeWatch {
        if let Some(b) = self.queued.lock().unwrap().pop_front() {
            return b;
        }
        if let Some(b) = self
            .per_dir
            .lock()
            .unwrap()
            .get(&(dir.to_path_buf(), minified))
        {
            return b.clone();
        }
        self.defaults
            .lock()
            .unwrap()
            .get(&minified)
            .cloned()
            .unwrap_or(FakeWatch::Start)
    }
}

impl Default for FakeCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for FakeCompiler {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn executable_setting(&self) -> &'static str {
        "[compiler].sass_bin_path"
    }

    fn base_invocation(&self, _project_root: &Path, _config: &CompilerConfig) -> Invocation {
        Invocation::new("fake-sass")
    }

    fn watch<'a>(
        &'a self,
        source_dir: &'a Path,
        _project_root: &'a Path,
        _config: &'a CompilerConfig,
        minified: bool,
    ) -> BoxFuture<'a, Result<ProcessOutcome, ProcessError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(WatchCall {
                source_dir: source_dir.to_path_buf(),
                minified,
            });

            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }

            match self.behaviour_for(source_dir, minified) {
                FakeWatch::Start => {
                    let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
                    self.started.lock().unwrap().push(pid);
                    Ok(ProcessOutcome::started(pid))
                }
                FakeWatch::Killed => Ok(ProcessOutcome::killed(None)),
                FakeWatch::NoPid => Ok(ProcessOutcome::default()),
                FakeWatch::Fail(msg) => Err(ProcessError::Spawn {
                    program: "fake-sass".to_string(),
                    source: std::io::Error::other(msg),
                }),
            }
        })
    }
}

/// Selector that always hands out the same fake compiler.
#[derive(Debug, Clone)]
pub struct FakeSelector(pub Arc<FakeCompiler>);

impl CompilerSelector for FakeSelector {
    fn select(&self, _config: &CompilerConfig) -> Arc<dyn Compiler> {
        self.0.clone()
    }
}
