//! `perf stat` runner.
//!
//! The measured program is executed as a child of the harness. The harness
//! prints one JSON record per counter on stderr, and the program writes its
//! rendered image to a fixed location in its working directory.

use crate::runner::{RunOutput, Runner};
use perfsweep_core::{parser, Error, Result, WorkloadDescriptor};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Harness binary used when none is configured.
pub const DEFAULT_HARNESS: &str = "perf";

/// Environment variable read by the measured program's OpenMP runtime.
pub const DEFAULT_THREADS_ENV: &str = "OMP_NUM_THREADS";

/// Where the measured program writes its image, relative to its working directory.
pub const DEFAULT_ARTIFACT: &str = "mandelbrot.ppm";

/// How to invoke the harness and the measured program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Harness executable (`perf`).
    pub harness: PathBuf,
    /// The measured program.
    pub program: PathBuf,
    /// Artifact written by the program on every run.
    pub artifact: PathBuf,
    /// Environment variable carrying the thread count.
    pub threads_env: String,
    /// Working directory for the child; the current directory when unset.
    pub working_dir: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            harness: PathBuf::from(DEFAULT_HARNESS),
            program: program.into(),
            artifact: PathBuf::from(DEFAULT_ARTIFACT),
            threads_env: DEFAULT_THREADS_ENV.to_string(),
            working_dir: None,
        }
    }

    pub fn with_harness(mut self, harness: impl Into<PathBuf>) -> Self {
        self.harness = harness.into();
        self
    }

    pub fn with_artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = artifact.into();
        self
    }

    pub fn with_threads_env(mut self, name: impl Into<String>) -> Self {
        self.threads_env = name.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Runner that measures the program with `perf stat`.
pub struct PerfRunner {
    config: RunnerConfig,
}

impl PerfRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Directory the child runs in.
    fn working_dir(&self) -> Result<PathBuf> {
        match &self.config.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.working_dir()?.join(path))
        }
    }

    /// Location of the artifact after a run.
    pub fn artifact_path(&self) -> Result<PathBuf> {
        self.resolve(&self.config.artifact)
    }

    /// Harness arguments for `descriptor`, program and its arguments included.
    pub fn args(&self, descriptor: &WorkloadDescriptor) -> Result<Vec<String>> {
        let program = self.resolve(&self.config.program)?;

        let mut args = vec![
            "stat".to_string(),
            // Multiple samples give the harness a variance to report
            "-r".to_string(),
            descriptor.repeat().to_string(),
            "-e".to_string(),
            descriptor.events().join(","),
            // One JSON record per counter
            "-j".to_string(),
            program.display().to_string(),
        ];
        args.extend(descriptor.program_args());
        Ok(args)
    }

    /// Build the full harness command for `descriptor`.
    pub fn command(&self, descriptor: &WorkloadDescriptor) -> Result<Command> {
        let mut cmd = Command::new(&self.config.harness);
        cmd.args(self.args(descriptor)?)
            .current_dir(self.working_dir()?)
            .env(&self.config.threads_env, descriptor.threads().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(cmd)
    }
}

impl Runner for PerfRunner {
    fn name(&self) -> &'static str {
        "perf"
    }

    fn run(&self, descriptor: &WorkloadDescriptor) -> Result<RunOutput> {
        let command_line = format!(
            "{} {}",
            self.config.harness.display(),
            self.args(descriptor)?.join(" ")
        );
        tracing::info!(workload = %descriptor, threads = descriptor.threads(), "running measure");
        tracing::debug!(command = %command_line, "spawning harness");

        let output = self
            .command(descriptor)?
            .output()
            .map_err(|e| Error::Other(format!("Failed to run `{}`: {}", command_line, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::SubprocessFailure {
                command: command_line,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        if !output.stdout.is_empty() {
            tracing::debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "program output");
        }

        let results = parser::parse_output(&stderr)?;
        tracing::info!(count = results.len(), "results:");
        for result in &results {
            tracing::info!("\t{}", result);
        }

        Ok(RunOutput {
            results,
            artifact_path: self.artifact_path()?,
        })
    }
}
